pub mod analysis;
pub mod session;

pub use analysis::{AnalysisResult, Direction, Elliott, Fibonacci, VisualIndicator};
pub use session::{ImagePayload, ImageSource, SessionState};
