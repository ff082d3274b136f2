pub use analysis::{AnalysisBackend, AnalysisOrchestrator};
pub use capture::CaptureController;
pub use permission::{PermissionPhase, PermissionStateMachine};
pub use session::ChartSession;

pub mod analysis;
pub mod capture;
pub mod permission;
pub mod session;
