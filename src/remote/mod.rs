pub mod analysis_response;
pub mod vision_client;

pub use analysis_response::RawAnalysis;
pub use vision_client::VisionClient;
