//! Capture-to-analysis session engine for trading chart images.
//!
//! A session acquires a camera stream (or accepts a file upload), encodes one
//! frame as a base64 data URI, submits it to an external vision-analysis
//! service, and validates the structured verdict it returns.

pub mod camera;
pub mod errors;
pub mod extract;
pub mod logger;
pub mod models;
pub mod platform;
pub mod remote;
pub mod services;

pub use errors::{InputError, PermissionError, ResponseError, ServiceError, SessionError};
pub use models::{AnalysisResult, Direction, ImagePayload, SessionState, VisualIndicator};
pub use services::{AnalysisBackend, AnalysisOrchestrator, ChartSession};
