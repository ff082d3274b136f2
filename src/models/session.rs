use chrono::{DateTime, Utc};

/// Session-level display state. Created on load, mutated only by the
/// services, reset to `Idle` by an explicit user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    PermissionPending,
    CameraActive,
    ImageCaptured,
    Analyzing,
    Result,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Camera,
    Upload,
}

/// Encoded chart image ready for submission.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Always a `data:<mime>;base64,...` URI.
    pub data_uri: String,
    pub source: ImageSource,
    pub captured_at: DateTime<Utc>,
}

impl ImagePayload {
    pub fn new(data_uri: String, source: ImageSource) -> Self {
        Self {
            data_uri,
            source,
            captured_at: Utc::now(),
        }
    }
}
