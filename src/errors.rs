use thiserror::Error;

use crate::models::SessionState;

/// Camera acquisition failures, classified from whatever the device layer
/// reports. Recoverable locally: the session offers retry or file upload.
#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("camera permission denied by the user")]
    Denied,
    #[error("no camera device available")]
    NoDevice,
    #[error("camera is in use by another application")]
    DeviceBusy,
    #[error("requested camera constraints cannot be satisfied")]
    ConstraintsUnsatisfiable,
    #[error("camera access failed: {0}")]
    Other(String),
}

/// Local input failures. None of these reach the network.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("selected file is not an image: {0}")]
    UnsupportedType(String),
    #[error("failed to read file: {0}")]
    Unreadable(String),
    #[error("frame encoding failed: {0}")]
    EncodeFailed(String),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("analysis service returned {status}: {message}")]
    Remote { status: u16, message: String },
}

/// Failures turning the service's free-form text into a validated result.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("analysis service returned empty content")]
    EmptyResponse,
    #[error("no JSON object found in service response")]
    NoJsonFound,
    #[error("malformed JSON in service response: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("response failed schema validation: {0}")]
    SchemaMismatch(String),
}

/// Session-scoped error union. Nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Permission(#[from] PermissionError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Response(#[from] ResponseError),
    #[error("operation not allowed while session is {0:?}")]
    InvalidState(SessionState),
}
