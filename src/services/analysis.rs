use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::errors::{ResponseError, ServiceError, SessionError};
use crate::extract::json_region;
use crate::models::{AnalysisResult, ImagePayload, SessionState};
use crate::remote::RawAnalysis;

/// Request/response seam to the external vision-analysis service. One image
/// in, free-form text expected to contain one JSON object out. The service's
/// prompt and scoring live on the other side of this trait.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(&self, image: &ImagePayload) -> Result<String, ServiceError>;
}

/// Submits encoded images and validates what comes back. Enforces the
/// single-flight invariant: at most one outstanding analysis per session.
pub struct AnalysisOrchestrator {
    backend: Arc<dyn AnalysisBackend>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag even when the submission future is dropped.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl AnalysisOrchestrator {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Submits one encoded image. A second submission while one is
    /// outstanding fails fast without touching the network. No automatic
    /// retry on failure.
    pub async fn submit(&self, image: &ImagePayload) -> Result<AnalysisResult, SessionError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            warn!("analysis submission refused, one already in flight");
            return Err(SessionError::InvalidState(SessionState::Analyzing));
        }
        let _guard = FlightGuard(&self.in_flight);

        let text = self.backend.analyze(image).await?;
        let result = Self::parse_response(&text)?;
        info!(
            "analysis complete: {:?} at {}",
            result.direction, result.probability
        );
        Ok(result)
    }

    /// Turns the service's free-form text into a validated result, or a
    /// typed error. Partial data never escapes.
    fn parse_response(text: &str) -> Result<AnalysisResult, ResponseError> {
        if text.trim().is_empty() {
            return Err(ResponseError::EmptyResponse);
        }

        let region = json_region(text).ok_or(ResponseError::NoJsonFound)?;
        let value: serde_json::Value = serde_json::from_str(region)?;
        let raw: RawAnalysis = serde_json::from_value(value)
            .map_err(|e| ResponseError::SchemaMismatch(e.to_string()))?;
        raw.validate()
    }
}
