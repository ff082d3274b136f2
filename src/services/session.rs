use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::camera::CameraDevice;
use crate::errors::SessionError;
use crate::models::{AnalysisResult, ImagePayload, SessionState};
use crate::platform::CapabilityProbe;
use crate::services::analysis::{AnalysisBackend, AnalysisOrchestrator};
use crate::services::capture::CaptureController;
use crate::services::permission::{PermissionPhase, PermissionStateMachine};

/// Session-level state model tying permission, capture and analysis
/// together. One instance per user session; all mutation goes through the
/// methods below, and `&mut self` keeps user events strictly sequential.
pub struct ChartSession {
    state: SessionState,
    permission: PermissionStateMachine,
    capture: CaptureController,
    orchestrator: AnalysisOrchestrator,
    device: Arc<dyn CameraDevice>,
    image: Option<ImagePayload>,
    result: Option<AnalysisResult>,
    error: Option<String>,
}

impl ChartSession {
    pub fn new(
        device: Arc<dyn CameraDevice>,
        backend: Arc<dyn AnalysisBackend>,
        probe: Arc<dyn CapabilityProbe>,
    ) -> Self {
        Self {
            state: SessionState::Idle,
            permission: PermissionStateMachine::new(probe),
            capture: CaptureController::new(),
            orchestrator: AnalysisOrchestrator::new(backend),
            device,
            image: None,
            result: None,
            error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    /// Message for the terminal `Error` state.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn permission_phase(&self) -> PermissionPhase {
        self.permission.phase()
    }

    /// True after a denied acquisition: retry and upload stay available.
    pub fn fallback_offered(&self) -> bool {
        self.permission.phase() == PermissionPhase::FallbackOffered
    }

    pub fn denial_message(&self) -> Option<&'static str> {
        self.permission.denial_message()
    }

    pub fn remediation(&self) -> &'static str {
        self.permission.remediation()
    }

    /// Native preview size while the camera is live.
    pub fn preview_dimensions(&self) -> Option<(u32, u32)> {
        self.capture.preview_dimensions()
    }

    /// Starts camera acquisition from `Idle`. Platforms that want a consent
    /// explanation park in `PermissionPending` until [`Self::confirm_consent`].
    pub async fn start(&mut self) -> Result<SessionState, SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::InvalidState(self.state));
        }
        if self.permission.begin() {
            info!("awaiting consent acknowledgement before camera prompt");
            self.state = SessionState::PermissionPending;
            return Ok(self.state);
        }
        self.request_camera().await
    }

    /// Consent-explanation acknowledgement; issues the real prompt.
    pub async fn confirm_consent(&mut self) -> Result<SessionState, SessionError> {
        if self.state != SessionState::PermissionPending {
            return Err(SessionError::InvalidState(self.state));
        }
        self.request_camera().await
    }

    /// Retry action exposed by the denial fallback.
    pub async fn retry_permission(&mut self) -> Result<SessionState, SessionError> {
        if self.state != SessionState::Idle || !self.fallback_offered() {
            return Err(SessionError::InvalidState(self.state));
        }
        self.request_camera().await
    }

    async fn request_camera(&mut self) -> Result<SessionState, SessionError> {
        self.state = SessionState::PermissionPending;
        match self.permission.acquire(self.device.as_ref()).await {
            Ok(stream) => {
                self.capture.attach(stream);
                self.state = SessionState::CameraActive;
                Ok(self.state)
            }
            Err(e) => {
                // Locally recoverable; the fallback actions stay available.
                self.state = SessionState::Idle;
                Err(e.into())
            }
        }
    }

    /// Captures one frame and drives it through analysis. The stream is
    /// released on every path out of `CameraActive`; `ImageCaptured`
    /// advances to `Analyzing` automatically.
    pub async fn capture_and_analyze(&mut self) -> Result<SessionState, SessionError> {
        if self.state != SessionState::CameraActive {
            return Err(SessionError::InvalidState(self.state));
        }

        let image = match self.capture.capture() {
            Ok(image) => image,
            Err(e) => {
                warn!("frame capture failed: {e}");
                self.state = SessionState::Idle;
                return Err(e.into());
            }
        };

        self.state = SessionState::ImageCaptured;
        self.image = Some(image);
        self.analyze().await
    }

    /// File-selection capture path, valid from `Idle` (camera never started,
    /// or the fallback was taken). Invalid files never reach the network.
    pub async fn upload_and_analyze(&mut self, path: &Path) -> Result<SessionState, SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::InvalidState(self.state));
        }

        let image = self.capture.load_file(path)?;
        self.state = SessionState::ImageCaptured;
        self.image = Some(image);
        self.analyze().await
    }

    /// Cancels the live camera without analyzing. `CameraActive` -> `Idle`.
    pub fn cancel(&mut self) -> Result<SessionState, SessionError> {
        if self.state != SessionState::CameraActive {
            return Err(SessionError::InvalidState(self.state));
        }
        self.capture.cancel();
        self.state = SessionState::Idle;
        Ok(self.state)
    }

    /// Explicit user reset back to `Idle`. Discards the captured image, the
    /// result, the error, and any stray stream.
    pub fn reset(&mut self) -> SessionState {
        self.capture.cancel();
        self.image = None;
        self.result = None;
        self.error = None;
        self.state = SessionState::Idle;
        self.state
    }

    async fn analyze(&mut self) -> Result<SessionState, SessionError> {
        let image = match self.image.clone() {
            Some(image) => image,
            None => return Err(SessionError::InvalidState(self.state)),
        };

        self.state = SessionState::Analyzing;
        match self.orchestrator.submit(&image).await {
            Ok(result) => {
                self.result = Some(result);
                self.state = SessionState::Result;
                Ok(self.state)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.state = SessionState::Error;
                Err(e)
            }
        }
    }
}
