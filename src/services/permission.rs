use std::sync::Arc;

use tracing::{info, warn};

use crate::camera::{CameraDevice, CameraStream, StreamConstraints};
use crate::errors::PermissionError;
use crate::platform::{CapabilityProbe, Platform, remediation_steps};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionPhase {
    Idle,
    RequestingConsent,
    Granted,
    Denied,
    /// Terminal for a failed acquisition: the user may retry the request or
    /// switch to the file-upload path.
    FallbackOffered,
}

/// Drives camera-access acquisition: the platform consent step, constraint
/// classification, and the single relaxation retry.
pub struct PermissionStateMachine {
    phase: PermissionPhase,
    probe: Arc<dyn CapabilityProbe>,
    denial_message: Option<&'static str>,
}

impl PermissionStateMachine {
    pub fn new(probe: Arc<dyn CapabilityProbe>) -> Self {
        Self {
            phase: PermissionPhase::Idle,
            probe,
            denial_message: None,
        }
    }

    pub fn phase(&self) -> PermissionPhase {
        self.phase
    }

    /// Message describing the last denial, phrased for the fallback screen.
    pub fn denial_message(&self) -> Option<&'static str> {
        self.denial_message
    }

    /// Steps for re-enabling camera access on this platform/browser.
    pub fn remediation(&self) -> &'static str {
        remediation_steps(self.probe.platform(), self.probe.browser())
    }

    /// True when the platform wants a consent explanation shown before the
    /// real permission prompt.
    pub fn needs_consent_prompt(&self) -> bool {
        self.probe.platform() == Platform::Ios
    }

    /// Arms the consent-explanation step. Returns `true` when the machine is
    /// parked in `RequestingConsent` awaiting acknowledgement; `false` means
    /// the caller should issue the device request immediately.
    pub fn begin(&mut self) -> bool {
        self.denial_message = None;
        if self.needs_consent_prompt() {
            self.phase = PermissionPhase::RequestingConsent;
            true
        } else {
            false
        }
    }

    /// Issues the actual device request. Preferred constraints first; a
    /// `ConstraintsUnsatisfiable` answer earns exactly one retry with the
    /// minimal set. Any other failure, or a failed retry, lands in
    /// `FallbackOffered`.
    pub async fn acquire(
        &mut self,
        device: &dyn CameraDevice,
    ) -> Result<CameraStream, PermissionError> {
        self.phase = PermissionPhase::RequestingConsent;
        self.denial_message = None;

        match device.open(&StreamConstraints::preferred()).await {
            Ok(stream) => {
                self.phase = PermissionPhase::Granted;
                Ok(stream)
            }
            Err(PermissionError::ConstraintsUnsatisfiable) => {
                info!("preferred constraints rejected, retrying with minimal set");
                match device.open(&StreamConstraints::minimal()).await {
                    Ok(stream) => {
                        self.phase = PermissionPhase::Granted;
                        Ok(stream)
                    }
                    Err(retry_err) => {
                        warn!("relaxed constraint retry failed: {retry_err}");
                        self.deny("Could not access the camera. Upload an image instead.");
                        Err(retry_err)
                    }
                }
            }
            Err(err) => {
                warn!("camera acquisition failed: {err}");
                self.deny(Self::message_for(&err));
                Err(err)
            }
        }
    }

    fn deny(&mut self, message: &'static str) {
        self.phase = PermissionPhase::Denied;
        self.denial_message = Some(message);
        // Denial always comes with the two-way fallback.
        self.phase = PermissionPhase::FallbackOffered;
    }

    fn message_for(err: &PermissionError) -> &'static str {
        match err {
            PermissionError::Denied => {
                "Camera permission denied. Upload an image instead, or follow the steps to enable camera access."
            }
            PermissionError::NoDevice => "No camera found. Upload an image of the chart instead.",
            PermissionError::DeviceBusy => {
                "The camera is in use by another application. Close other apps or upload an image."
            }
            _ => "Could not access the camera. Upload an image instead.",
        }
    }
}
