use async_trait::async_trait;
use image::RgbImage;
use tracing::warn;

use super::constraints::StreamConstraints;
use crate::errors::{InputError, PermissionError};

/// One live video track. Implementations wrap whatever actually produces
/// frames; `stop` must be idempotent-safe only through [`CameraStream`].
pub trait VideoTrack: Send {
    /// Native frame dimensions of the track.
    fn dimensions(&self) -> (u32, u32);

    /// One frame at the track's native dimensions.
    fn grab_frame(&mut self) -> Result<RgbImage, InputError>;

    fn stop(&mut self);
}

/// Exclusive handle over an acquired track. Every stop routes through
/// [`CameraStream::release`]; dropping an unreleased stream stops the track
/// as well, so a handle can never leak a running camera.
pub struct CameraStream {
    track: Box<dyn VideoTrack>,
    released: bool,
}

impl std::fmt::Debug for CameraStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraStream")
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl CameraStream {
    pub fn new(track: Box<dyn VideoTrack>) -> Self {
        Self {
            track,
            released: false,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.track.dimensions()
    }

    pub fn grab_frame(&mut self) -> Result<RgbImage, InputError> {
        self.track.grab_frame()
    }

    /// Stops the underlying track exactly once.
    pub fn release(&mut self) {
        if !self.released {
            self.track.stop();
            self.released = true;
        }
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        if !self.released {
            warn!("camera stream dropped without explicit release, stopping track");
            self.track.stop();
            self.released = true;
        }
    }
}

/// Device seam for camera acquisition. The real implementation lives with the
/// embedder; tests script it.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open(&self, constraints: &StreamConstraints)
    -> Result<CameraStream, PermissionError>;
}

/// Device for environments without camera hardware. Every request reports
/// missing hardware, which pushes sessions onto the file-upload path.
pub struct NoCameraDevice;

#[async_trait]
impl CameraDevice for NoCameraDevice {
    async fn open(
        &self,
        _constraints: &StreamConstraints,
    ) -> Result<CameraStream, PermissionError> {
        Err(PermissionError::NoDevice)
    }
}
