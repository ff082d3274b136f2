use std::fs;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, info};

use crate::camera::CameraStream;
use crate::errors::InputError;
use crate::models::{ImagePayload, ImageSource};

/// Lossy encode quality for captured frames (canvas 0.8 equivalent).
const CAPTURE_JPEG_QUALITY: u8 = 80;

/// Owns the live media stream while the camera is active, turns frames into
/// encoded payloads, and handles the file-upload alternative.
pub struct CaptureController {
    stream: Option<CameraStream>,
}

impl CaptureController {
    pub fn new() -> Self {
        Self { stream: None }
    }

    /// Takes ownership of a freshly acquired stream. Any stray previous
    /// stream is released first; there is at most one live stream per
    /// session.
    pub fn attach(&mut self, stream: CameraStream) {
        self.release_stream();
        self.stream = Some(stream);
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Native frame size of the live preview, while a stream is attached.
    pub fn preview_dimensions(&self) -> Option<(u32, u32)> {
        self.stream.as_ref().map(|s| s.dimensions())
    }

    /// Grabs one frame at the stream's native dimensions, encodes it, and
    /// emits the payload. The stream is released on every exit path, success
    /// or error.
    pub fn capture(&mut self) -> Result<ImagePayload, InputError> {
        let result = match self.stream.as_mut() {
            Some(stream) => Self::encode_frame(stream),
            None => Err(InputError::Unreadable("no live camera stream".into())),
        };
        self.release_stream();
        result
    }

    /// Explicit cancel from the live preview.
    pub fn cancel(&mut self) {
        self.release_stream();
    }

    /// Sole stop path for the live stream.
    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
            info!("camera stream released");
        }
    }

    fn encode_frame(stream: &mut CameraStream) -> Result<ImagePayload, InputError> {
        let (width, height) = stream.dimensions();
        let frame = stream.grab_frame()?;
        debug!("captured frame at {}x{}", width, height);

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, CAPTURE_JPEG_QUALITY)
            .encode(frame.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| InputError::EncodeFailed(e.to_string()))?;

        Ok(ImagePayload::new(
            format!("data:image/jpeg;base64,{}", BASE64.encode(&jpeg)),
            ImageSource::Camera,
        ))
    }

    /// File-selection capture path. The MIME gate runs before any read;
    /// non-image files are rejected locally and never reach the network.
    pub fn load_file(&self, path: &Path) -> Result<ImagePayload, InputError> {
        let mime = image_mime(path)
            .ok_or_else(|| InputError::UnsupportedType(path.display().to_string()))?;

        let bytes = fs::read(path)
            .map_err(|e| InputError::Unreadable(format!("{}: {e}", path.display())))?;

        Ok(ImagePayload::new(
            format!("data:{mime};base64,{}", BASE64.encode(&bytes)),
            ImageSource::Upload,
        ))
    }
}

impl Default for CaptureController {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension-based MIME gate for uploads. Unknown extensions are rejected
/// rather than guessed.
fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "heic" | "heif" => Some("image/heic"),
        _ => None,
    }
}
