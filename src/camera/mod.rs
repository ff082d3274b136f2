pub mod constraints;
pub mod device;

pub use constraints::{FacingMode, StreamConstraints};
pub use device::{CameraDevice, CameraStream, NoCameraDevice, VideoTrack};
