use std::sync::Arc;

use crate::models::camera_models::{CameraInfo, FlashMode, StillImage, TorchMode, VideoFrame};
use crate::models::config::SessionConfiguration;
use crate::models::error::CaptureError;

/// Callback invoked for each captured frame.
///
/// Fires on the device's capture thread, in capture order, one frame at a
/// time. Keep per-frame work minimal.
pub type FrameCallback = Arc<dyn Fn(&VideoFrame) + Send + Sync + 'static>;

/// One-shot completion for a still-image request.
///
/// Invoked exactly once, on the device's completion thread — unless the
/// request itself was rejected, in which case it is never invoked.
pub type StillCompletion = Box<dyn FnOnce(Result<StillImage, CaptureError>) + Send + 'static>;

/// Interface to a physical (or simulated) camera.
///
/// Implemented by platform backends:
/// - `SimCamera` (scan-capture-sim)
/// - Future: `AvFoundationCamera` (macOS/iOS), `V4l2Camera` (Linux)
pub trait CameraDevice: Send + Sync {
    /// Descriptor for this camera (position, capabilities).
    fn info(&self) -> CameraInfo;

    /// Whether the device's light source supports flash during still capture.
    fn has_flash(&self) -> bool;

    /// Whether the device's light source supports continuous torch mode.
    fn has_torch(&self) -> bool;

    /// Acquire the exclusive configuration lock.
    ///
    /// The camera is a singleton hardware resource; mode and format changes
    /// are only valid while this lock is held. Bounded wait: returns
    /// `DeviceBusy` rather than hanging if another consumer holds the device.
    fn lock_for_configuration(&self) -> Result<(), CaptureError>;

    /// Release the configuration lock.
    fn unlock_for_configuration(&self);

    /// Apply the session's format (dimensions, frame rate).
    /// Requires the configuration lock.
    fn configure_format(&self, config: &SessionConfiguration) -> Result<(), CaptureError>;

    /// Apply a flash mode. Requires the configuration lock.
    fn set_flash_mode(&self, mode: FlashMode) -> Result<(), CaptureError>;

    /// Apply a torch mode. Requires the configuration lock.
    fn set_torch_mode(&self, mode: TorchMode) -> Result<(), CaptureError>;

    fn flash_mode(&self) -> FlashMode;

    fn torch_mode(&self) -> TorchMode;

    /// Start continuous frame delivery via `callback`.
    fn start_streaming(&self, callback: FrameCallback) -> Result<(), CaptureError>;

    /// Stop frame delivery. Returns once no further callbacks will fire.
    fn stop_streaming(&self) -> Result<(), CaptureError>;

    /// Request one decoded still image.
    ///
    /// Returns immediately; `completion` fires later on the device's
    /// completion thread. If this returns an error, `completion` is dropped
    /// without being invoked.
    fn capture_still(&self, completion: StillCompletion) -> Result<(), CaptureError>;
}
