use crate::models::camera_models::StillImage;
use crate::models::error::CaptureError;
use crate::models::state::SessionState;

/// Event delegate for capture session notifications.
///
/// All methods are called from capture/completion threads, not the UI
/// thread. Implementations should marshal to the UI thread if needed.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: &SessionState);

    /// Called when a still-image request completes successfully.
    fn on_still_captured(&self, image: &StillImage);

    /// Called when a recoverable error occurs during capture.
    fn on_error(&self, error: &CaptureError);
}
