use super::camera_models::CameraPosition;
use super::error::CaptureError;

/// Configuration for a capture session.
#[derive(Debug, Clone)]
pub struct SessionConfiguration {
    /// Camera placement to prefer during device selection. If no camera at
    /// this position exists, any available camera is used instead.
    pub preferred_position: CameraPosition,

    /// Target frame rate in frames per second (default: 30).
    pub frame_rate: f64,

    /// Requested frame width in pixels (default: 1280).
    pub width: u32,

    /// Requested frame height in pixels (default: 720).
    pub height: u32,
}

impl SessionConfiguration {
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.frame_rate <= 0.0 || !self.frame_rate.is_finite() {
            return Err(CaptureError::ConfigurationFailed(
                "frame rate must be positive".into(),
            ));
        }
        if self.frame_rate > 240.0 {
            return Err(CaptureError::ConfigurationFailed(format!(
                "frame rate too high: {}",
                self.frame_rate
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::ConfigurationFailed(
                "frame dimensions must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            preferred_position: CameraPosition::Back,
            frame_rate: 30.0,
            width: 1280,
            height: 720,
        }
    }
}
