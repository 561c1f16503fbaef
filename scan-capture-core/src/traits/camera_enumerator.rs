use std::sync::Arc;

use super::camera_device::CameraDevice;

/// Enumeration of the cameras available to the process.
pub trait CameraEnumerator: Send + Sync {
    /// Cameras currently available, in platform order.
    fn devices(&self) -> Vec<Arc<dyn CameraDevice>>;
}
