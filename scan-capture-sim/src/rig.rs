use std::sync::Arc;

use scan_capture_core::models::camera_models::CameraPosition;
use scan_capture_core::traits::camera_device::CameraDevice;
use scan_capture_core::traits::camera_enumerator::CameraEnumerator;

use crate::sim_camera::SimCamera;

/// A fixed set of simulated cameras, enumerable by the capture core.
pub struct SimRig {
    devices: Vec<Arc<SimCamera>>,
}

impl SimRig {
    /// The usual phone layout: a back camera with flash and torch, and a
    /// front camera with neither.
    pub fn front_and_back() -> Self {
        Self::custom(vec![
            Arc::new(SimCamera::back()),
            Arc::new(SimCamera::front()),
        ])
    }

    pub fn back_only() -> Self {
        Self::custom(vec![Arc::new(SimCamera::back())])
    }

    /// A rig with no cameras at all.
    pub fn empty() -> Self {
        Self::custom(Vec::new())
    }

    pub fn custom(devices: Vec<Arc<SimCamera>>) -> Self {
        Self { devices }
    }

    /// The rig's camera at `position`, for test inspection.
    pub fn camera(&self, position: CameraPosition) -> Option<Arc<SimCamera>> {
        self.devices
            .iter()
            .find(|d| d.info().position == position)
            .cloned()
    }
}

impl CameraEnumerator for SimRig {
    fn devices(&self) -> Vec<Arc<dyn CameraDevice>> {
        self.devices
            .iter()
            .map(|d| Arc::clone(d) as Arc<dyn CameraDevice>)
            .collect()
    }
}
