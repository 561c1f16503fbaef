use crate::models::camera_models::{Barcode, VideoFrame};

/// Frame-level barcode decoding capability.
///
/// Decoding itself is delegated to a platform vision/metadata backend;
/// implementations wrap that backend behind this seam.
pub trait BarcodeDetector: Send + Sync {
    /// Inspect one frame. Runs on the capture thread at frame rate, so
    /// implementations must be cheap per call.
    fn detect(&self, frame: &VideoFrame) -> Option<Barcode>;
}
