//! # scan-capture-core
//!
//! Platform-agnostic camera capture core for barcode scanning.
//!
//! Owns the capture-session lifecycle: device selection, session graph
//! (input → outputs), live preview, flash/torch control, on-demand still
//! capture, and teardown. Platform backends (AVFoundation, V4L2, the
//! simulator in scan-capture-sim) implement the `CameraDevice` and
//! `CameraEnumerator` traits and plug into the generic
//! `CaptureSessionManager`.
//!
//! ## Architecture
//!
//! ```text
//! scan-capture-core (this crate)
//! ├── traits/       ← CameraDevice, CameraEnumerator, CaptureDelegate, ScanDelegate, BarcodeDetector
//! ├── models/       ← CaptureError, SessionState, SessionConfiguration, frame/still/barcode types
//! ├── session/      ← CaptureSessionManager, VideoDataOutput, StillImageOutput, PreviewLayer
//! └── controller    ← ScanController (scan surface shell)
//! ```

pub mod controller;
pub mod models;
pub mod session;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types at crate root for convenience.
pub use controller::ScanController;
pub use models::camera_models::{
    Barcode, CameraInfo, CameraPosition, FlashMode, PixelFormat, SessionDiagnostics, StillImage,
    TorchMode, VideoFrame,
};
pub use models::config::SessionConfiguration;
pub use models::error::CaptureError;
pub use models::state::SessionState;
pub use session::manager::CaptureSessionManager;
pub use session::outputs::{StillImageOutput, StillObserver, SubscriptionId, VideoDataOutput};
pub use session::preview::PreviewLayer;
pub use traits::barcode_detector::BarcodeDetector;
pub use traits::camera_device::{CameraDevice, FrameCallback, StillCompletion};
pub use traits::camera_enumerator::CameraEnumerator;
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::scan_delegate::ScanDelegate;
