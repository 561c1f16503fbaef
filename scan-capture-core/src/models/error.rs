use thiserror::Error;

/// Errors that can occur during capture-session operations.
///
/// All of these are recoverable at the call site; none should terminate
/// the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("no camera device available")]
    DeviceUnavailable,

    #[error("device busy: {0}")]
    DeviceBusy(String),

    #[error("unsupported mode: {0}")]
    UnsupportedMode(String),

    #[error("invalid session state: {0}")]
    InvalidState(String),

    #[error("still capture already in flight")]
    CaptureInFlight,

    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),
}
