use serde::{Deserialize, Serialize};

/// Physical placement of a camera on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    Front,
    Back,
    External,
}

/// Flash behavior during still capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    Off,
    On,
    Auto,
}

/// Continuous illumination mode, distinct from flash (which fires only
/// during still capture).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TorchMode {
    Off,
    On,
    Auto,
}

/// Pixel layout of delivered frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Gray8,
    Nv12,
    Bgra8,
}

/// A camera available for capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub id: String,
    pub name: String,
    pub position: CameraPosition,
    pub has_flash: bool,
    pub has_torch: bool,
    pub is_default: bool,
}

/// A single frame from the continuous capture stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFrame {
    pub sequence: u64,
    pub timestamp_us: u64,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

/// A decoded still image produced by `StillImageOutput`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StillImage {
    pub id: String,
    pub captured_at: String,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Whether the flash was engaged when the sensor fired.
    pub flash_fired: bool,
    pub data: Vec<u8>,
}

impl StillImage {
    /// Stamps a fresh capture with a v4 id and an RFC 3339 timestamp.
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        flash_fired: bool,
        data: Vec<u8>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            captured_at: chrono::Utc::now().to_rfc3339(),
            width,
            height,
            format,
            flash_fired,
            data,
        }
    }
}

/// A decoded barcode payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barcode {
    /// Symbology name, e.g. "ean13", "qr".
    pub symbology: String,
    pub payload: String,
}

/// Diagnostics for debugging capture sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDiagnostics {
    pub frames_delivered: u64,
    pub stills_requested: u64,
    pub stills_completed: u64,
    pub stills_failed: u64,
}
