//! Scripted fakes for unit tests: frames are pushed manually and still
//! completions can be deferred and settled by the test.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::camera_models::{
    Barcode, CameraInfo, CameraPosition, FlashMode, PixelFormat, StillImage, TorchMode, VideoFrame,
};
use crate::models::config::SessionConfiguration;
use crate::models::error::CaptureError;
use crate::models::state::SessionState;
use crate::traits::barcode_detector::BarcodeDetector;
use crate::traits::camera_device::{CameraDevice, FrameCallback, StillCompletion};
use crate::traits::camera_enumerator::CameraEnumerator;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::scan_delegate::ScanDelegate;

pub(crate) struct FakeCamera {
    info: CameraInfo,
    flash: Mutex<FlashMode>,
    torch: Mutex<TorchMode>,
    locked: AtomicBool,
    refuse_lock: AtomicBool,
    streaming: AtomicBool,
    callback: Mutex<Option<FrameCallback>>,
    deferred: AtomicBool,
    pending: Mutex<Option<StillCompletion>>,
    fail_next: AtomicBool,
    next_sequence: AtomicU64,
}

impl FakeCamera {
    pub fn back() -> Arc<Self> {
        Self::create("fake-back", CameraPosition::Back, true, true)
    }

    pub fn front() -> Arc<Self> {
        Self::create("fake-front", CameraPosition::Front, false, false)
    }

    /// A back camera with neither flash nor torch.
    pub fn without_lighting() -> Arc<Self> {
        Self::create("fake-plain", CameraPosition::Back, false, false)
    }

    fn create(id: &str, position: CameraPosition, has_flash: bool, has_torch: bool) -> Arc<Self> {
        Arc::new(Self {
            info: CameraInfo {
                id: id.into(),
                name: format!("Fake Camera ({})", id),
                position,
                has_flash,
                has_torch,
                is_default: position == CameraPosition::Back,
            },
            flash: Mutex::new(FlashMode::Off),
            torch: Mutex::new(TorchMode::Off),
            locked: AtomicBool::new(false),
            refuse_lock: AtomicBool::new(false),
            streaming: AtomicBool::new(false),
            callback: Mutex::new(None),
            deferred: AtomicBool::new(false),
            pending: Mutex::new(None),
            fail_next: AtomicBool::new(false),
            next_sequence: AtomicU64::new(0),
        })
    }

    /// Make every `lock_for_configuration` fail, as if another consumer
    /// held the device.
    pub fn refuse_configuration_lock(&self) {
        self.refuse_lock.store(true, Ordering::SeqCst);
    }

    /// Stash still completions instead of settling them immediately; the
    /// test settles them via `settle_pending`.
    pub fn defer_still_completions(&self) {
        self.deferred.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_capture(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn is_config_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }

    pub fn current_flash(&self) -> FlashMode {
        *self.flash.lock()
    }

    pub fn current_torch(&self) -> TorchMode {
        *self.torch.lock()
    }

    /// Push one frame into the registered callback, as the hardware would.
    /// Returns false if the device is not streaming.
    pub fn emit_frame(&self) -> bool {
        let callback = self.callback.lock().clone();
        match callback {
            Some(callback) if self.streaming.load(Ordering::SeqCst) => {
                let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
                let frame = VideoFrame {
                    sequence,
                    timestamp_us: sequence * 1_000,
                    width: 64,
                    height: 48,
                    format: PixelFormat::Gray8,
                    data: vec![(sequence & 0xff) as u8; 64 * 48],
                };
                callback(&frame);
                true
            }
            _ => false,
        }
    }

    /// Settle a deferred still completion. Returns false if none is pending.
    pub fn settle_pending(&self, result: Result<StillImage, CaptureError>) -> bool {
        // Take the completion out before invoking it so a completion that
        // issues another capture does not re-enter the pending slot's lock.
        let completion = self.pending.lock().take();
        match completion {
            Some(completion) => {
                completion(result);
                true
            }
            None => false,
        }
    }

    pub fn make_still(&self) -> StillImage {
        StillImage::new(
            64,
            48,
            PixelFormat::Gray8,
            *self.flash.lock() != FlashMode::Off,
            vec![0u8; 64 * 48],
        )
    }
}

impl CameraDevice for FakeCamera {
    fn info(&self) -> CameraInfo {
        self.info.clone()
    }

    fn has_flash(&self) -> bool {
        self.info.has_flash
    }

    fn has_torch(&self) -> bool {
        self.info.has_torch
    }

    fn lock_for_configuration(&self) -> Result<(), CaptureError> {
        if self.refuse_lock.load(Ordering::SeqCst) {
            return Err(CaptureError::DeviceBusy("held by another consumer".into()));
        }
        if self.locked.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::DeviceBusy("already locked".into()));
        }
        Ok(())
    }

    fn unlock_for_configuration(&self) {
        self.locked.store(false, Ordering::SeqCst);
    }

    fn configure_format(&self, _config: &SessionConfiguration) -> Result<(), CaptureError> {
        if !self.locked.load(Ordering::SeqCst) {
            return Err(CaptureError::ConfigurationFailed(
                "configuration not locked".into(),
            ));
        }
        Ok(())
    }

    fn set_flash_mode(&self, mode: FlashMode) -> Result<(), CaptureError> {
        if !self.locked.load(Ordering::SeqCst) {
            return Err(CaptureError::ConfigurationFailed(
                "configuration not locked".into(),
            ));
        }
        if !self.info.has_flash {
            return Err(CaptureError::UnsupportedMode("flash".into()));
        }
        *self.flash.lock() = mode;
        Ok(())
    }

    fn set_torch_mode(&self, mode: TorchMode) -> Result<(), CaptureError> {
        if !self.locked.load(Ordering::SeqCst) {
            return Err(CaptureError::ConfigurationFailed(
                "configuration not locked".into(),
            ));
        }
        if !self.info.has_torch {
            return Err(CaptureError::UnsupportedMode("torch".into()));
        }
        *self.torch.lock() = mode;
        Ok(())
    }

    fn flash_mode(&self) -> FlashMode {
        *self.flash.lock()
    }

    fn torch_mode(&self) -> TorchMode {
        *self.torch.lock()
    }

    fn start_streaming(&self, callback: FrameCallback) -> Result<(), CaptureError> {
        if self.streaming.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::InvalidState("already streaming".into()));
        }
        *self.callback.lock() = Some(callback);
        Ok(())
    }

    fn stop_streaming(&self) -> Result<(), CaptureError> {
        self.streaming.store(false, Ordering::SeqCst);
        self.callback.lock().take();
        Ok(())
    }

    fn capture_still(&self, completion: StillCompletion) -> Result<(), CaptureError> {
        if self.deferred.load(Ordering::SeqCst) {
            *self.pending.lock() = Some(completion);
        } else if self.fail_next.swap(false, Ordering::SeqCst) {
            completion(Err(CaptureError::CaptureFailed("injected fault".into())));
        } else {
            completion(Ok(self.make_still()));
        }
        Ok(())
    }
}

pub(crate) struct FakeEnumerator {
    devices: Vec<Arc<FakeCamera>>,
}

impl FakeEnumerator {
    pub fn of(devices: Vec<Arc<FakeCamera>>) -> Arc<Self> {
        Arc::new(Self { devices })
    }

    pub fn empty() -> Arc<Self> {
        Self::of(Vec::new())
    }
}

impl CameraEnumerator for FakeEnumerator {
    fn devices(&self) -> Vec<Arc<dyn CameraDevice>> {
        self.devices
            .iter()
            .map(|d| Arc::clone(d) as Arc<dyn CameraDevice>)
            .collect()
    }
}

#[derive(Default)]
pub(crate) struct RecordingDelegate {
    pub states: Mutex<Vec<SessionState>>,
    pub stills: Mutex<Vec<StillImage>>,
    pub errors: Mutex<Vec<CaptureError>>,
}

impl CaptureDelegate for RecordingDelegate {
    fn on_state_changed(&self, state: &SessionState) {
        self.states.lock().push(*state);
    }

    fn on_still_captured(&self, image: &StillImage) {
        self.stills.lock().push(image.clone());
    }

    fn on_error(&self, error: &CaptureError) {
        self.errors.lock().push(error.clone());
    }
}

#[derive(Default)]
pub(crate) struct RecordingScanDelegate {
    pub found: AtomicUsize,
    pub dismissed: AtomicUsize,
}

impl ScanDelegate for RecordingScanDelegate {
    fn did_find_valid_barcode(&self) {
        self.found.fetch_add(1, Ordering::SeqCst);
    }

    fn dismiss_scan_view(&self) {
        self.dismissed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Reports a fixed barcode for every frame at or past `min_sequence`.
pub(crate) struct StubDetector {
    barcode: Option<Barcode>,
    min_sequence: u64,
}

impl StubDetector {
    pub fn always(payload: &str) -> Arc<Self> {
        Arc::new(Self {
            barcode: Some(Barcode {
                symbology: "qr".into(),
                payload: payload.into(),
            }),
            min_sequence: 0,
        })
    }

    pub fn after_sequence(payload: &str, min_sequence: u64) -> Arc<Self> {
        Arc::new(Self {
            barcode: Some(Barcode {
                symbology: "qr".into(),
                payload: payload.into(),
            }),
            min_sequence,
        })
    }

    pub fn never() -> Arc<Self> {
        Arc::new(Self {
            barcode: None,
            min_sequence: 0,
        })
    }
}

impl BarcodeDetector for StubDetector {
    fn detect(&self, frame: &VideoFrame) -> Option<Barcode> {
        if frame.sequence < self.min_sequence {
            return None;
        }
        self.barcode.clone()
    }
}
