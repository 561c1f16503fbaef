//! Simulated camera device.
//!
//! Generates synthetic frames on a dedicated thread at a configurable
//! rate and settles still-image requests asynchronously, mimicking the
//! threading shape of a real camera driver. Test hooks allow failure
//! injection and simulating a device held by another consumer.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use scan_capture_core::models::camera_models::{
    CameraInfo, CameraPosition, FlashMode, PixelFormat, StillImage, TorchMode, VideoFrame,
};
use scan_capture_core::models::config::SessionConfiguration;
use scan_capture_core::models::error::CaptureError;
use scan_capture_core::traits::camera_device::{CameraDevice, FrameCallback, StillCompletion};

/// Bounded wait for the configuration lock before reporting the device busy.
const LOCK_TIMEOUT: Duration = Duration::from_millis(50);

/// A camera that exists only in memory.
pub struct SimCamera {
    info: CameraInfo,
    width: AtomicU32,
    height: AtomicU32,
    frame_interval: Mutex<Duration>,
    still_delay: Mutex<Duration>,
    flash: Mutex<FlashMode>,
    torch: Mutex<TorchMode>,
    config_locked: AtomicBool,
    external_hold: AtomicBool,
    running: Arc<AtomicBool>,
    stream_handle: Mutex<Option<thread::JoinHandle<()>>>,
    frame_seq: Arc<AtomicU64>,
    fail_next_still: AtomicBool,
    started: Instant,
}

impl SimCamera {
    pub fn new(
        id: &str,
        name: &str,
        position: CameraPosition,
        has_flash: bool,
        has_torch: bool,
    ) -> Self {
        Self {
            info: CameraInfo {
                id: id.into(),
                name: name.into(),
                position,
                has_flash,
                has_torch,
                is_default: position == CameraPosition::Back,
            },
            width: AtomicU32::new(64),
            height: AtomicU32::new(48),
            frame_interval: Mutex::new(Duration::from_millis(5)),
            still_delay: Mutex::new(Duration::from_millis(10)),
            flash: Mutex::new(FlashMode::Off),
            torch: Mutex::new(TorchMode::Off),
            config_locked: AtomicBool::new(false),
            external_hold: AtomicBool::new(false),
            running: Arc::new(AtomicBool::new(false)),
            stream_handle: Mutex::new(None),
            frame_seq: Arc::new(AtomicU64::new(0)),
            fail_next_still: AtomicBool::new(false),
            started: Instant::now(),
        }
    }

    /// A back camera with flash and torch.
    pub fn back() -> Self {
        Self::new("sim-back-0", "Simulated Back Camera", CameraPosition::Back, true, true)
    }

    /// A front camera with no light source.
    pub fn front() -> Self {
        Self::new("sim-front-0", "Simulated Front Camera", CameraPosition::Front, false, false)
    }

    /// Adjust the simulator's timing (frame interval, still-capture latency).
    pub fn with_timing(self, frame_interval: Duration, still_delay: Duration) -> Self {
        *self.frame_interval.lock() = frame_interval;
        *self.still_delay.lock() = still_delay;
        self
    }

    /// Simulate the device being held configured by another consumer in
    /// the process; while held, `lock_for_configuration` fails.
    pub fn hold_externally(&self, held: bool) {
        self.external_hold.store(held, Ordering::SeqCst);
    }

    /// Make the next still-image request fail as a sensor fault.
    pub fn fail_next_capture(&self) {
        self.fail_next_still.store(true, Ordering::SeqCst);
    }

    pub fn is_streaming(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Total frames produced across all streaming runs.
    pub fn frames_emitted(&self) -> u64 {
        self.frame_seq.load(Ordering::SeqCst)
    }

    fn synth_pattern(sequence: u64, width: u32, height: u32) -> Vec<u8> {
        let len = (width as usize) * (height as usize);
        (0..len).map(|i| ((i as u64 + sequence) & 0xff) as u8).collect()
    }
}

impl CameraDevice for SimCamera {
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
        let deadline = Instant::now() + LOCK_TIMEOUT;
        loop {
            if !self.external_hold.load(Ordering::SeqCst)
                && self
                    .config_locked
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
            {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(CaptureError::DeviceBusy(format!(
                    "{} is held by another consumer",
                    self.info.name
                )));
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn unlock_for_configuration(&self) {
        self.config_locked.store(false, Ordering::SeqCst);
    }

    fn configure_format(&self, config: &SessionConfiguration) -> Result<(), CaptureError> {
        if !self.config_locked.load(Ordering::SeqCst) {
            return Err(CaptureError::ConfigurationFailed(
                "configuration not locked".into(),
            ));
        }
        self.width.store(config.width, Ordering::SeqCst);
        self.height.store(config.height, Ordering::SeqCst);
        *self.frame_interval.lock() = Duration::from_secs_f64(1.0 / config.frame_rate);
        Ok(())
    }

    fn set_flash_mode(&self, mode: FlashMode) -> Result<(), CaptureError> {
        if !self.config_locked.load(Ordering::SeqCst) {
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
        if !self.config_locked.load(Ordering::SeqCst) {
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
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::InvalidState("camera already streaming".into()));
        }

        let running = Arc::clone(&self.running);
        let sequence = Arc::clone(&self.frame_seq);
        let width = self.width.load(Ordering::SeqCst);
        let height = self.height.load(Ordering::SeqCst);
        let interval = *self.frame_interval.lock();
        let started = self.started;

        let handle = thread::Builder::new()
            .name("sim-camera-stream".into())
            .spawn(move || {
                while running.load(Ordering::SeqCst) {
                    thread::sleep(interval);
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    let seq = sequence.fetch_add(1, Ordering::SeqCst);
                    let frame = VideoFrame {
                        sequence: seq,
                        timestamp_us: started.elapsed().as_micros() as u64,
                        width,
                        height,
                        format: PixelFormat::Gray8,
                        data: Self::synth_pattern(seq, width, height),
                    };
                    callback(&frame);
                }
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                CaptureError::ConfigurationFailed(format!("failed to spawn stream thread: {}", e))
            })?;

        *self.stream_handle.lock() = Some(handle);
        log::debug!("{} streaming started", self.info.name);
        Ok(())
    }

    fn stop_streaming(&self) -> Result<(), CaptureError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.stream_handle.lock().take() {
            let _ = handle.join();
        }
        log::debug!("{} streaming stopped", self.info.name);
        Ok(())
    }

    fn capture_still(&self, completion: StillCompletion) -> Result<(), CaptureError> {
        let fail = self.fail_next_still.swap(false, Ordering::SeqCst);
        let flash_fired = self.info.has_flash && *self.flash.lock() != FlashMode::Off;
        let width = self.width.load(Ordering::SeqCst);
        let height = self.height.load(Ordering::SeqCst);
        let delay = *self.still_delay.lock();
        let sequence = self.frame_seq.load(Ordering::SeqCst);

        thread::Builder::new()
            .name("sim-camera-still".into())
            .spawn(move || {
                thread::sleep(delay);
                if fail {
                    completion(Err(CaptureError::CaptureFailed(
                        "simulated sensor fault".into(),
                    )));
                } else {
                    let data = Self::synth_pattern(sequence, width, height);
                    completion(Ok(StillImage::new(
                        width,
                        height,
                        PixelFormat::Gray8,
                        flash_fired,
                        data,
                    )));
                }
            })
            .map_err(|e| CaptureError::CaptureFailed(format!("failed to spawn still thread: {}", e)))?;
        Ok(())
    }
}

impl Drop for SimCamera {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.stream_handle.lock().take() {
            let _ = handle.join();
        }
    }
}
