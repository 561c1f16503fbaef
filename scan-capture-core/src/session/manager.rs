use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::camera_models::{
    CameraInfo, FlashMode, SessionDiagnostics, StillImage, TorchMode,
};
use crate::models::config::SessionConfiguration;
use crate::models::error::CaptureError;
use crate::models::state::SessionState;
use crate::session::outputs::{StillImageOutput, StillObserver, SubscriptionId, VideoDataOutput};
use crate::session::preview::PreviewLayer;
use crate::traits::camera_device::{CameraDevice, FrameCallback};
use crate::traits::camera_enumerator::CameraEnumerator;
use crate::traits::capture_delegate::CaptureDelegate;

/// Counters shared with the frame-dispatch path.
///
/// Kept out of the session mutex so the capture thread never contends
/// with UI-invoked operations.
#[derive(Default)]
struct SessionCounters {
    frames_delivered: AtomicU64,
    stills_requested: AtomicU64,
    stills_completed: AtomicU64,
    stills_failed: AtomicU64,
}

/// Internal mutable session state, protected by `parking_lot::Mutex`.
struct SessionInner {
    state: SessionState,
    device: Option<Arc<dyn CameraDevice>>,
    video_output: Option<Arc<VideoDataOutput>>,
    still_output: Option<Arc<StillImageOutput>>,
    generation: u64,
}

impl SessionInner {
    fn new() -> Self {
        Self {
            state: SessionState::Idle,
            device: None,
            video_output: None,
            still_output: None,
            generation: 0,
        }
    }
}

/// Owns the full lifecycle of camera capture: device selection, session
/// graph (input → outputs), live preview, flash/torch control, still
/// capture, and teardown.
///
/// Generic over camera backends via the `CameraDevice`/`CameraEnumerator`
/// traits. Data flow:
/// ```text
/// [CameraDevice] → frame dispatch ─┬→ [PreviewLayer]   (latest frame, for display)
///                                  └→ [VideoDataOutput] (subscribers, for detection)
///                → still request  ──→ [StillImageOutput] (one image per request)
/// ```
pub struct CaptureSessionManager {
    config: SessionConfiguration,
    enumerator: Arc<dyn CameraEnumerator>,
    inner: Mutex<SessionInner>,
    counters: Arc<SessionCounters>,
    // Shared with the frame-dispatch closure so a layer added after the
    // session starts still receives frames.
    preview: Arc<Mutex<Option<Arc<PreviewLayer>>>>,
    delegate: Mutex<Option<Arc<dyn CaptureDelegate>>>,
}

impl CaptureSessionManager {
    pub fn new(enumerator: Arc<dyn CameraEnumerator>) -> Self {
        Self {
            config: SessionConfiguration::default(),
            enumerator,
            inner: Mutex::new(SessionInner::new()),
            counters: Arc::new(SessionCounters::default()),
            preview: Arc::new(Mutex::new(None)),
            delegate: Mutex::new(None),
        }
    }

    pub fn with_config(
        config: SessionConfiguration,
        enumerator: Arc<dyn CameraEnumerator>,
    ) -> Result<Self, CaptureError> {
        config.validate()?;
        let mut manager = Self::new(enumerator);
        manager.config = config;
        Ok(manager)
    }

    pub fn set_delegate(&self, delegate: Arc<dyn CaptureDelegate>) {
        *self.delegate.lock() = Some(delegate);
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    pub fn config(&self) -> &SessionConfiguration {
        &self.config
    }

    /// Descriptor of the attached camera, if any.
    pub fn device_info(&self) -> Option<CameraInfo> {
        self.inner.lock().device.as_ref().map(|d| d.info())
    }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        SessionDiagnostics {
            frames_delivered: self.counters.frames_delivered.load(Ordering::Relaxed),
            stills_requested: self.counters.stills_requested.load(Ordering::Relaxed),
            stills_completed: self.counters.stills_completed.load(Ordering::Relaxed),
            stills_failed: self.counters.stills_failed.load(Ordering::Relaxed),
        }
    }

    /// Select a camera and attach it as the session's single input.
    ///
    /// Policy: prefer the configured position, fall back to any available
    /// camera. The device is locked for configuration once to verify
    /// exclusivity and apply the session format. Valid from the idle and
    /// destroyed states; attaching from destroyed rebuilds the session
    /// under a new generation.
    pub fn add_video_input_camera(&self) -> Result<(), CaptureError> {
        {
            let inner = self.inner.lock();
            if !matches!(inner.state, SessionState::Idle | SessionState::Destroyed) {
                return Err(CaptureError::InvalidState(format!(
                    "cannot attach input from {} state",
                    inner.state.name()
                )));
            }
        }

        let device = self.select_device()?;

        device.lock_for_configuration()?;
        let configured = device.configure_format(&self.config);
        device.unlock_for_configuration();
        configured?;

        {
            let mut inner = self.inner.lock();
            if !matches!(inner.state, SessionState::Idle | SessionState::Destroyed) {
                return Err(CaptureError::InvalidState(format!(
                    "cannot attach input from {} state",
                    inner.state.name()
                )));
            }
            inner.generation += 1;
            inner.device = Some(Arc::clone(&device));
            inner.state = SessionState::InputAttached;
        }
        log::debug!("attached camera input: {}", device.info().name);
        self.notify_state();
        Ok(())
    }

    /// Attach the frame fan-out and still-image outputs.
    ///
    /// Must be called after the input is attached and before the session
    /// starts; the session graph does not support attaching outputs to a
    /// running session.
    pub fn setup_outputs(&self) -> Result<(), CaptureError> {
        {
            let mut inner = self.inner.lock();
            if inner.state != SessionState::InputAttached {
                return Err(CaptureError::InvalidState(format!(
                    "outputs must be attached after the input and before start (currently {})",
                    inner.state.name()
                )));
            }
            inner.video_output = Some(Arc::new(VideoDataOutput::new()));
            inner.still_output = Some(Arc::new(StillImageOutput::new()));
            inner.state = SessionState::Ready;
        }
        self.notify_state();
        Ok(())
    }

    /// Create the preview layer bound to the current session, or return
    /// the existing one if it is still bound to this session generation.
    pub fn add_video_preview_layer(&self) -> Result<Arc<PreviewLayer>, CaptureError> {
        let inner = self.inner.lock();
        if !inner.state.has_input() {
            return Err(CaptureError::InvalidState(format!(
                "no session to bind a preview layer to (currently {})",
                inner.state.name()
            )));
        }
        let generation = inner.generation;
        drop(inner);

        let mut slot = self.preview.lock();
        if let Some(ref layer) = *slot {
            if layer.generation() == generation && layer.is_valid() {
                return Ok(Arc::clone(layer));
            }
        }
        let layer = Arc::new(PreviewLayer::new(generation));
        *slot = Some(Arc::clone(&layer));
        Ok(layer)
    }

    /// The current preview layer, if one has been created.
    pub fn preview_layer(&self) -> Option<Arc<PreviewLayer>> {
        self.preview.lock().clone()
    }

    /// Start the session: frames begin flowing from the device into the
    /// preview layer and frame subscribers, on the device's capture thread.
    pub fn start_running(&self) -> Result<(), CaptureError> {
        let (device, video_output) = {
            let inner = self.inner.lock();
            match inner.state {
                SessionState::Ready => {}
                SessionState::Running => {
                    return Err(CaptureError::InvalidState("session already running".into()))
                }
                other => {
                    return Err(CaptureError::InvalidState(format!(
                        "cannot start from {} state",
                        other.name()
                    )))
                }
            }
            let device = inner.device.clone().ok_or(CaptureError::DeviceUnavailable)?;
            let output = inner
                .video_output
                .clone()
                .ok_or_else(|| CaptureError::InvalidState("outputs not attached".into()))?;
            (device, output)
        };

        let counters = Arc::clone(&self.counters);
        let preview = Arc::clone(&self.preview);
        let callback: FrameCallback = Arc::new(move |frame| {
            counters.frames_delivered.fetch_add(1, Ordering::Relaxed);
            let layer = preview.lock().clone();
            if let Some(layer) = layer {
                layer.push_frame(frame);
            }
            video_output.dispatch(frame);
        });

        device.start_streaming(callback)?;

        self.inner.lock().state = SessionState::Running;
        self.notify_state();
        log::info!("capture session running");
        Ok(())
    }

    /// Stop frame delivery without tearing the session graph down.
    pub fn stop_running(&self) -> Result<(), CaptureError> {
        let device = {
            let inner = self.inner.lock();
            if inner.state != SessionState::Running {
                return Err(CaptureError::InvalidState(format!(
                    "cannot stop from {} state",
                    inner.state.name()
                )));
            }
            inner.device.clone().ok_or(CaptureError::DeviceUnavailable)?
        };

        device.stop_streaming()?;

        self.inner.lock().state = SessionState::Ready;
        self.notify_state();
        Ok(())
    }

    /// Apply a flash mode: capability check, then lock / apply / unlock.
    ///
    /// Unsupported modes and lock failures are reported and leave the
    /// device's existing mode untouched.
    pub fn set_flash_mode(&self, mode: FlashMode) -> Result<(), CaptureError> {
        let device = self.active_device()?;
        if !device.has_flash() {
            log::warn!("flash mode requested on {}, which has no flash", device.info().name);
            return Err(CaptureError::UnsupportedMode("flash".into()));
        }
        device.lock_for_configuration()?;
        let result = device.set_flash_mode(mode);
        device.unlock_for_configuration();
        result
    }

    /// Apply a torch mode. Same locking and failure contract as
    /// `set_flash_mode`.
    pub fn set_torch_mode(&self, mode: TorchMode) -> Result<(), CaptureError> {
        let device = self.active_device()?;
        if !device.has_torch() {
            log::warn!("torch mode requested on {}, which has no torch", device.info().name);
            return Err(CaptureError::UnsupportedMode("torch".into()));
        }
        device.lock_for_configuration()?;
        let result = device.set_torch_mode(mode);
        device.unlock_for_configuration();
        result
    }

    /// Request a single decoded still image.
    ///
    /// Returns immediately; the result becomes available via `still_image`
    /// and is reported to the delegate. At most one request may be
    /// outstanding; a second is rejected with `CaptureInFlight`. A failed
    /// capture never overwrites the previous image.
    pub fn capture_still_image(&self) -> Result<(), CaptureError> {
        let (device, output) = {
            let inner = self.inner.lock();
            match inner.state {
                SessionState::Running => {}
                SessionState::Destroyed => {
                    return Err(CaptureError::InvalidState("session destroyed".into()))
                }
                other => {
                    return Err(CaptureError::InvalidState(format!(
                        "cannot capture from {} state",
                        other.name()
                    )))
                }
            }
            let device = inner.device.clone().ok_or(CaptureError::DeviceUnavailable)?;
            let output = inner
                .still_output
                .clone()
                .ok_or_else(|| CaptureError::InvalidState("outputs not attached".into()))?;
            (device, output)
        };

        let counters = Arc::clone(&self.counters);
        let delegate = self.delegate.lock().clone();
        let observer: StillObserver = Arc::new(move |result| match result {
            Ok(image) => {
                counters.stills_completed.fetch_add(1, Ordering::Relaxed);
                if let Some(ref delegate) = delegate {
                    delegate.on_still_captured(image);
                }
            }
            Err(error) => {
                counters.stills_failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("still capture failed: {}", error);
                if let Some(ref delegate) = delegate {
                    delegate.on_error(error);
                }
            }
        });

        // Counted before the request is issued so a completion racing in
        // never observes more completions than requests.
        self.counters.stills_requested.fetch_add(1, Ordering::Relaxed);
        if let Err(error) = output.capture(&device, observer) {
            self.counters.stills_requested.fetch_sub(1, Ordering::Relaxed);
            return Err(error);
        }
        Ok(())
    }

    /// The most recently captured still image.
    pub fn still_image(&self) -> Option<StillImage> {
        let output = self.inner.lock().still_output.clone();
        output.and_then(|o| o.still_image())
    }

    /// Register a frame-stream subscriber. Callbacks fire on the capture
    /// thread; all subscribers are dropped automatically on teardown.
    pub fn subscribe_frames(&self, callback: FrameCallback) -> Result<SubscriptionId, CaptureError> {
        let inner = self.inner.lock();
        let output = inner
            .video_output
            .as_ref()
            .ok_or_else(|| CaptureError::InvalidState("outputs not attached".into()))?;
        Ok(output.subscribe(callback))
    }

    pub fn unsubscribe_frames(&self, id: SubscriptionId) {
        if let Some(ref output) = self.inner.lock().video_output {
            output.unsubscribe(id);
        }
    }

    /// Tear the session down: stop streaming, discard any pending still
    /// result, retire the outputs, invalidate the preview layer, and
    /// release the device. Idempotent; repeated calls are no-ops.
    ///
    /// After destruction every capture and mode-change operation reports
    /// `InvalidState` until the session is rebuilt from scratch.
    pub fn destroy_session(&self) {
        let (device, video_output, still_output, was_running) = {
            let mut inner = self.inner.lock();
            if inner.state == SessionState::Destroyed {
                return;
            }
            let was_running = inner.state.is_running();
            inner.state = SessionState::Destroyed;
            (
                inner.device.take(),
                inner.video_output.take(),
                inner.still_output.take(),
                was_running,
            )
        };

        // Retire the still output first so a result landing mid-teardown
        // is discarded rather than delivered to stale state.
        if let Some(output) = still_output {
            output.retire();
        }

        if was_running {
            if let Some(ref device) = device {
                if let Err(e) = device.stop_streaming() {
                    log::warn!("failed to stop streaming during teardown: {}", e);
                }
            }
        }

        if let Some(output) = video_output {
            output.retire();
        }

        if let Some(layer) = self.preview.lock().take() {
            layer.invalidate();
        }

        drop(device);
        self.notify_state();
        log::info!("capture session destroyed");
    }

    // --- Internal helpers ---

    fn select_device(&self) -> Result<Arc<dyn CameraDevice>, CaptureError> {
        let devices = self.enumerator.devices();
        if devices.is_empty() {
            return Err(CaptureError::DeviceUnavailable);
        }
        let preferred = devices
            .iter()
            .find(|d| d.info().position == self.config.preferred_position)
            .cloned();
        Ok(preferred.unwrap_or_else(|| Arc::clone(&devices[0])))
    }

    /// Device for a mode-change operation. Destroyed sessions report
    /// invalid state; sessions without an input report device-unavailable.
    fn active_device(&self) -> Result<Arc<dyn CameraDevice>, CaptureError> {
        let inner = self.inner.lock();
        if inner.state.is_destroyed() {
            return Err(CaptureError::InvalidState("session destroyed".into()));
        }
        inner.device.clone().ok_or(CaptureError::DeviceUnavailable)
    }

    fn notify_state(&self) {
        let state = self.inner.lock().state;
        let delegate = self.delegate.lock().clone();
        if let Some(delegate) = delegate {
            delegate.on_state_changed(&state);
        }
    }
}
