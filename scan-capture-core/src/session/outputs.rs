use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::camera_models::{StillImage, VideoFrame};
use crate::models::error::CaptureError;
use crate::traits::camera_device::{CameraDevice, FrameCallback};

/// Handle returned by `VideoDataOutput::subscribe`, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fan-out point for the continuous frame stream.
///
/// Subscribers are invoked on the device's capture thread, in capture
/// order, one frame at a time. Retiring the output drops all subscribers
/// so no callback can dangle past session teardown.
pub struct VideoDataOutput {
    subscribers: Mutex<Vec<(u64, FrameCallback)>>,
    next_id: AtomicU64,
    active: AtomicBool,
}

impl VideoDataOutput {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            active: AtomicBool::new(true),
        }
    }

    pub fn subscribe(&self, callback: FrameCallback) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers.lock().push((id, callback));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().retain(|(sid, _)| *sid != id.0);
    }

    /// Deliver one frame to all subscribers.
    ///
    /// Callbacks run outside the subscriber lock so a subscriber may
    /// unregister (or register another) without deadlocking.
    pub fn dispatch(&self, frame: &VideoFrame) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        let callbacks: Vec<FrameCallback> = self
            .subscribers
            .lock()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(frame);
        }
    }

    /// Stop delivery and drop all subscribers. Called on session teardown.
    pub fn retire(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.subscribers.lock().clear();
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Default for VideoDataOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer invoked after a still request settles, success or failure.
pub type StillObserver = Arc<dyn Fn(&Result<StillImage, CaptureError>) + Send + Sync + 'static>;

/// Session output producing one decoded image per request.
///
/// At most one request may be outstanding: a second request while one is
/// pending is rejected with `CaptureError::CaptureInFlight`. A failed
/// request leaves the previously captured image intact. Retiring the
/// output discards any pending result instead of delivering it to stale
/// state.
pub struct StillImageOutput {
    in_flight: AtomicBool,
    retired: AtomicBool,
    last_image: Mutex<Option<StillImage>>,
}

impl StillImageOutput {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            retired: AtomicBool::new(false),
            last_image: Mutex::new(None),
        }
    }

    /// Most recently captured image, if any.
    pub fn still_image(&self) -> Option<StillImage> {
        self.last_image.lock().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Request a single still image from `device`.
    ///
    /// Returns immediately. The result lands in `still_image` and is
    /// reported through `observer` on the device's completion thread.
    pub fn capture(
        self: Arc<Self>,
        device: &Arc<dyn CameraDevice>,
        observer: StillObserver,
    ) -> Result<(), CaptureError> {
        if self.retired.load(Ordering::SeqCst) {
            return Err(CaptureError::InvalidState("still output retired".into()));
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CaptureError::CaptureInFlight);
        }

        let this = Arc::clone(&self);
        let completion = Box::new(move |result: Result<StillImage, CaptureError>| {
            if this.retired.load(Ordering::SeqCst) {
                log::debug!("discarding still result delivered after teardown");
                this.in_flight.store(false, Ordering::SeqCst);
                return;
            }
            if let Ok(ref image) = result {
                *this.last_image.lock() = Some(image.clone());
            }
            observer(&result);
            // Released last: the slot stays held until the result is fully
            // published, so no second request can interleave with it.
            this.in_flight.store(false, Ordering::SeqCst);
        });

        if let Err(e) = device.capture_still(completion) {
            self.in_flight.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(())
    }

    /// Invalidate the output. Any pending result is discarded.
    pub fn retire(&self) {
        self.retired.store(true, Ordering::SeqCst);
    }
}

impl Default for StillImageOutput {
    fn default() -> Self {
        Self::new()
    }
}
