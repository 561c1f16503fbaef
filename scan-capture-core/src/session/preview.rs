use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::models::camera_models::VideoFrame;

/// Live rendering surface fed by the session's frame stream.
///
/// The manager owns the data binding (frames are pushed from the capture
/// thread); the hosting view owns on-screen placement and polls
/// `latest_frame` at its own cadence. The layer is bound 1:1 to a session
/// generation and is invalidated on teardown, after which it retains no
/// frame and accepts no more.
#[derive(Debug)]
pub struct PreviewLayer {
    generation: u64,
    frame: Mutex<Option<VideoFrame>>,
    valid: AtomicBool,
}

impl PreviewLayer {
    pub(crate) fn new(generation: u64) -> Self {
        Self {
            generation,
            frame: Mutex::new(None),
            valid: AtomicBool::new(true),
        }
    }

    /// Identity of the session this layer is bound to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    /// Most recent frame, if the layer is still valid.
    pub fn latest_frame(&self) -> Option<VideoFrame> {
        if !self.is_valid() {
            return None;
        }
        self.frame.lock().clone()
    }

    pub(crate) fn push_frame(&self, frame: &VideoFrame) {
        if !self.is_valid() {
            return;
        }
        *self.frame.lock() = Some(frame.clone());
    }

    pub(crate) fn invalidate(&self) {
        self.valid.store(false, Ordering::SeqCst);
        self.frame.lock().take();
    }
}
