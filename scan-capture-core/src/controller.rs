use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::camera_models::Barcode;
use crate::models::error::CaptureError;
use crate::session::manager::CaptureSessionManager;
use crate::session::outputs::SubscriptionId;
use crate::session::preview::PreviewLayer;
use crate::traits::barcode_detector::BarcodeDetector;
use crate::traits::scan_delegate::ScanDelegate;

/// Hosts the scanning surface: builds and starts the session manager, runs
/// barcode detection over the frame stream, and forwards the two lifecycle
/// events to its delegate.
pub struct ScanController {
    manager: Arc<CaptureSessionManager>,
    detector: Arc<dyn BarcodeDetector>,
    delegate: Arc<dyn ScanDelegate>,
    subscription: Mutex<Option<SubscriptionId>>,
    found: Arc<AtomicBool>,
    last_barcode: Arc<Mutex<Option<Barcode>>>,
}

impl ScanController {
    pub fn new(
        manager: Arc<CaptureSessionManager>,
        detector: Arc<dyn BarcodeDetector>,
        delegate: Arc<dyn ScanDelegate>,
    ) -> Self {
        Self {
            manager,
            detector,
            delegate,
            subscription: Mutex::new(None),
            found: Arc::new(AtomicBool::new(false)),
            last_barcode: Arc::new(Mutex::new(None)),
        }
    }

    /// Build the session and start streaming, returning the preview layer
    /// for the host to place on screen.
    ///
    /// Detection runs on the capture thread; `did_find_valid_barcode` fires
    /// at most once per scan session.
    pub fn start_scanning(&self) -> Result<Arc<PreviewLayer>, CaptureError> {
        self.manager.add_video_input_camera()?;
        self.manager.setup_outputs()?;
        let layer = self.manager.add_video_preview_layer()?;

        self.found.store(false, Ordering::SeqCst);
        self.last_barcode.lock().take();

        let detector = Arc::clone(&self.detector);
        let delegate = Arc::clone(&self.delegate);
        let found = Arc::clone(&self.found);
        let last_barcode = Arc::clone(&self.last_barcode);
        let id = self.manager.subscribe_frames(Arc::new(move |frame| {
            if found.load(Ordering::SeqCst) {
                return;
            }
            if let Some(barcode) = detector.detect(frame) {
                if !found.swap(true, Ordering::SeqCst) {
                    log::info!("valid barcode detected ({})", barcode.symbology);
                    *last_barcode.lock() = Some(barcode);
                    delegate.did_find_valid_barcode();
                }
            }
        }))?;
        *self.subscription.lock() = Some(id);

        self.manager.start_running()?;
        Ok(layer)
    }

    /// Stop streaming and tear the session down. Safe to call repeatedly.
    pub fn stop_scanning(&self) {
        if let Some(id) = self.subscription.lock().take() {
            self.manager.unsubscribe_frames(id);
        }
        self.manager.destroy_session();
    }

    /// Close the scanning surface: tears the session down and asks the
    /// delegate to dismiss.
    pub fn request_dismiss(&self) {
        self.stop_scanning();
        self.delegate.dismiss_scan_view();
    }

    /// Payload of the barcode detected in this scan session, if any.
    pub fn last_barcode(&self) -> Option<Barcode> {
        self.last_barcode.lock().clone()
    }

    pub fn manager(&self) -> &Arc<CaptureSessionManager> {
        &self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::state::SessionState;
    use crate::test_support::{FakeCamera, FakeEnumerator, RecordingScanDelegate, StubDetector};

    fn controller_with(
        camera: &Arc<FakeCamera>,
        detector: Arc<StubDetector>,
    ) -> (ScanController, Arc<RecordingScanDelegate>) {
        let manager = Arc::new(CaptureSessionManager::new(FakeEnumerator::of(vec![
            Arc::clone(camera),
        ])));
        let delegate = Arc::new(RecordingScanDelegate::default());
        let controller = ScanController::new(
            manager,
            detector,
            Arc::clone(&delegate) as Arc<dyn ScanDelegate>,
        );
        (controller, delegate)
    }

    #[test]
    fn finds_barcode_exactly_once() {
        let camera = FakeCamera::back();
        let (controller, delegate) = controller_with(&camera, StubDetector::always("0123456789"));

        controller.start_scanning().unwrap();
        for _ in 0..5 {
            camera.emit_frame();
        }

        assert_eq!(delegate.found.load(Ordering::SeqCst), 1);
        assert_eq!(controller.last_barcode().unwrap().payload, "0123456789");
    }

    #[test]
    fn detection_waits_for_a_decodable_frame() {
        let camera = FakeCamera::back();
        let (controller, delegate) =
            controller_with(&camera, StubDetector::after_sequence("4006381333931", 2));

        controller.start_scanning().unwrap();
        camera.emit_frame(); // 0
        camera.emit_frame(); // 1
        assert_eq!(delegate.found.load(Ordering::SeqCst), 0);

        camera.emit_frame(); // 2: decodable
        assert_eq!(delegate.found.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_detection_no_notification() {
        let camera = FakeCamera::back();
        let (controller, delegate) = controller_with(&camera, StubDetector::never());

        controller.start_scanning().unwrap();
        for _ in 0..5 {
            camera.emit_frame();
        }

        assert_eq!(delegate.found.load(Ordering::SeqCst), 0);
        assert!(controller.last_barcode().is_none());
    }

    #[test]
    fn dismiss_tears_down_and_notifies() {
        let camera = FakeCamera::back();
        let (controller, delegate) = controller_with(&camera, StubDetector::never());

        controller.start_scanning().unwrap();
        controller.request_dismiss();

        assert_eq!(delegate.dismissed.load(Ordering::SeqCst), 1);
        assert_eq!(controller.manager().state(), SessionState::Destroyed);
        assert!(!camera.emit_frame());
    }

    #[test]
    fn start_without_camera_reports_unavailable() {
        let manager = Arc::new(CaptureSessionManager::new(FakeEnumerator::empty()));
        let delegate = Arc::new(RecordingScanDelegate::default());
        let controller = ScanController::new(
            manager,
            StubDetector::always("x"),
            Arc::clone(&delegate) as Arc<dyn ScanDelegate>,
        );

        assert_eq!(
            controller.start_scanning().unwrap_err(),
            CaptureError::DeviceUnavailable
        );
        assert_eq!(delegate.found.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn rescan_after_dismiss_fires_again() {
        let camera = FakeCamera::back();
        let (controller, delegate) = controller_with(&camera, StubDetector::always("repeat"));

        controller.start_scanning().unwrap();
        camera.emit_frame();
        controller.request_dismiss();

        controller.start_scanning().unwrap();
        camera.emit_frame();

        assert_eq!(delegate.found.load(Ordering::SeqCst), 2);
    }
}
