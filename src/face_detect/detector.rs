use crate::face_detect::error::FaceDetectError;
use crate::face_detect::types::{BoundingBox, Orientation};
use image::DynamicImage;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

/// Boundary abstraction over an external face-rectangle detector.
///
/// Implementations must not block for the caller's benefit (the engine runs
/// them on a worker thread), must not mutate the input image, and report
/// boxes normalized to the image's own dimensions with a bottom-left origin.
pub trait FaceDetector: Send + Sync {
    fn detect_faces(
        &self,
        image: &DynamicImage,
        orientation: Orientation,
    ) -> Result<Vec<BoundingBox>, FaceDetectError>;
}

/// Typed result of one detection request. Failure is kept distinct from
/// "ran, found nothing" rather than collapsed into an empty list.
#[derive(Debug)]
pub enum DetectionOutcome {
    Faces(Vec<BoundingBox>),
    Failed(FaceDetectError),
}

/// One completed detection request, tagged with the image generation it was
/// issued for so a session can discard results for a superseded image.
#[derive(Debug)]
pub struct DetectionEvent {
    pub generation: u64,
    pub outcome: DetectionOutcome,
}

/// Runs detection requests one at a time on a background worker thread and
/// delivers each result exactly once over a channel.
///
/// The engine never touches session state; the owner of the receiving end
/// applies events on its own single logical thread of control.
pub struct DetectionEngine {
    detector: Arc<dyn FaceDetector>,
    events_tx: Sender<DetectionEvent>,
    inflight_cancel: Option<Arc<AtomicBool>>,
}

impl DetectionEngine {
    pub fn new(detector: Arc<dyn FaceDetector>) -> (DetectionEngine, Receiver<DetectionEvent>) {
        let (events_tx, events_rx) = channel();
        let engine = DetectionEngine {
            detector,
            events_tx,
            inflight_cancel: None,
        };
        (engine, events_rx)
    }

    /// Start a detection request for the given image generation. Any request
    /// still in flight is cancelled first; its result will not be delivered.
    pub fn request(&mut self, image: Arc<DynamicImage>, orientation: Orientation, generation: u64) {
        self.cancel_inflight();

        let cancel = Arc::new(AtomicBool::new(false));
        self.inflight_cancel = Some(Arc::clone(&cancel));

        let detector = Arc::clone(&self.detector);
        let events_tx = self.events_tx.clone();

        debug!("detection request issued for generation {generation}");
        thread::spawn(move || {
            let outcome = match detector.detect_faces(&image, orientation) {
                Ok(boxes) => {
                    debug!("detector returned {} box(es) for generation {generation}", boxes.len());
                    DetectionOutcome::Faces(boxes)
                }
                Err(e) => {
                    warn!("detector failed for generation {generation}: {e}");
                    DetectionOutcome::Failed(e)
                }
            };

            if cancel.load(Ordering::SeqCst) {
                debug!("detection for generation {generation} cancelled, dropping result");
                return;
            }

            // The receiver is gone once the session is dropped; nothing to do.
            let _ = events_tx.send(DetectionEvent { generation, outcome });
        });
    }

    /// Cancel the in-flight request, if any. Its worker runs to completion
    /// but its result is dropped instead of delivered.
    pub fn cancel_inflight(&mut self) {
        if let Some(cancel) = self.inflight_cancel.take() {
            cancel.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::time::Duration;

    struct FixedDetector {
        boxes: Vec<BoundingBox>,
        delay: Option<Duration>,
    }

    impl FaceDetector for FixedDetector {
        fn detect_faces(
            &self,
            _image: &DynamicImage,
            _orientation: Orientation,
        ) -> Result<Vec<BoundingBox>, FaceDetectError> {
            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
            Ok(self.boxes.clone())
        }
    }

    struct FailingDetector;

    impl FaceDetector for FailingDetector {
        fn detect_faces(
            &self,
            _image: &DynamicImage,
            _orientation: Orientation,
        ) -> Result<Vec<BoundingBox>, FaceDetectError> {
            Err(FaceDetectError::Detection("model unavailable".into()))
        }
    }

    fn blank_image() -> Arc<DynamicImage> {
        Arc::new(DynamicImage::ImageRgb8(RgbImage::new(8, 8)))
    }

    #[test]
    fn test_delivers_result_exactly_once() {
        let detector = Arc::new(FixedDetector {
            boxes: vec![BoundingBox::new(0.1, 0.1, 0.4, 0.4)],
            delay: None,
        });
        let (mut engine, events_rx) = DetectionEngine::new(detector);

        engine.request(blank_image(), Orientation::Up, 7);

        let event = events_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(event.generation, 7);
        match event.outcome {
            DetectionOutcome::Faces(boxes) => assert_eq!(boxes.len(), 1),
            DetectionOutcome::Failed(e) => panic!("unexpected failure: {e}"),
        }

        // no second delivery for the same request
        assert!(events_rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn test_failure_is_delivered_as_failed_outcome() {
        let (mut engine, events_rx) = DetectionEngine::new(Arc::new(FailingDetector));
        engine.request(blank_image(), Orientation::Up, 1);

        let event = events_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(
            event.outcome,
            DetectionOutcome::Failed(FaceDetectError::Detection(_))
        ));
    }

    #[test]
    fn test_cancelled_request_delivers_nothing() {
        let detector = Arc::new(FixedDetector {
            boxes: vec![],
            delay: Some(Duration::from_millis(100)),
        });
        let (mut engine, events_rx) = DetectionEngine::new(detector);

        engine.request(blank_image(), Orientation::Up, 1);
        engine.cancel_inflight();

        assert!(events_rx.recv_timeout(Duration::from_millis(500)).is_err());
    }

    #[test]
    fn test_new_request_supersedes_inflight_one() {
        let detector = Arc::new(FixedDetector {
            boxes: vec![BoundingBox::new(0.2, 0.2, 0.6, 0.6)],
            delay: Some(Duration::from_millis(100)),
        });
        let (mut engine, events_rx) = DetectionEngine::new(detector);

        engine.request(blank_image(), Orientation::Up, 1);
        engine.request(blank_image(), Orientation::Up, 2);

        let event = events_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(event.generation, 2);
        assert!(events_rx.recv_timeout(Duration::from_millis(300)).is_err());
    }
}
