use crate::face_detect::detector::{DetectionEngine, DetectionEvent, DetectionOutcome, FaceDetector};
use crate::face_detect::error::FaceDetectError;
use crate::face_detect::render::draw_detections;
use crate::face_detect::types::{BoundingBox, Orientation, Photo};
use image::DynamicImage;
use log::{debug, info, warn};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

/// Which of the three mutually exclusive screen surfaces is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subview {
    Main,
    PickerOpen,
    CameraOpen,
}

/// Where the current image stands with respect to detection. Failure is a
/// distinct observable state, never conflated with "ran, found nothing".
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionState {
    NotRun,
    InFlight,
    Complete(Vec<BoundingBox>),
    Failed(String),
}

/// Coarse phase of the screen, derived from the session fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No image yet.
    Idle,
    /// Image present, detection not run.
    Ready,
    /// Detection in flight.
    Detecting,
    /// Detection finished (with boxes, none, or a failure).
    Annotated,
}

/// Completion of a modal picker or camera presentation.
#[derive(Debug)]
pub enum PickOutcome {
    Picked(Photo),
    Cancelled,
    DecodeFailed(String),
}

/// Host capabilities probed once at session construction.
pub trait HostCapabilities {
    fn camera_available(&self) -> bool;
}

/// Everything the display surface needs to render one frame, derived purely
/// from the session state.
#[derive(Debug)]
pub struct ViewModel<'a> {
    pub image: Option<&'a DynamicImage>,
    pub caption: String,
    pub select_enabled: bool,
    pub capture_enabled: bool,
    pub detect_enabled: bool,
}

/// The single piece of mutable state behind the face-detect screen.
///
/// A session lives for the lifetime of its screen and is never persisted.
/// All mutation happens on the caller's thread: detection results arrive as
/// [`DetectionEvent`]s that the caller feeds back in via [`Session::pump_events`]
/// (or [`Session::handle_event`] when it owns its own event loop). Each image
/// replacement bumps an internal generation counter and cancels the in-flight
/// request, so a result computed for a superseded image is provably discarded.
pub struct Session {
    image: Option<Arc<DynamicImage>>,
    orientation: Orientation,
    detection: DetectionState,
    subview: Subview,
    generation: u64,
    camera_available: bool,
    notice: Option<String>,
    engine: DetectionEngine,
    events_rx: Receiver<DetectionEvent>,
}

impl Session {
    pub fn new(detector: Arc<dyn FaceDetector>, host: &dyn HostCapabilities) -> Session {
        let (engine, events_rx) = DetectionEngine::new(detector);
        Session {
            image: None,
            orientation: Orientation::Up,
            detection: DetectionState::NotRun,
            subview: Subview::Main,
            generation: 0,
            camera_available: host.camera_available(),
            notice: None,
            engine,
            events_rx,
        }
    }

    pub fn subview(&self) -> Subview {
        self.subview
    }

    pub fn detection(&self) -> &DetectionState {
        &self.detection
    }

    pub fn phase(&self) -> Phase {
        if self.image.is_none() {
            return Phase::Idle;
        }
        match self.detection {
            DetectionState::NotRun => Phase::Ready,
            DetectionState::InFlight => Phase::Detecting,
            DetectionState::Complete(_) | DetectionState::Failed(_) => Phase::Annotated,
        }
    }

    /// The image to display, annotated once detection has completed. `None`
    /// before any pick; the host shows its placeholder then.
    pub fn image(&self) -> Option<&DynamicImage> {
        self.image.as_deref()
    }

    pub fn face_count(&self) -> usize {
        match &self.detection {
            DetectionState::Complete(boxes) => boxes.len(),
            _ => 0,
        }
    }

    /// The detected boxes, once detection has completed successfully.
    pub fn face_boxes(&self) -> Option<&[BoundingBox]> {
        match &self.detection {
            DetectionState::Complete(boxes) => Some(boxes),
            _ => None,
        }
    }

    /// Human-readable status line under the image.
    pub fn caption(&self) -> String {
        if let Some(notice) = &self.notice {
            return notice.clone();
        }
        match &self.detection {
            DetectionState::InFlight => "detecting faces...".to_string(),
            DetectionState::Failed(_) => "face detection failed".to_string(),
            DetectionState::Complete(boxes) => face_count_caption(boxes.len()),
            DetectionState::NotRun => face_count_caption(0),
        }
    }

    pub fn select_enabled(&self) -> bool {
        true
    }

    /// Fixed for the session lifetime, probed at construction.
    pub fn capture_enabled(&self) -> bool {
        self.camera_available
    }

    /// Detection can start only with an image present and no detection run.
    pub fn detect_enabled(&self) -> bool {
        self.image.is_some() && self.detection == DetectionState::NotRun
    }

    pub fn view_model(&self) -> ViewModel<'_> {
        ViewModel {
            image: self.image(),
            caption: self.caption(),
            select_enabled: self.select_enabled(),
            capture_enabled: self.capture_enabled(),
            detect_enabled: self.detect_enabled(),
        }
    }

    /// Present the gallery picker.
    pub fn open_picker(&mut self) {
        if self.subview != Subview::Main {
            warn!("picker requested while {:?} is active, ignoring", self.subview);
            return;
        }
        info!("summoning image picker");
        self.subview = Subview::PickerOpen;
    }

    /// Present the camera. Fails when the host reported no camera capability;
    /// hosts normally prevent this by disabling the action. Like
    /// [`Session::open_picker`], the request is ignored while another modal
    /// is already active; check [`Session::subview`] to observe it.
    pub fn open_camera(&mut self) -> Result<(), FaceDetectError> {
        if !self.camera_available {
            return Err(FaceDetectError::CaptureUnavailable);
        }
        if self.subview != Subview::Main {
            warn!("camera requested while {:?} is active, ignoring", self.subview);
            return Ok(());
        }
        info!("summoning camera");
        self.subview = Subview::CameraOpen;
        Ok(())
    }

    /// Completion callback of the picker/camera presentation. Always returns
    /// to the main subview. A cancelled pick leaves the rest of the session
    /// untouched; a new image replaces the current one and resets detection
    /// before any new result can be considered valid.
    pub fn picker_returned(&mut self, outcome: PickOutcome) {
        self.subview = Subview::Main;
        match outcome {
            PickOutcome::Picked(photo) => {
                info!("image returned, {}x{}", photo.dimensions().0, photo.dimensions().1);
                let upright = photo.upright();
                self.orientation = upright.orientation;
                self.image = Some(Arc::new(upright.pixels));
                self.detection = DetectionState::NotRun;
                self.notice = None;
                self.generation += 1;
                self.engine.cancel_inflight();
            }
            PickOutcome::Cancelled => {
                info!("pick cancelled, keeping prior state");
            }
            PickOutcome::DecodeFailed(reason) => {
                warn!("picked image could not be decoded: {reason}");
                self.notice = Some("could not read the selected image".to_string());
            }
        }
    }

    /// Kick off face detection for the current image. A no-op unless the
    /// detect action is enabled; the action disables itself immediately.
    pub fn run_detection(&mut self) {
        if !self.detect_enabled() {
            debug!("detect requested while disabled, ignoring");
            return;
        }
        let image = match &self.image {
            Some(image) => Arc::clone(image),
            None => return,
        };
        info!("getting faces for generation {}", self.generation);
        self.notice = None;
        self.detection = DetectionState::InFlight;
        self.engine.request(image, self.orientation, self.generation);
    }

    /// Apply one detection event. Events tagged with a superseded generation
    /// are discarded: the image they were computed for is gone.
    pub fn handle_event(&mut self, event: DetectionEvent) {
        if event.generation != self.generation {
            debug!(
                "discarding stale detection result (generation {} != {})",
                event.generation, self.generation
            );
            return;
        }
        if self.detection != DetectionState::InFlight {
            debug!("detection event without a request in flight, ignoring");
            return;
        }
        match event.outcome {
            DetectionOutcome::Faces(boxes) => {
                info!("found {} face(s)", boxes.len());
                if let Some(image) = &self.image {
                    let annotated = draw_detections(image, &boxes);
                    self.image = Some(Arc::new(annotated));
                }
                self.detection = DetectionState::Complete(boxes);
            }
            DetectionOutcome::Failed(e) => {
                warn!("detection failed: {e}");
                self.detection = DetectionState::Failed(e.to_string());
            }
        }
    }

    /// Drain and apply any detection events that have arrived. Call from the
    /// host's render/update tick.
    pub fn pump_events(&mut self) {
        let events: Vec<DetectionEvent> = self.events_rx.try_iter().collect();
        for event in events {
            self.handle_event(event);
        }
    }

    /// Block up to `timeout` for the next detection event and apply it.
    /// Returns false on timeout. Intended for hosts (and tests) without a
    /// render loop to pump from.
    pub fn wait_detection(&mut self, timeout: Duration) -> bool {
        let event = match self.events_rx.recv_timeout(timeout) {
            Ok(event) => event,
            Err(_) => return false,
        };
        self.handle_event(event);
        self.pump_events();
        true
    }
}

fn face_count_caption(count: usize) -> String {
    format!("{} face{}", count, if count == 1 { "" } else { "s" })
}
