use anyhow::Result;
use image::{DynamicImage, Rgb, RgbImage};
use rs_face_detect::face_detect::detector::FaceDetector;
use rs_face_detect::face_detect::error::FaceDetectError;
use rs_face_detect::face_detect::session::{HostCapabilities, PickOutcome, Session};
use rs_face_detect::face_detect::types::{BoundingBox, Orientation, Photo};
use std::sync::Arc;
use std::time::Duration;

struct Host;

impl HostCapabilities for Host {
    fn camera_available(&self) -> bool {
        false
    }
}

/// Stands in for the platform face detector: reports two fixed face regions.
struct StubDetector;

impl FaceDetector for StubDetector {
    fn detect_faces(
        &self,
        _image: &DynamicImage,
        _orientation: Orientation,
    ) -> Result<Vec<BoundingBox>, FaceDetectError> {
        Ok(vec![
            BoundingBox::new(0.15, 0.45, 0.4, 0.85),
            BoundingBox::new(0.55, 0.4, 0.85, 0.8),
        ])
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut session = Session::new(Arc::new(StubDetector), &Host);

    // synthetic 640x480 photo
    let pixels = RgbImage::from_fn(640, 480, |x, y| {
        Rgb([(x / 3) as u8, (y / 2) as u8, 96])
    });
    let photo = Photo::new(DynamicImage::ImageRgb8(pixels), Orientation::Up);

    session.open_picker();
    session.picker_returned(PickOutcome::Picked(photo));
    println!("caption: {}", session.caption());

    session.run_detection();
    if !session.wait_detection(Duration::from_secs(5)) {
        anyhow::bail!("detector never responded");
    }
    println!("caption: {}", session.caption());

    let annotated = session.image().expect("image present after detection");
    annotated.save("./annotated.png")?;
    println!("annotated image written to ./annotated.png");

    Ok(())
}
