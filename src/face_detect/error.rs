use thiserror::Error;

/// Failures a session can run into. A cancelled pick is an event, not an
/// error, and never appears here.
#[derive(Error, Debug)]
pub enum FaceDetectError {
    #[error("image decode failed: {0}")]
    ImageDecode(String),
    #[error("face detection failed: {0}")]
    Detection(String),
    #[error("camera capture is not available on this host")]
    CaptureUnavailable,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
