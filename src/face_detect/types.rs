use crate::face_detect::error::FaceDetectError;
use crate::face_detect::transform::upright_image;
use image::DynamicImage;

/// A single detected face region.
///
/// Coordinates are normalized to the image's own dimensions (range `[0, 1]`),
/// with the origin in the bottom-left corner as delivered by the detector.
/// Mapping onto a top-left-origin pixel grid requires a vertical flip; see
/// `render::draw_detections`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// Create a new BoundingBox
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self { xmin, ymin, xmax, ymax }
    }

    /// Return the box as a tuple (xmin, ymin, xmax, ymax)
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.xmin, self.ymin, self.xmax, self.ymax)
    }

    /// Normalized width of the bounding box
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Normalized height of the bounding box
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Check if the bounding box is empty (width or height is less than or equal to 0)
    pub fn empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Check if the bounding box coordinates are normalized (in range [0, 1])
    pub fn normalized(&self) -> bool {
        self.xmin >= 0.0 && self.xmax <= 1.0 && self.ymin >= 0.0 && self.ymax <= 1.0
    }

    /// Scale the bounding box to absolute pixel units for the given image size
    pub fn scale(&self, size: (f64, f64)) -> BoundingBox {
        let (sx, sy) = size;
        BoundingBox::new(self.xmin * sx, self.ymin * sy, self.xmax * sx, self.ymax * sy)
    }
}

/// The standard 8-state EXIF orientation of a captured image.
///
/// Values mirror the EXIF tag numbering (1 through 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Orientation {
    Up = 1,
    UpMirrored = 2,
    Down = 3,
    DownMirrored = 4,
    LeftMirrored = 5,
    Right = 6,
    RightMirrored = 7,
    Left = 8,
}

impl Orientation {
    /// Map a raw EXIF orientation tag value onto the enum, `None` if out of range.
    pub fn from_exif(value: u16) -> Option<Orientation> {
        match value {
            1 => Some(Orientation::Up),
            2 => Some(Orientation::UpMirrored),
            3 => Some(Orientation::Down),
            4 => Some(Orientation::DownMirrored),
            5 => Some(Orientation::LeftMirrored),
            6 => Some(Orientation::Right),
            7 => Some(Orientation::RightMirrored),
            8 => Some(Orientation::Left),
            _ => None,
        }
    }

    pub fn to_exif(self) -> u16 {
        self as u16
    }

    /// True when no pixel transform is needed to display the image upright.
    pub fn is_neutral(self) -> bool {
        self == Orientation::Up
    }

    /// True when the transform swaps the image's width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::LeftMirrored | Orientation::Right | Orientation::RightMirrored | Orientation::Left
        )
    }
}

/// A decoded image together with its capture orientation, as handed back by
/// the host's picker or camera.
#[derive(Debug, Clone)]
pub struct Photo {
    pub pixels: DynamicImage,
    pub orientation: Orientation,
}

impl Photo {
    pub fn new(pixels: DynamicImage, orientation: Orientation) -> Self {
        Self { pixels, orientation }
    }

    /// Decode encoded image bytes (JPEG, PNG, ...) into a photo.
    pub fn from_bytes(bytes: &[u8], orientation: Orientation) -> Result<Photo, FaceDetectError> {
        let pixels = image::load_from_memory(bytes)
            .map_err(|e| FaceDetectError::ImageDecode(e.to_string()))?;
        Ok(Photo { pixels, orientation })
    }

    /// Pixel dimensions (width, height) as stored, before orientation is applied.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.pixels.width(), self.pixels.height())
    }

    /// Re-render the photo so the pixel rows read top-to-bottom as displayed.
    /// The result always carries neutral orientation.
    pub fn upright(self) -> Photo {
        if self.orientation.is_neutral() {
            return self;
        }
        Photo {
            pixels: upright_image(self.pixels, self.orientation),
            orientation: Orientation::Up,
        }
    }
}
