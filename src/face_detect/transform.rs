use crate::face_detect::types::Orientation;
use image::DynamicImage;

/// Re-render an image so its pixel rows read top-to-bottom as displayed,
/// undoing the capture orientation. The standard EXIF transform table:
/// quarter turns for 6/8, half turn for 3, mirror variants for 2/4/5/7.
///
/// The caller is responsible for treating the result as neutrally oriented;
/// `Photo::upright` does exactly that.
pub fn upright_image(image: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Up => image,
        Orientation::UpMirrored => image.fliph(),
        Orientation::Down => image.rotate180(),
        Orientation::DownMirrored => image.flipv(),
        Orientation::LeftMirrored => image.rotate90().fliph(),
        Orientation::Right => image.rotate90(),
        Orientation::RightMirrored => image.rotate270().fliph(),
        Orientation::Left => image.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// 2x1 image: red pixel on the left, green pixel on the right.
    fn two_pixel_strip() -> DynamicImage {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_up_is_identity() {
        let original = two_pixel_strip();
        let upright = upright_image(original.clone(), Orientation::Up);
        assert_eq!(original.to_rgb8().as_raw(), upright.to_rgb8().as_raw());
    }

    #[test]
    fn test_down_rotates_half_turn() {
        let upright = upright_image(two_pixel_strip(), Orientation::Down).to_rgb8();
        assert_eq!(upright.get_pixel(0, 0), &Rgb([0, 255, 0]));
        assert_eq!(upright.get_pixel(1, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_mirrored_flips_horizontally() {
        let upright = upright_image(two_pixel_strip(), Orientation::UpMirrored).to_rgb8();
        assert_eq!(upright.get_pixel(0, 0), &Rgb([0, 255, 0]));
        assert_eq!(upright.get_pixel(1, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_quarter_turns_swap_dimensions() {
        for orientation in [
            Orientation::LeftMirrored,
            Orientation::Right,
            Orientation::RightMirrored,
            Orientation::Left,
        ] {
            let upright = upright_image(two_pixel_strip(), orientation);
            assert_eq!((upright.width(), upright.height()), (1, 2), "{orientation:?}");
        }
    }

    #[test]
    fn test_right_turns_counterclockwise_content() {
        // A camera held with the top edge to the right stores the scene
        // rotated; a clockwise quarter turn restores it. The left pixel of
        // the strip ends up in the top row.
        let upright = upright_image(two_pixel_strip(), Orientation::Right).to_rgb8();
        assert_eq!(upright.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(upright.get_pixel(0, 1), &Rgb([0, 255, 0]));
    }
}
