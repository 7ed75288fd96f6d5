use crate::face_detect::types::BoundingBox;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// Stroke width of the face outlines, relative to the image width.
const STROKE_WIDTH_FRACTION: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Colors;

impl Colors {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
}

/// Composite rectangle outlines at the detected face locations onto a copy of
/// `image`. Pure and deterministic: the input is never mutated, the output has
/// identical dimensions, and an empty `boxes` slice yields a pixel-identical
/// copy of the original.
///
/// Boxes are normalized with a bottom-left origin, so the vertical axis is
/// flipped while mapping onto the image's top-left-origin pixel grid.
pub fn draw_detections(image: &DynamicImage, boxes: &[BoundingBox]) -> DynamicImage {
    draw_detections_with(image, boxes, Colors::RED)
}

/// Same as `draw_detections` with an explicit outline color.
pub fn draw_detections_with(image: &DynamicImage, boxes: &[BoundingBox], color: Color) -> DynamicImage {
    let mut canvas = image.to_rgba8();
    let (width, height) = (canvas.width(), canvas.height());

    let stroke = ((STROKE_WIDTH_FRACTION * width as f64).round() as u32).max(1);

    for bbox in boxes {
        if bbox.empty() {
            continue;
        }
        if let Some(rect) = to_pixel_rect(bbox, width, height) {
            draw_box_outline(&mut canvas, rect, stroke, color);
        }
    }

    DynamicImage::ImageRgba8(canvas)
}

/// Map a normalized bottom-left-origin box onto top-left-origin pixel
/// coordinates, clamped to the image bounds. `None` when the clamped box has
/// no visible extent.
fn to_pixel_rect(bbox: &BoundingBox, width: u32, height: u32) -> Option<Rect> {
    let abs = bbox.scale((width as f64, height as f64));

    let left = abs.xmin.max(0.0).min(width as f64 - 1.0);
    let right = abs.xmax.max(0.0).min(width as f64);
    // vertical flip: the box's ymax edge is the top edge on screen
    let top = (height as f64 - abs.ymax).max(0.0).min(height as f64 - 1.0);
    let bottom = (height as f64 - abs.ymin).max(0.0).min(height as f64);

    let rect_width = (right - left).round() as i64;
    let rect_height = (bottom - top).round() as i64;
    if rect_width < 1 || rect_height < 1 {
        return None;
    }

    Some(Rect::at(left.round() as i32, top.round() as i32).of_size(rect_width as u32, rect_height as u32))
}

/// Draw an unfilled rectangle of the given stroke width as concentric
/// one-pixel hollow rectangles shrinking inward.
fn draw_box_outline(canvas: &mut RgbaImage, rect: Rect, stroke: u32, color: Color) {
    let rgba = color.to_rgba();
    for inset in 0..stroke as i32 {
        let width = rect.width() as i32 - 2 * inset;
        let height = rect.height() as i32 - 2 * inset;
        if width < 1 || height < 1 {
            break;
        }
        let ring = Rect::at(rect.left() + inset, rect.top() + inset).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(canvas, ring, rgba);
    }
}
