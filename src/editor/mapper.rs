//! Mapping between display space and image pixel space.

use serde::{Deserialize, Serialize};

/// A point in either display or image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Native resolution of a loaded raster image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Creates a new image size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the shorter side in pixels.
    pub fn min_side(&self) -> u32 {
        self.width.min(self.height)
    }
}

/// On-screen bounding box of the displayed image, relative to the origin
/// pointer events are reported in.
///
/// Layout can change between events, so hosts pass a fresh value with
/// every pointer event rather than caching one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayRect {
    /// Offset of the image's left edge.
    pub left: f32,
    /// Offset of the image's top edge.
    pub top: f32,
    /// Rendered width.
    pub width: f32,
    /// Rendered height.
    pub height: f32,
}

impl DisplayRect {
    /// Creates a new display rectangle.
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    fn is_laid_out(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Converts a pointer position into image pixel coordinates.
///
/// Returns the origin while the image has no on-screen size yet. Results are
/// not clamped: a pointer outside the image maps outside the image.
pub fn to_image_space(pointer: Point, display: DisplayRect, image: ImageSize) -> Point {
    if !display.is_laid_out() {
        return Point::default();
    }
    let scale_x = image.width as f32 / display.width;
    let scale_y = image.height as f32 / display.height;
    Point {
        x: (pointer.x - display.left) * scale_x,
        y: (pointer.y - display.top) * scale_y,
    }
}

/// Converts an image pixel coordinate back to a pointer position.
pub fn to_display_space(point: Point, display: DisplayRect, image: ImageSize) -> Point {
    if image.width == 0 || image.height == 0 {
        return Point::new(display.left, display.top);
    }
    let scale_x = display.width / image.width as f32;
    let scale_y = display.height / image.height as f32;
    Point {
        x: point.x * scale_x + display.left,
        y: point.y * scale_y + display.top,
    }
}
