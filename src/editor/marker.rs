//! Marks an edit region on a copy of the image for the generation service.

use crate::editor::mapper::ImageSize;
use crate::editor::raster;
use crate::editor::selection::Selection;
use crate::error::{Result, ThumbError};
use image::{DynamicImage, Rgba, RgbaImage};
use std::io::Cursor;

/// Marker colour. The edit prompt refers to it by name.
pub const MARKER_COLOR: Rgba<u8> = Rgba([0xff, 0x00, 0x00, 0xff]);

/// Smallest marker line width in pixels.
pub const MIN_MARKER_THICKNESS: f32 = 5.0;

/// MIME type of the encoded marked image.
pub const MARKED_MIME_TYPE: &str = "image/png";

/// Line width of the marker: 1% of the shorter side, never below
/// [`MIN_MARKER_THICKNESS`].
pub fn marker_thickness(size: ImageSize) -> f32 {
    (size.min_side() as f32 * 0.01).max(MIN_MARKER_THICKNESS)
}

/// Strokes the marker onto a copy of `image`.
///
/// The selection is clamped to the image first; a selection with no area
/// inside the image leaves the copy unmarked.
pub fn mark(image: &RgbaImage, selection: Selection) -> RgbaImage {
    let size = ImageSize::new(image.width(), image.height());
    let bounds = selection.clamp_to(size);
    let mut marked = image.clone();
    if !bounds.is_empty() {
        raster::stroke_rect(&mut marked, bounds, marker_thickness(size), MARKER_COLOR);
    }
    marked
}

/// Decodes `data`, marks `selection` on it and re-encodes it as opaque PNG.
///
/// Fails with [`ThumbError::SubmitRejected`] if the selection has no area
/// inside the image, since the result would carry no marker.
pub fn encode_marked(data: &[u8], selection: Selection) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(data)
        .map_err(|e| ThumbError::ImageDecode(e.to_string()))?;
    let size = ImageSize::new(decoded.width(), decoded.height());
    if selection.clamp_to(size).is_empty() {
        return Err(ThumbError::SubmitRejected("selected region does not overlap the image"));
    }
    let marked = mark(&decoded.to_rgba8(), selection);

    tracing::debug!(
        width = marked.width(),
        height = marked.height(),
        x = selection.x,
        y = selection.y,
        w = selection.width,
        h = selection.height,
        "marked edit region"
    );

    let opaque = DynamicImage::ImageRgba8(marked).to_rgb8();
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(opaque)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| ThumbError::ImageDecode(format!("failed to encode marked image: {e}")))?;
    Ok(out)
}
