//! Pixel-level drawing on RGBA buffers.

use crate::editor::selection::Selection;
use image::{Rgba, RgbaImage};

/// Source-over blend of `src` onto `dst`.
pub(crate) fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let a = f32::from(src[3]) / 255.0;
    if a <= 0.0 {
        return dst;
    }
    let inv = 1.0 - a;
    let channel = |d: u8, s: u8| {
        (f32::from(d) * inv + f32::from(s) * a)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    let out_a = (f32::from(dst[3]) + f32::from(src[3]) * inv)
        .round()
        .clamp(0.0, 255.0) as u8;
    Rgba([
        channel(dst[0], src[0]),
        channel(dst[1], src[1]),
        channel(dst[2], src[2]),
        out_a,
    ])
}

/// Blends `color` over every pixel.
pub(crate) fn fill_alpha(img: &mut RgbaImage, color: Rgba<u8>) {
    for pixel in img.pixels_mut() {
        *pixel = blend_pixel(*pixel, color);
    }
}

/// Copies the pixels of `src` whose centres fall inside `clip` into `dst`.
pub(crate) fn copy_clipped(dst: &mut RgbaImage, src: &RgbaImage, clip: Selection) {
    let Some((x0, y0, x1, y1)) = pixel_span(dst, clip.x, clip.y, clip.right(), clip.bottom())
    else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            if clip.contains_center(x as f32 + 0.5, y as f32 + 0.5) {
                dst.put_pixel(x, y, *src.get_pixel(x, y));
            }
        }
    }
}

/// Strokes the outline of `rect` with an opaque line centred on its edges.
///
/// A pixel is painted when its centre lies within `thickness / 2` of the
/// rectangle's outline, matching how a vector stroke straddles its path.
pub(crate) fn stroke_rect(img: &mut RgbaImage, rect: Selection, thickness: f32, color: Rgba<u8>) {
    let half = thickness.max(1.0) / 2.0;
    let outer = (
        rect.x - half,
        rect.y - half,
        rect.right() + half,
        rect.bottom() + half,
    );
    let inner = (
        rect.x + half,
        rect.y + half,
        rect.right() - half,
        rect.bottom() - half,
    );

    let Some((x0, y0, x1, y1)) = pixel_span(img, outer.0, outer.1, outer.2, outer.3) else {
        return;
    };
    for y in y0..y1 {
        let cy = y as f32 + 0.5;
        if cy < outer.1 || cy >= outer.3 {
            continue;
        }
        for x in x0..x1 {
            let cx = x as f32 + 0.5;
            if cx < outer.0 || cx >= outer.2 {
                continue;
            }
            let in_hole = cx > inner.0 && cx < inner.2 && cy > inner.1 && cy < inner.3;
            if !in_hole {
                img.put_pixel(x, y, color);
            }
        }
    }
}

/// Integer pixel range covering `[left, right) x [top, bottom)`, clipped to
/// the image. `None` when nothing is visible.
fn pixel_span(
    img: &RgbaImage,
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
) -> Option<(u32, u32, u32, u32)> {
    let (w, h) = (img.width() as f32, img.height() as f32);
    let x0 = left.floor().clamp(0.0, w) as u32;
    let y0 = top.floor().clamp(0.0, h) as u32;
    let x1 = right.ceil().clamp(0.0, w) as u32;
    let y1 = bottom.ceil().clamp(0.0, h) as u32;
    (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
}
