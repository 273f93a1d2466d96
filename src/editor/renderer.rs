//! Spotlight rendering of the active selection over the source image.

use crate::editor::mapper::ImageSize;
use crate::editor::raster;
use crate::editor::selection::Selection;
use crate::error::{Result, ThumbError};
use image::{Rgba, RgbaImage};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Dim applied over the whole image while a selection exists.
pub const OVERLAY_COLOR: Rgba<u8> = Rgba([0, 0, 0, 128]);

/// Colour of the selection border.
pub const BORDER_COLOR: Rgba<u8> = Rgba([0xf4, 0x72, 0xb6, 0xff]);

/// Width of the selection border in image pixels.
pub const BORDER_WIDTH: f32 = 4.0;

/// Instruction shown over the image before anything is selected.
pub const HINT_TEXT: &str = "Draw a box around what you want to change";

/// Identity of an image source, used to key the decode cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u64);

impl SourceId {
    /// Wraps a caller-assigned identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Derives an identifier from the encoded image bytes.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        Self(hasher.finish())
    }
}

struct DecodedSource {
    id: SourceId,
    pixels: RgbaImage,
}

/// Owns the drawing surface and the decoded base image.
///
/// Each [`render`](Self::render) starts again from the base image, so
/// repeated renders never stack overlays.
#[derive(Default)]
pub struct SelectionRenderer {
    source: Option<DecodedSource>,
    surface: RgbaImage,
    hint_visible: bool,
}

impl SelectionRenderer {
    /// Creates a renderer with no image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `data` as the base image unless `id` is already loaded.
    pub fn load(&mut self, id: SourceId, data: &[u8]) -> Result<ImageSize> {
        if let Some(source) = self.source.as_ref().filter(|s| s.id == id) {
            tracing::debug!(?id, "image already decoded, reusing cache");
            return Ok(ImageSize::new(source.pixels.width(), source.pixels.height()));
        }
        let pixels = image::load_from_memory(data)
            .map_err(|e| ThumbError::ImageDecode(e.to_string()))?
            .to_rgba8();
        Ok(self.set_image(id, pixels))
    }

    /// Installs an already-decoded base image.
    pub fn set_image(&mut self, id: SourceId, pixels: RgbaImage) -> ImageSize {
        let size = ImageSize::new(pixels.width(), pixels.height());
        tracing::debug!(?id, width = size.width, height = size.height, "base image loaded");
        self.surface = pixels.clone();
        self.source = Some(DecodedSource { id, pixels });
        self.hint_visible = true;
        size
    }

    /// Identity of the current base image.
    pub fn source_id(&self) -> Option<SourceId> {
        self.source.as_ref().map(|s| s.id)
    }

    /// Native size of the current base image.
    pub fn image_size(&self) -> Option<ImageSize> {
        self.source
            .as_ref()
            .map(|s| ImageSize::new(s.pixels.width(), s.pixels.height()))
    }

    /// Redraws the surface for the given selection.
    ///
    /// Does nothing until a base image has been loaded.
    pub fn render(&mut self, selection: Option<Selection>, dragging: bool) {
        let Some(source) = self.source.as_ref() else {
            return;
        };
        self.surface.clone_from(&source.pixels);

        if let Some(sel) = selection {
            raster::fill_alpha(&mut self.surface, OVERLAY_COLOR);
            raster::copy_clipped(&mut self.surface, &source.pixels, sel);
            raster::stroke_rect(&mut self.surface, sel, BORDER_WIDTH, BORDER_COLOR);
        }
        self.hint_visible = selection.is_none() && !dragging;
    }

    /// The rendered frame.
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    /// Hint text to show over the frame, if any.
    pub fn hint(&self) -> Option<&'static str> {
        (self.source.is_some() && self.hint_visible).then_some(HINT_TEXT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const BASE: Rgba<u8> = Rgba([200, 100, 50, 255]);
    const DIMMED: Rgba<u8> = Rgba([100, 50, 25, 255]);

    fn loaded(width: u32, height: u32) -> SelectionRenderer {
        let mut renderer = SelectionRenderer::new();
        renderer.set_image(SourceId::new(1), RgbaImage::from_pixel(width, height, BASE));
        renderer
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, BASE))
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_render_without_selection_is_base_image_with_hint() {
        let mut renderer = loaded(40, 30);
        renderer.render(None, false);

        assert!(renderer.surface().pixels().all(|p| *p == BASE));
        assert_eq!(renderer.hint(), Some(HINT_TEXT));
    }

    #[test]
    fn test_hint_hidden_while_dragging() {
        let mut renderer = loaded(40, 30);
        renderer.render(None, true);
        assert_eq!(renderer.hint(), None);
    }

    #[test]
    fn test_spotlight_leaves_selection_clear() {
        let mut renderer = loaded(100, 100);
        renderer.render(Some(Selection::new(20.0, 20.0, 40.0, 40.0)), false);
        let surface = renderer.surface();

        // outside: dimmed
        assert_eq!(*surface.get_pixel(5, 5), DIMMED);
        assert_eq!(*surface.get_pixel(90, 90), DIMMED);
        // inside, away from the border: original pixels
        assert_eq!(*surface.get_pixel(40, 40), BASE);
        // on the edge: border
        assert_eq!(*surface.get_pixel(20, 40), BORDER_COLOR);
        assert_eq!(*surface.get_pixel(59, 40), BORDER_COLOR);
        assert_eq!(renderer.hint(), None);
    }

    #[test]
    fn test_repeated_renders_do_not_accumulate() {
        let mut renderer = loaded(50, 50);
        let sel = Some(Selection::new(10.0, 10.0, 10.0, 10.0));
        renderer.render(sel, false);
        renderer.render(sel, false);
        renderer.render(sel, false);
        assert_eq!(*renderer.surface().get_pixel(45, 45), DIMMED);

        renderer.render(None, false);
        assert_eq!(*renderer.surface().get_pixel(45, 45), BASE);
    }

    #[test]
    fn test_render_before_load_is_noop() {
        let mut renderer = SelectionRenderer::new();
        renderer.render(Some(Selection::new(0.0, 0.0, 5.0, 5.0)), false);
        assert_eq!(renderer.surface().dimensions(), (0, 0));
        assert_eq!(renderer.hint(), None);
    }

    #[test]
    fn test_load_decodes_and_caches_by_id() {
        let mut renderer = SelectionRenderer::new();
        let data = png_bytes(16, 8);
        let id = SourceId::of_bytes(&data);

        assert_eq!(renderer.load(id, &data).unwrap(), ImageSize::new(16, 8));
        // same id: cached, the bytes are not looked at again
        assert_eq!(
            renderer.load(id, b"garbage").unwrap(),
            ImageSize::new(16, 8)
        );
        assert_eq!(renderer.source_id(), Some(id));

        // new id: decoded again
        let err = renderer.load(SourceId::new(99), b"garbage").unwrap_err();
        assert!(matches!(err, ThumbError::ImageDecode(_)));
        assert_eq!(renderer.source_id(), Some(id));
    }
}
