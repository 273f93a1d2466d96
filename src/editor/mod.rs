//! Region selection over a generated image.
//!
//! [`SelectionEditor`] ties together the pieces a host UI needs: pointer
//! events in display space are mapped into image pixels
//! ([`mapper`]), folded into one canonical rectangle ([`selection`]),
//! painted as a spotlight ([`renderer`]), and finally turned into an
//! [`EditRequest`] whose image is marked by [`marker`] on submission.

pub mod mapper;
pub mod marker;
mod raster;
pub mod renderer;
pub mod selection;

pub use mapper::{DisplayRect, ImageSize, Point};
pub use renderer::{SelectionRenderer, SourceId, HINT_TEXT};
pub use selection::{Selection, SelectionState, SelectionTool};

use crate::error::{Result, ThumbError};
use crate::thumbnail::EditRequest;
use image::RgbaImage;

/// Handle for one requested image load.
///
/// Only the most recently issued ticket may complete; older tickets are
/// stale and their results are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    source: SourceId,
}

impl LoadTicket {
    /// The source this load was requested for.
    pub fn source(&self) -> SourceId {
        self.source
    }
}

/// Interactive selection over one image.
#[derive(Default)]
pub struct SelectionEditor {
    tool: SelectionTool,
    renderer: SelectionRenderer,
    instruction: String,
    busy: bool,
    next_seq: u64,
    pending: Option<LoadTicket>,
}

impl SelectionEditor {
    /// Creates an editor with no image loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new image load, superseding any pending one.
    pub fn request_load(&mut self, source: SourceId) -> LoadTicket {
        self.next_seq += 1;
        let ticket = LoadTicket {
            seq: self.next_seq,
            source,
        };
        self.pending = Some(ticket);
        ticket
    }

    /// Completes a load with the encoded image bytes.
    ///
    /// Returns `Ok(false)` without touching anything if `ticket` has been
    /// superseded. A fresh image discards the current selection.
    pub fn complete_load(&mut self, ticket: LoadTicket, data: &[u8]) -> Result<bool> {
        if self.pending != Some(ticket) {
            tracing::warn!(source = ?ticket.source, "ignoring stale image load");
            return Ok(false);
        }
        self.pending = None;
        self.renderer.load(ticket.source, data)?;
        self.tool.clear();
        self.redraw();
        Ok(true)
    }

    /// Completes a load with already-decoded pixels.
    pub fn complete_load_decoded(&mut self, ticket: LoadTicket, pixels: RgbaImage) -> bool {
        if self.pending != Some(ticket) {
            tracing::warn!(source = ?ticket.source, "ignoring stale image load");
            return false;
        }
        self.pending = None;
        self.renderer.set_image(ticket.source, pixels);
        self.tool.clear();
        self.redraw();
        true
    }

    /// Native size of the loaded image.
    pub fn image_size(&self) -> Option<ImageSize> {
        self.renderer.image_size()
    }

    /// Maps a pointer position against the current layout.
    fn map(&self, pointer: Point, display: DisplayRect) -> Option<Point> {
        let size = self.image_size()?;
        Some(mapper::to_image_space(pointer, display, size))
    }

    /// Pointer pressed: starts a new selection.
    pub fn pointer_down(&mut self, pointer: Point, display: DisplayRect) -> bool {
        if self.busy {
            return false;
        }
        let Some(at) = self.map(pointer, display) else {
            return false;
        };
        self.tool.pointer_down(at) && self.redraw()
    }

    /// Pointer moved: resizes the selection while dragging.
    pub fn pointer_move(&mut self, pointer: Point, display: DisplayRect) -> bool {
        if self.busy || !self.tool.is_dragging() {
            return false;
        }
        let Some(to) = self.map(pointer, display) else {
            return false;
        };
        self.tool.pointer_move(to) && self.redraw()
    }

    /// Pointer released or left the image: commits the selection.
    pub fn pointer_up(&mut self) -> bool {
        // the drag still ends while busy so it cannot stay stuck open
        self.tool.pointer_up() && self.redraw()
    }

    /// Discards the current selection.
    pub fn clear_selection(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.tool.clear() && self.redraw()
    }

    /// Sets the free-text edit instruction.
    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.instruction = instruction.into();
    }

    /// The current edit instruction.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Current selection state.
    pub fn state(&self) -> SelectionState {
        self.tool.state()
    }

    /// The committed selection, if any.
    pub fn selection(&self) -> Option<Selection> {
        self.tool.committed()
    }

    /// Whether an edit submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Marks a submission in flight (or finished). Pointer edits, clearing
    /// and re-submission are refused while busy.
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Returns true if [`edit_request`](Self::edit_request) would succeed.
    pub fn can_submit(&self) -> bool {
        self.check_submit().is_ok()
    }

    fn check_submit(&self) -> Result<Selection> {
        if self.busy {
            return Err(ThumbError::SubmitRejected("an edit is already in flight"));
        }
        let size = self
            .image_size()
            .ok_or(ThumbError::SubmitRejected("no image loaded"))?;
        // regions drawn off the image would reach the service unmarked
        let selection = self
            .tool
            .committed()
            .map(|s| s.clamp_to(size))
            .filter(|s| !s.is_empty())
            .ok_or(ThumbError::SubmitRejected("no region selected"))?;
        if self.instruction.trim().is_empty() {
            return Err(ThumbError::SubmitRejected("edit instruction is empty"));
        }
        Ok(selection)
    }

    /// Builds the edit request for `image`, the encoded bytes of the image
    /// being edited. The selection is clipped to the image bounds.
    pub fn edit_request(&self, image: &[u8]) -> Result<EditRequest> {
        let selection = self.check_submit()?;
        Ok(EditRequest::new(image.to_vec(), self.instruction.trim(), selection))
    }

    /// The rendered frame.
    pub fn surface(&self) -> &RgbaImage {
        self.renderer.surface()
    }

    /// Hint to overlay on the frame, if any.
    pub fn hint(&self) -> Option<&'static str> {
        self.renderer.hint()
    }

    fn redraw(&mut self) -> bool {
        self.renderer.render(self.tool.current(), self.tool.is_dragging());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn editor_with_image(width: u32, height: u32) -> SelectionEditor {
        let mut editor = SelectionEditor::new();
        let ticket = editor.request_load(SourceId::new(1));
        assert!(editor.complete_load_decoded(
            ticket,
            RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
        ));
        editor
    }

    #[test]
    fn test_scaled_display_scenario() {
        let mut editor = editor_with_image(1920, 1080);
        let display = DisplayRect::new(0.0, 0.0, 640.0, 360.0);

        editor.pointer_down(Point::new(100.0, 100.0), display);
        editor.pointer_move(Point::new(200.0, 160.0), display);
        editor.pointer_up();

        assert_eq!(
            editor.selection(),
            Some(Selection::new(300.0, 300.0, 300.0, 180.0))
        );
    }

    #[test]
    fn test_layout_is_resampled_every_event() {
        let mut editor = editor_with_image(1000, 1000);

        editor.pointer_down(
            Point::new(10.0, 10.0),
            DisplayRect::new(0.0, 0.0, 500.0, 500.0),
        );
        // window resized mid-drag
        editor.pointer_move(
            Point::new(60.0, 60.0),
            DisplayRect::new(10.0, 10.0, 1000.0, 1000.0),
        );
        editor.pointer_up();

        assert_eq!(
            editor.selection(),
            Some(Selection::new(20.0, 20.0, 30.0, 30.0))
        );
    }

    #[test]
    fn test_stale_load_is_ignored() {
        let mut editor = SelectionEditor::new();
        let first = editor.request_load(SourceId::new(1));
        let second = editor.request_load(SourceId::new(2));

        assert!(editor.complete_load_decoded(second, RgbaImage::new(64, 32)));
        assert!(!editor.complete_load_decoded(first, RgbaImage::new(8, 8)));
        assert_eq!(editor.image_size(), Some(ImageSize::new(64, 32)));

        // stale bytes are never decoded, so garbage is harmless
        assert!(!editor.complete_load(first, b"garbage").unwrap());
    }

    #[test]
    fn test_corrupt_image_load_fails() {
        let mut editor = SelectionEditor::new();
        let ticket = editor.request_load(SourceId::new(7));
        let err = editor.complete_load(ticket, b"not a png").unwrap_err();
        assert!(matches!(err, ThumbError::ImageDecode(_)));
        assert_eq!(editor.image_size(), None);
    }

    #[test]
    fn test_new_image_discards_selection() {
        let mut editor = editor_with_image(100, 100);
        let display = DisplayRect::new(0.0, 0.0, 100.0, 100.0);
        editor.pointer_down(Point::new(10.0, 10.0), display);
        editor.pointer_move(Point::new(50.0, 50.0), display);
        editor.pointer_up();
        assert!(editor.selection().is_some());

        let ticket = editor.request_load(SourceId::new(2));
        editor.complete_load_decoded(ticket, RgbaImage::new(100, 100));
        assert_eq!(editor.selection(), None);
        assert_eq!(editor.hint(), Some(HINT_TEXT));
    }

    #[test]
    fn test_pointer_ignored_before_image_loads() {
        let mut editor = SelectionEditor::new();
        let display = DisplayRect::new(0.0, 0.0, 100.0, 100.0);
        assert!(!editor.pointer_down(Point::new(10.0, 10.0), display));
        assert_eq!(editor.state(), SelectionState::Idle);
    }

    #[test]
    fn test_submit_gating() {
        let mut editor = editor_with_image(200, 100);
        let display = DisplayRect::new(0.0, 0.0, 200.0, 100.0);

        editor.set_instruction("make it blue");
        assert!(!editor.can_submit(), "no selection yet");
        assert!(matches!(
            editor.edit_request(b"img"),
            Err(ThumbError::SubmitRejected(_))
        ));

        editor.pointer_down(Point::new(10.0, 10.0), display);
        editor.pointer_move(Point::new(60.0, 40.0), display);
        assert!(!editor.can_submit(), "drag not committed");
        editor.pointer_up();
        assert!(editor.can_submit());

        editor.set_instruction("   ");
        assert!(!editor.can_submit(), "blank instruction");

        editor.set_instruction(" make it blue ");
        let request = editor.edit_request(b"img").unwrap();
        assert_eq!(request.instruction, "make it blue");
        assert_eq!(request.selection, Selection::new(10.0, 10.0, 50.0, 30.0));
        assert_eq!(request.image, b"img");
    }

    #[test]
    fn test_zero_area_selection_cannot_be_submitted() {
        let mut editor = editor_with_image(200, 100);
        let display = DisplayRect::new(0.0, 0.0, 200.0, 100.0);
        editor.set_instruction("add a hat");
        editor.pointer_down(Point::new(10.0, 10.0), display);
        editor.pointer_up();
        assert!(editor.selection().is_some());
        assert!(!editor.can_submit());
    }

    #[test]
    fn test_region_drawn_off_the_image_cannot_be_submitted() {
        let mut editor = editor_with_image(200, 100);
        let display = DisplayRect::new(0.0, 0.0, 200.0, 100.0);
        editor.set_instruction("add a hat");
        editor.pointer_down(Point::new(-50.0, -50.0), display);
        editor.pointer_move(Point::new(-10.0, -10.0), display);
        editor.pointer_up();

        assert_eq!(
            editor.selection(),
            Some(Selection::new(-50.0, -50.0, 40.0, 40.0))
        );
        assert!(!editor.can_submit());
        assert!(matches!(
            editor.edit_request(b"img"),
            Err(ThumbError::SubmitRejected("no region selected"))
        ));
    }

    #[test]
    fn test_region_overhanging_the_image_is_clipped() {
        let mut editor = editor_with_image(200, 100);
        let display = DisplayRect::new(0.0, 0.0, 200.0, 100.0);
        editor.set_instruction("add a hat");
        editor.pointer_down(Point::new(150.0, 50.0), display);
        editor.pointer_move(Point::new(260.0, 140.0), display);
        editor.pointer_up();

        let request = editor.edit_request(b"img").unwrap();
        assert_eq!(request.selection, Selection::new(150.0, 50.0, 50.0, 50.0));
    }

    #[test]
    fn test_busy_blocks_edits_and_resubmission() {
        let mut editor = editor_with_image(200, 100);
        let display = DisplayRect::new(0.0, 0.0, 200.0, 100.0);
        editor.set_instruction("add a hat");
        editor.pointer_down(Point::new(10.0, 10.0), display);
        editor.pointer_move(Point::new(50.0, 50.0), display);
        editor.pointer_up();

        editor.set_busy(true);
        assert!(!editor.can_submit());
        assert!(!editor.clear_selection());
        assert!(!editor.pointer_down(Point::new(90.0, 90.0), display));
        assert_eq!(
            editor.selection(),
            Some(Selection::new(10.0, 10.0, 40.0, 40.0))
        );

        editor.set_busy(false);
        assert!(editor.can_submit());
        assert!(editor.clear_selection());
        assert!(!editor.can_submit());
    }

    #[test]
    fn test_surface_tracks_selection() {
        let mut editor = editor_with_image(100, 100);
        let display = DisplayRect::new(0.0, 0.0, 100.0, 100.0);
        let base = Rgba([10, 20, 30, 255]);

        assert_eq!(*editor.surface().get_pixel(90, 90), base);
        editor.pointer_down(Point::new(10.0, 10.0), display);
        assert_eq!(editor.hint(), None);
        editor.pointer_move(Point::new(50.0, 50.0), display);
        assert_ne!(*editor.surface().get_pixel(90, 90), base);

        editor.pointer_up();
        editor.clear_selection();
        assert_eq!(*editor.surface().get_pixel(90, 90), base);
        assert_eq!(editor.hint(), Some(HINT_TEXT));
    }
}
