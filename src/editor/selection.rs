//! Rectangular selection and the drag gesture that produces it.

use crate::editor::mapper::{ImageSize, Point};
use serde::{Deserialize, Serialize};

/// A canonical, axis-aligned rectangle in image pixel space.
///
/// `x`/`y` is always the minimum corner and both extents are non-negative,
/// whichever direction the drag went.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Selection {
    /// Creates a selection from its top-left corner and extents.
    ///
    /// Negative extents are folded back so the result stays canonical.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_corners(Point::new(x, y), Point::new(x + width, y + height))
    }

    /// Returns the bounding box of two opposite corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Zero-sized selection at a point.
    pub fn at(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Right edge (`x + width`).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns true if the selection covers no area.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Returns true if the pixel whose centre is at `(px, py)` lies inside.
    pub(crate) fn contains_center(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Intersects the selection with the image bounds.
    pub fn clamp_to(&self, size: ImageSize) -> Self {
        let w = size.width as f32;
        let h = size.height as f32;
        let left = self.x.clamp(0.0, w);
        let top = self.y.clamp(0.0, h);
        let right = self.right().clamp(0.0, w);
        let bottom = self.bottom().clamp(0.0, h);
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }
}

/// Lifecycle of the single live selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SelectionState {
    /// No selection.
    #[default]
    Idle,
    /// Anchor fixed, live corner following the pointer.
    Dragging {
        /// Where the pointer went down.
        anchor: Point,
        /// Bounding box of the anchor and the latest pointer position.
        rect: Selection,
    },
    /// Drag ended; the rectangle is frozen and can be submitted.
    Committed(Selection),
}

impl SelectionState {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging",
            Self::Committed(_) => "committed",
        }
    }
}

/// Drives [`SelectionState`] from pointer gestures.
///
/// Every method returns `true` when the state changed and the owner has to
/// repaint.
#[derive(Debug, Clone, Default)]
pub struct SelectionTool {
    state: SelectionState,
}

impl SelectionTool {
    /// Creates an idle tool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new drag, discarding any previous selection.
    pub fn pointer_down(&mut self, at: Point) -> bool {
        self.state = SelectionState::Dragging {
            anchor: at,
            rect: Selection::at(at),
        };
        true
    }

    /// Moves the live corner. Ignored unless a drag is in progress.
    pub fn pointer_move(&mut self, to: Point) -> bool {
        match &mut self.state {
            SelectionState::Dragging { anchor, rect } => {
                *rect = Selection::from_corners(*anchor, to);
                true
            }
            _ => false,
        }
    }

    /// Ends the drag and freezes the rectangle as-is, zero-area included.
    pub fn pointer_up(&mut self) -> bool {
        match self.state {
            SelectionState::Dragging { rect, .. } => {
                self.state = SelectionState::Committed(rect);
                true
            }
            _ => false,
        }
    }

    /// Discards the selection.
    pub fn clear(&mut self) -> bool {
        let changed = self.state != SelectionState::Idle;
        self.state = SelectionState::Idle;
        changed
    }

    /// Current state.
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// The live rectangle, whether dragging or committed.
    pub fn current(&self) -> Option<Selection> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Dragging { rect, .. } | SelectionState::Committed(rect) => Some(rect),
        }
    }

    /// The frozen rectangle, if a drag has finished.
    pub fn committed(&self) -> Option<Selection> {
        match self.state {
            SelectionState::Committed(rect) => Some(rect),
            _ => None,
        }
    }

    /// Returns true while a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SelectionState::Dragging { .. })
    }
}
