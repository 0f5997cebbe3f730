//! Retained drawing output of a chart
//!
//! A controller writes plain marks in surface-local pixels; the app paints
//! them with egui. Data marks and selection overlay are kept apart: `marks`
//! depend only on the rows and the surface size, `overlay` on the widget's
//! registry entry.

use std::sync::Arc;

use egui::{Align2, Color32, Pos2, Rect, Vec2};

/// One drawing primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// Filled bar for one category
    Bar { rect: Rect, color: Color32, key: i64 },

    /// Filled grid cell
    Cell { rect: Rect, color: Color32, column: usize, row: usize },

    /// Scatter point
    Dot { center: Pos2, radius: f32, color: Color32 },

    /// Filled region, pre-triangulated; `rings` are its boundaries.
    /// Geometry is shared with the controller's projection cache.
    Region {
        rings: Arc<[Vec<Pos2>]>,
        triangles: Arc<[[Pos2; 3]]>,
        color: Color32,
        key: u32,
    },

    /// Text anchored at a position
    Label { pos: Pos2, text: String, anchor: Align2 },

    /// Axis or tick line
    Rule { from: Pos2, to: Pos2 },

    /// Stroked rectangle, used for selections
    Frame { rect: Rect, color: Color32 },

    /// Stroked polygon rings, used for selected regions
    Outline { rings: Arc<[Vec<Pos2>]>, color: Color32 },
}

/// A chart's render target
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    size: Vec2,
    marks: Vec<Mark>,
    overlay: Vec<Mark>,
}

impl Surface {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            marks: Vec::new(),
            overlay: Vec::new(),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Surface bounds in local coordinates
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.size)
    }

    /// Drop all marks and overlay
    pub fn clear(&mut self) {
        self.marks.clear();
        self.overlay.clear();
    }

    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    pub fn push_overlay(&mut self, mark: Mark) {
        self.overlay.push(mark);
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn overlay(&self) -> &[Mark] {
        &self.overlay
    }

    /// Count marks matching a predicate
    pub fn count_marks(&self, predicate: impl Fn(&Mark) -> bool) -> usize {
        self.marks.iter().filter(|m| predicate(m)).count()
    }

    pub fn bar_count(&self) -> usize {
        self.count_marks(|m| matches!(m, Mark::Bar { .. }))
    }

    pub fn dot_count(&self) -> usize {
        self.count_marks(|m| matches!(m, Mark::Dot { .. }))
    }
}
