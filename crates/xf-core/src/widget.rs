//! Widget controller contract used by the recompute loop

use egui::{Pos2, Rect};

use crate::filter::{FilterDescriptor, OwnerKey};
use crate::view::FilteredView;

/// A user input event in surface-local pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Pointer click
    Click { pos: Pos2 },

    /// Brush released. `None` means the brush was dismissed.
    BrushEnd { selection: Option<Rect> },
}

/// What a widget wants done with its registry entry after a gesture
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Replace the owner's entry
    Set(FilterDescriptor),

    /// Remove the owner's entry
    Clear,

    /// The gesture hit nothing; leave the registry alone
    Ignore,
}

/// A chart that is both a filter source and a filtered view consumer.
///
/// Widgets never talk to each other. The [`crate::CrossFilter`] engine calls
/// `on_gesture`, updates the registry and then `render`s every widget.
pub trait FilterWidget {
    /// Registry key owned by this widget
    fn owner(&self) -> &OwnerKey;

    /// When true the widget always renders the full store, even while its
    /// own filter narrows the other widgets.
    fn self_excluding(&self) -> bool;

    /// Wipe previous output and redraw from `rows`. Calling this twice with
    /// the same input yields the same output.
    fn render(&mut self, rows: &FilteredView<'_>);

    /// Translate a gesture into a registry update
    fn on_gesture(&mut self, gesture: &Gesture) -> GestureOutcome;

    /// Get as any for downcasting
    fn as_any(&self) -> &dyn std::any::Any;

    /// Get as any mut for downcasting
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
