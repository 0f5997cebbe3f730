//! Chart controllers for the trip cross-filter dashboard
//!
//! Every chart implements [`ChartWidget`]: it renders a [`FilteredView`] into
//! its own [`Surface`], turns pointer gestures into filter descriptors and
//! reads its current selection through a [`FilterHandle`]. The app only
//! paints surfaces and forwards gestures.
//!
//! [`FilteredView`]: xf_core::FilteredView
//! [`FilterHandle`]: xf_core::FilterHandle

pub mod dashboard;
pub mod plots;
pub mod scale;
pub mod surface;

use egui::{Pos2, Rect, Vec2};
use thiserror::Error;
use xf_core::{FilterError, FilterWidget};
use xf_data::Margins;

// Re-exports
pub use dashboard::{build_dashboard, resize_widgets, Dashboard};
pub use plots::{BarChart, ScatterBrush, TimeHeatmap, ZoneMap};
pub use scale::{BandScale, LinearScale};
pub use surface::{Mark, Surface};

/// Surface size used until the app reports a real one
pub const DEFAULT_SIZE: Vec2 = Vec2::new(480.0, 320.0);

/// A filter widget that draws into a [`Surface`]
pub trait ChartWidget: FilterWidget {
    fn title(&self) -> &str;

    /// Output of the latest render
    fn surface(&self) -> &Surface;

    /// Change the surface size. Takes effect on the next render.
    fn resize(&mut self, size: Vec2);

    /// Tooltip for the mark under `pos`
    fn hover_text(&self, pos: Pos2) -> Option<String>;
}

/// Errors raised while assembling charts
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Zone map '{0}' is configured but no zones were loaded")]
    MissingZones(String),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Plot area inside the margins; never negative
pub(crate) fn plot_rect(size: Vec2, margins: &Margins) -> Rect {
    let min = Pos2::new(margins.left, margins.top);
    let max = Pos2::new(
        (size.x - margins.right).max(margins.left),
        (size.y - margins.bottom).max(margins.top),
    );
    Rect::from_min_max(min, max)
}
