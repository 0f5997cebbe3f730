//! Chart controllers

pub mod bar;
pub mod colors;
pub mod geo;
pub mod heatmap;
pub mod scatter;

pub use bar::BarChart;
pub use geo::ZoneMap;
pub use heatmap::TimeHeatmap;
pub use scatter::ScatterBrush;

use egui::Rect;

/// A brush that selects nothing
pub(crate) fn is_empty_brush(selection: Option<Rect>) -> bool {
    match selection {
        None => true,
        Some(rect) => !(rect.width() > 0.0 && rect.height() > 0.0),
    }
}
