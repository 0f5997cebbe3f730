//! Assemble a cross-filter engine from a dashboard configuration

use std::sync::Arc;

use egui::Vec2;
use xf_core::{CrossFilter, Field, OwnerKey, PassSummary};
use xf_data::{DashboardConfig, WidgetConfig, WidgetKind, ZoneSet};

use crate::plots::{BarChart, ScatterBrush, TimeHeatmap, ZoneMap};
use crate::{ChartWidget, ViewError};

/// The engine type the app drives
pub type Dashboard = CrossFilter<dyn ChartWidget>;

fn build_widget(
    dashboard: &Dashboard,
    config: &DashboardConfig,
    widget: &WidgetConfig,
    zones: Option<&Arc<ZoneSet>>,
) -> Result<Box<dyn ChartWidget>, ViewError> {
    let owner = OwnerKey::new(widget.owner.clone());
    let handle = dashboard.filter_handle();

    let chart: Box<dyn ChartWidget> = match widget.kind {
        WidgetKind::Bar { field } => {
            let names = if field == Field::DayOfWeek {
                config.day_names.clone()
            } else {
                Vec::new()
            };
            Box::new(
                BarChart::new(owner, widget.title.clone(), field, handle)
                    .with_margins(config.margins)
                    .with_value_names(names)
                    .with_self_excluding(widget.self_excluding),
            )
        }
        WidgetKind::Heatmap => Box::new(
            TimeHeatmap::new(owner, widget.title.clone(), handle)
                .with_margins(config.margins)
                .with_day_names(config.day_names.clone())
                .with_self_excluding(widget.self_excluding),
        ),
        WidgetKind::Scatter => Box::new(
            ScatterBrush::new(owner, widget.title.clone(), handle)
                .with_margins(config.margins)
                .with_max_points(config.scatter_max_points)
                .with_self_excluding(widget.self_excluding),
        ),
        WidgetKind::ZoneMap => {
            let zones = zones.ok_or_else(|| ViewError::MissingZones(widget.owner.clone()))?;
            Box::new(
                ZoneMap::new(owner, widget.title.clone(), zones.clone(), handle)
                    .with_self_excluding(widget.self_excluding),
            )
        }
    };
    Ok(chart)
}

/// Create every configured widget and register it with a fresh engine.
/// Zone maps need `zones`; nothing is rendered until a store is loaded.
pub fn build_dashboard(config: &DashboardConfig, zones: Option<Arc<ZoneSet>>) -> Result<Dashboard, ViewError> {
    let mut dashboard = Dashboard::new();
    for widget in &config.widgets {
        let chart = build_widget(&dashboard, config, widget, zones.as_ref())?;
        dashboard.register(chart)?;
    }
    tracing::info!("Dashboard built with {} widgets", config.widgets.len());
    Ok(dashboard)
}

/// Apply new surface sizes and re-render if any changed.
/// Returns the new pass when one ran.
pub fn resize_widgets(
    dashboard: &mut Dashboard,
    sizes: &[(OwnerKey, Vec2)],
) -> Result<Option<PassSummary>, ViewError> {
    let mut changed = false;
    for (owner, size) in sizes {
        if let Some(widget) = dashboard.widget_mut(owner) {
            if widget.surface().size() != *size {
                widget.resize(*size);
                changed = true;
            }
        }
    }
    if changed && dashboard.is_loaded() {
        return Ok(Some(dashboard.recompute()?));
    }
    Ok(None)
}
