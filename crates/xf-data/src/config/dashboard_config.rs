//! Dashboard layout and data location configuration

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use xf_core::{CategoryLabels, Field};

use crate::sources::IngestFilter;
use crate::DataError;

/// Plot margins in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 40.0,
            right: 30.0,
            bottom: 50.0,
            left: 60.0,
        }
    }
}

/// Kind of chart a widget renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetKind {
    /// Row counts per value of a discrete field
    Bar { field: Field },
    /// Day of week by hour count grid
    Heatmap,
    /// Distance against tip
    Scatter,
    /// Pickup counts per zone
    ZoneMap,
}

/// One widget of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Registry key of the widget, unique within a dashboard
    pub owner: String,
    pub kind: WidgetKind,
    pub title: String,
    /// Render from the full store instead of the filtered view
    #[serde(default)]
    pub self_excluding: bool,
}

impl WidgetConfig {
    pub fn new(owner: impl Into<String>, kind: WidgetKind, title: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            kind,
            title: title.into(),
            self_excluding: false,
        }
    }

    pub fn self_excluding(mut self, enabled: bool) -> Self {
        self.self_excluding = enabled;
        self
    }
}

/// Complete dashboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Trip CSV file
    pub trips_path: Option<PathBuf>,
    /// Zone polygon GeoJSON file
    pub zones_path: Option<PathBuf>,
    pub payment_labels: CategoryLabels,
    /// Day names starting at Sunday
    pub day_names: Vec<String>,
    pub margins: Margins,
    /// Upper bound on scatter marks drawn per pass
    pub scatter_max_points: usize,
    pub ingest: IngestFilter,
    pub widgets: Vec<WidgetConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            trips_path: None,
            zones_path: None,
            payment_labels: CategoryLabels::payment_types(),
            day_names: ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            margins: Margins::default(),
            scatter_max_points: 5000,
            ingest: IngestFilter::default(),
            widgets: vec![
                WidgetConfig::new("map", WidgetKind::ZoneMap, "Pickups by zone"),
                WidgetConfig::new("heatmap", WidgetKind::Heatmap, "Trips by day and hour"),
                WidgetConfig::new("scatter", WidgetKind::Scatter, "Distance vs tip"),
                WidgetConfig::new(
                    "bar",
                    WidgetKind::Bar {
                        field: Field::PaymentType,
                    },
                    "Payment type",
                ),
            ],
        }
    }
}

impl DashboardConfig {
    /// Read and validate a JSON configuration file
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::info!("Loaded dashboard config from {:?} with {} widgets", path, config.widgets.len());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), DataError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.day_names.len() != 7 {
            return Err(DataError::Config(format!(
                "expected 7 day names, found {}",
                self.day_names.len()
            )));
        }
        if self.scatter_max_points == 0 {
            return Err(DataError::Config("scatter_max_points must be positive".to_string()));
        }

        let mut seen = HashSet::new();
        for widget in &self.widgets {
            if widget.owner.trim().is_empty() {
                return Err(DataError::Config(format!("widget '{}' has an empty owner key", widget.title)));
            }
            if !seen.insert(widget.owner.as_str()) {
                return Err(DataError::Config(format!("duplicate widget owner '{}'", widget.owner)));
            }
            if let WidgetKind::Bar { field } = widget.kind {
                if !field.is_discrete() {
                    return Err(DataError::Config(format!(
                        "bar widget '{}' needs a discrete field, got {:?}",
                        widget.owner, field
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether any widget needs zone polygons
    pub fn has_zone_map(&self) -> bool {
        self.widgets.iter().any(|w| w.kind == WidgetKind::ZoneMap)
    }

    /// Name of a day index, falling back to the number
    pub fn day_name(&self, day: usize) -> String {
        self.day_names.get(day).cloned().unwrap_or_else(|| day.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = DashboardConfig::default();

        assert!(config.validate().is_ok());
        assert!(config.has_zone_map());
        assert_eq!(config.widgets.len(), 4);
        assert!(config.widgets.iter().all(|w| !w.self_excluding));
        assert_eq!(config.margins.left, 60.0);
        assert_eq!(config.day_name(0), "Sun");
        assert_eq!(config.day_name(9), "9");
    }

    #[test]
    fn test_json_round_trip_with_partial_input() {
        let json = r#"{
            "scatter_max_points": 100,
            "widgets": [
                { "owner": "hours", "kind": { "type": "bar", "field": "hour" }, "title": "Hours", "self_excluding": true },
                { "owner": "grid", "kind": { "type": "heatmap" }, "title": "Grid" }
            ]
        }"#;

        let config: DashboardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.scatter_max_points, 100);
        assert_eq!(config.day_names.len(), 7);
        assert!(!config.has_zone_map());
        assert_eq!(config.widgets[0].kind, WidgetKind::Bar { field: Field::Hour });
        assert!(config.widgets[0].self_excluding);
        assert!(!config.widgets[1].self_excluding);

        let text = serde_json::to_string(&config).unwrap();
        let back: DashboardConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = DashboardConfig::default();
        config.widgets.push(WidgetConfig::new("bar", WidgetKind::Heatmap, "Again"));
        assert!(matches!(config.validate(), Err(DataError::Config(_))));

        let mut config = DashboardConfig::default();
        config.widgets = vec![WidgetConfig::new("tips", WidgetKind::Bar { field: Field::Tip }, "Tips")];
        assert!(matches!(config.validate(), Err(DataError::Config(_))));

        let mut config = DashboardConfig::default();
        config.day_names.pop();
        assert!(matches!(config.validate(), Err(DataError::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("xf-dashboard-{}.json", std::process::id()));
        let config = DashboardConfig {
            trips_path: Some(PathBuf::from("trips.csv")),
            ingest: IngestFilter::permissive(),
            ..DashboardConfig::default()
        };

        config.save(&path).unwrap();
        let loaded = DashboardConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }
}
