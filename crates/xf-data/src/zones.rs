//! Pickup zone polygons loaded from GeoJSON
//!
//! Zone identifiers arrive as numbers in the trip data and as numbers or
//! numeric strings in the polygon asset. Both sides are normalized to `u32`
//! here, at ingestion, so joins never compare mixed key types.

use std::path::{Path, PathBuf};

use geo_types::{Geometry, MultiPolygon};
use geojson::{feature::Id, Feature, GeoJson};
use serde_json::Value as JsonValue;

use crate::DataError;

/// Property names that may carry the zone identifier
const ID_PROPERTIES: [&str; 4] = ["LocationId", "LocationID", "location_id", "locationid"];

/// One pickup zone
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: u32,
    pub name: String,
    pub borough: Option<String>,
    /// Geometry in longitude/latitude degrees
    pub geometry: MultiPolygon<f64>,
}

/// The finite set of zones a trip's pickup location is drawn from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

/// Parse a textual zone id such as `"132"` or `"132.0"`
pub fn normalize_zone_id(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<u32>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(zone_id_from_f64))
}

/// Accept whole, non-negative floats as zone ids
pub fn zone_id_from_f64(value: f64) -> Option<u32> {
    crate::sources::integral(value)
}

/// Zone id from a JSON property or feature id
pub fn zone_id_from_json(value: &JsonValue) -> Option<u32> {
    match value {
        JsonValue::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .or_else(|| n.as_f64().and_then(zone_id_from_f64)),
        JsonValue::String(s) => normalize_zone_id(s),
        _ => None,
    }
}

fn feature_zone_id(feature: &Feature) -> Option<u32> {
    ID_PROPERTIES
        .iter()
        .find_map(|key| feature.property(key).and_then(zone_id_from_json))
        .or_else(|| match &feature.id {
            Some(Id::Number(n)) => zone_id_from_json(&JsonValue::Number(n.clone())),
            Some(Id::String(s)) => normalize_zone_id(s),
            None => None,
        })
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    feature.property(key).and_then(|v| v.as_str()).map(str::to_string)
}

impl ZoneSet {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// Parse a GeoJSON FeatureCollection of zone polygons.
    ///
    /// Every feature must carry a zone id; features with non-polygon
    /// geometry are skipped.
    pub fn from_geojson_str(source: &str) -> Result<Self, DataError> {
        let geojson: GeoJson = source.parse()?;
        let collection = match geojson {
            GeoJson::FeatureCollection(collection) => collection,
            _ => return Err(DataError::GeoJson("expected a FeatureCollection".to_string())),
        };

        let mut zones = Vec::with_capacity(collection.features.len());
        for (index, feature) in collection.features.into_iter().enumerate() {
            let id = feature_zone_id(&feature)
                .ok_or_else(|| DataError::InvalidZoneId(format!("feature #{} has no numeric zone id", index)))?;
            let name = string_property(&feature, "zone").unwrap_or_else(|| format!("Zone {}", id));
            let borough = string_property(&feature, "borough");

            let Some(geometry) = feature.geometry else {
                tracing::warn!("Zone {} has no geometry, skipping", id);
                continue;
            };

            let geometry = match Geometry::<f64>::try_from(geometry)? {
                Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
                Geometry::MultiPolygon(multi) => multi,
                other => {
                    tracing::warn!("Zone {} has unsupported geometry {}, skipping", id, kind_of(&other));
                    continue;
                }
            };

            zones.push(Zone {
                id,
                name,
                borough,
                geometry,
            });
        }

        tracing::info!("Loaded {} zones", zones.len());
        Ok(Self { zones })
    }

    /// Blocking load from a file
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&text)
    }

    /// Load on the blocking pool
    pub async fn load_async(path: PathBuf) -> Result<Self, DataError> {
        tokio::task::spawn_blocking(move || Self::load(&path)).await?
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn get(&self, id: u32) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

fn kind_of(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "LocationId": "1", "zone": "Harbor", "borough": "EWR" },
                "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]] }
            },
            {
                "type": "Feature",
                "properties": { "LocationId": 2, "zone": "Midtown" },
                "geometry": { "type": "MultiPolygon", "coordinates": [[[[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 0.0]]]] }
            },
            {
                "type": "Feature",
                "properties": { "LocationId": "3.0", "zone": "Marker" },
                "geometry": { "type": "Point", "coordinates": [5.0, 5.0] }
            }
        ]
    }"#;

    #[test]
    fn test_zone_ids_are_normalized() {
        assert_eq!(normalize_zone_id(" 132 "), Some(132));
        assert_eq!(normalize_zone_id("132.0"), Some(132));
        assert_eq!(normalize_zone_id("13.5"), None);
        assert_eq!(normalize_zone_id("-4"), None);
        assert_eq!(normalize_zone_id(""), None);
        assert_eq!(zone_id_from_json(&serde_json::json!(7)), Some(7));
        assert_eq!(zone_id_from_json(&serde_json::json!("7")), Some(7));
        assert_eq!(zone_id_from_json(&serde_json::json!(null)), None);
    }

    #[test]
    fn test_parse_feature_collection() {
        let zones = ZoneSet::from_geojson_str(ZONES).unwrap();

        assert_eq!(zones.len(), 2);
        assert_eq!(zones.get(1).map(|z| z.name.as_str()), Some("Harbor"));
        assert_eq!(zones.get(1).and_then(|z| z.borough.clone()), Some("EWR".to_string()));
        assert_eq!(zones.get(2).map(|z| z.geometry.0.len()), Some(1));
        assert!(zones.get(3).is_none());
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let source = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"zone": "Nowhere"},
             "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}}
        ]}"#;

        let err = ZoneSet::from_geojson_str(source).unwrap_err();
        assert!(matches!(err, DataError::InvalidZoneId(_)));
    }

    #[test]
    fn test_not_a_collection() {
        let source = r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#;
        assert!(matches!(ZoneSet::from_geojson_str(source), Err(DataError::GeoJson(_))));
    }
}
