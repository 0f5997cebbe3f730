//! Choropleth map of pickups per zone

use std::collections::BTreeMap;
use std::sync::Arc;

use egui::{pos2, Pos2, Vec2};
use geo::{BoundingRect, Centroid, Contains, MapCoords, TriangulateEarcut};
use geo_types::{Coord, MultiPolygon, Point};
use xf_core::aggregate::{count_by, max_count};
use xf_core::{Field, FilterDescriptor, FilterHandle, FilterWidget, FilteredView, Gesture, GestureOutcome, OwnerKey};
use xf_data::{Margins, ZoneSet};

use super::colors::{viridis, NO_DATA, SELECTION};
use crate::surface::{Mark, Surface};
use crate::{plot_rect, ChartWidget};

/// Latitude limit of the Web Mercator projection
const MAX_LATITUDE: f64 = 85.051_128_78;

fn mercator(c: Coord<f64>) -> Coord<f64> {
    let lat = c.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    Coord {
        x: c.x.to_radians(),
        y: (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
    }
}

/// Uniform scale and offset fitting projected bounds into a pixel box
#[derive(Debug, Clone, Copy)]
struct Fit {
    min_x: f64,
    max_y: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Fit {
    fn new(bounds: geo_types::Rect<f64>, target: egui::Rect) -> Self {
        let (width, height) = (bounds.width(), bounds.height());
        let sx = if width > 0.0 { target.width() as f64 / width } else { f64::INFINITY };
        let sy = if height > 0.0 { target.height() as f64 / height } else { f64::INFINITY };
        let scale = match sx.min(sy) {
            s if s.is_finite() => s,
            _ => 1.0,
        };
        Self {
            min_x: bounds.min().x,
            max_y: bounds.max().y,
            scale,
            offset_x: target.left() as f64 + (target.width() as f64 - width * scale) / 2.0,
            offset_y: target.top() as f64 + (target.height() as f64 - height * scale) / 2.0,
        }
    }

    fn apply(self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.offset_x + (c.x - self.min_x) * self.scale,
            y: self.offset_y + (self.max_y - c.y) * self.scale,
        }
    }
}

/// A zone in pixel coordinates
#[derive(Debug, Clone)]
struct ProjectedZone {
    id: u32,
    name: String,
    shape: MultiPolygon<f64>,
    rings: Arc<[Vec<Pos2>]>,
    triangles: Arc<[[Pos2; 3]]>,
    count: usize,
}

fn to_pos(c: Coord<f64>) -> Pos2 {
    pos2(c.x as f32, c.y as f32)
}

fn rings_of(shape: &MultiPolygon<f64>) -> Arc<[Vec<Pos2>]> {
    shape
        .0
        .iter()
        .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
        .map(|ring| ring.coords().copied().map(to_pos).collect())
        .collect()
}

fn triangles_of(shape: &MultiPolygon<f64>) -> Arc<[[Pos2; 3]]> {
    shape
        .0
        .iter()
        .flat_map(|polygon| polygon.earcut_triangles())
        .map(|triangle| triangle.to_array().map(to_pos))
        .collect()
}

/// Pickup counts per zone on a Mercator map fitted to the surface.
/// Clicking a zone toggles an equality filter on the pickup zone.
pub struct ZoneMap {
    owner: OwnerKey,
    title: String,
    self_excluding: bool,
    handle: FilterHandle,
    margins: Margins,
    zones: Arc<ZoneSet>,
    surface: Surface,
    projected: Vec<ProjectedZone>,
    projected_size: Option<Vec2>,
}

impl ZoneMap {
    pub fn new(owner: OwnerKey, title: impl Into<String>, zones: Arc<ZoneSet>, handle: FilterHandle) -> Self {
        Self {
            owner,
            title: title.into(),
            self_excluding: false,
            handle,
            margins: Margins {
                top: 10.0,
                right: 10.0,
                bottom: 10.0,
                left: 10.0,
            },
            zones,
            surface: Surface::new(crate::DEFAULT_SIZE),
            projected: Vec::new(),
            projected_size: None,
        }
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self.projected_size = None;
        self
    }

    pub fn with_self_excluding(mut self, enabled: bool) -> Self {
        self.self_excluding = enabled;
        self
    }

    /// Trips counted for a zone in the latest render
    pub fn count(&self, zone: u32) -> usize {
        self.projected.iter().find(|z| z.id == zone).map_or(0, |z| z.count)
    }

    /// Pixel centroid of a zone
    pub fn zone_center(&self, zone: u32) -> Option<Pos2> {
        let zone = self.projected.iter().find(|z| z.id == zone)?;
        zone.shape.centroid().map(|p| pos2(p.x() as f32, p.y() as f32))
    }

    /// Zone currently selected by this map
    pub fn selected(&self) -> Option<u32> {
        match self.handle.get(&self.owner) {
            Some(FilterDescriptor::DiscreteEquals {
                dim: Field::Zone,
                value,
            }) => u32::try_from(value).ok(),
            _ => None,
        }
    }

    fn project(&mut self) {
        let size = self.surface.size();
        let target = plot_rect(size, &self.margins);

        let mercator_shapes: Vec<MultiPolygon<f64>> =
            self.zones.zones().iter().map(|z| z.geometry.map_coords(mercator)).collect();

        let bounds = mercator_shapes
            .iter()
            .filter_map(|shape| shape.bounding_rect())
            .reduce(|a, b| {
                geo_types::Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            });

        self.projected.clear();
        if let Some(bounds) = bounds {
            let fit = Fit::new(bounds, target);
            for (zone, shape) in self.zones.zones().iter().zip(mercator_shapes) {
                let shape = shape.map_coords(move |c| fit.apply(c));
                self.projected.push(ProjectedZone {
                    id: zone.id,
                    name: zone.name.clone(),
                    rings: rings_of(&shape),
                    triangles: triangles_of(&shape),
                    shape,
                    count: 0,
                });
            }
        }
        self.projected_size = Some(size);
        tracing::debug!("Projected {} zones for map '{}'", self.projected.len(), self.owner);
    }

    fn zone_at(&self, pos: Pos2) -> Option<&ProjectedZone> {
        let point = Point::new(pos.x as f64, pos.y as f64);
        self.projected.iter().find(|z| z.shape.contains(&point))
    }
}

impl FilterWidget for ZoneMap {
    fn owner(&self) -> &OwnerKey {
        &self.owner
    }

    fn self_excluding(&self) -> bool {
        self.self_excluding
    }

    fn render(&mut self, rows: &FilteredView<'_>) {
        self.surface.clear();
        if self.projected_size != Some(self.surface.size()) {
            self.project();
        }

        let counts: BTreeMap<u32, usize> = count_by(rows, |r| r.zone());
        let max = max_count(&counts);

        for zone in self.projected.iter_mut() {
            zone.count = counts.get(&zone.id).copied().unwrap_or(0);
            let color = if zone.count == 0 { NO_DATA } else { viridis(zone.count, max) };
            self.surface.push(Mark::Region {
                rings: Arc::clone(&zone.rings),
                triangles: Arc::clone(&zone.triangles),
                color,
                key: zone.id,
            });
        }

        if let Some(selected) = self.selected() {
            if let Some(zone) = self.projected.iter().find(|z| z.id == selected) {
                self.surface.push_overlay(Mark::Outline {
                    rings: Arc::clone(&zone.rings),
                    color: SELECTION,
                });
            }
        }
    }

    fn on_gesture(&mut self, gesture: &Gesture) -> GestureOutcome {
        let Gesture::Click { pos } = *gesture else {
            return GestureOutcome::Ignore;
        };
        let Some(id) = self.zone_at(pos).map(|z| z.id) else {
            return GestureOutcome::Ignore;
        };

        if self.selected() == Some(id) {
            GestureOutcome::Clear
        } else {
            GestureOutcome::Set(FilterDescriptor::DiscreteEquals {
                dim: Field::Zone,
                value: id as i64,
            })
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl ChartWidget for ZoneMap {
    fn title(&self) -> &str {
        &self.title
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }

    fn resize(&mut self, size: Vec2) {
        self.surface.set_size(size);
    }

    fn hover_text(&self, pos: Pos2) -> Option<String> {
        self.zone_at(pos).map(|z| format!("{}: {} trips", z.name, z.count))
    }
}
