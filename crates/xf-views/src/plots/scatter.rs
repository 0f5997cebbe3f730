//! Distance against tip scatter plot with a rectangular brush

use egui::{pos2, Align2, Pos2, Rect, Vec2};
use xf_core::aggregate::max_value;
use xf_core::{Field, FilterDescriptor, FilterHandle, FilterWidget, FilteredView, Gesture, GestureOutcome, OwnerKey};
use xf_data::Margins;

use super::colors::{category10, SELECTION};
use super::is_empty_brush;
use crate::scale::LinearScale;
use crate::surface::{Mark, Surface};
use crate::{plot_rect, ChartWidget};

/// Axis maximum when there is nothing to plot
const FALLBACK_MAX: f64 = 10.0;

#[derive(Debug, Clone)]
struct ScatterPoint {
    center: Pos2,
    radius: f32,
    distance: f64,
    tip: f64,
    label: String,
}

/// Scales of one render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterScales {
    pub x: LinearScale,
    pub y: LinearScale,
}

/// Scatter of trip distance (x) against tip (y).
///
/// A finished brush is inverted right away against the scales of the latest
/// render and stored as a distance/tip range. Later renders rescale the axes
/// from their own rows and only project the stored range forward to draw the
/// overlay.
pub struct ScatterBrush {
    owner: OwnerKey,
    title: String,
    self_excluding: bool,
    handle: FilterHandle,
    margins: Margins,
    max_points: usize,
    surface: Surface,
    scales: Option<ScatterScales>,
    points: Vec<ScatterPoint>,
    /// Payment labels in order of first appearance; the index picks the color
    palette: Vec<String>,
}

impl ScatterBrush {
    pub fn new(owner: OwnerKey, title: impl Into<String>, handle: FilterHandle) -> Self {
        Self {
            owner,
            title: title.into(),
            self_excluding: false,
            handle,
            margins: Margins::default(),
            max_points: 5000,
            surface: Surface::new(crate::DEFAULT_SIZE),
            scales: None,
            points: Vec::new(),
            palette: Vec::new(),
        }
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points.max(1);
        self
    }

    pub fn with_self_excluding(mut self, enabled: bool) -> Self {
        self.self_excluding = enabled;
        self
    }

    /// Scales of the latest render, `None` before the first one
    pub fn scales(&self) -> Option<ScatterScales> {
        self.scales
    }

    /// Stored `(distance, tip)` bounds of the active brush
    pub fn brushed_range(&self) -> Option<((f64, f64), (f64, f64))> {
        match self.handle.get(&self.owner) {
            Some(FilterDescriptor::Range2D {
                dim1: Field::Distance,
                lo1,
                hi1,
                dim2: Field::Tip,
                lo2,
                hi2,
            }) => Some(((lo1, hi1), (lo2, hi2))),
            _ => None,
        }
    }

    fn draw_axes(&mut self, plot: Rect, scales: ScatterScales) {
        self.surface.push(Mark::Rule {
            from: plot.left_bottom(),
            to: plot.right_bottom(),
        });
        self.surface.push(Mark::Rule {
            from: plot.left_top(),
            to: plot.left_bottom(),
        });

        for tick in scales.x.ticks(5) {
            self.surface.push(Mark::Label {
                pos: pos2(scales.x.apply(tick), plot.bottom() + 4.0),
                text: format!("{:.1}", tick),
                anchor: Align2::CENTER_TOP,
            });
        }
        for tick in scales.y.ticks(5) {
            self.surface.push(Mark::Label {
                pos: pos2(plot.left() - 4.0, scales.y.apply(tick)),
                text: format!("{:.1}", tick),
                anchor: Align2::RIGHT_CENTER,
            });
        }
        self.surface.push(Mark::Label {
            pos: pos2(plot.center().x, plot.bottom() + 24.0),
            text: Field::Distance.display_name().to_string(),
            anchor: Align2::CENTER_TOP,
        });
        self.surface.push(Mark::Label {
            pos: pos2(plot.left(), plot.top() - 8.0),
            text: Field::Tip.display_name().to_string(),
            anchor: Align2::LEFT_BOTTOM,
        });
    }
}

/// Palette slot of a label, assigning the next slot on first sight
fn palette_slot(palette: &mut Vec<String>, label: &str) -> usize {
    match palette.iter().position(|known| known == label) {
        Some(slot) => slot,
        None => {
            palette.push(label.to_string());
            palette.len() - 1
        }
    }
}

fn axis_max(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v > 0.0 => v,
        _ => FALLBACK_MAX,
    }
}

impl FilterWidget for ScatterBrush {
    fn owner(&self) -> &OwnerKey {
        &self.owner
    }

    fn self_excluding(&self) -> bool {
        self.self_excluding
    }

    fn render(&mut self, rows: &FilteredView<'_>) {
        self.surface.clear();
        self.points.clear();

        let limit = self.max_points;
        let plot = plot_rect(self.surface.size(), &self.margins);
        // axes span the whole view even when only the first `limit` rows are drawn
        let scales = ScatterScales {
            x: LinearScale::new(
                (0.0, axis_max(max_value(rows.iter(), Field::Distance))),
                (plot.left(), plot.right()),
            ),
            y: LinearScale::new(
                (0.0, axis_max(max_value(rows.iter(), Field::Tip))),
                (plot.bottom(), plot.top()),
            ),
        };
        self.scales = Some(scales);
        self.draw_axes(plot, scales);

        for record in rows.iter().take(limit) {
            let center = pos2(scales.x.apply(record.distance()), scales.y.apply(record.tip()));
            let radius = record.passengers().filter(|p| *p > 0).unwrap_or(1) as f32 * 1.5;
            let color = category10(palette_slot(&mut self.palette, record.payment_label()));
            self.surface.push(Mark::Dot { center, radius, color });
            self.points.push(ScatterPoint {
                center,
                radius,
                distance: record.distance(),
                tip: record.tip(),
                label: record.payment_label().to_string(),
            });
        }
        if rows.len() > limit {
            tracing::debug!("Scatter '{}' drew {} of {} rows", self.owner, limit, rows.len());
        }

        if let Some(((lo1, hi1), (lo2, hi2))) = self.brushed_range() {
            let projected = Rect::from_two_pos(
                pos2(scales.x.apply(lo1), scales.y.apply(hi2)),
                pos2(scales.x.apply(hi1), scales.y.apply(lo2)),
            );
            let visible = projected.intersect(plot);
            if visible.is_positive() {
                self.surface.push_overlay(Mark::Frame {
                    rect: visible,
                    color: SELECTION,
                });
            }
        }
    }

    fn on_gesture(&mut self, gesture: &Gesture) -> GestureOutcome {
        match *gesture {
            Gesture::Click { .. } => {
                if self.brushed_range().is_some() {
                    GestureOutcome::Clear
                } else {
                    GestureOutcome::Ignore
                }
            }
            Gesture::BrushEnd { selection } => {
                let Some(rect) = selection.filter(|_| !is_empty_brush(selection)) else {
                    return GestureOutcome::Clear;
                };
                let Some(scales) = self.scales else {
                    return GestureOutcome::Ignore;
                };

                // y runs bottom to top, so the rect's bottom edge is the low tip
                GestureOutcome::Set(FilterDescriptor::Range2D {
                    dim1: Field::Distance,
                    lo1: scales.x.invert(rect.left()),
                    hi1: scales.x.invert(rect.right()),
                    dim2: Field::Tip,
                    lo2: scales.y.invert(rect.bottom()),
                    hi2: scales.y.invert(rect.top()),
                })
            }
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl ChartWidget for ScatterBrush {
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
        self.points
            .iter()
            .rev()
            .find(|p| p.center.distance(pos) <= p.radius.max(3.0))
            .map(|p| format!("{}: {:.2} mi, tip {:.2}", p.label, p.distance, p.tip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xf_core::{CategoryLabels, CrossFilter, RecordStore, TripRow};

    fn trip(distance: f64, tip: f64, passengers: Option<u32>) -> TripRow {
        TripRow {
            distance,
            tip,
            day_of_week: 3,
            hour: 12,
            payment_type: 1,
            passengers,
            zone: Some(4),
        }
    }

    fn engine(rows: Vec<TripRow>) -> (CrossFilter<ScatterBrush>, OwnerKey) {
        let mut engine: CrossFilter<ScatterBrush> = CrossFilter::new();
        let owner = OwnerKey::from("scatter");
        let scatter = ScatterBrush::new(owner.clone(), "Distance vs tip", engine.filter_handle());
        engine.register(Box::new(scatter)).unwrap();
        engine.load(RecordStore::new(rows, &CategoryLabels::default()));
        (engine, owner)
    }

    #[test]
    fn test_axes_and_radius() {
        let (engine, owner) = engine(vec![trip(4.0, 2.0, Some(2)), trip(8.0, 0.0, None)]);
        let scatter = engine.widget(&owner).unwrap();
        let scales = scatter.scales().unwrap();

        assert_eq!(scales.x.domain(), (0.0, 8.0));
        assert_eq!(scales.y.domain(), (0.0, 2.0));
        let radii: Vec<f32> = scatter
            .surface()
            .marks()
            .iter()
            .filter_map(|m| match m {
                Mark::Dot { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect();
        assert_eq!(radii, vec![3.0, 1.5]);
    }

    #[test]
    fn test_axes_fall_back_when_max_is_zero() {
        let (engine, owner) = engine(vec![trip(3.0, 0.0, Some(1))]);
        let scales = engine.widget(&owner).and_then(|s| s.scales()).unwrap();
        assert_eq!(scales.y.domain(), (0.0, FALLBACK_MAX));
    }

    #[test]
    fn test_point_cap_keeps_full_axes() {
        let rows = (0..20).map(|i| trip(1.0 + i as f64, 1.0, Some(1))).collect();
        let mut engine: CrossFilter<ScatterBrush> = CrossFilter::new();
        let owner = OwnerKey::from("scatter");
        let scatter = ScatterBrush::new(owner.clone(), "capped", engine.filter_handle()).with_max_points(5);
        engine.register(Box::new(scatter)).unwrap();
        engine.load(RecordStore::new(rows, &CategoryLabels::default()));

        let scatter = engine.widget(&owner).unwrap();
        assert_eq!(scatter.surface().dot_count(), 5);
        let scales = scatter.scales().unwrap();
        assert_eq!(scales.x.domain(), (0.0, 20.0));

        // undrawn rows are still reachable by a brush over the whole plot
        let selection = Rect::from_two_pos(
            pos2(scales.x.apply(0.0), scales.y.apply(1.0)),
            pos2(scales.x.apply(20.0), scales.y.apply(0.0)),
        )
        .expand(1.0);
        let pass = engine
            .handle_gesture(&owner, &Gesture::BrushEnd { selection: Some(selection) })
            .unwrap()
            .unwrap();
        assert_eq!(pass.matched, 20);
        assert_eq!(engine.widget(&owner).unwrap().surface().dot_count(), 5);
    }

    #[test]
    fn test_brush_is_stored_in_data_units() {
        let (mut engine, owner) = engine(vec![
            trip(2.0, 1.0, Some(1)),
            trip(5.0, 3.0, Some(1)),
            trip(9.0, 6.0, Some(1)),
            trip(10.0, 8.0, Some(1)),
        ]);
        let scales = engine.widget(&owner).and_then(|s| s.scales()).unwrap();
        let selection = Rect::from_two_pos(
            pos2(scales.x.apply(1.0), scales.y.apply(4.0)),
            pos2(scales.x.apply(6.0), scales.y.apply(0.5)),
        );

        let pass = engine
            .handle_gesture(&owner, &Gesture::BrushEnd { selection: Some(selection) })
            .unwrap()
            .unwrap();
        assert_eq!(pass.matched, 2);

        let ((lo1, hi1), (lo2, hi2)) = engine.widget(&owner).and_then(|s| s.brushed_range()).unwrap();
        assert!((lo1 - 1.0).abs() < 1e-3 && (hi1 - 6.0).abs() < 1e-3);
        assert!((lo2 - 0.5).abs() < 1e-3 && (hi2 - 4.0).abs() < 1e-3);
        assert_eq!(engine.widget(&owner).unwrap().surface().overlay().len(), 1);
    }

    #[test]
    fn test_click_clears_brush() {
        let (mut engine, owner) = engine(vec![trip(2.0, 1.0, Some(1))]);
        engine
            .set_filter(
                owner.clone(),
                FilterDescriptor::Range2D {
                    dim1: Field::Distance,
                    lo1: 0.0,
                    hi1: 1.0,
                    dim2: Field::Tip,
                    lo2: 0.0,
                    hi2: 1.0,
                },
            )
            .unwrap();
        assert_eq!(engine.filtered_len(), 0);

        let click = Gesture::Click { pos: pos2(100.0, 100.0) };
        let pass = engine.handle_gesture(&owner, &click).unwrap().unwrap();
        assert_eq!(pass.matched, 1);
        assert_eq!(engine.handle_gesture(&owner, &click).unwrap(), None);
    }

    #[test]
    fn test_color_follows_payment_label() {
        let mut cash = trip(3.0, 0.0, Some(1));
        cash.payment_type = 2;
        let mut odd = trip(4.0, 0.0, Some(1));
        odd.payment_type = 9;
        let mut odder = trip(5.0, 0.0, Some(1));
        odder.payment_type = 11;
        let (mut engine, owner) = engine(vec![trip(2.0, 1.0, Some(1)), cash, odd, odder]);

        let colors = |engine: &CrossFilter<ScatterBrush>| -> Vec<egui::Color32> {
            engine
                .widget(&owner)
                .unwrap()
                .surface()
                .marks()
                .iter()
                .filter_map(|m| match m {
                    Mark::Dot { color, .. } => Some(*color),
                    _ => None,
                })
                .collect()
        };

        // both unmapped codes share the fallback label
        let all = colors(&engine);
        assert_eq!(all, vec![category10(0), category10(1), category10(2), category10(2)]);

        // a label keeps its color when earlier labels are filtered out
        engine
            .set_filter(
                OwnerKey::from("elsewhere"),
                FilterDescriptor::DiscreteEquals { dim: Field::PaymentType, value: 2 },
            )
            .unwrap();
        assert_eq!(colors(&engine), vec![category10(1)]);
    }

    #[test]
    fn test_hover_finds_point() {
        let (engine, owner) = engine(vec![trip(4.0, 2.0, Some(2))]);
        let scatter = engine.widget(&owner).unwrap();
        let scales = scatter.scales().unwrap();
        let at = pos2(scales.x.apply(4.0), scales.y.apply(2.0));

        assert_eq!(
            scatter.hover_text(at),
            Some("Credit card: 4.00 mi, tip 2.00".to_string())
        );
    }
}
