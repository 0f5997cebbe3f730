//! Horizontal bar chart of row counts per category

use egui::{pos2, Align2, Pos2, Rect, Vec2};
use xf_core::aggregate::count_by_field;
use xf_core::{Field, FilterDescriptor, FilterHandle, FilterWidget, FilteredView, Gesture, GestureOutcome, OwnerKey};
use xf_data::Margins;

use super::colors::{BAR_FILL, SELECTION};
use crate::scale::{BandScale, LinearScale};
use crate::surface::{Mark, Surface};
use crate::{plot_rect, ChartWidget};

/// One laid out bar
#[derive(Debug, Clone)]
struct BarSlot {
    key: i64,
    label: String,
    count: usize,
    rect: Rect,
    /// Full-width row used for hit testing
    band: Rect,
}

/// Counts rows per value of a discrete field. Bars are sorted by count,
/// largest first. Clicking a bar toggles an equality filter on its value.
pub struct BarChart {
    owner: OwnerKey,
    title: String,
    field: Field,
    self_excluding: bool,
    handle: FilterHandle,
    margins: Margins,
    /// Display names indexed by value, used when the field has no label
    value_names: Vec<String>,
    surface: Surface,
    bars: Vec<BarSlot>,
}

impl BarChart {
    pub fn new(owner: OwnerKey, title: impl Into<String>, field: Field, handle: FilterHandle) -> Self {
        Self {
            owner,
            title: title.into(),
            field,
            self_excluding: false,
            handle,
            margins: Margins::default(),
            value_names: Vec::new(),
            surface: Surface::new(crate::DEFAULT_SIZE),
            bars: Vec::new(),
        }
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_value_names(mut self, names: Vec<String>) -> Self {
        self.value_names = names;
        self
    }

    pub fn with_self_excluding(mut self, enabled: bool) -> Self {
        self.self_excluding = enabled;
        self
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// `(value, label, count)` per bar in drawing order
    pub fn categories(&self) -> Vec<(i64, &str, usize)> {
        self.bars.iter().map(|b| (b.key, b.label.as_str(), b.count)).collect()
    }

    /// Center of the bar for `key`, if drawn
    pub fn bar_center(&self, key: i64) -> Option<Pos2> {
        self.bars.iter().find(|b| b.key == key).map(|b| b.band.center())
    }

    /// Value currently selected by this chart
    pub fn selected(&self) -> Option<i64> {
        match self.handle.get(&self.owner) {
            Some(FilterDescriptor::DiscreteEquals { dim, value }) if dim == self.field => Some(value),
            _ => None,
        }
    }

    fn label_for(&self, key: i64, payment_label: &str) -> String {
        if self.field == Field::PaymentType {
            return payment_label.to_string();
        }
        usize::try_from(key)
            .ok()
            .and_then(|i| self.value_names.get(i).cloned())
            .unwrap_or_else(|| key.to_string())
    }

    fn slot_at(&self, pos: Pos2) -> Option<&BarSlot> {
        self.bars.iter().find(|b| b.band.contains(pos))
    }
}

impl FilterWidget for BarChart {
    fn owner(&self) -> &OwnerKey {
        &self.owner
    }

    fn self_excluding(&self) -> bool {
        self.self_excluding
    }

    fn render(&mut self, rows: &FilteredView<'_>) {
        self.surface.clear();
        self.bars.clear();

        let counts = count_by_field(rows, self.field);
        let mut sorted: Vec<(i64, usize)> = counts.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        // First record of each value supplies its label
        let mut labels = std::collections::BTreeMap::new();
        for record in rows {
            if let Some(key) = record.discrete(self.field) {
                labels
                    .entry(key)
                    .or_insert_with(|| self.label_for(key, record.payment_label()));
            }
        }

        let plot = plot_rect(self.surface.size(), &self.margins);
        self.surface.push(Mark::Rule {
            from: plot.left_top(),
            to: plot.left_bottom(),
        });
        self.surface.push(Mark::Label {
            pos: pos2(plot.center().x, plot.bottom() + 24.0),
            text: "Trips".to_string(),
            anchor: Align2::CENTER_TOP,
        });

        if sorted.is_empty() {
            return;
        }

        let max = sorted.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let x = LinearScale::new((0.0, max as f64), (plot.left(), plot.right()));
        let y = BandScale::new(sorted.len(), (plot.top(), plot.bottom()), 0.1);
        let bandwidth = y.bandwidth();

        for (index, (key, count)) in sorted.into_iter().enumerate() {
            let Some(top) = y.band(index) else { continue };
            let label = labels.remove(&key).unwrap_or_else(|| key.to_string());
            let right = if max == 0 { plot.left() } else { x.apply(count as f64) };
            let rect = Rect::from_min_max(pos2(plot.left(), top), pos2(right, top + bandwidth));
            let band = Rect::from_min_max(pos2(plot.left(), top), pos2(plot.right(), top + bandwidth));

            self.surface.push(Mark::Bar {
                rect,
                color: BAR_FILL,
                key,
            });
            self.surface.push(Mark::Label {
                pos: pos2(plot.left() - 6.0, band.center().y),
                text: label.clone(),
                anchor: Align2::RIGHT_CENTER,
            });
            self.surface.push(Mark::Label {
                pos: pos2(rect.right() + 4.0, band.center().y),
                text: count.to_string(),
                anchor: Align2::LEFT_CENTER,
            });

            self.bars.push(BarSlot {
                key,
                label,
                count,
                rect,
                band,
            });
        }

        if let Some(selected) = self.selected() {
            if let Some(bar) = self.bars.iter().find(|b| b.key == selected) {
                self.surface.push_overlay(Mark::Frame {
                    rect: bar.rect.expand(1.5),
                    color: SELECTION,
                });
            }
        }
    }

    fn on_gesture(&mut self, gesture: &Gesture) -> GestureOutcome {
        let Gesture::Click { pos } = *gesture else {
            return GestureOutcome::Ignore;
        };
        let Some(key) = self.slot_at(pos).map(|b| b.key) else {
            return GestureOutcome::Ignore;
        };

        if self.selected() == Some(key) {
            GestureOutcome::Clear
        } else {
            GestureOutcome::Set(FilterDescriptor::DiscreteEquals {
                dim: self.field,
                value: key,
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

impl ChartWidget for BarChart {
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
        self.slot_at(pos).map(|b| format!("{}: {} trips", b.label, b.count))
    }
}
