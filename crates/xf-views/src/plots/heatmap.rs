//! Day of week by hour heatmap with a rectangular brush

use std::collections::BTreeMap;

use egui::{pos2, Align2, Pos2, Rect, Vec2};
use xf_core::aggregate::{count_by2, max_count};
use xf_core::{Field, FilterDescriptor, FilterHandle, FilterWidget, FilteredView, Gesture, GestureOutcome, OwnerKey};
use xf_data::Margins;

use super::colors::{inferno, SELECTION};
use super::is_empty_brush;
use crate::scale::BandScale;
use crate::surface::{Mark, Surface};
use crate::{plot_rect, ChartWidget};

const HOURS: usize = 24;
const DAYS: usize = 7;
const PADDING: f32 = 0.05;

/// 7 x 24 grid of trip counts. Hours run along x, days along y.
///
/// A brush selects whole cells: its pixel edges are snapped to band steps and
/// stored as an hour window and a day window.
pub struct TimeHeatmap {
    owner: OwnerKey,
    title: String,
    self_excluding: bool,
    handle: FilterHandle,
    margins: Margins,
    day_names: Vec<String>,
    surface: Surface,
    hours: BandScale,
    days: BandScale,
    plot: Rect,
    counts: BTreeMap<(u8, u8), usize>,
}

impl TimeHeatmap {
    pub fn new(owner: OwnerKey, title: impl Into<String>, handle: FilterHandle) -> Self {
        let surface = Surface::new(crate::DEFAULT_SIZE);
        let margins = Margins::default();
        let plot = plot_rect(surface.size(), &margins);
        Self {
            owner,
            title: title.into(),
            self_excluding: false,
            handle,
            margins,
            day_names: ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            surface,
            hours: BandScale::new(HOURS, (plot.left(), plot.right()), PADDING),
            days: BandScale::new(DAYS, (plot.top(), plot.bottom()), PADDING),
            plot,
            counts: BTreeMap::new(),
        }
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_day_names(mut self, names: Vec<String>) -> Self {
        self.day_names = names;
        self
    }

    pub fn with_self_excluding(mut self, enabled: bool) -> Self {
        self.self_excluding = enabled;
        self
    }

    /// Count of one cell from the latest render
    pub fn count(&self, day: u8, hour: u8) -> usize {
        self.counts.get(&(day, hour)).copied().unwrap_or(0)
    }

    /// Pixel rectangle of a cell under the current layout
    pub fn cell_rect(&self, day: u8, hour: u8) -> Option<Rect> {
        let x = self.hours.band(hour as usize)?;
        let y = self.days.band(day as usize)?;
        Some(Rect::from_min_size(
            pos2(x, y),
            Vec2::new(self.hours.bandwidth(), self.days.bandwidth()),
        ))
    }

    fn day_name(&self, day: usize) -> String {
        self.day_names.get(day).cloned().unwrap_or_else(|| day.to_string())
    }

    fn selection(&self) -> Option<(i64, i64, i64, i64)> {
        match self.handle.get(&self.owner) {
            Some(FilterDescriptor::BucketGrid {
                dim1: Field::Hour,
                lo1,
                hi1,
                dim2: Field::DayOfWeek,
                lo2,
                hi2,
            }) => Some((lo1, hi1, lo2, hi2)),
            _ => None,
        }
    }

    fn layout(&mut self) {
        self.plot = plot_rect(self.surface.size(), &self.margins);
        self.hours = BandScale::new(HOURS, (self.plot.left(), self.plot.right()), PADDING);
        self.days = BandScale::new(DAYS, (self.plot.top(), self.plot.bottom()), PADDING);
    }

    fn draw_axes(&mut self) {
        for day in 0..DAYS {
            if let Some(y) = self.days.band(day) {
                let text = self.day_name(day);
                self.surface.push(Mark::Label {
                    pos: pos2(self.plot.left() - 6.0, y + self.days.bandwidth() / 2.0),
                    text,
                    anchor: Align2::RIGHT_CENTER,
                });
            }
        }
        for hour in (0..HOURS).step_by(3) {
            if let Some(x) = self.hours.band(hour) {
                self.surface.push(Mark::Label {
                    pos: pos2(x + self.hours.bandwidth() / 2.0, self.plot.bottom() + 6.0),
                    text: format!("{}h", hour),
                    anchor: Align2::CENTER_TOP,
                });
            }
        }
    }
}

impl FilterWidget for TimeHeatmap {
    fn owner(&self) -> &OwnerKey {
        &self.owner
    }

    fn self_excluding(&self) -> bool {
        self.self_excluding
    }

    fn render(&mut self, rows: &FilteredView<'_>) {
        self.surface.clear();
        self.layout();

        self.counts = count_by2(rows, |r| Some(r.day_of_week()), |r| Some(r.hour()));
        let max = max_count(&self.counts);

        let cells: Vec<(u8, u8, usize)> = self.counts.iter().map(|(&(d, h), &c)| (d, h, c)).collect();
        for (day, hour, count) in cells {
            if let Some(rect) = self.cell_rect(day, hour) {
                self.surface.push(Mark::Cell {
                    rect,
                    color: inferno(count, max),
                    column: hour as usize,
                    row: day as usize,
                });
            }
        }
        self.draw_axes();

        if let Some((h0, h1, d0, d1)) = self.selection() {
            let corners = (
                self.cell_rect(d0 as u8, h0 as u8),
                self.cell_rect(d1 as u8, h1 as u8),
            );
            if let (Some(first), Some(last)) = corners {
                self.surface.push_overlay(Mark::Frame {
                    rect: first.union(last),
                    color: SELECTION,
                });
            }
        }
    }

    fn on_gesture(&mut self, gesture: &Gesture) -> GestureOutcome {
        match *gesture {
            Gesture::Click { .. } => {
                // a click without a drag dismisses the brush
                if self.selection().is_some() {
                    GestureOutcome::Clear
                } else {
                    GestureOutcome::Ignore
                }
            }
            Gesture::BrushEnd { selection } => {
                let Some(rect) = selection.filter(|_| !is_empty_brush(selection)) else {
                    return GestureOutcome::Clear;
                };
                // only the part over the grid counts
                let rect = rect.intersect(self.plot);
                if !rect.is_positive() {
                    return GestureOutcome::Ignore;
                }

                let hours = (self.hours.index_at(rect.left()), self.hours.index_at(rect.right()));
                let days = (self.days.index_at(rect.top()), self.days.index_at(rect.bottom()));
                match (hours, days) {
                    ((Some(h0), Some(h1)), (Some(d0), Some(d1))) => GestureOutcome::Set(FilterDescriptor::BucketGrid {
                        dim1: Field::Hour,
                        lo1: h0 as i64,
                        hi1: h1 as i64,
                        dim2: Field::DayOfWeek,
                        lo2: d0 as i64,
                        hi2: d1 as i64,
                    }),
                    _ => GestureOutcome::Ignore,
                }
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

impl ChartWidget for TimeHeatmap {
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
        if !self.plot.contains(pos) {
            return None;
        }
        let hour = self.hours.index_at(pos.x)?;
        let day = self.days.index_at(pos.y)?;
        let count = self.count(day as u8, hour as u8);
        Some(format!("{} {:02}:00: {} trips", self.day_name(day), hour, count))
    }
}
