//! Dashboard window: docked chart tabs, toolbar and gesture routing

use std::collections::HashMap;

use egui::{Color32, Pos2, Rect, Sense, Stroke, Ui, Vec2, WidgetText};
use egui_dock::{DockArea, DockState, NodeIndex, Style, TabViewer};
use tracing::{debug, warn};

use xf_core::{Gesture, OwnerKey, PassSummary};
use xf_views::{resize_widgets, ChartWidget, Dashboard};

use crate::paint::{paint_brush_preview, paint_surface};

/// What the window shows
pub enum Screen {
    Ready(Dashboard),
    /// Startup failed; the message is shown instead of the charts
    Failed(String),
}

/// Main application state
pub struct TripVizApp {
    screen: Screen,
    dock_state: DockState<OwnerKey>,
    /// Drag start per chart, in surface-local pixels
    drags: HashMap<OwnerKey, Pos2>,
    status: Option<PassSummary>,
}

impl TripVizApp {
    pub fn new(screen: Screen) -> Self {
        let (owners, status) = match &screen {
            Screen::Ready(dashboard) => (
                dashboard.widgets().map(|w| w.owner().clone()).collect(),
                dashboard.last_pass(),
            ),
            Screen::Failed(_) => (Vec::new(), None),
        };
        Self {
            screen,
            dock_state: grid_dock_state(owners),
            drags: HashMap::new(),
            status,
        }
    }

    fn toolbar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Taxi trips");
            ui.separator();

            let Screen::Ready(dashboard) = &mut self.screen else {
                return;
            };

            if ui.button("Clear filters").clicked() {
                match dashboard.reset() {
                    Ok(pass) => self.status = Some(pass),
                    Err(e) => warn!("Reset failed: {}", e),
                }
            }

            if let Some(pass) = self.status {
                ui.label(format!(
                    "{} of {} trips, {} active filters",
                    pass.matched, pass.total, pass.active_filters
                ));
            }
        });
    }
}

impl eframe::App for TripVizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.toolbar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| match &mut self.screen {
            Screen::Failed(message) => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.heading("Could not start the dashboard");
                    ui.colored_label(Color32::from_rgb(220, 80, 80), message.as_str());
                });
            }
            Screen::Ready(dashboard) => {
                let mut tabs = ChartTabs {
                    dashboard,
                    drags: &mut self.drags,
                    sizes: Vec::new(),
                    status: &mut self.status,
                };
                DockArea::new(&mut self.dock_state)
                    .style(Style::from_egui(ui.style().as_ref()))
                    .show_close_buttons(false)
                    .show_inside(ui, &mut tabs);

                let sizes = std::mem::take(&mut tabs.sizes);
                match resize_widgets(tabs.dashboard, &sizes) {
                    Ok(Some(pass)) => {
                        debug!("Re-rendered after resize");
                        *tabs.status = Some(pass);
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Resize failed: {}", e),
                }
            }
        });
    }
}

/// Tab viewer drawing one chart per tab
struct ChartTabs<'a> {
    dashboard: &'a mut Dashboard,
    drags: &'a mut HashMap<OwnerKey, Pos2>,
    /// Sizes reported this frame, applied after the dock is drawn
    sizes: Vec<(OwnerKey, Vec2)>,
    status: &'a mut Option<PassSummary>,
}

impl ChartTabs<'_> {
    fn dispatch(&mut self, owner: &OwnerKey, gesture: Gesture) {
        match self.dashboard.handle_gesture(owner, &gesture) {
            Ok(Some(pass)) => {
                debug!("Gesture on '{}' -> {} / {} rows", owner, pass.matched, pass.total);
                *self.status = Some(pass);
            }
            Ok(None) => {}
            Err(e) => warn!("Gesture on '{}' failed: {}", owner, e),
        }
    }
}

impl TabViewer for ChartTabs<'_> {
    type Tab = OwnerKey;

    fn title(&mut self, tab: &mut Self::Tab) -> WidgetText {
        match self.dashboard.widget(tab) {
            Some(widget) => widget.title().into(),
            None => tab.to_string().into(),
        }
    }

    fn ui(&mut self, ui: &mut Ui, tab: &mut Self::Tab) {
        let size = ui.available_size();
        let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
        let origin = response.rect.min;
        let local = |pos: Pos2| pos - origin.to_vec2();
        self.sizes.push((tab.clone(), size));

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.drags.insert(tab.clone(), local(pos));
            }
        }

        if response.drag_released() {
            let start = self.drags.remove(tab);
            let end = response.interact_pointer_pos().map(local);
            let selection = match (start, end) {
                (Some(a), Some(b)) => Some(Rect::from_two_pos(a, b)),
                _ => None,
            };
            self.dispatch(tab, Gesture::BrushEnd { selection });
        } else if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.dispatch(tab, Gesture::Click { pos: local(pos) });
            }
        }

        let Some(widget) = self.dashboard.widget(tab) else {
            return;
        };
        paint_surface(&painter, origin.to_vec2(), widget.surface(), ui.visuals());

        if response.dragged() {
            if let (Some(start), Some(now)) = (self.drags.get(tab), response.interact_pointer_pos()) {
                let stroke = Stroke::new(1.5, ui.visuals().selection.stroke.color);
                paint_brush_preview(&painter, origin.to_vec2(), Rect::from_two_pos(*start, local(now)), stroke);
            }
        }

        if let Some(text) = response.hover_pos().and_then(|pos| widget.hover_text(local(pos))) {
            response.on_hover_text(text);
        }
    }

    fn closeable(&mut self, _tab: &mut Self::Tab) -> bool {
        false
    }
}

/// Two by two grid; extra charts become tabs of the first leaf
fn grid_dock_state(owners: Vec<OwnerKey>) -> DockState<OwnerKey> {
    let mut owners = owners.into_iter();
    let Some(first) = owners.next() else {
        return DockState::new(Vec::new());
    };

    let mut dock_state = DockState::new(vec![first]);
    let surface = dock_state.main_surface_mut();
    if let Some(second) = owners.next() {
        let [left, right] = surface.split_right(NodeIndex::root(), 0.5, vec![second]);
        if let Some(third) = owners.next() {
            surface.split_below(left, 0.5, vec![third]);
        }
        if let Some(fourth) = owners.next() {
            surface.split_below(right, 0.5, vec![fourth]);
        }
    }

    for owner in owners {
        dock_state.push_to_first_leaf(owner);
    }
    dock_state
}
