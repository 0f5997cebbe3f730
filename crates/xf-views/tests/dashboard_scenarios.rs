//! End-to-end cross-filter scenarios through the public dashboard API

use egui::{pos2, Rect};
use xf_core::{Field, FilterDescriptor, FilterWidget, Gesture, OwnerKey, RecordStore, TripRow};
use xf_data::{DashboardConfig, WidgetConfig, WidgetKind};
use xf_views::{build_dashboard, BarChart, ChartWidget, Dashboard, Mark, ScatterBrush};

const DAYS: [u8; 10] = [0, 0, 1, 1, 1, 2, 3, 3, 3, 3];

fn rows() -> Vec<TripRow> {
    DAYS.iter()
        .enumerate()
        .map(|(i, &day)| TripRow {
            distance: 1.0 + i as f64,
            tip: (i % 4) as f64,
            day_of_week: day,
            hour: (i * 2) as u8,
            payment_type: 1 + (i % 3) as u8,
            passengers: Some(1 + (i % 2) as u32),
            zone: Some(100 + i as u32),
        })
        .collect()
}

fn config(days_self_excluding: bool) -> DashboardConfig {
    DashboardConfig {
        widgets: vec![
            WidgetConfig::new("days", WidgetKind::Bar { field: Field::DayOfWeek }, "Days")
                .self_excluding(days_self_excluding),
            WidgetConfig::new("scatter", WidgetKind::Scatter, "Distance vs tip"),
            WidgetConfig::new("heatmap", WidgetKind::Heatmap, "Day and hour"),
        ],
        ..DashboardConfig::default()
    }
}

fn loaded(days_self_excluding: bool) -> Dashboard {
    let config = config(days_self_excluding);
    let mut dashboard = build_dashboard(&config, None).unwrap();
    dashboard.load(RecordStore::new(rows(), &config.payment_labels));
    dashboard
}

fn bar_chart<'a>(dashboard: &'a Dashboard, owner: &OwnerKey) -> &'a BarChart {
    dashboard
        .widget(owner)
        .and_then(|w| w.as_any().downcast_ref::<BarChart>())
        .unwrap()
}

fn scatter<'a>(dashboard: &'a Dashboard, owner: &OwnerKey) -> &'a ScatterBrush {
    dashboard
        .widget(owner)
        .and_then(|w| w.as_any().downcast_ref::<ScatterBrush>())
        .unwrap()
}

#[test]
fn test_day_selection_narrows_scatter() {
    let mut dashboard = loaded(false);
    let days = OwnerKey::from("days");
    let scatter_owner = OwnerKey::from("scatter");

    let mut counts: Vec<(i64, usize)> = bar_chart(&dashboard, &days)
        .categories()
        .into_iter()
        .map(|(key, _, count)| (key, count))
        .collect();
    counts.sort();
    assert_eq!(counts, vec![(0, 2), (1, 3), (2, 1), (3, 4)]);
    assert_eq!(scatter(&dashboard, &scatter_owner).surface().dot_count(), 10);

    let monday = bar_chart(&dashboard, &days).bar_center(1).unwrap();
    let pass = dashboard
        .handle_gesture(&days, &Gesture::Click { pos: monday })
        .unwrap()
        .unwrap();

    assert_eq!(pass.matched, 3);
    assert_eq!(scatter(&dashboard, &scatter_owner).surface().dot_count(), 3);
    assert_eq!(bar_chart(&dashboard, &days).categories()[0].1, "Mon");
}

#[test]
fn test_empty_brush_region_leaves_bar_chart_empty() {
    let mut dashboard = loaded(false);
    let days = OwnerKey::from("days");

    let pass = dashboard
        .set_filter(
            OwnerKey::from("scatter"),
            FilterDescriptor::Range2D {
                dim1: Field::Distance,
                lo1: 40.0,
                hi1: 45.0,
                dim2: Field::Tip,
                lo2: 50.0,
                hi2: 60.0,
            },
        )
        .unwrap();

    assert_eq!(pass.matched, 0);
    assert_eq!(bar_chart(&dashboard, &days).surface().bar_count(), 0);
    assert_eq!(scatter(&dashboard, &OwnerKey::from("scatter")).surface().dot_count(), 0);
}

#[test]
fn test_self_excluding_widget_ignores_its_own_filter() {
    let mut dashboard = loaded(true);
    let days = OwnerKey::from("days");

    // another widget narrows the data first
    dashboard
        .set_filter(
            OwnerKey::from("heatmap"),
            FilterDescriptor::BucketGrid {
                dim1: Field::Hour,
                lo1: 0,
                hi1: 23,
                dim2: Field::DayOfWeek,
                lo2: 0,
                hi2: 2,
            },
        )
        .unwrap();
    let before = bar_chart(&dashboard, &days).surface().marks().to_vec();

    let tuesday = bar_chart(&dashboard, &days).bar_center(2).unwrap();
    let pass = dashboard
        .handle_gesture(&days, &Gesture::Click { pos: tuesday })
        .unwrap()
        .unwrap();
    assert_eq!(pass.matched, 1);

    let chart = bar_chart(&dashboard, &days);
    assert_eq!(chart.surface().marks(), before.as_slice());
    assert_eq!(chart.surface().overlay().len(), 1);
}

#[test]
fn test_toggle_and_reset_restore_full_view() {
    let mut dashboard = loaded(false);
    let days = OwnerKey::from("days");
    let full = scatter(&dashboard, &OwnerKey::from("scatter")).surface().clone();

    let sunday = bar_chart(&dashboard, &days).bar_center(0).unwrap();
    dashboard.handle_gesture(&days, &Gesture::Click { pos: sunday }).unwrap();
    let sunday = bar_chart(&dashboard, &days).bar_center(0).unwrap();
    let pass = dashboard
        .handle_gesture(&days, &Gesture::Click { pos: sunday })
        .unwrap()
        .unwrap();
    assert_eq!(pass.matched, 10);
    assert_eq!(scatter(&dashboard, &OwnerKey::from("scatter")).surface(), &full);

    let sunday = bar_chart(&dashboard, &days).bar_center(0).unwrap();
    dashboard.handle_gesture(&days, &Gesture::Click { pos: sunday }).unwrap();
    let pass = dashboard.reset().unwrap();
    assert_eq!(pass.matched, 10);
    assert_eq!(pass.active_filters, 0);
    assert_eq!(scatter(&dashboard, &OwnerKey::from("scatter")).surface(), &full);
}

#[test]
fn test_brush_survives_rescaled_axes() {
    let mut dashboard = loaded(false);
    let scatter_owner = OwnerKey::from("scatter");
    let scales = scatter(&dashboard, &scatter_owner).scales().unwrap();

    // distance 2..6, tip 0.5..3.5 under the full-data scales
    let selection = Rect::from_two_pos(
        pos2(scales.x.apply(2.0), scales.y.apply(3.5)),
        pos2(scales.x.apply(6.0), scales.y.apply(0.5)),
    );
    dashboard
        .handle_gesture(&scatter_owner, &Gesture::BrushEnd { selection: Some(selection) })
        .unwrap();
    let stored = scatter(&dashboard, &scatter_owner).brushed_range().unwrap();

    // narrowing by day rescales the scatter axes
    let days = OwnerKey::from("days");
    dashboard
        .set_filter(days, FilterDescriptor::DiscreteEquals { dim: Field::DayOfWeek, value: 1 })
        .unwrap();

    let chart = scatter(&dashboard, &scatter_owner);
    let rescaled = chart.scales().unwrap();
    assert_ne!(rescaled.x.domain(), scales.x.domain());
    assert_eq!(chart.brushed_range(), Some(stored));

    // the overlay is the stored range projected through the new scales
    let ((lo1, hi1), (lo2, hi2)) = stored;
    let expected = Rect::from_two_pos(
        pos2(rescaled.x.apply(lo1), rescaled.y.apply(hi2)),
        pos2(rescaled.x.apply(hi1), rescaled.y.apply(lo2)),
    );
    match chart.surface().overlay() {
        [Mark::Frame { rect, .. }] => {
            assert!(expected.contains_rect(*rect));
        }
        other => panic!("unexpected overlay {:?}", other),
    }
}
