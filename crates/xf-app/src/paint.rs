//! Paint chart surfaces with egui

use egui::epaint::Mesh;
use egui::{Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2, Visuals};
use xf_views::{Mark, Surface};

fn closed(ring: &[Pos2], offset: Vec2) -> Vec<Pos2> {
    ring.iter().map(|p| *p + offset).collect()
}

fn paint_mark(painter: &Painter, offset: Vec2, mark: &Mark, visuals: &Visuals) {
    let axis = Stroke::new(1.0, visuals.weak_text_color());

    match mark {
        Mark::Bar { rect, color, .. } | Mark::Cell { rect, color, .. } => {
            painter.rect_filled(rect.translate(offset), 0.0, *color);
        }
        Mark::Dot { center, radius, color } => {
            painter.circle_filled(*center + offset, *radius, color.gamma_multiply(0.7));
        }
        Mark::Region {
            rings,
            triangles,
            color,
            ..
        } => {
            let mut mesh = Mesh::default();
            for triangle in triangles.iter() {
                let base = mesh.vertices.len() as u32;
                for point in triangle {
                    mesh.colored_vertex(*point + offset, *color);
                }
                mesh.add_triangle(base, base + 1, base + 2);
            }
            painter.add(Shape::mesh(mesh));
            for ring in rings.iter() {
                painter.add(Shape::closed_line(closed(ring, offset), Stroke::new(0.5, Color32::from_gray(30))));
            }
        }
        Mark::Label { pos, text, anchor } => {
            painter.text(*pos + offset, *anchor, text, FontId::proportional(11.0), visuals.text_color());
        }
        Mark::Rule { from, to } => {
            painter.line_segment([*from + offset, *to + offset], axis);
        }
        Mark::Frame { rect, color } => {
            painter.rect_stroke(rect.translate(offset), 0.0, Stroke::new(2.0, *color));
        }
        Mark::Outline { rings, color } => {
            for ring in rings.iter() {
                painter.add(Shape::closed_line(closed(ring, offset), Stroke::new(2.0, *color)));
            }
        }
    }
}

/// Paint marks, then the selection overlay on top
pub fn paint_surface(painter: &Painter, offset: Vec2, surface: &Surface, visuals: &Visuals) {
    for mark in surface.marks().iter().chain(surface.overlay()) {
        paint_mark(painter, offset, mark, visuals);
    }
}

/// Rectangle shown while a brush is being dragged
pub fn paint_brush_preview(painter: &Painter, offset: Vec2, rect: Rect, stroke: Stroke) {
    let rect = rect.translate(offset);
    painter.rect_filled(rect, 0.0, stroke.color.linear_multiply(0.15));
    painter.rect_stroke(rect, 0.0, stroke);
}
