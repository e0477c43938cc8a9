use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

use super::viewport::Viewport;

pub(super) const POINT_RADIUS: f32 = 10.0;
pub(super) const HOVER_ACCENT: Color32 = Color32::from_rgb(255, 164, 101);
pub(super) const NOISE_COLOR: Color32 = Color32::from_gray(130);
pub(super) const SEARCH_RING: Color32 = Color32::from_rgb(103, 196, 255);

const CLUSTER_PALETTE: [Color32; 7] = [
    Color32::from_rgb(255, 99, 132),
    Color32::from_rgb(54, 162, 235),
    Color32::from_rgb(255, 206, 86),
    Color32::from_rgb(75, 192, 192),
    Color32::from_rgb(153, 102, 255),
    Color32::from_rgb(255, 159, 64),
    Color32::from_rgb(199, 199, 199),
];

pub(super) fn cluster_color(cluster: i32) -> Color32 {
    CLUSTER_PALETTE[cluster.rem_euclid(CLUSTER_PALETTE.len() as i32) as usize]
}

pub(super) fn cluster_fill(cluster: i32) -> Color32 {
    let color = cluster_color(cluster);
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), 26)
}

pub(super) fn cluster_outline(cluster: i32) -> Color32 {
    let color = cluster_color(cluster);
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), 128)
}

/// Grid spacing follows the zoom scale and the origin follows the pan
/// offset, so the grid appears glued to the content.
pub(super) fn draw_background(painter: &Painter, rect: Rect, viewport: &Viewport) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (50.0 * viewport.scale).max(10.0);
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + viewport.offset.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            stroke,
        );
        x += step;
    }

    let mut y = rect.top() + viewport.offset.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            stroke,
        );
        y += step;
    }
}
