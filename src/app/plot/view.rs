use std::collections::BTreeMap;

use eframe::egui::{
    Align2, Color32, CornerRadius, FontId, Painter, Pos2, Rect, Sense, Stroke, StrokeKind, Ui,
    pos2, vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::projection::Point;

use super::super::ViewModel;
use super::super::render_utils::{
    HOVER_ACCENT, NOISE_COLOR, POINT_RADIUS, SEARCH_RING, cluster_color, cluster_fill,
    cluster_outline, draw_background,
};
use super::tooltip::{self, LINE_HEIGHT, TEXT_INSET, WRAP_LINE_FACTOR};

const CLUSTER_PADDING: f32 = 20.0;
const LABEL_FONT: f32 = 14.0;

fn fuzzy_title_match(matcher: &SkimMatcherV2, title: &str, query: &str) -> bool {
    matcher.fuzzy_match(title, query).is_some()
        || matcher
            .fuzzy_match(&title.to_ascii_lowercase(), &query.to_ascii_lowercase())
            .is_some()
}

impl ViewModel {
    pub(in crate::app) fn draw_plot(&mut self, ui: &mut Ui) {
        let (surface, response) =
            ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(surface);

        self.handle_plot_input(ui, surface, &response);

        draw_background(&painter, surface, &self.viewport);

        if self.result.points.is_empty() {
            return;
        }

        self.draw_cluster_regions(&painter, surface);
        self.draw_points(&painter, surface);

        if let Some(point) = self
            .interaction
            .hovered
            .and_then(|index| self.result.points.get(index))
        {
            let anchor = response
                .hover_pos()
                .unwrap_or_else(|| self.viewport.to_screen(surface, point.x, point.y));
            self.draw_tooltip(&painter, surface, anchor, point);
        }
    }

    /// One rounded bounding region per externally assigned cluster id; the
    /// `cluster` field is the sole source of visual grouping.
    fn draw_cluster_regions(&self, painter: &Painter, surface: Rect) {
        let mut groups: BTreeMap<i32, Vec<&Point>> = BTreeMap::new();
        for point in &self.result.points {
            if !point.is_noise() {
                groups.entry(point.cluster).or_default().push(point);
            }
        }

        for (cluster, members) in groups {
            let mut bounds: Option<Rect> = None;
            let mut center_x_sum = 0.0;
            for point in &members {
                let position = self.viewport.to_screen(surface, point.x, point.y);
                let point_rect = Rect::from_min_max(position, position);
                bounds = Some(match bounds {
                    Some(rect) => rect.union(point_rect),
                    None => point_rect,
                });
                center_x_sum += position.x;
            }
            let Some(bounds) = bounds else {
                continue;
            };
            let bounds = bounds.expand(CLUSTER_PADDING);

            painter.rect_filled(bounds, CornerRadius::same(10), cluster_fill(cluster));
            painter.rect_stroke(
                bounds,
                CornerRadius::same(10),
                Stroke::new(1.0, cluster_outline(cluster)),
                StrokeKind::Inside,
            );

            // Label only when the term map knows this cluster.
            if let Some(terms) = self.result.cluster_label_terms(cluster) {
                let label = format!("Cluster {cluster}: {terms}");
                let galley = painter.layout_no_wrap(
                    label,
                    FontId::proportional(LABEL_FONT),
                    Color32::WHITE,
                );
                let text_pos = pos2(
                    center_x_sum / members.len() as f32 - galley.size().x / 2.0,
                    bounds.top() - galley.size().y - 5.0,
                );
                let backdrop = Rect::from_min_size(text_pos, galley.size()).expand2(vec2(5.0, 2.0));
                painter.rect_filled(
                    backdrop,
                    CornerRadius::same(3),
                    Color32::from_rgba_unmultiplied(0, 0, 0, 178),
                );
                painter.galley(text_pos, galley, Color32::WHITE);
            }
        }
    }

    fn draw_points(&self, painter: &Painter, surface: Rect) {
        let query = self.search.trim();
        let matcher = (!query.is_empty()).then(SkimMatcherV2::default);

        for (index, point) in self.result.points.iter().enumerate() {
            let position = self.viewport.to_screen(surface, point.x, point.y);
            let is_hovered = self.interaction.hovered == Some(index);

            let fill = if is_hovered {
                HOVER_ACCENT
            } else if point.is_noise() {
                NOISE_COLOR
            } else {
                cluster_color(point.cluster)
            };

            painter.circle_filled(position, POINT_RADIUS, fill);
            painter.circle_stroke(
                position,
                POINT_RADIUS,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );

            if let Some(matcher) = &matcher
                && fuzzy_title_match(matcher, &point.title, query)
            {
                painter.circle_stroke(
                    position,
                    POINT_RADIUS + 3.0,
                    Stroke::new(1.5, SEARCH_RING),
                );
            }

            // The hovered title moves into the tooltip instead.
            if !is_hovered {
                painter.text(
                    position - vec2(0.0, POINT_RADIUS + 5.0),
                    Align2::CENTER_BOTTOM,
                    &point.title,
                    FontId::proportional(12.0),
                    Color32::from_gray(220),
                );
            }
        }
    }

    fn draw_tooltip(&self, painter: &Painter, surface: Rect, anchor: Pos2, point: &Point) {
        let sections = tooltip::build_sections(point, &self.result);
        let measure = |text: &str, font: &FontId| -> f32 {
            painter
                .layout_no_wrap(text.to_owned(), font.clone(), Color32::WHITE)
                .size()
                .x
        };
        let frame = tooltip::compute_frame(&sections, anchor, surface, &measure);

        painter.rect_filled(
            frame.rect(),
            CornerRadius::same(5),
            Color32::from_rgba_unmultiplied(28, 32, 39, 242),
        );
        painter.rect_stroke(
            frame.rect(),
            CornerRadius::same(5),
            Stroke::new(1.0, Color32::from_gray(90)),
            StrokeKind::Inside,
        );

        let interior = frame.interior_width();
        let mut cursor_y = frame.min.y + 6.0;
        for section in &sections {
            let font = section.kind.font();
            let color = section.kind.color();
            let lines = tooltip::wrap_text(&section.text, &font, interior, &measure);
            for (line_index, line) in lines.iter().enumerate() {
                if line_index > 0 {
                    cursor_y += LINE_HEIGHT * WRAP_LINE_FACTOR;
                }
                painter.text(
                    pos2(frame.min.x + TEXT_INSET, cursor_y),
                    Align2::LEFT_TOP,
                    line,
                    font.clone(),
                    color,
                );
            }
            cursor_y += LINE_HEIGHT;
        }
    }
}
