use eframe::egui::{Color32, FontId, Pos2, Rect, pos2};

use crate::projection::{Point, ProjectionResult};
use crate::util::format_timestamp;

pub(in crate::app) const LINE_HEIGHT: f32 = 18.0;
pub(in crate::app) const TEXT_INSET: f32 = 10.0;
/// Continuation lines of a wrapped section advance less than a full row.
pub(in crate::app) const WRAP_LINE_FACTOR: f32 = 0.8;
const WIDTH_PADDING: f32 = 20.0;
const HEIGHT_PADDING: f32 = 12.0;
const EDGE_MARGIN: f32 = 10.0;
const MAX_WIDTH_FRACTION: f32 = 0.8;
const MIN_PREVIEW_CHARS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum SectionKind {
    Title,
    Path,
    Keywords,
    Cluster,
    Info,
    Dates,
    Preview,
    Distance,
}

impl SectionKind {
    pub(in crate::app) fn font(self) -> FontId {
        match self {
            Self::Title => FontId::proportional(14.0),
            Self::Keywords | Self::Cluster | Self::Info => FontId::proportional(12.0),
            Self::Path | Self::Dates | Self::Preview => FontId::proportional(11.0),
            Self::Distance => FontId::proportional(10.0),
        }
    }

    pub(in crate::app) fn color(self) -> Color32 {
        match self {
            Self::Title => Color32::from_gray(240),
            Self::Preview => Color32::from_gray(160),
            Self::Distance => Color32::from_gray(140),
            _ => Color32::from_gray(205),
        }
    }
}

#[derive(Clone, Debug)]
pub(in crate::app) struct Section {
    pub kind: SectionKind,
    pub text: String,
}

/// Builds the visible tooltip sections for a hovered point. Each variant is
/// included only when its guard holds, so the renderer can treat the list
/// as final.
pub(in crate::app) fn build_sections(point: &Point, result: &ProjectionResult) -> Vec<Section> {
    let mut sections = vec![Section {
        kind: SectionKind::Title,
        text: point.title.clone(),
    }];

    if !point.path.is_empty() {
        sections.push(Section {
            kind: SectionKind::Path,
            text: point.path.clone(),
        });
    }

    if !point.top_terms.is_empty() {
        sections.push(Section {
            kind: SectionKind::Keywords,
            text: format!("Keywords: {}", point.top_terms.join(", ")),
        });
    }

    if let Some(terms) = result.cluster_label_terms(point.cluster) {
        sections.push(Section {
            kind: SectionKind::Cluster,
            text: format!("Cluster {}: {terms}", point.cluster),
        });
    }

    let mut info_parts = Vec::new();
    if !point.tags.is_empty() {
        let tags = point
            .tags
            .iter()
            .map(|tag| format!("#{tag}"))
            .collect::<Vec<_>>()
            .join(" ");
        info_parts.push(tags);
    }
    if let Some(word_count) = point.word_count {
        info_parts.push(match point.reading_time {
            Some(minutes) => format!("{word_count} words (~{minutes} min read)"),
            None => format!("{word_count} words"),
        });
    }
    if !info_parts.is_empty() {
        sections.push(Section {
            kind: SectionKind::Info,
            text: info_parts.join(" • "),
        });
    }

    if let Some(mtime) = point.mtime {
        let mut text = format!("Modified: {}", format_timestamp(mtime));
        if let Some(ctime) = point.ctime {
            text.push_str(&format!(" • Created: {}", format_timestamp(ctime)));
        }
        sections.push(Section {
            kind: SectionKind::Dates,
            text,
        });
    }

    if let Some(preview) = &point.content_preview
        && preview.chars().count() >= MIN_PREVIEW_CHARS
    {
        sections.push(Section {
            kind: SectionKind::Preview,
            text: preview.clone(),
        });
    }

    if let Some(distance) = point.distance_to_center
        && !point.is_noise()
    {
        sections.push(Section {
            kind: SectionKind::Distance,
            text: format!("Distance to center: {distance:.2}"),
        });
    }

    sections
}

#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct TooltipFrame {
    pub min: Pos2,
    pub width: f32,
    pub height: f32,
}

impl TooltipFrame {
    pub(in crate::app) fn rect(&self) -> Rect {
        Rect::from_min_size(self.min, eframe::egui::vec2(self.width, self.height))
    }

    pub(in crate::app) fn interior_width(&self) -> f32 {
        self.width - WIDTH_PADDING
    }
}

/// Sizes the tooltip from measured section widths and places it next to the
/// pointer: right/below by default, flipped on overflow, then clamped to the
/// surface. `measure` maps text in a font to its pixel width.
pub(in crate::app) fn compute_frame(
    sections: &[Section],
    anchor: Pos2,
    surface: Rect,
    measure: &dyn Fn(&str, &FontId) -> f32,
) -> TooltipFrame {
    let mut width: f32 = 0.0;
    for section in sections {
        width = width.max(measure(&section.text, &section.kind.font()) + WIDTH_PADDING);
    }
    width = width.min(surface.width() * MAX_WIDTH_FRACTION);

    let height = sections.len() as f32 * LINE_HEIGHT + HEIGHT_PADDING;

    let mut x = anchor.x + EDGE_MARGIN;
    if x + width > surface.right() - EDGE_MARGIN {
        x = anchor.x - width - EDGE_MARGIN;
    }

    let mut y = anchor.y + EDGE_MARGIN;
    if y + height > surface.bottom() - EDGE_MARGIN {
        y = anchor.y - height - EDGE_MARGIN;
    }

    let max_x = (surface.right() - width - EDGE_MARGIN).max(surface.left() + EDGE_MARGIN);
    let max_y = (surface.bottom() - height - EDGE_MARGIN).max(surface.top() + EDGE_MARGIN);
    x = x.clamp(surface.left() + EDGE_MARGIN, max_x);
    y = y.clamp(surface.top() + EDGE_MARGIN, max_y);

    TooltipFrame {
        min: pos2(x, y),
        width,
        height,
    }
}

/// Greedy word wrap: break before the word that would overflow. A line always
/// keeps at least one word, so pathological widths cannot loop.
pub(in crate::app) fn wrap_text(
    text: &str,
    font: &FontId,
    max_width: f32,
    measure: &dyn Fn(&str, &FontId) -> f32,
) -> Vec<String> {
    if measure(text, font) <= max_width {
        return vec![text.to_owned()];
    }

    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_owned()
        } else {
            format!("{line} {word}")
        };

        if !line.is_empty() && measure(&candidate, font) > max_width {
            lines.push(std::mem::take(&mut line));
            line = word.to_owned();
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::vec2;

    const CHAR_WIDTH: f32 = 7.0;

    fn measure(text: &str, _font: &FontId) -> f32 {
        text.chars().count() as f32 * CHAR_WIDTH
    }

    fn surface() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(1600.0, 700.0))
    }

    fn bare_point() -> Point {
        crate::projection::test_point("A note", 0.0, 0.0, -1)
    }

    fn result_with_cluster_terms(cluster: i32) -> ProjectionResult {
        let mut result = ProjectionResult::default();
        result.cluster_terms.insert(
            cluster.to_string(),
            vec![crate::projection::ClusterTerm {
                term: "graphs".to_owned(),
                score: 1.0,
            }],
        );
        result
    }

    #[test]
    fn bare_point_shows_title_and_path_only() {
        let sections = build_sections(&bare_point(), &ProjectionResult::default());
        let kinds: Vec<_> = sections.iter().map(|section| section.kind).collect();
        assert_eq!(kinds, vec![SectionKind::Title, SectionKind::Path]);
    }

    #[test]
    fn cluster_section_requires_a_term_map_entry() {
        let mut point = bare_point();
        point.cluster = 3;

        // No entry for cluster 3: the section is omitted without error.
        let sections = build_sections(&point, &ProjectionResult::default());
        assert!(!sections.iter().any(|s| s.kind == SectionKind::Cluster));

        let sections = build_sections(&point, &result_with_cluster_terms(3));
        let cluster = sections
            .iter()
            .find(|s| s.kind == SectionKind::Cluster)
            .unwrap();
        assert_eq!(cluster.text, "Cluster 3: graphs");
    }

    #[test]
    fn metadata_sections_follow_their_guards() {
        let mut point = bare_point();
        point.top_terms = vec!["a".to_owned(), "b".to_owned()];
        point.tags = vec!["daily".to_owned()];
        point.word_count = Some(400);
        point.reading_time = Some(2);
        point.mtime = Some(1_714_000_000_000);
        point.content_preview = Some("A longer preview".to_owned());
        point.cluster = 0;
        point.distance_to_center = Some(0.25);

        let sections = build_sections(&point, &result_with_cluster_terms(0));
        let kinds: Vec<_> = sections.iter().map(|section| section.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Title,
                SectionKind::Path,
                SectionKind::Keywords,
                SectionKind::Cluster,
                SectionKind::Info,
                SectionKind::Dates,
                SectionKind::Preview,
                SectionKind::Distance,
            ]
        );

        let info = &sections[4];
        assert_eq!(info.text, "#daily • 400 words (~2 min read)");
    }

    #[test]
    fn short_previews_and_noise_distance_are_hidden() {
        let mut point = bare_point();
        point.content_preview = Some("hey".to_owned());
        point.distance_to_center = Some(0.5); // cluster is -1

        let sections = build_sections(&point, &ProjectionResult::default());
        assert!(!sections.iter().any(|s| s.kind == SectionKind::Preview));
        assert!(!sections.iter().any(|s| s.kind == SectionKind::Distance));
    }

    #[test]
    fn frame_sizes_from_widest_section() {
        let sections = vec![
            Section {
                kind: SectionKind::Title,
                text: "short".to_owned(),
            },
            Section {
                kind: SectionKind::Path,
                text: "a/considerably/longer/path.md".to_owned(),
            },
        ];
        let frame = compute_frame(&sections, pos2(100.0, 100.0), surface(), &measure);
        assert_eq!(frame.width, measure("a/considerably/longer/path.md", &FontId::default()) + 20.0);
        assert_eq!(frame.height, 2.0 * LINE_HEIGHT + 12.0);
        assert_eq!(frame.min, pos2(110.0, 110.0));
    }

    #[test]
    fn width_is_capped_to_surface_fraction() {
        let sections = vec![Section {
            kind: SectionKind::Title,
            text: "x".repeat(400),
        }];
        let frame = compute_frame(&sections, pos2(0.0, 0.0), surface(), &measure);
        assert_eq!(frame.width, surface().width() * 0.8);
    }

    #[test]
    fn frame_flips_left_and_up_near_edges() {
        let sections = vec![Section {
            kind: SectionKind::Title,
            text: "some tooltip title".to_owned(),
        }];
        let anchor = pos2(1590.0, 690.0);
        let frame = compute_frame(&sections, anchor, surface(), &measure);

        assert!(frame.min.x < anchor.x);
        assert!(frame.min.y < anchor.y);
        let rect = frame.rect();
        assert!(rect.right() <= surface().right());
        assert!(rect.bottom() <= surface().bottom());
    }

    #[test]
    fn frame_never_escapes_the_surface() {
        let sections = vec![Section {
            kind: SectionKind::Title,
            text: "t".repeat(60),
        }];
        for anchor in [pos2(0.0, 0.0), pos2(1600.0, 0.0), pos2(0.0, 700.0), pos2(800.0, 350.0)] {
            let rect = compute_frame(&sections, anchor, surface(), &measure).rect();
            assert!(rect.left() >= surface().left());
            assert!(rect.top() >= surface().top());
            assert!(rect.right() <= surface().right());
            assert!(rect.bottom() <= surface().bottom());
        }
    }

    #[test]
    fn overlong_text_wraps_within_interior_width() {
        let font = SectionKind::Preview.font();
        let text = "word ".repeat(40);
        let max_width = 30.0 * CHAR_WIDTH;

        let lines = wrap_text(text.trim(), &font, max_width, &measure);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(measure(line, &font) <= max_width);
        }
        assert_eq!(lines.join(" "), text.trim());
    }

    #[test]
    fn fitting_text_stays_on_one_line() {
        let font = SectionKind::Title.font();
        let lines = wrap_text("fits fine", &font, 500.0, &measure);
        assert_eq!(lines, vec!["fits fine".to_owned()]);
    }
}
