use eframe::egui::{self, Align, Context, Layout, RichText, Ui};

use crate::projection::ProjectionResult;
use crate::recommend::recommend;

use super::{ConnectionSummary, OpenCallback, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(result: ProjectionResult, open_callback: OpenCallback) -> Self {
        Self {
            result,
            viewport: Default::default(),
            interaction: Default::default(),
            search: String::new(),
            connections: Vec::new(),
            open_callback,
        }
    }

    /// Replaces the projection snapshot and resets the session view state.
    /// An empty batch is refused and the previous snapshot stays live.
    pub(in crate::app) fn load(&mut self, result: ProjectionResult) -> bool {
        if result.points.is_empty() {
            return false;
        }

        self.result = result;
        self.viewport.reset();
        self.interaction.reset();
        self.connections.clear();
        true
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source_label: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("note-atlas");
                    ui.separator();
                    ui.label(format!("source: {source_label}"));
                    ui.label(format!("notes: {}", self.result.points.len()));
                    ui.label(format!("clusters: {}", self.result.cluster_count()));

                    ui.separator();
                    ui.label("search:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.search)
                            .hint_text("note title")
                            .desired_width(180.0),
                    );

                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload projection"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!("zoom: {:.1}x", self.viewport.scale));
                    });
                });
            });

        egui::SidePanel::right("connections")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_connections_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Computing note projection...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_plot(ui);
            }
        });
    }

    pub(in crate::app) fn refresh_connections(&mut self) {
        let summaries: Vec<ConnectionSummary> =
            recommend(&self.result.points, &self.result.cluster_terms)
                .into_iter()
                .map(|connection| ConnectionSummary {
                    source_title: connection.source.title.clone(),
                    source_path: connection.source.path.clone(),
                    target_title: connection.target.title.clone(),
                    target_path: connection.target.path.clone(),
                    similarity: connection.similarity,
                    common_terms: connection.common_terms,
                    cluster_terms: connection.cluster_terms,
                    reason: connection.reason,
                })
                .collect();
        self.connections = summaries;
    }

    fn draw_connections_panel(&mut self, ui: &mut Ui) {
        ui.heading("Suggested connections");
        ui.add_space(4.0);

        if ui.button("Find connections").clicked() {
            self.refresh_connections();
        }
        ui.add_space(6.0);

        if self.connections.is_empty() {
            ui.label("No suggestions yet. Run the search to rank related note pairs.");
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            for summary in &self.connections {
                ui.group(|ui| {
                    ui.label(
                        RichText::new(format!(
                            "{} -> {}",
                            summary.source_title, summary.target_title
                        ))
                        .strong(),
                    );
                    ui.small(format!(
                        "{:.0}% similar | {}",
                        summary.similarity, summary.reason
                    ));
                    if !summary.common_terms.is_empty() {
                        ui.small(format!(
                            "Shared keywords: {}",
                            summary.common_terms.join(", ")
                        ));
                    }
                    if !summary.cluster_terms.is_empty() {
                        ui.small(format!(
                            "Cluster terms: {}",
                            summary.cluster_terms.join(", ")
                        ));
                    }
                    ui.horizontal(|ui| {
                        if ui.small_button("Open source").clicked() {
                            (self.open_callback)(&summary.source_path);
                        }
                        if ui.small_button("Open target").clicked() {
                            (self.open_callback)(&summary.target_path);
                        }
                    });
                });
                ui.add_space(4.0);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::projection::test_point;
    use eframe::egui::vec2;

    fn model_with_points(count: usize) -> ViewModel {
        let mut result = ProjectionResult::default();
        for index in 0..count {
            result
                .points
                .push(test_point(&format!("n{index}"), index as f32, 0.0, 0));
        }
        ViewModel::new(result, Arc::new(|_| {}))
    }

    #[test]
    fn empty_batch_leaves_prior_snapshot_untouched() {
        let mut model = model_with_points(2);
        model.viewport.pan_by(vec2(40.0, 0.0));

        assert!(!model.load(ProjectionResult::default()));
        assert_eq!(model.result.points.len(), 2);
        assert_eq!(model.viewport.offset, vec2(40.0, 0.0));
    }

    #[test]
    fn loading_a_batch_replaces_the_snapshot_and_resets_view_state() {
        let mut model = model_with_points(2);
        model.viewport.pan_by(vec2(40.0, 0.0));
        model.viewport.apply_scroll(1.0);
        model.interaction.hovered = Some(1);
        model.refresh_connections();

        let mut next = ProjectionResult::default();
        next.points.push(test_point("only", 0.0, 0.0, -1));
        assert!(model.load(next));

        assert_eq!(model.result.points.len(), 1);
        assert_eq!(model.viewport.scale, 1.0);
        assert_eq!(model.viewport.offset, vec2(0.0, 0.0));
        assert_eq!(model.interaction.hovered, None);
        assert!(model.connections.is_empty());
    }

    #[test]
    fn refresh_connections_copies_pairs_out_of_the_snapshot() {
        let mut result = ProjectionResult::default();
        let mut a = test_point("a", 0.0, 0.0, 2);
        a.distance_to_center = Some(0.1);
        let mut b = test_point("b", 0.1, 0.0, 2);
        b.distance_to_center = Some(0.2);
        result.points.push(a);
        result.points.push(b);

        let mut model = ViewModel::new(result, Arc::new(|_| {}));
        model.refresh_connections();

        assert_eq!(model.connections.len(), 1);
        let summary = &model.connections[0];
        assert_eq!(summary.source_title, "a");
        assert_eq!(summary.target_path, "b.md");
        assert!((summary.similarity - 90.0).abs() < 1e-3);
    }
}
