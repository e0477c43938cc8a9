use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::warn;

use crate::projection::{self, AnalysisSettings, ProjectionResult};

mod panels;
mod plot;
mod render_utils;
mod viewport;

use plot::Interaction;
use viewport::Viewport;

/// Host-injected action for a clicked note path. The core assumes nothing
/// about its effect.
pub type OpenCallback = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Clone)]
pub enum ProjectionSource {
    File(PathBuf),
    Service {
        base_url: String,
        notes_dir: PathBuf,
        settings: AnalysisSettings,
    },
}

impl ProjectionSource {
    fn label(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Service { base_url, .. } => base_url.clone(),
        }
    }

    fn load(&self) -> anyhow::Result<ProjectionResult> {
        match self {
            Self::File(path) => projection::load_projection_file(path),
            Self::Service {
                base_url,
                notes_dir,
                settings,
            } => {
                let notes = projection::collect_notes(notes_dir)?;
                projection::fetch_projection(base_url, &notes, *settings)
            }
        }
    }
}

pub struct NoteAtlasApp {
    source: ProjectionSource,
    open_callback: OpenCallback,
    state: AppState,
    reload_rx: Option<Receiver<Result<ProjectionResult, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<ProjectionResult, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

/// The one owning slot for the projection snapshot plus all per-session view
/// state. The snapshot is replaced wholesale on load, never mutated in place.
struct ViewModel {
    result: ProjectionResult,
    viewport: Viewport,
    interaction: Interaction,
    search: String,
    connections: Vec<ConnectionSummary>,
    open_callback: OpenCallback,
}

/// Owned copy of a recommended pair for the review panel, detached from the
/// snapshot lifetime.
struct ConnectionSummary {
    source_title: String,
    source_path: String,
    target_title: String,
    target_path: String,
    similarity: f32,
    common_terms: Vec<String>,
    cluster_terms: Vec<String>,
    reason: String,
}

impl NoteAtlasApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: ProjectionSource,
        open_callback: OpenCallback,
    ) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            open_callback,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: ProjectionSource) -> Receiver<Result<ProjectionResult, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = source.load().map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: ProjectionSource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }
}

impl eframe::App for NoteAtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(result) => AppState::Ready(Box::new(ViewModel::new(
                            result,
                            Arc::clone(&self.open_callback),
                        ))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Computing note projection...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the note projection");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.source.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                let source_label = self.source.label();
                model.show(ctx, &source_label, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(result)) => {
                            if !model.load(result) {
                                warn!("projection result had no points; keeping current view");
                            }
                        }
                        Ok(Err(error)) => {
                            transition = Some(AppState::Error(error));
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
