mod app;
mod projection;
mod recommend;
mod util;

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::app::{NoteAtlasApp, ProjectionSource};
use crate::projection::AnalysisSettings;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Load a saved projection result (JSON) instead of asking the service.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory scanned for Markdown notes.
    #[arg(long, default_value = "notes")]
    notes_dir: PathBuf,

    /// Base URL of the t-SNE sidecar service.
    #[arg(long, default_value = "http://127.0.0.1:1234")]
    server_url: String,

    #[arg(long, default_value_t = 30)]
    perplexity: u32,

    #[arg(long, default_value_t = 1000)]
    iterations: u32,

    #[arg(long, default_value_t = 200.0)]
    learning_rate: f64,
}

fn open_note(path: &str) {
    let status = Command::new("xdg-open").arg(path).status();
    match status {
        Ok(status) if !status.success() => {
            warn!(%path, %status, "xdg-open exited with failure");
        }
        Err(error) => {
            warn!(%path, %error, "failed to spawn xdg-open");
        }
        Ok(_) => {}
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let source = match args.input {
        Some(path) => ProjectionSource::File(path),
        None => ProjectionSource::Service {
            base_url: args.server_url,
            notes_dir: args.notes_dir,
            settings: AnalysisSettings {
                perplexity: args.perplexity,
                iterations: args.iterations,
                learning_rate: args.learning_rate,
            },
        },
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1600.0, 900.0]),
        ..Default::default()
    };

    eframe::run_native(
        "note-atlas",
        options,
        Box::new(move |cc| {
            Ok(Box::new(NoteAtlasApp::new(
                cc,
                source,
                Arc::new(open_note),
            )))
        }),
    )
}
