use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::result::{ProjectionResult, parse_projection};

/// Cap mirrors the sidecar's practical limit; beyond this t-SNE runtimes
/// dominate the session.
const MAX_NOTES: usize = 200;
const PREVIEW_CHARS: usize = 150;
const WORDS_PER_MINUTE: u32 = 200;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct AnalysisSettings {
    pub perplexity: u32,
    pub iterations: u32,
    pub learning_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct NotePayload {
    pub path: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctime: Option<i64>,
    #[serde(rename = "wordCount")]
    pub word_count: u32,
    #[serde(rename = "readingTime")]
    pub reading_time: u32,
    pub tags: Vec<String>,
    #[serde(rename = "contentPreview")]
    pub content_preview: String,
}

#[derive(Serialize)]
struct ProcessRequest<'a> {
    notes: &'a [NotePayload],
    settings: AnalysisSettings,
}

pub fn collect_notes(notes_dir: &Path) -> Result<Vec<NotePayload>> {
    let tag_pattern = Regex::new(r"#([A-Za-z0-9_-]+)").expect("tag pattern is valid");
    let mut notes = Vec::new();

    for entry in WalkDir::new(notes_dir).sort_by_file_name() {
        let entry = entry.with_context(|| {
            format!("failed to walk notes directory {}", notes_dir.display())
        })?;
        if !entry.file_type().is_file()
            || entry.path().extension().is_none_or(|ext| ext != "md")
        {
            continue;
        }
        if notes.len() >= MAX_NOTES {
            debug!(limit = MAX_NOTES, "note limit reached, ignoring the rest");
            break;
        }

        let path = entry.path();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read note {}", path.display()))?;
        notes.push(note_payload(path, content, &tag_pattern));
    }

    if notes.is_empty() {
        return Err(anyhow!(
            "no markdown notes found under {}",
            notes_dir.display()
        ));
    }

    info!(count = notes.len(), "collected notes for projection");
    Ok(notes)
}

fn note_payload(path: &Path, content: String, tag_pattern: &Regex) -> NotePayload {
    let title = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let word_count = content.split_whitespace().count() as u32;
    let reading_time = word_count.div_ceil(WORDS_PER_MINUTE);

    // Every occurrence counts; the sidecar weighs repeated tags.
    let tags = tag_pattern
        .captures_iter(&content)
        .map(|capture| capture[1].to_string())
        .collect::<Vec<_>>();

    let (mtime, ctime) = file_times(path);

    NotePayload {
        path: path.display().to_string(),
        title,
        content_preview: content_preview(&content),
        content,
        mtime,
        ctime,
        word_count,
        reading_time,
        tags,
    }
}

fn content_preview(content: &str) -> String {
    let mut preview: String = content
        .chars()
        .take(PREVIEW_CHARS)
        .map(|ch| if ch == '\n' { ' ' } else { ch })
        .collect();
    if content.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

fn file_times(path: &Path) -> (Option<i64>, Option<i64>) {
    let Ok(metadata) = fs::metadata(path) else {
        return (None, None);
    };
    (
        metadata.modified().ok().and_then(epoch_millis),
        metadata.created().ok().and_then(epoch_millis),
    )
}

fn epoch_millis(time: SystemTime) -> Option<i64> {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .ok()
        .map(|duration| duration.as_millis() as i64)
}

pub fn fetch_projection(
    base_url: &str,
    notes: &[NotePayload],
    settings: AnalysisSettings,
) -> Result<ProjectionResult> {
    let base_url = base_url.trim_end_matches('/');
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()
        .context("failed to build HTTP client")?;

    client
        .get(format!("{base_url}/health"))
        .timeout(Duration::from_secs(5))
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .with_context(|| {
            format!(
                "projection service is not reachable at {base_url}; \
                 start it with `python src/python/tsne/server.py`"
            )
        })?;

    info!(
        notes = notes.len(),
        perplexity = settings.perplexity,
        iterations = settings.iterations,
        "submitting notes for projection"
    );

    let response = client
        .post(format!("{base_url}/process"))
        .json(&ProcessRequest { notes, settings })
        .send()
        .context("projection request failed")?;

    let status = response.status();
    let body = response
        .text()
        .context("failed to read projection response body")?;
    if !status.is_success() {
        // The body usually carries an {"error": ...} with the real cause.
        return match parse_projection(&body) {
            Err(error) => Err(error),
            Ok(_) => Err(anyhow!("projection service returned {status}")),
        };
    }

    let result = parse_projection(&body)?;
    info!(
        points = result.points.len(),
        clusters = result.cluster_count(),
        "projection received"
    );
    Ok(result)
}

pub fn load_projection_file(path: &Path) -> Result<ProjectionResult> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read projection file {}", path.display()))?;
    parse_projection(&raw)
        .with_context(|| format!("failed to parse projection file {}", path.display()))
}
