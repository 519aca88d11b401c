//! Runs the dispatcher in-process and collects what it produced.

use std::path::{Path, PathBuf};

use fff_core::{DispatchStats, Dispatcher, HttpClient, Outcome, ProbeSettings};
use tokio::sync::mpsc;

/// Settings with no pacing delay and artifacts under `output_dir`.
#[must_use]
pub fn fast_settings(output_dir: &Path) -> ProbeSettings {
    ProbeSettings {
        delay_ms: 0,
        output_dir: output_dir.to_path_buf(),
        ..ProbeSettings::default()
    }
}

/// Dispatches every line of `input` and returns the stats and all outcomes.
pub async fn run_probe(settings: ProbeSettings, input: &str) -> (DispatchStats, Vec<Outcome>) {
    let config = settings.into_config();
    let client = HttpClient::new(&config.client).expect("client should build");
    let dispatcher = Dispatcher::new(config, client).expect("dispatcher should build");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let stats = dispatcher
        .run(input.as_bytes(), tx)
        .await
        .expect("dispatch should complete");

    let mut outcomes = Vec::new();
    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }
    (stats, outcomes)
}

/// Concatenated stdout lines for a set of outcomes.
#[must_use]
pub fn summary_lines(outcomes: &[Outcome]) -> Vec<String> {
    outcomes.iter().filter_map(Outcome::summary_line).collect()
}

/// Every regular file below `dir`, recursively.
#[must_use]
pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return found;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            found.extend(files_under(&path));
        } else {
            found.push(path);
        }
    }
    found
}
