// Stream Viewer Setup
// Main library entry point

pub mod catalog;
pub mod tui;
pub mod utils;
pub mod wizard;

use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

/// Resolve the log folder (absolute path). Prefers a `setup-logs/` folder
/// next to the executable; falls back to the working directory.
fn resolve_log_folder() -> Result<PathBuf> {
    let base = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("setup-logs"))
}

/// Initialize the logging system with dual format (JSON + human-readable).
///
/// Logging is file-only: stdout stays untouched so the terminal UI is never
/// corrupted, and the final selection can be emitted on stdout cleanly.
pub fn init_logging() -> Result<()> {
    let log_dir = resolve_log_folder()?;
    init_logging_at(&log_dir)
}

fn init_logging_at(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");

    // JSON log file for structured parsing
    let json_log_file = log_dir.join(format!("viewer-setup-{}.log", timestamp));

    // Human-readable log file (.txt)
    let txt_log_file = log_dir.join(format!("viewer-setup-{}.txt", timestamp));

    let dispatch = fern::Dispatch::new()
        .level(log::LevelFilter::Debug)
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_utc = chrono::Utc::now().to_rfc3339();
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let json_line = utils::logging::format_json_log(
                        &timestamp_utc,
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}", json_line));
                })
                .chain(fern::log_file(&json_log_file)?),
        )
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}", txt_line));
                })
                .chain(fern::log_file(&txt_log_file)?),
        );

    dispatch.apply()?;

    log::info!(
        "[PHASE: initialization] Logging initialized, log directory: {:?}",
        log_dir
    );
    Ok(())
}

/// Run the interactive setup wizard. On completion, the resolved selection
/// is printed to stdout as one JSON object for the downstream viewer.
pub fn run_tui() -> Result<()> {
    init_logging()?;

    let defaults = tui::UiDefaults {
        app_server: std::env::var("VIEWER_SETUP_APP_SERVER").unwrap_or_default(),
        stream_server: std::env::var("VIEWER_SETUP_STREAM_SERVER").unwrap_or_default(),
        plain_ui: std::env::var("VIEWER_SETUP_UI_MODE")
            .map(|v| v.trim().eq_ignore_ascii_case("plain"))
            .unwrap_or(false),
    };

    match tui::run(defaults)? {
        Some((selection, ui_mode)) => {
            info!(
                "[PHASE: tui] [STEP: exit] Setup complete, handing selection to the viewer (application {})",
                selection.application_id
            );
            let payload = serde_json::json!({
                "selection": selection,
                "uiMode": ui_mode.as_str(),
            });
            println!("{}", payload);
        }
        None => {
            info!("[PHASE: tui] [STEP: exit] Setup cancelled before completion");
        }
    }

    Ok(())
}

/// Render a single wizard frame for CI/tooling, without a real terminal.
pub fn run_tui_smoke(target: Option<String>) -> Result<()> {
    tui::smoke(target.as_deref().unwrap_or("welcome"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_writes_json_and_text_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        init_logging_at(dir.path()).expect("init logging");

        log::info!("[PHASE: test] [STEP: logging] smoke line");

        let mut json_lines = None;
        let mut txt_seen = false;
        for entry in std::fs::read_dir(dir.path()).expect("read dir") {
            let path = entry.expect("entry").path();
            let content = std::fs::read_to_string(&path).expect("read log");
            match path.extension().and_then(|e| e.to_str()) {
                Some("log") => json_lines = Some(content),
                Some("txt") => txt_seen = !content.is_empty(),
                _ => {}
            }
        }

        let json_lines = json_lines.expect("json log file");
        let smoke_line = json_lines
            .lines()
            .find(|l| l.contains("smoke line"))
            .expect("smoke line logged");
        let parsed: serde_json::Value = serde_json::from_str(smoke_line).expect("valid JSON line");
        assert_eq!(parsed["phase"], "test");
        assert_eq!(parsed["step"], "logging");
        assert!(txt_seen, "human-readable log written");
    }
}
