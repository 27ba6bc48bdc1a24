//! Operations behind the CLI subcommands
//!
//! Each function does the work and returns data; printing stays in `main`.

use crate::error::{AppError, Result};
use crate::state::AppState;
use fable_core::{ImportSession, SessionSummary};
use fable_importer::quarantine::list_quarantined;
use fable_importer::{FileScanner, QuarantinedFile, RescanOutcome};
use fable_metadata::MetadataExtractor;
use std::path::{Path, PathBuf};
use tracing::info;

/// Run one import session to completion
pub async fn import(state: &AppState, dry_run: bool) -> Result<ImportSession> {
    let started = state.importer.start_import(dry_run)?;
    info!("Import session {} started", started.id);

    let finished = state.importer.wait().await;
    finished_session(&started, finished)
}

/// The record `wait` returned for the session started as `started`
fn finished_session(started: &ImportSession, finished: Option<ImportSession>) -> Result<ImportSession> {
    finished.ok_or_else(|| AppError::SessionLost(started.id.clone()))
}

/// Add catalog rows for new files under `path` (default: the library root)
pub async fn scan(state: &AppState, path: Option<&Path>) -> Result<usize> {
    let root = library_root(state, path);
    Ok(state.reconciler.scan(&root).await?)
}

/// Full reconciliation of `path` (default: the library root)
pub async fn rescan(state: &AppState, path: Option<&Path>) -> Result<RescanOutcome> {
    let root = library_root(state, path);
    Ok(state.reconciler.rescan(&root).await?)
}

pub fn logs(state: &AppState) -> Result<Vec<SessionSummary>> {
    Ok(state.importer.list_logs()?)
}

pub fn log(state: &AppState, session_id: &str) -> Result<ImportSession> {
    Ok(state.importer.get_log(session_id)?)
}

/// Files currently held in quarantine, with recorded reasons
pub fn quarantine(state: &AppState) -> Result<Vec<QuarantinedFile>> {
    let scanner = FileScanner::new(&state.config.library.import_extensions);
    Ok(list_quarantined(
        &state.config.library.quarantine_directory,
        state.importer.log_store(),
        &MetadataExtractor::new(),
        &scanner,
    )?)
}

/// Write the cover (or its thumbnail) of `file` to `output`, returning the
/// number of bytes written
pub fn cover(state: &AppState, file: &Path, thumbnail: bool, output: &Path) -> Result<usize> {
    let data = if thumbnail {
        state.covers.extract_thumbnail(
            file,
            state.config.covers.thumbnail_width,
            state.config.covers.thumbnail_height,
        )?
    } else {
        state.covers.extract(file)?.data
    };

    write_output(output, &data)?;
    Ok(data.len())
}

/// Write the cover of `file` to `output` as base64 text, returning the
/// number of bytes written
pub fn cover_base64(state: &AppState, file: &Path, output: &Path) -> Result<usize> {
    let encoded = state.covers.extract_base64(file)?;
    write_output(output, encoded.as_bytes())?;
    Ok(encoded.len())
}

fn write_output(output: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, data)?;
    Ok(())
}

fn library_root(state: &AppState, path: Option<&Path>) -> PathBuf {
    path.map_or_else(|| state.config.library.scan_directory.clone(), Path::to_path_buf)
}
