//! Persisted import session logs
//!
//! One pretty-printed JSON document per session at `<dir>/<session_id>.json`.
//! Saving rewrites the whole file and then rotates the directory down to the
//! newest `max_logs` files by modification time.

use crate::{ImportError, Result};
use chrono::{DateTime, Utc};
use fable_core::{ImportSession, SessionSummary};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Directory of session log files
#[derive(Debug, Clone)]
pub struct SessionLogStore {
    dir: PathBuf,
    max_logs: usize,
}

impl SessionLogStore {
    /// `max_logs == 0` disables rotation
    pub fn new(dir: impl Into<PathBuf>, max_logs: usize) -> Self {
        Self {
            dir: dir.into(),
            max_logs,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the log for `session_id` lives
    pub fn log_path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}.json"))
    }

    /// Write the session record, then rotate old logs
    pub fn save(&self, session: &ImportSession) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.log_path(&session.id);
        fs::write(&path, serde_json::to_vec_pretty(session)?)?;
        debug!("Saved session log {:?}", path);

        if let Err(e) = self.rotate() {
            warn!("Failed to rotate session logs in {:?}: {}", self.dir, e);
        }
        Ok(path)
    }

    /// Delete all but the newest `max_logs` log files, returning how many
    /// were removed
    pub fn rotate(&self) -> Result<usize> {
        if self.max_logs == 0 {
            return Ok(0);
        }

        let mut removed = 0;
        for (path, _) in self.log_files()?.into_iter().skip(self.max_logs) {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Rotated out session log {:?}", path);
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove old session log {:?}: {}", path, e),
            }
        }
        Ok(removed)
    }

    /// Summaries of every readable log, newest first
    pub fn list(&self) -> Result<Vec<SessionSummary>> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|(session, modified)| session.summary(modified))
            .collect())
    }

    /// Full session records of every readable log, newest first
    pub fn sessions(&self) -> Result<Vec<ImportSession>> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|(session, _)| session)
            .collect())
    }

    /// Full record of one session
    pub fn get(&self, session_id: &str) -> Result<ImportSession> {
        if !is_valid_session_id(session_id) {
            return Err(ImportError::InvalidSessionId(session_id.to_string()));
        }

        let path = self.log_path(session_id);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ImportError::LogNotFound(session_id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&data)?)
    }

    fn load_all(&self) -> Result<Vec<(ImportSession, DateTime<Utc>)>> {
        let mut sessions = Vec::new();
        for (path, modified) in self.log_files()? {
            let parsed = fs::read(&path)
                .map_err(ImportError::from)
                .and_then(|data| Ok(serde_json::from_slice::<ImportSession>(&data)?));
            match parsed {
                Ok(session) => sessions.push((session, DateTime::<Utc>::from(modified))),
                Err(e) => debug!("Skipping unreadable session log {:?}: {}", path, e),
            }
        }
        Ok(sessions)
    }

    /// `*.json` files with their modification times, newest first.
    /// Equal times are ordered by file name, later names first.
    fn log_files(&self) -> Result<Vec<(PathBuf, SystemTime)>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files: Vec<(PathBuf, SystemTime)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if !path.extension().is_some_and(|ext| ext == "json") {
                    return None;
                }
                let metadata = entry.metadata().ok().filter(|m| m.is_file())?;
                Some((path, metadata.modified().ok()?))
            })
            .collect();

        files.sort_by(|(a_path, a_time), (b_path, b_time)| {
            b_time.cmp(a_time).then_with(|| b_path.cmp(a_path))
        });
        Ok(files)
    }
}

fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && !session_id.contains("..")
        && !session_id.contains(['/', '\\'])
        && !session_id.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn session(id: &str) -> ImportSession {
        let mut session = ImportSession::new(false, Path::new("/logs"));
        session.id = id.to_string();
        session.total_files = 3;
        session.finish();
        session
    }

    fn set_mtime(path: &Path, secs_ago: u64) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(secs_ago))
            .unwrap();
    }

    #[test]
    fn save_then_get_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionLogStore::new(temp_dir.path().join("logs"), 10);

        let saved = session("import_1000");
        let path = store.save(&saved).unwrap();

        assert_eq!(path, temp_dir.path().join("logs/import_1000.json"));
        assert_eq!(store.get("import_1000").unwrap(), saved);
    }

    #[test]
    fn get_rejects_traversal_and_reports_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionLogStore::new(temp_dir.path(), 10);

        for bad in ["", "../secret", "a/b", "a\\b"] {
            assert!(matches!(store.get(bad), Err(ImportError::InvalidSessionId(_))));
        }
        assert!(matches!(
            store.get("import_42"),
            Err(ImportError::LogNotFound(_))
        ));
    }

    #[test]
    fn rotation_keeps_newest_by_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let writer = SessionLogStore::new(temp_dir.path(), 0);
        let store = SessionLogStore::new(temp_dir.path(), 2);

        // Names deliberately disagree with modification order
        for (id, age) in [("import_3", 300), ("import_1", 100), ("import_2", 200)] {
            writer.save(&session(id)).unwrap();
            set_mtime(&writer.log_path(id), age);
        }

        assert_eq!(store.rotate().unwrap(), 1);
        assert!(!store.log_path("import_3").exists());

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|s| s.session_id).collect();
        assert_eq!(ids, vec!["import_1", "import_2"]);
    }

    #[test]
    fn zero_max_logs_disables_rotation() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionLogStore::new(temp_dir.path(), 0);
        for i in 0..5 {
            store.save(&session(&format!("import_{i}"))).unwrap();
        }
        assert_eq!(store.list().unwrap().len(), 5);
    }

    #[test]
    fn list_skips_invalid_files_and_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let missing = SessionLogStore::new(temp_dir.path().join("nope"), 10);
        assert!(missing.list().unwrap().is_empty());

        let store = SessionLogStore::new(temp_dir.path(), 10);
        store.save(&session("import_7")).unwrap();
        fs::write(temp_dir.path().join("garbage.json"), b"{not json").unwrap();
        fs::write(temp_dir.path().join("readme.txt"), b"hi").unwrap();

        let summaries = store.list().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].session_id, "import_7");
        assert_eq!(summaries[0].total_files, 3);
    }
}
