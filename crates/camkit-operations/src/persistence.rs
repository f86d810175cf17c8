//! Session files
//!
//! A session is stored as one JSON document:
//! `{ "format_version": 1, "saved_at": "...", "session": { ... } }`.
//! Loading a session runs crash recovery, so operations saved while a
//! computation was in flight come back idle.

use crate::error::{OperationError, OperationResult};
use crate::session::CamSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Version written into new session files
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// Contents of a session file as stored on disk
#[derive(Debug, Clone, Deserialize)]
pub struct SessionFile {
    pub format_version: u32,
    pub saved_at: DateTime<Utc>,
    pub session: CamSession,
}

#[derive(Serialize)]
struct SessionFileRef<'a> {
    format_version: u32,
    saved_at: DateTime<Utc>,
    session: &'a CamSession,
}

impl SessionFile {
    /// Read a session file without running recovery
    ///
    /// Stale computations are kept as saved. Derived values are rebuilt
    /// from the percentages and cutter/feed inputs are raised to their
    /// minimums, since the file may have been edited by hand.
    pub fn read(path: &Path) -> OperationResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut file: SessionFile = serde_json::from_str(&content)?;
        if file.format_version != SESSION_FORMAT_VERSION {
            return Err(OperationError::UnsupportedFormat(file.format_version));
        }
        file.session.restore_derived();
        Ok(file)
    }
}

impl CamSession {
    /// Save the session as JSON
    pub fn save_to_file(&self, path: &Path) -> OperationResult<()> {
        let file = SessionFileRef {
            format_version: SESSION_FORMAT_VERSION,
            saved_at: Utc::now(),
            session: self,
        };
        let content = serde_json::to_string_pretty(&file)?;
        fs::write(path, content)?;
        info!(
            "Saved session with {} operation(s) to {}",
            self.len(),
            path.display()
        );
        Ok(())
    }

    /// Load a session and reset computations that never finished
    pub fn load_from_file(path: &Path) -> OperationResult<Self> {
        let SessionFile {
            saved_at, mut session, ..
        } = SessionFile::read(path)?;
        session.reset_all_computing_flags();
        session.revalidate_chains();
        info!(
            "Loaded session with {} operation(s) saved at {} from {}",
            session.len(),
            saved_at,
            path.display()
        );
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unsupported_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(
            &path,
            r#"{ "format_version": 99, "saved_at": "2024-01-01T00:00:00Z", "session": {} }"#,
        )
        .unwrap();
        assert!(matches!(
            CamSession::load_from_file(&path),
            Err(OperationError::UnsupportedFormat(99))
        ));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            CamSession::load_from_file(&path),
            Err(OperationError::Serialization(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            CamSession::load_from_file(&dir.path().join("missing.json")),
            Err(OperationError::Io(_))
        ));
    }
}
