//! Durable results ledger
//!
//! Owns the in-memory `ResultsDocument` and its JSON file. Every recorded
//! verdict is flushed immediately so an abrupt exit loses at most the verdict
//! in flight. A corrupt file is moved aside under a timestamped backup name
//! and replaced by an empty document; it is never deleted.

use crate::error::{TrackingError, TrackingResult};
use crate::types::{ParsedFields, RecordOutcome, RecountPolicy, ResultsDocument};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default results file name
pub const DEFAULT_RESULTS_PATH: &str = "parser_test_results.json";

/// Load the results document at `path`.
///
/// Missing file yields an empty document. Malformed content (invalid UTF-8,
/// invalid JSON, wrong shape) is renamed to a backup path and an empty
/// document is returned. Only an unreadable existing file is an error.
pub fn load_document(path: &Path) -> TrackingResult<ResultsDocument> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No results file yet, starting fresh");
            return Ok(ResultsDocument::new());
        }
        Err(e) => return Err(TrackingError::Io(e)),
    };

    match serde_json::from_slice::<ResultsDocument>(&bytes) {
        Ok(document) => {
            debug!(
                path = %path.display(),
                titles = document.titles.len(),
                versions = document.versions.len(),
                "Loaded results"
            );
            Ok(document)
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Results file is corrupted. Creating backup and starting fresh."
            );
            backup_file(path);
            Ok(ResultsDocument::new())
        }
    }
}

/// Write `document` to `path` as pretty JSON.
///
/// Writes a sibling temp file first and renames it over the target.
pub fn save_document(document: &ResultsDocument, path: &Path) -> TrackingResult<()> {
    let temp_path = temp_path_for(path);
    let content = serde_json::to_string_pretty(document)?;
    std::fs::write(&temp_path, content)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(TrackingError::Io(e));
    }
    Ok(())
}

/// Backup name for a results file: `<path>.bak.<YYYYmmddHHMMSS>`
pub fn backup_path_for(path: &Path, at: chrono::NaiveDateTime) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".bak.{}", at.format("%Y%m%d%H%M%S")));
    PathBuf::from(name)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Move the file at `path` aside. Failures are logged, never raised.
fn backup_file(path: &Path) -> Option<PathBuf> {
    let backup = backup_path_for(path, crate::types::now_local());
    match std::fs::rename(path, &backup) {
        Ok(()) => {
            warn!(backup = %backup.display(), "Backup created");
            Some(backup)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to create backup");
            None
        }
    }
}

/// Results ledger bound to a file path
#[derive(Debug)]
pub struct ResultStore {
    path: PathBuf,
    document: ResultsDocument,
    policy: RecountPolicy,
}

impl ResultStore {
    /// Open the ledger at `path`, recovering from corruption
    pub fn open(path: impl AsRef<Path>) -> TrackingResult<Self> {
        let path = path.as_ref().to_path_buf();
        let document = load_document(&path)?;
        Ok(Self {
            path,
            document,
            policy: RecountPolicy::default(),
        })
    }

    /// Wrap an in-memory document without touching disk
    pub fn from_document(path: impl Into<PathBuf>, document: ResultsDocument) -> Self {
        Self {
            path: path.into(),
            document,
            policy: RecountPolicy::default(),
        }
    }

    /// Select how re-recorded pairs affect counters
    pub fn with_policy(mut self, policy: RecountPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &ResultsDocument {
        &self.document
    }

    pub fn policy(&self) -> RecountPolicy {
        self.policy
    }

    /// Save the full document, returning the error
    pub fn save(&self) -> TrackingResult<()> {
        save_document(&self.document, &self.path)
    }

    /// Save the full document; a failure is logged and reported as `false`.
    ///
    /// The in-memory document stays authoritative either way.
    pub fn flush(&self) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Error saving results");
                false
            }
        }
    }

    /// Upsert a verdict, update counters per policy, and flush
    pub fn record_verdict(
        &mut self,
        title: &str,
        version: &str,
        parsed_result: ParsedFields,
        is_correct: bool,
        notes: impl Into<String>,
    ) -> RecordOutcome {
        let mut outcome = self.document.record_verdict(
            title,
            version,
            parsed_result,
            is_correct,
            notes,
            self.policy,
        );
        outcome.persisted = self.flush();

        debug!(
            title,
            version,
            is_correct,
            first_write = outcome.first_write,
            verdict_changed = outcome.verdict_changed,
            persisted = outcome.persisted,
            "Recorded verdict"
        );
        outcome
    }

    /// Every title that carries a verdict for any version
    pub fn previously_tested_titles(&self) -> Vec<String> {
        self.document.titles.keys().cloned().collect()
    }
}
