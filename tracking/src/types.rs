//! Core types for the verdict ledger
//!
//! The persisted document maps versions to running counters and titles to
//! one verdict per version. Title keys are the raw dataset lines; nothing is
//! normalized.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field snapshot returned by the parser collaborator for one title.
///
/// Keeps the parser's own field order, both on screen and on disk.
pub type ParsedFields = serde_json::Map<String, serde_json::Value>;

/// Verdicts for one title, keyed by version identifier
pub type VersionVerdicts = BTreeMap<String, TitleVerdict>;

/// Local wall-clock timestamp, matching the ISO-8601 strings already on disk
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Root persisted entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsDocument {
    /// Per-version counters
    #[serde(default)]
    pub versions: BTreeMap<String, VersionStats>,

    /// Per-title verdicts, keyed by title then version
    #[serde(default)]
    pub titles: BTreeMap<String, VersionVerdicts>,
}

/// Running counters for one library version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionStats {
    pub tested_count: u64,
    pub correct_count: u64,

    /// When the first verdict for this version was recorded
    #[serde(rename = "timestamp")]
    pub first_seen: NaiveDateTime,
}

impl VersionStats {
    fn new(first_seen: NaiveDateTime) -> Self {
        Self {
            tested_count: 0,
            correct_count: 0,
            first_seen,
        }
    }
}

/// Human judgment of one parse result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleVerdict {
    pub is_correct: bool,

    /// Exactly what the operator was shown
    pub parsed_result: ParsedFields,

    /// Empty unless the verdict is negative
    #[serde(default)]
    pub notes: String,

    pub timestamp: NaiveDateTime,
}

/// How counters react when a (title, version) pair is recorded again
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecountPolicy {
    /// Every write increments `tested_count` (and `correct_count` when correct)
    #[default]
    EveryWrite,
    /// Only the first write for a pair touches the counters
    FirstWriteOnly,
}

/// What a single `record_verdict` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    /// No verdict existed for this (title, version) pair before
    pub first_write: bool,
    /// A prior verdict existed and its correctness flipped
    pub verdict_changed: bool,
    /// Counters were incremented
    pub counted: bool,
    /// The follow-up save reached disk
    pub persisted: bool,
}

impl ResultsDocument {
    /// Empty `{versions: {}, titles: {}}` document
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a verdict for `(title, version)` and update the version counters.
    ///
    /// The `persisted` flag of the returned outcome is always `false`; the
    /// store sets it after flushing.
    pub fn record_verdict(
        &mut self,
        title: &str,
        version: &str,
        parsed_result: ParsedFields,
        is_correct: bool,
        notes: impl Into<String>,
        policy: RecountPolicy,
    ) -> RecordOutcome {
        let now = now_local();
        let notes = if is_correct { String::new() } else { notes.into() };

        let previous = self
            .titles
            .entry(title.to_string())
            .or_default()
            .insert(
                version.to_string(),
                TitleVerdict {
                    is_correct,
                    parsed_result,
                    notes,
                    timestamp: now,
                },
            );

        let first_write = previous.is_none();
        let verdict_changed = previous.is_some_and(|p| p.is_correct != is_correct);
        let counted = first_write || policy == RecountPolicy::EveryWrite;

        let stats = self
            .versions
            .entry(version.to_string())
            .or_insert_with(|| VersionStats::new(now));
        if counted {
            stats.tested_count += 1;
            if is_correct {
                stats.correct_count += 1;
            }
        }

        RecordOutcome {
            first_write,
            verdict_changed,
            counted,
            persisted: false,
        }
    }

    /// Whether `title` already carries a verdict for `version`
    pub fn has_verdict(&self, title: &str, version: &str) -> bool {
        self.titles
            .get(title)
            .is_some_and(|versions| versions.contains_key(version))
    }

    /// Verdict for `(title, version)`, if recorded
    pub fn verdict(&self, title: &str, version: &str) -> Option<&TitleVerdict> {
        self.titles.get(title)?.get(version)
    }

    /// Counters for `version`, if any verdict was ever recorded for it
    pub fn version_stats(&self, version: &str) -> Option<&VersionStats> {
        self.versions.get(version)
    }
}
