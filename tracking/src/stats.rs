//! Per-version accuracy report derived from the ledger

use crate::types::ResultsDocument;
use serde::Serialize;

/// Aggregate metrics for one version against one dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub version: String,
    /// Dataset size (0 when no dataset is loaded)
    pub total_candidates: usize,
    /// Titles with a verdict for any version
    pub total_tested_any_version: usize,
    pub tested_this_version: u64,
    pub correct_this_version: u64,
    /// Percentage in `[0, 100]`; `None` until something was tested
    pub accuracy: Option<f64>,
    /// Dataset titles still lacking a verdict for this version
    pub untested_this_version: usize,
}

impl StatsSnapshot {
    /// Whether a dataset backs the candidate counts
    pub fn has_dataset(&self) -> bool {
        self.total_candidates > 0
    }
}

/// Build a snapshot; pure read of `document`.
pub fn report(document: &ResultsDocument, all_titles: &[String], version: &str) -> StatsSnapshot {
    let (tested, correct) = document
        .version_stats(version)
        .map(|s| (s.tested_count, s.correct_count))
        .unwrap_or((0, 0));

    let accuracy = (tested > 0).then(|| correct as f64 / tested as f64 * 100.0);

    let untested = all_titles
        .iter()
        .filter(|title| !document.has_verdict(title, version))
        .count();

    StatsSnapshot {
        version: version.to_string(),
        total_candidates: all_titles.len(),
        total_tested_any_version: document.titles.len(),
        tested_this_version: tested,
        correct_this_version: correct,
        accuracy,
        untested_this_version: untested,
    }
}

impl std::fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===== Testing Statistics =====")?;
        writeln!(f, "Library version: {}", self.version)?;
        writeln!(f, "Total titles in dataset: {}", self.total_candidates)?;
        writeln!(
            f,
            "Total titles tested (any version): {}",
            self.total_tested_any_version
        )?;
        writeln!(
            f,
            "Titles tested with current version: {}",
            self.tested_this_version
        )?;
        if let Some(accuracy) = self.accuracy {
            writeln!(f, "Current version accuracy: {:.2}%", accuracy)?;
        }
        writeln!(
            f,
            "Untested titles with current version: {}",
            self.untested_this_version
        )?;
        write!(f, "=============================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParsedFields, RecountPolicy};

    fn titles() -> Vec<String> {
        vec![
            "Show.S01E02.1080p".to_string(),
            "Movie.2020.720p".to_string(),
            "Doc.2019.2160p".to_string(),
        ]
    }

    #[test]
    fn test_unseen_version_has_no_accuracy() {
        let snapshot = report(&ResultsDocument::new(), &titles(), "dev");
        assert_eq!(snapshot.tested_this_version, 0);
        assert_eq!(snapshot.correct_this_version, 0);
        assert_eq!(snapshot.accuracy, None);
        assert_eq!(snapshot.untested_this_version, 3);
        assert!(!snapshot.to_string().contains("accuracy"));
    }

    #[test]
    fn test_accuracy_and_untested() {
        let mut doc = ResultsDocument::new();
        let all = titles();
        let policy = RecountPolicy::EveryWrite;
        doc.record_verdict(&all[0], "dev", ParsedFields::new(), true, "", policy);
        doc.record_verdict(&all[1], "dev", ParsedFields::new(), false, "year", policy);
        doc.record_verdict(&all[2], "1.0", ParsedFields::new(), true, "", policy);

        let snapshot = report(&doc, &all, "dev");
        assert_eq!(snapshot.total_candidates, 3);
        assert_eq!(snapshot.total_tested_any_version, 3);
        assert_eq!(snapshot.tested_this_version, 2);
        assert_eq!(snapshot.correct_this_version, 1);
        assert_eq!(snapshot.accuracy, Some(50.0));
        assert_eq!(snapshot.untested_this_version, 1);
        assert!(snapshot
            .to_string()
            .contains("Current version accuracy: 50.00%"));
    }

    #[test]
    fn test_accuracy_stays_in_range() {
        let mut doc = ResultsDocument::new();
        for i in 0..7 {
            doc.record_verdict(
                &format!("T{i}"),
                "dev",
                ParsedFields::new(),
                i % 3 != 0,
                "",
                RecountPolicy::EveryWrite,
            );
        }
        let accuracy = report(&doc, &[], "dev").accuracy.unwrap();
        assert!((0.0..=100.0).contains(&accuracy));
    }

    #[test]
    fn test_no_dataset() {
        let snapshot = report(&ResultsDocument::new(), &[], "dev");
        assert!(!snapshot.has_dataset());
        assert_eq!(snapshot.total_candidates, 0);
        assert_eq!(snapshot.untested_this_version, 0);
    }
}
