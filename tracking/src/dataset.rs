//! Line-based title dataset loader

use crate::error::{TrackingError, TrackingResult};
use std::path::Path;

/// Read one title per line, trimmed, skipping blank lines.
///
/// Duplicates are kept in file order.
pub fn load_dataset(path: impl AsRef<Path>) -> TrackingResult<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| TrackingError::dataset(path, e))?;
    Ok(parse_dataset(&content))
}

/// Split dataset text into titles
pub fn parse_dataset(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
