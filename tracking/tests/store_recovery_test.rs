//! Ledger persistence tests: save/load fidelity and corrupt-file recovery.

use tempfile::tempdir;
use tracking::{
    load_document, save_document, ParsedFields, RecountPolicy, ResultStore, ResultsDocument,
};

fn backups_in(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.to_string_lossy().contains(".bak."))
        .collect()
}

#[test]
fn test_save_then_load_is_field_for_field() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");

    let mut doc = ResultsDocument::new();
    let mut fields = ParsedFields::new();
    fields.insert("title".to_string(), serde_json::json!("Show"));
    fields.insert("seasons".to_string(), serde_json::json!([1]));
    fields.insert("episodes".to_string(), serde_json::json!([2]));
    fields.insert("extended".to_string(), serde_json::json!(false));
    fields.insert("bitrate".to_string(), serde_json::Value::Null);
    fields.insert("score".to_string(), serde_json::json!(1.8597941207808163e-7));
    fields.insert("ratio".to_string(), serde_json::json!(0.1 + 0.2));
    doc.record_verdict(
        "Show.S01E02.1080p",
        "dev",
        fields,
        true,
        "",
        RecountPolicy::EveryWrite,
    );
    doc.record_verdict(
        "Movie.2020.720p",
        "1.0",
        ParsedFields::new(),
        false,
        "wrong year",
        RecountPolicy::EveryWrite,
    );

    save_document(&doc, &path).unwrap();
    let loaded = load_document(&path).unwrap();

    assert_eq!(loaded, doc);
    let show = loaded.verdict("Show.S01E02.1080p", "dev").unwrap();
    let shown = &show.parsed_result;
    assert_eq!(
        shown["score"].as_f64().unwrap().to_bits(),
        1.8597941207808163e-7_f64.to_bits()
    );
    assert_eq!(shown["ratio"].as_f64(), Some(0.1 + 0.2));
    let keys: Vec<&str> = shown.keys().map(String::as_str).collect();
    assert_eq!(
        keys.join(","),
        "title,seasons,episodes,extended,bitrate,score,ratio"
    );

    let movie = loaded.verdict("Movie.2020.720p", "1.0").unwrap();
    assert_eq!(movie.notes, "wrong year");
    assert_eq!(loaded.version_stats("1.0").unwrap().correct_count, 0);
}

#[test]
fn test_file_is_human_readable_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    let mut store = ResultStore::open(&path).unwrap();
    store.record_verdict("A", "dev", ParsedFields::new(), true, "");

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n  \"titles\""));
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["versions"]["dev"]["tested_count"], 1);
    assert!(value["versions"]["dev"]["timestamp"].is_string());
    assert_eq!(value["titles"]["A"]["dev"]["is_correct"], true);
}

#[test]
fn test_invalid_utf8_is_treated_as_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    std::fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

    let doc = load_document(&path).unwrap();
    assert_eq!(doc, ResultsDocument::new());
    assert!(!path.exists());
    assert_eq!(backups_in(dir.path()).len(), 1);
}

#[test]
fn test_wrong_shape_is_treated_as_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let doc = load_document(&path).unwrap();
    assert_eq!(doc, ResultsDocument::new());
    let backups = backups_in(dir.path());
    assert_eq!(backups.len(), 1);
    assert_eq!(std::fs::read_to_string(&backups[0]).unwrap(), "[1, 2, 3]");
}

#[test]
fn test_empty_object_loads_as_empty_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    std::fs::write(&path, "{}").unwrap();

    assert_eq!(load_document(&path).unwrap(), ResultsDocument::new());
    assert!(path.exists());
    assert!(backups_in(dir.path()).is_empty());
}

#[test]
fn test_directory_at_results_path_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(ResultStore::open(dir.path()).is_err());
}
