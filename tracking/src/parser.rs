//! Parser collaborator seam
//!
//! The title parser is a black box that maps a title to named fields. It is
//! never judged here; the operator decides whether its output is right.

use crate::error::{TrackingError, TrackingResult};
use crate::types::ParsedFields;
use std::process::Command;

/// Default parser command: PTT's `parse_title` via python3.
pub const DEFAULT_PARSER_COMMAND: &str =
    "python3 -c \"import json, sys; from PTT import parse_title; print(json.dumps(parse_title(sys.argv[1]), default=str))\"";

/// Anything that can parse a title into fields
pub trait TitleParser {
    fn parse(&self, title: &str) -> TrackingResult<ParsedFields>;
}

impl<F> TitleParser for F
where
    F: Fn(&str) -> TrackingResult<ParsedFields>,
{
    fn parse(&self, title: &str) -> TrackingResult<ParsedFields> {
        self(title)
    }
}

/// Runs an external command per title.
///
/// The title is appended as the last argument; the command must exit with
/// status 0 and print a single JSON object on stdout.
#[derive(Debug, Clone)]
pub struct CommandParser {
    program: String,
    args: Vec<String>,
}

impl CommandParser {
    /// Build from a shell-style command line
    pub fn from_command_line(command_line: &str) -> TrackingResult<Self> {
        let mut words = shlex::split(command_line)
            .ok_or_else(|| {
                TrackingError::config(format!(
                    "unbalanced quoting in parser command: {command_line}"
                ))
            })?
            .into_iter();
        let program = words
            .next()
            .ok_or_else(|| TrackingError::config("parser command is empty"))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl TitleParser for CommandParser {
    fn parse(&self, title: &str) -> TrackingResult<ParsedFields> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(title)
            .output()
            .map_err(|e| {
                TrackingError::parser(title, format!("failed to run {}: {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TrackingError::parser(
                title,
                format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    stderr.trim()
                ),
            ));
        }

        let value: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| {
                TrackingError::parser(title, format!("invalid JSON output: {e}"))
            })?;

        match value {
            serde_json::Value::Object(fields) => Ok(fields),
            other => Err(TrackingError::parser(
                title,
                format!("expected a JSON object, got {other}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_parser() {
        let parser = |title: &str| -> TrackingResult<ParsedFields> {
            let mut fields = ParsedFields::new();
            fields.insert("title".to_string(), serde_json::json!(title));
            Ok(fields)
        };
        let fields = parser.parse("Movie.2020.720p").unwrap();
        assert_eq!(fields["title"], serde_json::json!("Movie.2020.720p"));
    }

    #[test]
    fn test_command_line_splitting() {
        let parser = CommandParser::from_command_line(DEFAULT_PARSER_COMMAND).unwrap();
        assert_eq!(parser.program(), "python3");
        assert_eq!(parser.args.len(), 2);
        assert_eq!(parser.args[0], "-c");
        assert!(parser.args[1].contains("parse_title(sys.argv[1])"));
    }

    #[test]
    fn test_rejects_empty_and_unbalanced_commands() {
        assert!(CommandParser::from_command_line("   ").is_err());
        let unbalanced = CommandParser::from_command_line("python3 \"unterminated");
        assert!(unbalanced.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_output_becomes_fields() {
        let parser = CommandParser::from_command_line(
            r#"sh -c "printf '{\"title\": \"%s\", \"year\": 2020}' \"$0\"""#,
        )
        .unwrap();
        let fields = parser.parse("Movie").unwrap();
        assert_eq!(fields["title"], serde_json::json!("Movie"));
        assert_eq!(fields["year"], serde_json::json!(2020));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_output_keeps_field_order() {
        let parser = CommandParser::from_command_line(
            r#"sh -c "printf '{\"title\": \"X\", \"year\": 2020, \"codec\": \"x264\"}'""#,
        )
        .unwrap();
        let fields = parser.parse("X").unwrap();
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "year", "codec"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure_is_parser_error() {
        let parser = CommandParser::from_command_line("sh -c \"exit 3\"").unwrap();
        let err = parser.parse("Movie").unwrap_err();
        assert!(matches!(err, TrackingError::ParserFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_object_output_is_rejected() {
        let parser = CommandParser::from_command_line("sh -c \"echo [1]\"").unwrap();
        let err = parser.parse("Movie").unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));
    }
}
