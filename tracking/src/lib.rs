//! Manual verification ledger for title parsers
//!
//! This library provides:
//! - A durable JSON ledger of human verdicts per title and library version
//! - A seedable sampling policy for what to test next
//! - An interactive session state machine with a guaranteed final flush
//! - Per-version accuracy reporting
//!
//! The parser itself and the operator's terminal are collaborators behind the
//! [`TitleParser`] and [`Operator`] traits.
//!
//! # Usage
//!
//! ```no_run
//! use tracking::{
//!     load_dataset, CommandParser, ResultStore, Sampler, Session, SessionConfig, SessionMode,
//! };
//! # fn demo(operator: &mut impl tracking::Operator) -> tracking::TrackingResult<()> {
//! let titles = load_dataset("titles.txt")?;
//! let mut store = ResultStore::open("parser_test_results.json")?;
//! let parser = CommandParser::from_command_line(tracking::DEFAULT_PARSER_COMMAND)?;
//! let mut session = Session::new(
//!     SessionConfig::for_version("1.5.3"),
//!     SessionMode::Fresh,
//!     titles,
//!     Sampler::from_entropy(),
//! );
//! let report = session.run(&mut store, &parser, operator)?;
//! println!("{}", report.stats);
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod error;
pub mod parser;
pub mod sampler;
pub mod session;
pub mod state_machine;
pub mod stats;
pub mod store;
pub mod types;

pub use dataset::{load_dataset, parse_dataset};
pub use error::{TrackingError, TrackingResult};
pub use parser::{CommandParser, TitleParser, DEFAULT_PARSER_COMMAND};
pub use sampler::Sampler;
pub use session::{
    Operator, OperatorInput, Session, SessionConfig, SessionMode, SessionReport, VerdictInput,
};
pub use state_machine::{SessionMachine, SessionPhase, TransitionRecord};
pub use stats::{report, StatsSnapshot};
pub use store::{backup_path_for, load_document, save_document, ResultStore, DEFAULT_RESULTS_PATH};
pub use types::{
    ParsedFields, RecordOutcome, RecountPolicy, ResultsDocument, TitleVerdict, VersionStats,
};
