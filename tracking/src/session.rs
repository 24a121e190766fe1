//! Interactive verification session
//!
//! Drives rounds of select → parse → ask → record against an explicit
//! `ResultStore`. Whatever way the loop ends (no candidates, quit, declined
//! to continue, interrupted input, parser fault) the store is flushed and a
//! final report is shown before `run` returns.

use crate::error::TrackingResult;
use crate::parser::TitleParser;
use crate::sampler::Sampler;
use crate::state_machine::{SessionMachine, SessionPhase, TransitionRecord};
use crate::stats::{report, StatsSnapshot};
use crate::store::ResultStore;
use crate::types::ParsedFields;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

pub const VERDICT_PROMPT: &str =
    "Is this parsing correct? (Y/n/s/q) [Y=yes, n=no, s=skip, q=quit]: ";
pub const NOTES_PROMPT: &str = "Notes about this result: ";
pub const CONTINUE_PROMPT: &str = "Continue testing? (Y/n): ";
const INVALID_VERDICT: &str = "Invalid input. Please enter Y, n, s or q (or press Enter for Yes).";

/// One line of operator input, or the end of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorInput {
    Line(String),
    /// Ctrl-C, closed stdin, or any other cancellation
    Interrupted,
}

/// The human side of the session
pub trait Operator {
    /// Show a title and the fields the parser produced for it
    fn present(&mut self, title: &str, parsed: &ParsedFields);

    /// Prompt and block until a line arrives or input is cancelled
    fn read_line(&mut self, prompt: &str) -> OperatorInput;

    /// Informational message
    fn notify(&mut self, message: &str);

    /// Periodic and final statistics
    fn show_stats(&mut self, snapshot: &StatsSnapshot);

    /// Whether a cancellation arrived outside a prompt, e.g. while the
    /// parser was running
    fn interrupt_pending(&mut self) -> bool {
        false
    }
}

/// Verdict tokens, matched case-insensitively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictInput {
    /// `y` or empty
    Affirm,
    /// `n`
    Deny,
    /// `s`
    Skip,
    /// `q`
    Quit,
}

impl VerdictInput {
    /// Parse a raw input line; `None` for anything unrecognized
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "" | "y" => Some(Self::Affirm),
            "n" => Some(Self::Deny),
            "s" => Some(Self::Skip),
            "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Where candidates come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// Random dataset titles lacking a verdict for the version
    Fresh,
    /// Every previously tested title, shuffled once
    Retest,
    /// Exactly one given title
    Single(String),
}

/// Session cadence and version tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub version: String,
    /// Show statistics after every N recorded verdicts (0 disables)
    pub stats_every: u32,
    /// Ask whether to continue after every N recorded verdicts (0 disables)
    pub confirm_every: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: "dev".to_string(),
            stats_every: 5,
            confirm_every: 10,
        }
    }
}

impl SessionConfig {
    pub fn for_version(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }
}

/// How a session ended and what it did
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Terminal phase reached
    pub end: SessionPhase,
    /// Titles presented, including skipped ones
    pub rounds: u32,
    pub recorded: u32,
    pub skipped: u32,
    /// Whether the final flush reached disk
    pub saved: bool,
    pub stats: StatsSnapshot,
}

enum Candidates {
    Fresh,
    Retest {
        queue: VecDeque<String>,
        started_empty: bool,
    },
    Single(Option<String>),
}

/// One interactive session over a fixed dataset
pub struct Session<R = StdRng> {
    config: SessionConfig,
    mode: SessionMode,
    all_titles: Vec<String>,
    sampler: Sampler<R>,
    machine: SessionMachine,
    recorded: u32,
    skipped: u32,
}

impl<R: Rng> Session<R> {
    pub fn new(
        config: SessionConfig,
        mode: SessionMode,
        all_titles: Vec<String>,
        sampler: Sampler<R>,
    ) -> Self {
        Self {
            config,
            mode,
            all_titles,
            sampler,
            machine: SessionMachine::new(),
            recorded: 0,
            skipped: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.machine.current()
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        self.machine.transitions()
    }

    /// Run rounds until a terminal phase, then flush and report.
    ///
    /// A parser fault is returned as the error, after the flush and report.
    pub fn run<P, O>(
        &mut self,
        store: &mut ResultStore,
        parser: &P,
        operator: &mut O,
    ) -> TrackingResult<SessionReport>
    where
        P: TitleParser + ?Sized,
        O: Operator + ?Sized,
    {
        info!(
            version = %self.config.version,
            mode = ?self.mode,
            candidates = self.all_titles.len(),
            results = %store.path().display(),
            recount = ?store.policy(),
            "Session starting"
        );

        let outcome = self.drive(store, parser, operator);
        if !self.machine.is_terminal() {
            warn!(phase = %self.machine.current(), "Session stopped outside a terminal phase");
        }

        let saved = store.flush();
        let stats = report(store.document(), &self.all_titles, &self.config.version);
        operator.show_stats(&stats);

        info!(
            end = %self.machine.current(),
            rounds = self.machine.round(),
            recorded = self.recorded,
            skipped = self.skipped,
            saved,
            "Session finished"
        );

        outcome.map(|()| SessionReport {
            end: self.machine.current(),
            rounds: self.machine.round(),
            recorded: self.recorded,
            skipped: self.skipped,
            saved,
            stats,
        })
    }

    fn drive<P, O>(
        &mut self,
        store: &mut ResultStore,
        parser: &P,
        operator: &mut O,
    ) -> TrackingResult<()>
    where
        P: TitleParser + ?Sized,
        O: Operator + ?Sized,
    {
        let mut candidates = match &self.mode {
            SessionMode::Fresh => Candidates::Fresh,
            SessionMode::Retest => {
                let queue = self.sampler.build_retest_queue(store.document());
                let started_empty = queue.is_empty();
                Candidates::Retest {
                    queue,
                    started_empty,
                }
            }
            SessionMode::Single(title) => Candidates::Single(Some(title.clone())),
        };

        loop {
            let Some(title) = self.next_candidate(&mut candidates, store) else {
                if let Some(message) = exhausted_message(&candidates) {
                    operator.notify(message);
                }
                return self
                    .machine
                    .advance(SessionPhase::Done, Some("no candidates"));
            };

            self.machine.advance(SessionPhase::Presenting, None)?;
            let parsed = match parser.parse(&title) {
                Ok(parsed) => parsed,
                // Ctrl-C reaches the parser child too; that is a cancellation
                Err(e) if operator.interrupt_pending() => {
                    debug!(title = %title, error = %e, "Parse cancelled by interrupt");
                    return self.interrupt(operator, "cancelled during parse");
                }
                Err(e) => {
                    warn!(title = %title, error = %e, "Parser failed");
                    self.machine
                        .advance(SessionPhase::Failed, Some(&e.to_string()))?;
                    return Err(e);
                }
            };
            operator.present(&title, &parsed);

            self.machine.advance(SessionPhase::AwaitingVerdict, None)?;
            let Some(verdict) = read_verdict(operator) else {
                return self.interrupt(operator, "input cancelled");
            };

            let (is_correct, notes) = match verdict {
                VerdictInput::Quit => {
                    operator.notify("Quitting test session.");
                    return self
                        .machine
                        .advance(SessionPhase::Quit, Some("operator quit"));
                }
                VerdictInput::Skip => {
                    operator.notify("Skipping this title.");
                    self.skipped += 1;
                    self.machine.advance(SessionPhase::Selecting, Some("skip"))?;
                    continue;
                }
                VerdictInput::Affirm => (true, String::new()),
                VerdictInput::Deny => match operator.read_line(NOTES_PROMPT) {
                    OperatorInput::Line(notes) => (false, notes),
                    OperatorInput::Interrupted => {
                        return self.interrupt(operator, "input cancelled")
                    }
                },
            };

            self.machine.advance(
                SessionPhase::Recording,
                Some(if is_correct { "affirm" } else { "deny" }),
            )?;
            store.record_verdict(&title, &self.config.version, parsed, is_correct, notes);
            self.recorded += 1;

            if is_multiple(self.recorded, self.config.stats_every) {
                operator.show_stats(&report(
                    store.document(),
                    &self.all_titles,
                    &self.config.version,
                ));
            }

            if is_multiple(self.recorded, self.config.confirm_every) {
                match operator.read_line(CONTINUE_PROMPT) {
                    OperatorInput::Line(answer)
                        if matches!(answer.trim().to_lowercase().as_str(), "" | "y") => {}
                    OperatorInput::Line(_) => {
                        operator.notify("Ending test session.");
                        return self
                            .machine
                            .advance(SessionPhase::Quit, Some("declined to continue"));
                    }
                    OperatorInput::Interrupted => {
                        return self.interrupt(operator, "input cancelled")
                    }
                }
            }

            self.machine.advance(SessionPhase::Selecting, None)?;
        }
    }

    fn next_candidate(
        &mut self,
        candidates: &mut Candidates,
        store: &ResultStore,
    ) -> Option<String> {
        match candidates {
            Candidates::Fresh => self
                .sampler
                .pick_untested(&self.all_titles, store.document(), &self.config.version)
                .map(String::from),
            Candidates::Retest { queue, .. } => queue.pop_front(),
            Candidates::Single(title) => title.take(),
        }
    }

    fn interrupt<O: Operator + ?Sized>(
        &mut self,
        operator: &mut O,
        reason: &str,
    ) -> TrackingResult<()> {
        operator.notify("Test session interrupted.");
        self.machine
            .advance(SessionPhase::Interrupted, Some(reason))
    }
}

fn exhausted_message(candidates: &Candidates) -> Option<&'static str> {
    match candidates {
        Candidates::Fresh => {
            Some("All titles in the dataset have been tested with this library version.")
        }
        Candidates::Retest {
            started_empty: true,
            ..
        } => Some("No previously tested titles found."),
        Candidates::Retest { .. } => Some("All previously tested titles have been retested."),
        Candidates::Single(_) => None,
    }
}

/// Prompt until a valid verdict arrives; `None` on interruption
fn read_verdict<O: Operator + ?Sized>(operator: &mut O) -> Option<VerdictInput> {
    loop {
        match operator.read_line(VERDICT_PROMPT) {
            OperatorInput::Line(line) => match VerdictInput::parse(&line) {
                Some(verdict) => return Some(verdict),
                None => operator.notify(INVALID_VERDICT),
            },
            OperatorInput::Interrupted => return None,
        }
    }
}

fn is_multiple(count: u32, every: u32) -> bool {
    every > 0 && count > 0 && count % every == 0
}
