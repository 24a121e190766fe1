//! Session state machine: explicit phases and legal transition guards.
//!
//! Every interactive round walks
//! `Selecting → Presenting → AwaitingVerdict → Recording → Selecting`
//! until a terminal phase is reached. Each transition is validated and kept
//! in a log so a finished session can be inspected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TrackingError, TrackingResult};

/// Phases of one interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Choosing the next candidate title.
    Selecting,
    /// Running the parser on the candidate and showing the result.
    Presenting,
    /// Waiting for affirm / deny / skip / quit.
    AwaitingVerdict,
    /// Writing the verdict through the store.
    Recording,
    /// No candidates left (terminal).
    Done,
    /// Operator asked to stop (terminal).
    Quit,
    /// Input was cancelled or closed (terminal).
    Interrupted,
    /// Parser collaborator faulted (terminal).
    Failed,
}

impl SessionPhase {
    /// Whether this is a terminal phase (no further transitions allowed).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Done | Self::Quit | Self::Interrupted | Self::Failed
        )
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selecting => write!(f, "selecting"),
            Self::Presenting => write!(f, "presenting"),
            Self::AwaitingVerdict => write!(f, "awaiting_verdict"),
            Self::Recording => write!(f, "recording"),
            Self::Done => write!(f, "done"),
            Self::Quit => write!(f, "quit"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Legal transitions between session phases.
///
/// ```text
/// Selecting → Presenting | Done
/// Presenting → AwaitingVerdict | Failed | Interrupted (cancelled mid-parse)
/// AwaitingVerdict → Recording | Selecting (skip) | Quit | Interrupted
/// Recording → Selecting | Quit (declined to continue) | Interrupted
/// ```
fn is_legal_transition(from: SessionPhase, to: SessionPhase) -> bool {
    use SessionPhase::*;

    matches!(
        (from, to),
        (Selecting, Presenting)
            | (Selecting, Done)
            | (Presenting, AwaitingVerdict)
            | (Presenting, Failed)
            | (Presenting, Interrupted)
            | (AwaitingVerdict, Recording)
            | (AwaitingVerdict, Selecting)
            | (AwaitingVerdict, Quit)
            | (AwaitingVerdict, Interrupted)
            | (Recording, Selecting)
            | (Recording, Quit)
            | (Recording, Interrupted)
    )
}

/// A single recorded phase transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: SessionPhase,
    pub to: SessionPhase,
    /// Rounds presented so far when the transition happened.
    pub round: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Tracks the current phase and its transition log.
#[derive(Debug)]
pub struct SessionMachine {
    current: SessionPhase,
    round: u32,
    transitions: Vec<TransitionRecord>,
}

impl SessionMachine {
    /// Create a machine starting at `Selecting`.
    pub fn new() -> Self {
        Self {
            current: SessionPhase::Selecting,
            round: 0,
            transitions: Vec::new(),
        }
    }

    pub fn current(&self) -> SessionPhase {
        self.current
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Move to `to`, rejecting edges outside the phase graph.
    ///
    /// Entering `Presenting` starts a new round.
    pub fn advance(&mut self, to: SessionPhase, reason: Option<&str>) -> TrackingResult<()> {
        if !is_legal_transition(self.current, to) {
            return Err(TrackingError::transition(self.current, to));
        }

        if to == SessionPhase::Presenting {
            self.round += 1;
        }

        tracing::debug!(
            from = %self.current,
            to = %to,
            round = self.round,
            "Session transition"
        );

        self.transitions.push(TransitionRecord {
            from: self.current,
            to,
            round: self.round,
            reason: reason.map(String::from),
        });
        self.current = to;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionPhase::*;

    #[test]
    fn test_full_round_and_exit() {
        let mut machine = SessionMachine::new();
        machine.advance(Presenting, None).unwrap();
        machine.advance(AwaitingVerdict, None).unwrap();
        machine.advance(Recording, Some("affirm")).unwrap();
        machine.advance(Selecting, None).unwrap();
        machine.advance(Done, Some("no candidates")).unwrap();

        assert!(machine.is_terminal());
        assert_eq!(machine.round(), 1);
        assert_eq!(machine.transitions().len(), 5);
        assert_eq!(machine.transitions()[2].reason.as_deref(), Some("affirm"));
    }

    #[test]
    fn test_skip_returns_to_selecting() {
        let mut machine = SessionMachine::new();
        machine.advance(Presenting, None).unwrap();
        machine.advance(AwaitingVerdict, None).unwrap();
        machine.advance(Selecting, Some("skip")).unwrap();
        machine.advance(Presenting, None).unwrap();
        assert_eq!(machine.round(), 2);
    }

    #[test]
    fn test_cancel_while_presenting() {
        let mut machine = SessionMachine::new();
        machine.advance(Presenting, None).unwrap();
        machine.advance(Interrupted, Some("parse cancelled")).unwrap();
        assert!(machine.is_terminal());
        assert_eq!(machine.round(), 1);
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let mut machine = SessionMachine::new();
        assert!(machine.advance(Recording, None).is_err());
        assert_eq!(machine.current(), Selecting);

        machine.advance(Done, None).unwrap();
        assert!(machine.advance(Selecting, None).is_err());
        assert!(machine.advance(Interrupted, None).is_err());
    }

    #[test]
    fn test_terminal_phases() {
        for phase in [Done, Quit, Interrupted, Failed] {
            assert!(phase.is_terminal());
        }
        for phase in [Selecting, Presenting, AwaitingVerdict, Recording] {
            assert!(!phase.is_terminal());
        }
    }

    #[test]
    fn test_transition_serialization() {
        let record = TransitionRecord {
            from: AwaitingVerdict,
            to: Quit,
            round: 3,
            reason: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"from":"awaiting_verdict","to":"quit","round":3}"#);
    }
}
