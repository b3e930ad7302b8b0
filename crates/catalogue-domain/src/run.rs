//! Lifecycle of a single pipeline run
//!
//! ```text
//! Received → Extracting → Validating → CheckingDuplicate → Writing → Completed
//!     └──────────┴────────────┴───────────────┴──────────────┴──→ Failed(kind)
//! ```
//!
//! States are never re-entered and a run cannot be resumed; a retry of the
//! whole pipeline is a fresh run starting at `Received`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Empty or oversized input text
    InvalidInput,
    /// The generator found no model information
    NoDataExtracted,
    /// The extracted record violates the validation policy
    Rejected,
    /// Transient call failures persisted past the retry bound
    TransientCallFailure,
    /// The call failed in a way retrying cannot fix
    NonRetryableCallFailure,
    /// An entry with the same natural key already exists
    DuplicateKey,
    /// The storage layer failed
    StorageFailure,
    /// The caller's run-level deadline expired
    TimedOut,
}

impl ErrorKind {
    /// Stable snake_case label, suitable for logs and error bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NoDataExtracted => "no_data_extracted",
            ErrorKind::Rejected => "rejected",
            ErrorKind::TransientCallFailure => "transient_call_failure",
            ErrorKind::NonRetryableCallFailure => "non_retryable_call_failure",
            ErrorKind::DuplicateKey => "duplicate_key",
            ErrorKind::StorageFailure => "storage_failure",
            ErrorKind::TimedOut => "timed_out",
        }
    }

    /// HTTP status an outer boundary should answer with for this kind
    ///
    /// This is the only kind-to-status table in the workspace.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidInput | ErrorKind::NoDataExtracted => 400,
            ErrorKind::DuplicateKey => 409,
            ErrorKind::Rejected => 422,
            ErrorKind::TransientCallFailure
            | ErrorKind::NonRetryableCallFailure
            | ErrorKind::StorageFailure => 500,
            ErrorKind::TimedOut => 504,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Input accepted, nothing done yet
    Received,
    /// Waiting on the generation service
    Extracting,
    /// Checking the extraction result
    Validating,
    /// Looking up the natural key
    CheckingDuplicate,
    /// Inserting into storage
    Writing,
    /// Entry stored
    Completed,
    /// Run ended with an error of the given kind
    Failed(ErrorKind),
}

impl RunState {
    fn step(&self) -> u8 {
        match self {
            RunState::Received => 0,
            RunState::Extracting => 1,
            RunState::Validating => 2,
            RunState::CheckingDuplicate => 3,
            RunState::Writing => 4,
            RunState::Completed => 5,
            RunState::Failed(_) => 6,
        }
    }

    /// Completed and Failed are terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed(_))
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: RunState) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            RunState::Failed(_) => true,
            _ => next.step() == self.step() + 1,
        }
    }
}

/// Rejected state transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid run transition: {from:?} -> {to:?}")]
pub struct TransitionError {
    /// State the run was in
    pub from: RunState,
    /// State that was requested
    pub to: RunState,
}

/// Records the states a run passes through and enforces legal transitions
#[derive(Debug, Clone)]
pub struct RunTracker {
    history: Vec<RunState>,
}

impl RunTracker {
    /// Start a fresh run at `Received`
    pub fn new() -> Self {
        Self {
            history: vec![RunState::Received],
        }
    }

    /// Current state
    pub fn state(&self) -> RunState {
        // history always holds at least `Received`
        self.history.last().copied().unwrap_or(RunState::Received)
    }

    /// Move to the next state
    pub fn advance(&mut self, next: RunState) -> Result<(), TransitionError> {
        let from = self.state();
        if !from.can_transition_to(next) {
            return Err(TransitionError { from, to: next });
        }
        self.history.push(next);
        Ok(())
    }

    /// Move to `Failed(kind)`; ignored if the run already terminated
    pub fn fail(&mut self, kind: ErrorKind) {
        if !self.state().is_terminal() {
            self.history.push(RunState::Failed(kind));
        }
    }

    /// Every state visited so far, in order
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Consume the tracker, returning the visited states
    pub fn into_history(self) -> Vec<RunState> {
        self.history
    }
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}
