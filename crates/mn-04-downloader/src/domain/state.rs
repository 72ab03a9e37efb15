//! # Round State Machine
//!
//! ```text
//! Idle -> Fetching -> Verifying -> QuorumReached -> Parsing -> Committed
//!            |            |                  \          \
//!            v            v                   v          v
//!           Idle     QuorumFailed          ParseFailed  ParseFailed
//! ```
//!
//! `QuorumFailed`, `ParseFailed` and `Committed` return to `Idle`. Fetching
//! may return to `Idle` directly when no new file is published.

use crate::domain::errors::DownloaderError;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundState {
    Idle,
    Fetching,
    Verifying,
    QuorumReached,
    QuorumFailed,
    Parsing,
    Committed,
    ParseFailed,
}

impl RoundState {
    pub fn can_transition_to(&self, next: RoundState) -> bool {
        use RoundState::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Fetching, Idle)
                | (Fetching, Verifying)
                | (Fetching, QuorumFailed)
                | (Verifying, QuorumReached)
                | (Verifying, QuorumFailed)
                | (QuorumReached, Parsing)
                | (QuorumReached, ParseFailed)
                | (Parsing, Committed)
                | (Parsing, ParseFailed)
                | (QuorumFailed, Idle)
                | (ParseFailed, Idle)
                | (Committed, Idle)
        )
    }

    /// Failure state reachable from this state, if any.
    pub fn failure(&self) -> Option<RoundState> {
        match self {
            RoundState::Fetching | RoundState::Verifying => Some(RoundState::QuorumFailed),
            RoundState::QuorumReached | RoundState::Parsing => Some(RoundState::ParseFailed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RoundState::QuorumFailed | RoundState::ParseFailed | RoundState::Committed
        )
    }
}

/// Current state of the single round a downloader runs.
#[derive(Debug)]
pub struct RoundTracker {
    state: RoundState,
}

impl Default for RoundTracker {
    fn default() -> Self {
        Self {
            state: RoundState::Idle,
        }
    }
}

impl RoundTracker {
    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn advance(&mut self, next: RoundState) -> Result<(), DownloaderError> {
        if !self.state.can_transition_to(next) {
            return Err(DownloaderError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        trace!(from = ?self.state, to = ?next, "Round transition");
        self.state = next;
        Ok(())
    }

    /// Moves to the failure state for the current phase, then to `Idle`.
    /// Returns the failure state passed through.
    pub fn fail(&mut self) -> RoundState {
        let failed = self.state.failure().unwrap_or(self.state);
        if self.state.can_transition_to(failed) {
            self.state = failed;
        }
        self.state = RoundState::Idle;
        failed
    }

    /// Returns a terminal state to `Idle`.
    pub fn finish(&mut self) -> Result<(), DownloaderError> {
        if self.state == RoundState::Idle {
            return Ok(());
        }
        self.advance(RoundState::Idle)
    }
}
