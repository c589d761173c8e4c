//! MockStatusSource - scripted status source for tests
//!
//! Plays back a fixed sequence of poll outcomes, then reports transport
//! errors once the script is exhausted.

use std::collections::VecDeque;

use contracts::{ClockStatus, ContractError, StatusSource};

/// One scripted poll outcome.
#[derive(Debug, Clone)]
pub enum ScriptedPoll {
    /// A decoded status report.
    Status(ClockStatus),
    /// A transport failure with the given message.
    Failure(String),
}

/// `StatusSource` that replays a script.
#[derive(Debug, Default)]
pub struct MockStatusSource {
    script: VecDeque<ScriptedPoll>,
    fetches: u64,
}

impl MockStatusSource {
    /// Create from a full script.
    pub fn new(script: impl IntoIterator<Item = ScriptedPoll>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fetches: 0,
        }
    }

    /// Convenience: a script of plain running reports at the given times.
    pub fn running_at(times: &[&str]) -> Self {
        Self::new(times.iter().map(|t| {
            ScriptedPoll::Status(ClockStatus::running_at(
                t.parse().expect("valid scripted time"),
            ))
        }))
    }

    /// Number of fetches served so far.
    pub fn fetches(&self) -> u64 {
        self.fetches
    }

    /// Remaining scripted outcomes.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl StatusSource for MockStatusSource {
    async fn fetch(&mut self) -> Result<ClockStatus, ContractError> {
        self.fetches += 1;
        match self.script.pop_front() {
            Some(ScriptedPoll::Status(status)) => Ok(status),
            Some(ScriptedPoll::Failure(message)) => Err(ContractError::source_transport(message)),
            None => Err(ContractError::source_transport("mock script exhausted")),
        }
    }
}
