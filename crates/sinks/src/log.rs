//! LogSink - logs every transition via tracing

use async_trait::async_trait;
use contracts::{ContractError, PulseSink};
use tracing::info;

/// Sink that logs lifecycle and voltage transitions for debugging.
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl PulseSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink stopped");
        Ok(())
    }

    async fn positive(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "Positive voltage");
        Ok(())
    }

    async fn negative(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "Negative voltage");
        Ok(())
    }

    async fn zero(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "Zero voltage");
        Ok(())
    }
}
