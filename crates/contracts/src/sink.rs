//! PulseSink trait - pulse consumer interface
//!
//! Every device the engine drives (serial line, UDP broadcast, simulator,
//! log) implements this capability. The trait is object-safe: the engine
//! holds sinks as an ordered `Vec<Box<dyn PulseSink>>` and stays ignorant of
//! concrete types.

use async_trait::async_trait;

use crate::ContractError;

/// A device that consumes pulse and lifecycle commands.
///
/// Voltage methods must return only once the effect is observable on the
/// transport: the engine measures the pulse duration from the return of the
/// polarity call to the issuance of the zero call.
#[async_trait]
pub trait PulseSink: Send {
    /// Sink name (used for logging/metrics).
    fn name(&self) -> &str;

    /// Initialize the sink. Called once, before any voltage call.
    async fn start(&mut self) -> Result<(), ContractError>;

    /// Release any armed state. Must not fail on a sink that was never
    /// started.
    async fn stop(&mut self) -> Result<(), ContractError>;

    /// Drive positive voltage.
    async fn positive(&mut self) -> Result<(), ContractError>;

    /// Drive negative voltage.
    async fn negative(&mut self) -> Result<(), ContractError>;

    /// Drive zero voltage, ending the current pulse.
    async fn zero(&mut self) -> Result<(), ContractError>;

    /// Synchronous resource release, run during engine teardown after all
    /// sinks have stopped.
    fn release(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    /// Asynchronous resource release, run after the synchronous pass.
    async fn release_async(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
