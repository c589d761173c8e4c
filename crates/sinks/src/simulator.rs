//! SimulatorSink - models an analogue clock face in the log
//!
//! Follows the same stepping contract as a physical movement: a face
//! advances one minute when a polarity phase is followed by its zero phase.
//! Useful during development to see what the slave dials would display.

use async_trait::async_trait;
use contracts::{ClockTime, ContractError, PulseSink};
use tracing::info;

/// Sink that simulates a slave clock face.
pub struct SimulatorSink {
    name: String,
    face: ClockTime,
    modulus: u16,
    pulse_armed: bool,
}

impl SimulatorSink {
    /// Create a simulated face showing `start` on a dial with the given
    /// modulus (720 or 1440 minutes).
    pub fn new(name: impl Into<String>, start: ClockTime, modulus: u16) -> Self {
        Self {
            name: name.into(),
            face: start.normalize(modulus),
            modulus,
            pulse_armed: false,
        }
    }

    /// The time currently shown on the simulated face.
    pub fn face(&self) -> ClockTime {
        self.face
    }
}

#[async_trait]
impl PulseSink for SimulatorSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, face = %self.face, "Simulated analogue clock initialized");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, face = %self.face, "Simulated analogue clock stopped");
        Ok(())
    }

    async fn positive(&mut self) -> Result<(), ContractError> {
        self.pulse_armed = true;
        Ok(())
    }

    async fn negative(&mut self) -> Result<(), ContractError> {
        self.pulse_armed = true;
        Ok(())
    }

    async fn zero(&mut self) -> Result<(), ContractError> {
        if self.pulse_armed {
            self.pulse_armed = false;
            self.face = self.face.succ(self.modulus);
            info!(sink = %self.name, face = %self.face, "Simulated analogue clock");
        }
        Ok(())
    }
}
