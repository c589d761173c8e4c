//! SerialPortSink - drives RTS/DTR control lines
//!
//! The clock amplifier is wired to the serial control lines, not the data
//! pins: RTS asserts the positive supply, DTR the negative one, and a pulse
//! ends when both lines drop. In `dtr_only` mode (single-line amplifiers
//! that derive polarity themselves) either polarity asserts DTR.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use contracts::{ContractError, PulseSink};
use serialport::SerialPort;
use tracing::{debug, instrument};

const BAUD_RATE: u32 = 9600;
const OPEN_TIMEOUT: Duration = Duration::from_millis(500);

/// Sink that pulses a bipolar clock line through serial control signals.
pub struct SerialPortSink {
    name: String,
    port_name: String,
    dtr_only: bool,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialPortSink {
    /// Create a sink for the given port. The port is opened in `start()`.
    pub fn new(name: impl Into<String>, port_name: impl Into<String>, dtr_only: bool) -> Self {
        Self {
            name: name.into(),
            port_name: port_name.into(),
            dtr_only,
            port: None,
        }
    }

    /// Create from params (for the factory). Requires `port`; `dtr_only`
    /// defaults to false.
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let port_name = params
            .get("port")
            .ok_or_else(|| ContractError::sink_start(&name, "missing 'port' parameter"))?;
        let dtr_only = params
            .get("dtr_only")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        Ok(Self::new(name, port_name.clone(), dtr_only))
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>, ContractError> {
        let name = self.name.clone();
        self.port
            .as_mut()
            .ok_or_else(|| ContractError::sink_command(name, "port not open"))
    }

    fn set_lines(&mut self, rts: bool, dtr: bool) -> Result<(), ContractError> {
        let name = self.name.clone();
        let port = self.port_mut()?;
        port.write_request_to_send(rts)
            .and_then(|()| port.write_data_terminal_ready(dtr))
            .map_err(|e| ContractError::sink_command(name, e.to_string()))
    }
}

#[async_trait]
impl PulseSink for SerialPortSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "serial_sink_start", skip(self), fields(sink = %self.name, port = %self.port_name))]
    async fn start(&mut self) -> Result<(), ContractError> {
        let port = serialport::new(&self.port_name, BAUD_RATE)
            .timeout(OPEN_TIMEOUT)
            .open()
            .map_err(|e| ContractError::sink_start(&self.name, e.to_string()))?;
        self.port = Some(port);
        self.set_lines(false, false)?;
        debug!(sink = %self.name, port = %self.port_name, dtr_only = self.dtr_only, "SerialPortSink opened");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), ContractError> {
        // Drop the lines if the port ever opened; a never-started sink has
        // nothing to do.
        if self.port.is_some() {
            self.set_lines(false, false)?;
        }
        Ok(())
    }

    async fn positive(&mut self) -> Result<(), ContractError> {
        if self.dtr_only {
            self.set_lines(false, true)
        } else {
            self.set_lines(true, false)
        }
    }

    async fn negative(&mut self) -> Result<(), ContractError> {
        self.set_lines(false, true)
    }

    async fn zero(&mut self) -> Result<(), ContractError> {
        self.set_lines(false, false)
    }

    fn release(&mut self) -> Result<(), ContractError> {
        self.port = None;
        debug!(sink = %self.name, "SerialPortSink released");
        Ok(())
    }
}
