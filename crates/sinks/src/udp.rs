//! UdpBroadcastSink - voltage transitions as broadcast datagrams
//!
//! Wire format: a single ASCII byte per transition, `+` / `-` / `0`.
//! Receivers on the layout network (turnout decoders, secondary clock
//! drivers) key off exactly these three bytes.

use std::collections::HashMap;
use std::net::SocketAddr;

use async_trait::async_trait;
use contracts::{ContractError, PulseSink};
use tokio::net::UdpSocket;
use tracing::{debug, instrument};

const POSITIVE: &[u8] = b"+";
const NEGATIVE: &[u8] = b"-";
const ZERO: &[u8] = b"0";

/// Sink that broadcasts each voltage transition over UDP.
pub struct UdpBroadcastSink {
    name: String,
    addr: SocketAddr,
    socket: Option<UdpSocket>,
}

impl UdpBroadcastSink {
    /// Create a sink targeting the given endpoint. The socket is bound in
    /// `start()`, not here.
    pub fn new(name: impl Into<String>, addr: SocketAddr) -> Self {
        Self {
            name: name.into(),
            addr,
            socket: None,
        }
    }

    /// Create from params (for the factory). Requires `addr`.
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let addr_str = params
            .get("addr")
            .ok_or_else(|| ContractError::sink_start(&name, "missing 'addr' parameter"))?;
        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| ContractError::sink_start(&name, format!("invalid address '{addr_str}': {e}")))?;
        Ok(Self::new(name, addr))
    }

    async fn transmit(&self, payload: &[u8]) -> Result<(), ContractError> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| ContractError::sink_command(&self.name, "socket not bound"))?;
        socket
            .send_to(payload, self.addr)
            .await
            .map_err(|e| ContractError::sink_command(&self.name, e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl PulseSink for UdpBroadcastSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "udp_sink_start", skip(self), fields(sink = %self.name, target = %self.addr))]
    async fn start(&mut self) -> Result<(), ContractError> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| ContractError::sink_start(&self.name, e.to_string()))?;
        socket
            .set_broadcast(true)
            .map_err(|e| ContractError::sink_start(&self.name, e.to_string()))?;
        self.socket = Some(socket);
        debug!(sink = %self.name, target = %self.addr, "UdpBroadcastSink bound");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), ContractError> {
        // Send a final zero so no receiver is left holding a pulse.
        if self.socket.is_some() {
            self.transmit(ZERO).await?;
        }
        Ok(())
    }

    async fn positive(&mut self) -> Result<(), ContractError> {
        self.transmit(POSITIVE).await
    }

    async fn negative(&mut self) -> Result<(), ContractError> {
        self.transmit(NEGATIVE).await
    }

    async fn zero(&mut self) -> Result<(), ContractError> {
        self.transmit(ZERO).await
    }

    fn release(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(sink = %self.name, "UdpBroadcastSink released");
        Ok(())
    }
}
