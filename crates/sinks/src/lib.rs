//! # Sinks
//!
//! Pulse sink implementations.
//!
//! Contains LogSink, UdpBroadcastSink, SerialPortSink and SimulatorSink,
//! plus the factory that instantiates them from `SinkConfig` entries.

mod factory;
mod log;
mod serial;
mod simulator;
mod udp;

pub use factory::create_sinks;
pub use log::LogSink;
pub use serial::SerialPortSink;
pub use simulator::SimulatorSink;
pub use udp::UdpBroadcastSink;

pub use contracts::PulseSink;
