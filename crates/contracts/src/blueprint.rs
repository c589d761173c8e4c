//! ServiceBlueprint - Config Loader output
//!
//! Describes a complete deployment: engine settings plus the set of pulse
//! sinks this installation drives.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::PulseSettings;

/// Configuration version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceBlueprint {
    /// Configuration version.
    #[serde(default)]
    pub version: ConfigVersion,

    /// Engine and polling parameters.
    #[serde(default)]
    pub pulse: PulseSettings,

    /// Pulse sinks to install, in dispatch order.
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// One configured pulse sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Unique name (used for logging/metrics).
    pub name: String,

    /// Sink implementation to instantiate.
    pub sink_type: SinkType,

    /// Implementation-specific parameters.
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Available sink implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log every lifecycle and voltage transition.
    Log,
    /// Broadcast voltage transitions as UDP datagrams.
    Udp,
    /// Drive RTS/DTR control lines of a serial port.
    Serial,
    /// Model an analogue clock face in the log.
    Simulator,
}
