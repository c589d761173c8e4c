//! Sink factory - instantiates sinks from configuration

use contracts::{ContractError, PulseSettings, PulseSink, SinkConfig, SinkType};
use tracing::{info, instrument};

use crate::{LogSink, SerialPortSink, SimulatorSink, UdpBroadcastSink};

/// Build the ordered sink set from configuration.
///
/// Order is preserved: the engine dispatches pulses in exactly this order.
/// No transport is touched here; each sink connects in its own `start()`.
#[instrument(name = "create_sinks", skip(configs, settings), fields(sink_count = configs.len()))]
pub fn create_sinks(
    configs: &[SinkConfig],
    settings: &PulseSettings,
) -> Result<Vec<Box<dyn PulseSink>>, ContractError> {
    let mut sinks: Vec<Box<dyn PulseSink>> = Vec::with_capacity(configs.len());
    for config in configs {
        sinks.push(create_sink(config, settings)?);
        info!(sink = %config.name, sink_type = ?config.sink_type, "Sink installed");
    }
    Ok(sinks)
}

fn create_sink(
    config: &SinkConfig,
    settings: &PulseSettings,
) -> Result<Box<dyn PulseSink>, ContractError> {
    match config.sink_type {
        SinkType::Log => Ok(Box::new(LogSink::new(&config.name))),
        SinkType::Udp => Ok(Box::new(UdpBroadcastSink::from_params(
            &config.name,
            &config.params,
        )?)),
        SinkType::Serial => Ok(Box::new(SerialPortSink::from_params(
            &config.name,
            &config.params,
        )?)),
        SinkType::Simulator => Ok(Box::new(SimulatorSink::new(
            &config.name,
            settings.analogue_clock_start_time,
            settings.modulus(),
        ))),
    }
}
