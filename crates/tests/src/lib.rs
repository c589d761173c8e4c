//! # Integration Tests
//!
//! End-to-end tests over the full service path, no network required:
//! scripted status source -> poller -> engine -> recording sinks.

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use contracts::{ClockStatus, ContractError, PulseSettings, PulseSink};
    use poller::Poller;
    use pulse_engine::PulseEngine;
    use status_client::{MockStatusSource, ScriptedPoll};
    use tokio::sync::watch;
    use tokio::time;

    type EventLog = Arc<Mutex<Vec<(String, &'static str)>>>;

    struct RecordingSink {
        name: String,
        events: EventLog,
    }

    impl RecordingSink {
        fn boxed(name: &str, events: &EventLog) -> Box<dyn PulseSink> {
            Box::new(Self {
                name: name.to_string(),
                events: Arc::clone(events),
            })
        }

        fn record(&self, op: &'static str) {
            self.events.lock().unwrap().push((self.name.clone(), op));
        }
    }

    #[async_trait]
    impl PulseSink for RecordingSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn start(&mut self) -> Result<(), ContractError> {
            self.record("start");
            Ok(())
        }

        async fn stop(&mut self) -> Result<(), ContractError> {
            self.record("stop");
            Ok(())
        }

        async fn positive(&mut self) -> Result<(), ContractError> {
            self.record("positive");
            Ok(())
        }

        async fn negative(&mut self) -> Result<(), ContractError> {
            self.record("negative");
            Ok(())
        }

        async fn zero(&mut self) -> Result<(), ContractError> {
            self.record("zero");
            Ok(())
        }
    }

    fn settings() -> PulseSettings {
        PulseSettings {
            analogue_clock_start_time: "06:00".parse().unwrap(),
            poll_interval_seconds: 10,
            fast_forward_interval_milliseconds: 100,
            pulse_duration_milliseconds: 20,
            error_wait_retry_milliseconds: 5000,
            remote_clock_time_href: "http://test/api/clock".into(),
            ..Default::default()
        }
    }

    fn ops_for<'a>(events: &'a [(String, &'static str)], name: &str) -> Vec<&'static str> {
        events
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, op)| *op)
            .collect()
    }

    /// End-to-end: scripted source -> Poller -> PulseEngine -> two sinks.
    ///
    /// Steady tracking over three polls, one minute apart, then shutdown.
    /// Every sink sees start, alternating-polarity steps, and stop.
    #[tokio::test(start_paused = true)]
    async fn test_e2e_steady_tracking() {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let sink_set = vec![
            RecordingSink::boxed("primary", &events),
            RecordingSink::boxed("secondary", &events),
        ];

        let engine = PulseEngine::new(settings(), sink_set);
        let source = MockStatusSource::running_at(&["06:00", "06:01", "06:02"]);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let poller = Poller::new(source, engine, &settings(), shutdown_rx);
        let handle = tokio::spawn(poller.run());

        time::sleep(Duration::from_secs(25)).await;
        shutdown_tx.send(true).unwrap();
        let stats = handle.await.unwrap();

        assert_eq!(stats.polls, 3);
        assert_eq!(stats.failures, 0);
        assert_eq!(stats.steps, 2);
        assert_eq!(stats.final_time, "06:02".parse().unwrap());

        let recorded = events.lock().unwrap().clone();
        // 06:01 is odd (positive), 06:02 is even (negative)
        let expected = vec!["start", "positive", "zero", "negative", "zero", "stop"];
        assert_eq!(ops_for(&recorded, "primary"), expected);
        assert_eq!(ops_for(&recorded, "secondary"), expected);

        // Per phase, primary is always driven before secondary
        for pair in recorded.chunks(2) {
            assert_eq!(pair[0].0, "primary");
            assert_eq!(pair[1].0, "secondary");
            assert_eq!(pair[0].1, pair[1].1);
        }
    }

    /// A large gap on the first poll is closed by a fast-forward run.
    #[tokio::test(start_paused = true)]
    async fn test_e2e_catch_up_after_outage() {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let sink_set = vec![RecordingSink::boxed("movement", &events)];

        let engine = PulseEngine::new(settings(), sink_set);
        // Service comes up at 06:00 but the authoritative time is 06:30
        let source = MockStatusSource::running_at(&["06:30"]);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let poller = Poller::new(source, engine, &settings(), shutdown_rx);
        let handle = tokio::spawn(poller.run());

        time::sleep(Duration::from_secs(8)).await;
        shutdown_tx.send(true).unwrap();
        let stats = handle.await.unwrap();

        assert_eq!(stats.steps, 30);
        assert_eq!(stats.final_time, "06:30".parse().unwrap());

        let recorded = events.lock().unwrap().clone();
        let ops = ops_for(&recorded, "movement");
        // 30 two-phase steps plus start/stop
        assert_eq!(ops.len(), 62);
        // Polarity alternates minute by minute: 06:01 positive, 06:02 negative...
        assert_eq!(ops[1], "positive");
        assert_eq!(ops[3], "negative");
        assert_eq!(ops[5], "positive");
    }

    /// Source outages leave the modeled position untouched; recovery
    /// catches up in one run.
    #[tokio::test(start_paused = true)]
    async fn test_e2e_outage_then_recovery() {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let sink_set = vec![RecordingSink::boxed("movement", &events)];

        let engine = PulseEngine::new(settings(), sink_set);
        let source = MockStatusSource::new([
            ScriptedPoll::Status(ClockStatus::running_at("06:01".parse().unwrap())),
            ScriptedPoll::Failure("gateway timeout".into()),
            ScriptedPoll::Failure("gateway timeout".into()),
            ScriptedPoll::Status(ClockStatus::running_at("06:04".parse().unwrap())),
        ]);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let poller = Poller::new(source, engine, &settings(), shutdown_rx);
        let handle = tokio::spawn(poller.run());

        // Ticks at 0/10/20/30 s; failed polls add a 5 s retry wait.
        time::sleep(Duration::from_secs(38)).await;
        shutdown_tx.send(true).unwrap();
        let stats = handle.await.unwrap();

        assert_eq!(stats.polls, 4);
        assert_eq!(stats.failures, 2);
        // One step to 06:01, then a three-step catch-up to 06:04
        assert_eq!(stats.steps, 4);
        assert_eq!(stats.final_time, "06:04".parse().unwrap());
    }

    /// A paused or unavailable source must not move the clocks.
    #[tokio::test(start_paused = true)]
    async fn test_e2e_flagged_reports_hold_position() {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let sink_set = vec![RecordingSink::boxed("movement", &events)];

        let engine = PulseEngine::new(settings(), sink_set);
        let paused = ClockStatus {
            time: Some("09:00".parse().unwrap()),
            is_paused: true,
            ..Default::default()
        };
        let unavailable = ClockStatus {
            is_unavailable: true,
            ..Default::default()
        };
        let source = MockStatusSource::new([
            ScriptedPoll::Status(paused),
            ScriptedPoll::Status(unavailable),
            ScriptedPoll::Status(ClockStatus::running_at("06:01".parse().unwrap())),
        ]);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let poller = Poller::new(source, engine, &settings(), shutdown_rx);
        let handle = tokio::spawn(poller.run());

        time::sleep(Duration::from_secs(25)).await;
        shutdown_tx.send(true).unwrap();
        let stats = handle.await.unwrap();

        // Flagged reports are successful polls that move nothing
        assert_eq!(stats.polls, 3);
        assert_eq!(stats.failures, 0);
        assert_eq!(stats.steps, 1);
        assert_eq!(stats.final_time, "06:01".parse().unwrap());
    }

    /// Configuration loaded from TOML builds a working sink set.
    #[tokio::test]
    async fn test_config_to_sink_set() {
        let blueprint = config_loader::ConfigLoader::load_from_str(
            r#"
[pulse]
remote_clock_time_href = "http://192.168.1.2/api/clock/time"
use_12_hour_clock = true

[[sinks]]
name = "console"
sink_type = "log"

[[sinks]]
name = "face"
sink_type = "simulator"
"#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let sink_set = sinks::create_sinks(&blueprint.sinks, &blueprint.pulse).unwrap();
        let mut engine = PulseEngine::new(blueprint.pulse, sink_set);

        let status = ClockStatus::running_at("06:01".parse().unwrap());
        engine.update(&status).await.unwrap();
        assert_eq!(engine.steps_issued(), 1);
        assert_eq!(engine.installed_sink_names(), vec!["console", "face"]);

        engine.shutdown().await.unwrap();
    }
}
