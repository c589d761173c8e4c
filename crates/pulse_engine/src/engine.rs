//! Main pulse engine implementation.

use std::time::Duration;

use contracts::{ClockStatus, ClockTime, ContractError, PulseSettings, PulseSink};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No update received yet; sinks not started.
    Uninitialized,
    /// Following the authoritative clock one step per poll.
    Tracking,
    /// Closing a multi-minute gap on the internal catch-up clock.
    FastForwarding,
    /// Torn down; terminal.
    Stopped,
}

/// The pulse synchronization engine.
///
/// Owns the modeled analogue position and the ordered sink set. All stepping
/// happens on the caller's task: `update` suspends until the step (or the
/// whole catch-up run) has completed, so the polling loop can never overlap
/// two steps.
pub struct PulseEngine {
    settings: PulseSettings,
    sinks: Vec<Box<dyn PulseSink>>,
    modeled_time: ClockTime,
    last_authoritative: Option<ClockTime>,
    state: EngineState,
    steps_issued: u64,
}

impl PulseEngine {
    /// Create an engine over the given sink set.
    ///
    /// The modeled position starts at `settings.analogue_clock_start_time`;
    /// startup overrides are applied to the settings before construction.
    pub fn new(settings: PulseSettings, sinks: Vec<Box<dyn PulseSink>>) -> Self {
        let modeled_time = settings
            .analogue_clock_start_time
            .normalize(settings.modulus());
        Self {
            settings,
            sinks,
            modeled_time,
            last_authoritative: None,
            state: EngineState::Uninitialized,
            steps_issued: 0,
        }
    }

    /// The engine's belief about the analogue position.
    pub fn modeled_time(&self) -> ClockTime {
        self.modeled_time
    }

    /// The last actionable authoritative time seen.
    pub fn last_authoritative(&self) -> Option<ClockTime> {
        self.last_authoritative
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Total completed steps since startup.
    pub fn steps_issued(&self) -> u64 {
        self.steps_issued
    }

    /// Names of the installed sinks, in dispatch order.
    pub fn installed_sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Process one authoritative status report.
    ///
    /// # Errors
    /// A sink command failure propagates uncaught; the modeled time stays at
    /// the last completed step and the next successful poll classifies the
    /// remaining gap as a catch-up.
    #[instrument(name = "engine_update", skip(self, status), fields(modeled = %self.modeled_time))]
    pub async fn update(&mut self, status: &ClockStatus) -> Result<(), ContractError> {
        if self.state == EngineState::Stopped {
            warn!("Update after shutdown ignored");
            return Ok(());
        }
        if self.state == EngineState::Uninitialized {
            self.initialize().await?;
        }

        let Some(time) = status.actionable_time() else {
            debug!("Status carries no actionable position, skipping");
            return Ok(());
        };

        let modulus = self.settings.modulus();
        let target = time.normalize(modulus);
        self.last_authoritative = Some(target);

        if target == self.modeled_time {
            return Ok(());
        }

        if self.modeled_time.is_one_minute_before(target, modulus) {
            self.step_once().await?;
            self.modeled_time = target;
            observability::record_modeled_time(self.modeled_time.as_minutes());
            info!(time = %self.modeled_time, "Updated analogue time");
        } else {
            self.state = EngineState::FastForwarding;
            let result = self.fast_forward(target).await;
            self.state = EngineState::Tracking;
            result?;
            info!(time = %self.modeled_time, "Updated analogue time");
        }

        Ok(())
    }

    /// Tear the engine down: stop every sink, then run the synchronous and
    /// asynchronous release passes.
    ///
    /// All three passes visit every sink even when an earlier sink fails;
    /// the first error is returned after the passes complete.
    #[instrument(name = "engine_shutdown", skip(self))]
    pub async fn shutdown(&mut self) -> Result<(), ContractError> {
        if self.state == EngineState::Stopped {
            return Ok(());
        }
        info!("Stopping pulse engine");

        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.stop().await {
                warn!(sink = sink.name(), error = %e, "Sink stop failed");
                first_error.get_or_insert(e);
            }
        }
        for sink in &mut self.sinks {
            if let Err(e) = sink.release() {
                warn!(sink = sink.name(), error = %e, "Sink release failed");
                first_error.get_or_insert(e);
            }
        }
        for sink in &mut self.sinks {
            if let Err(e) = sink.release_async().await {
                warn!(sink = sink.name(), error = %e, "Sink async release failed");
                first_error.get_or_insert(e);
            }
        }

        self.state = EngineState::Stopped;
        info!("Pulse engine stopped");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// One-shot `Uninitialized -> Tracking` transition: start every sink in
    /// dispatch order, each awaited before the next.
    async fn initialize(&mut self) -> Result<(), ContractError> {
        for sink in &mut self.sinks {
            sink.start().await?;
        }
        self.state = EngineState::Tracking;
        info!(
            sinks = self.sinks.len(),
            start = %self.modeled_time,
            "Pulse engine initialized"
        );
        Ok(())
    }

    /// Close a multi-minute gap on the internal catch-up clock, one step per
    /// `fast_forward_interval_milliseconds` tick, until the modeled time
    /// reaches `target`. The caller stays suspended until convergence.
    async fn fast_forward(&mut self, target: ClockTime) -> Result<(), ContractError> {
        let modulus = self.settings.modulus();
        let distance = self.modeled_time.forward_distance(target, modulus);
        info!(
            from = %self.modeled_time,
            to = %target,
            steps = distance,
            "Fast forwarding analogue time"
        );

        let mut ticker = time::interval(Duration::from_millis(
            self.settings.fast_forward_interval_milliseconds,
        ));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; consume it so every step
        // waits a full interval.
        ticker.tick().await;

        let mut steps: u16 = 0;
        while self.modeled_time != target {
            ticker.tick().await;
            self.step_once().await?;
            self.modeled_time = self.modeled_time.succ(modulus);
            steps += 1;
            observability::record_modeled_time(self.modeled_time.as_minutes());
            debug!(time = %self.modeled_time, "Fast forwarding");
        }

        observability::record_fast_forward(steps);
        Ok(())
    }

    /// One electromechanical step: polarity phase, hold, zero phase.
    ///
    /// Polarity comes from the parity of the minute currently shown: even
    /// minutes drive negative, odd minutes positive. Bipolar movements
    /// depend on strict alternation; breaking it stalls the mechanism.
    async fn step_once(&mut self) -> Result<(), ContractError> {
        if self.modeled_time.minute() % 2 == 0 {
            self.set_negative().await?;
        } else {
            self.set_positive().await?;
        }

        time::sleep(Duration::from_millis(self.settings.pulse_duration_milliseconds)).await;
        self.set_zero().await?;

        self.steps_issued += 1;
        observability::record_step();
        Ok(())
    }

    async fn set_positive(&mut self) -> Result<(), ContractError> {
        for sink in &mut self.sinks {
            sink.positive().await?;
        }
        Ok(())
    }

    async fn set_negative(&mut self) -> Result<(), ContractError> {
        for sink in &mut self.sinks {
            sink.negative().await?;
        }
        Ok(())
    }

    async fn set_zero(&mut self) -> Result<(), ContractError> {
        for sink in &mut self.sinks {
            sink.zero().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    type EventLog = Arc<Mutex<Vec<(String, &'static str)>>>;

    /// Recording sink; optionally fails on a chosen operation.
    struct RecordingSink {
        name: String,
        events: EventLog,
        fail_on: Option<&'static str>,
    }

    impl RecordingSink {
        fn new(name: &str, events: EventLog) -> Self {
            Self {
                name: name.to_string(),
                events,
                fail_on: None,
            }
        }

        fn failing_on(name: &str, events: EventLog, op: &'static str) -> Self {
            Self {
                name: name.to_string(),
                events,
                fail_on: Some(op),
            }
        }

        fn record(&self, op: &'static str) -> Result<(), ContractError> {
            if self.fail_on == Some(op) {
                return Err(ContractError::sink_command(&self.name, "injected failure"));
            }
            self.events.lock().unwrap().push((self.name.clone(), op));
            Ok(())
        }
    }

    #[async_trait]
    impl PulseSink for RecordingSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn start(&mut self) -> Result<(), ContractError> {
            self.record("start")
        }

        async fn stop(&mut self) -> Result<(), ContractError> {
            self.record("stop")
        }

        async fn positive(&mut self) -> Result<(), ContractError> {
            self.record("positive")
        }

        async fn negative(&mut self) -> Result<(), ContractError> {
            self.record("negative")
        }

        async fn zero(&mut self) -> Result<(), ContractError> {
            self.record("zero")
        }

        fn release(&mut self) -> Result<(), ContractError> {
            self.record("release")
        }

        async fn release_async(&mut self) -> Result<(), ContractError> {
            self.record("release_async")
        }
    }

    fn settings_24h(start: &str) -> PulseSettings {
        PulseSettings {
            analogue_clock_start_time: start.parse().unwrap(),
            fast_forward_interval_milliseconds: 100,
            pulse_duration_milliseconds: 20,
            ..Default::default()
        }
    }

    fn engine_with_sinks(start: &str, names: &[&str]) -> (PulseEngine, EventLog) {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let sinks: Vec<Box<dyn PulseSink>> = names
            .iter()
            .map(|n| Box::new(RecordingSink::new(n, Arc::clone(&events))) as Box<dyn PulseSink>)
            .collect();
        (PulseEngine::new(settings_24h(start), sinks), events)
    }

    fn status(time: &str) -> ClockStatus {
        ClockStatus::running_at(time.parse().unwrap())
    }

    fn ops(events: &EventLog) -> Vec<(String, &'static str)> {
        events.lock().unwrap().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_update_starts_sinks_in_order() {
        let (mut engine, events) = engine_with_sinks("06:00", &["a", "b", "c"]);
        assert_eq!(engine.state(), EngineState::Uninitialized);

        engine.update(&status("06:00")).await.unwrap();

        assert_eq!(engine.state(), EngineState::Tracking);
        assert_eq!(
            ops(&events),
            vec![
                ("a".to_string(), "start"),
                ("b".to_string(), "start"),
                ("c".to_string(), "start"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_flagged_status_is_ignored() {
        let (mut engine, events) = engine_with_sinks("06:00", &["a"]);
        engine.update(&status("06:00")).await.unwrap();
        events.lock().unwrap().clear();

        for flagged in [
            ClockStatus {
                is_unavailable: true,
                ..status("07:30")
            },
            ClockStatus {
                is_realtime: true,
                ..status("07:30")
            },
            ClockStatus {
                is_paused: true,
                ..status("07:30")
            },
        ] {
            engine.update(&flagged).await.unwrap();
        }

        assert_eq!(engine.modeled_time(), "06:00".parse().unwrap());
        assert!(ops(&events).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_equal_target_is_idempotent() {
        let (mut engine, events) = engine_with_sinks("06:00", &["a"]);
        engine.update(&status("06:00")).await.unwrap();
        events.lock().unwrap().clear();

        engine.update(&status("06:00")).await.unwrap();
        engine.update(&status("06:00")).await.unwrap();

        assert!(ops(&events).is_empty());
        assert_eq!(engine.steps_issued(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_step_even_minute_is_negative() {
        let (mut engine, events) = engine_with_sinks("06:00", &["a"]);
        engine.update(&status("06:01")).await.unwrap();

        assert_eq!(engine.modeled_time(), "06:01".parse().unwrap());
        assert_eq!(engine.steps_issued(), 1);
        assert_eq!(
            ops(&events),
            vec![
                ("a".to_string(), "start"),
                ("a".to_string(), "negative"),
                ("a".to_string(), "zero"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_step_odd_minute_is_positive() {
        let (mut engine, events) = engine_with_sinks("06:01", &["a"]);
        engine.update(&status("06:02")).await.unwrap();

        let polarity_ops: Vec<_> = ops(&events)
            .into_iter()
            .filter(|(_, op)| *op == "positive" || *op == "negative")
            .collect();
        assert_eq!(polarity_ops, vec![("a".to_string(), "positive")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fanout_order_per_phase() {
        let (mut engine, events) = engine_with_sinks("06:01", &["a", "b", "c"]);
        engine.update(&status("06:02")).await.unwrap();

        let step_ops: Vec<_> = ops(&events)
            .into_iter()
            .filter(|(_, op)| *op != "start")
            .collect();
        assert_eq!(
            step_ops,
            vec![
                ("a".to_string(), "positive"),
                ("b".to_string(), "positive"),
                ("c".to_string(), "positive"),
                ("a".to_string(), "zero"),
                ("b".to_string(), "zero"),
                ("c".to_string(), "zero"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_forward_counts_steps() {
        let (mut engine, _events) = engine_with_sinks("06:00", &["a"]);
        engine.update(&status("06:10")).await.unwrap();

        assert_eq!(engine.modeled_time(), "06:10".parse().unwrap());
        assert_eq!(engine.steps_issued(), 10);
        assert_eq!(engine.state(), EngineState::Tracking);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_forward_paces_steps_by_interval() {
        let (mut engine, _events) = engine_with_sinks("06:00", &["a"]);

        // 10 steps at one per 100 ms tick: the run cannot converge in less
        // than a full second, even on the paused clock.
        let started = time::Instant::now();
        engine.update(&status("06:10")).await.unwrap();

        assert_eq!(engine.steps_issued(), 10);
        assert!(
            started.elapsed() >= Duration::from_millis(10 * 100),
            "catch-up finished after {:?}, faster than one step per tick",
            started.elapsed()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_holds_pulse_for_configured_duration() {
        /// Records the virtual instant of every voltage transition.
        struct TimestampingSink {
            timeline: Arc<Mutex<Vec<(&'static str, time::Instant)>>>,
        }

        #[async_trait]
        impl PulseSink for TimestampingSink {
            fn name(&self) -> &str {
                "timeline"
            }
            async fn start(&mut self) -> Result<(), ContractError> {
                Ok(())
            }
            async fn stop(&mut self) -> Result<(), ContractError> {
                Ok(())
            }
            async fn positive(&mut self) -> Result<(), ContractError> {
                self.timeline
                    .lock()
                    .unwrap()
                    .push(("positive", time::Instant::now()));
                Ok(())
            }
            async fn negative(&mut self) -> Result<(), ContractError> {
                self.timeline
                    .lock()
                    .unwrap()
                    .push(("negative", time::Instant::now()));
                Ok(())
            }
            async fn zero(&mut self) -> Result<(), ContractError> {
                self.timeline
                    .lock()
                    .unwrap()
                    .push(("zero", time::Instant::now()));
                Ok(())
            }
        }

        let timeline = Arc::new(Mutex::new(Vec::new()));
        let sinks: Vec<Box<dyn PulseSink>> = vec![Box::new(TimestampingSink {
            timeline: Arc::clone(&timeline),
        })];
        let mut engine = PulseEngine::new(settings_24h("06:00"), sinks);

        engine.update(&status("06:01")).await.unwrap();

        let recorded = timeline.lock().unwrap().clone();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].0, "negative");
        assert_eq!(recorded[1].0, "zero");
        let held = recorded[1].1 - recorded[0].1;
        assert!(
            held >= Duration::from_millis(20),
            "zero phase followed polarity after only {held:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_forward_across_midnight() {
        let (mut engine, _events) = engine_with_sinks("23:59", &["a"]);
        engine.update(&status("00:01")).await.unwrap();

        assert_eq!(engine.modeled_time(), "00:01".parse().unwrap());
        assert_eq!(engine.steps_issued(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_forward_alternates_polarity() {
        let (mut engine, events) = engine_with_sinks("06:00", &["a"]);
        engine.update(&status("06:04")).await.unwrap();

        let polarity_ops: Vec<_> = ops(&events)
            .into_iter()
            .filter(|(_, op)| *op == "positive" || *op == "negative")
            .map(|(_, op)| op)
            .collect();
        assert_eq!(
            polarity_ops,
            vec!["negative", "positive", "negative", "positive"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_12h_dial_normalizes_target() {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let sinks: Vec<Box<dyn PulseSink>> =
            vec![Box::new(RecordingSink::new("a", Arc::clone(&events)))];
        let settings = PulseSettings {
            use_12_hour_clock: true,
            analogue_clock_start_time: "11:59".parse().unwrap(),
            fast_forward_interval_milliseconds: 100,
            pulse_duration_milliseconds: 20,
            ..Default::default()
        };
        let mut engine = PulseEngine::new(settings, sinks);

        // 12:01 normalizes to 00:01 on a 12-hour dial: two steps from 11:59.
        engine.update(&status("12:01")).await.unwrap();
        assert_eq!(engine.modeled_time(), "00:01".parse().unwrap());
        assert_eq!(engine.steps_issued(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_sink_set_still_tracks() {
        let (mut engine, _events) = engine_with_sinks("06:00", &[]);
        engine.update(&status("06:05")).await.unwrap();
        assert_eq!(engine.modeled_time(), "06:05".parse().unwrap());
        assert_eq!(engine.steps_issued(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_sink_aborts_catch_up() {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let sinks: Vec<Box<dyn PulseSink>> = vec![Box::new(RecordingSink::failing_on(
            "a",
            Arc::clone(&events),
            "positive",
        ))];
        let mut engine = PulseEngine::new(settings_24h("06:00"), sinks);

        // Step 1 (minute 0, even) drives negative and completes; step 2
        // (minute 1, odd) needs positive and fails.
        let result = engine.update(&status("06:03")).await;
        assert!(matches!(result, Err(ContractError::SinkCommand { .. })));
        assert_eq!(engine.modeled_time(), "06:01".parse().unwrap());
        assert_eq!(engine.steps_issued(), 1);
        assert_eq!(engine.state(), EngineState::Tracking);

        // The next poll reclassifies the remaining gap as a catch-up; with
        // the failure cleared it converges.
        let remaining = ops(&events).len();
        assert!(remaining > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_sink_skips_remaining_peers() {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let sinks: Vec<Box<dyn PulseSink>> = vec![
            Box::new(RecordingSink::new("a", Arc::clone(&events))),
            Box::new(RecordingSink::failing_on("b", Arc::clone(&events), "negative")),
            Box::new(RecordingSink::new("c", Arc::clone(&events))),
        ];
        let mut engine = PulseEngine::new(settings_24h("06:00"), sinks);

        assert!(engine.update(&status("06:01")).await.is_err());

        let step_ops: Vec<_> = ops(&events)
            .into_iter()
            .filter(|(_, op)| *op != "start")
            .collect();
        // a got its polarity call, b failed, c was never commanded.
        assert_eq!(step_ops, vec![("a".to_string(), "negative")]);
        assert_eq!(engine.modeled_time(), "06:00".parse().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_runs_all_passes_in_order() {
        let (mut engine, events) = engine_with_sinks("06:00", &["a", "b"]);
        engine.update(&status("06:00")).await.unwrap();
        events.lock().unwrap().clear();

        engine.shutdown().await.unwrap();
        assert_eq!(engine.state(), EngineState::Stopped);
        assert_eq!(
            ops(&events),
            vec![
                ("a".to_string(), "stop"),
                ("b".to_string(), "stop"),
                ("a".to_string(), "release"),
                ("b".to_string(), "release"),
                ("a".to_string(), "release_async"),
                ("b".to_string(), "release_async"),
            ]
        );

        // Updates after teardown are ignored.
        engine.update(&status("07:00")).await.unwrap();
        assert_eq!(engine.modeled_time(), "06:00".parse().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_without_start_is_clean() {
        let (mut engine, events) = engine_with_sinks("06:00", &["a"]);
        engine.shutdown().await.unwrap();
        // stop/release still run; stop must tolerate a never-started sink.
        assert_eq!(ops(&events)[0], ("a".to_string(), "stop"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_teardown_does_not_block_peers() {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let sinks: Vec<Box<dyn PulseSink>> = vec![
            Box::new(RecordingSink::failing_on("a", Arc::clone(&events), "stop")),
            Box::new(RecordingSink::new("b", Arc::clone(&events))),
        ];
        let mut engine = PulseEngine::new(settings_24h("06:00"), sinks);

        let result = engine.shutdown().await;
        assert!(result.is_err());
        // b still stopped and both sinks were released.
        let recorded = ops(&events);
        assert!(recorded.contains(&("b".to_string(), "stop")));
        assert!(recorded.contains(&("a".to_string(), "release")));
        assert!(recorded.contains(&("b".to_string(), "release_async")));
    }
}
