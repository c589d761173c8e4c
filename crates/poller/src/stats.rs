//! Run statistics for the polling loop

use std::time::Duration;

use contracts::ClockTime;

/// Summary of one polling run, returned when the loop exits.
#[derive(Debug, Clone)]
pub struct PollerStats {
    /// Total polls attempted.
    pub polls: u64,
    /// Polls that failed (transport, response, or decode).
    pub failures: u64,
    /// Electromechanical steps completed by the engine.
    pub steps: u64,
    /// Wall-clock duration of the run.
    pub duration: Duration,
    /// Modeled analogue position at shutdown.
    pub final_time: ClockTime,
}

impl PollerStats {
    /// Print a human-readable run summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Run Summary ===");
        println!("  Polls:      {} ({} failed)", self.polls, self.failures);
        println!("  Steps:      {}", self.steps);
        println!("  Duration:   {:.1}s", self.duration.as_secs_f64());
        println!("  Final time: {}", self.final_time);
    }
}
