//! Poll loop statistics

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Running statistics of the perception loop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollStats {
    /// Polls completed
    pub frame_count: u64,
    /// Mean time spent per poll
    pub average_process_time: Duration,
    /// Wall-clock time of the last completed poll
    pub last_poll: Option<DateTime<Utc>>,
}

impl PollStats {
    /// Fold one poll's processing time into the running mean
    pub fn record(&mut self, process_time: Duration) {
        let n = self.frame_count as f64;
        let total = self.average_process_time.as_secs_f64() * n + process_time.as_secs_f64();
        let mean = total / (n + 1.0);

        self.average_process_time = Duration::from_secs_f64(mean);
        self.frame_count += 1;
        self.last_poll = Some(Utc::now());
    }
}

impl fmt::Display for PollStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, {:.3}s average",
            self.frame_count,
            self.average_process_time.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_mean() {
        let mut stats = PollStats::default();
        assert!(stats.last_poll.is_none());

        stats.record(Duration::from_millis(100));
        stats.record(Duration::from_millis(300));

        assert_eq!(stats.frame_count, 2);
        let mean_ms = stats.average_process_time.as_secs_f64() * 1000.0;
        assert!((mean_ms - 200.0).abs() < 1e-6);
        assert!(stats.last_poll.is_some());
    }

    #[test]
    fn test_display() {
        let mut stats = PollStats::default();
        stats.record(Duration::from_millis(250));
        assert_eq!(stats.to_string(), "1 frames, 0.250s average");
    }
}
