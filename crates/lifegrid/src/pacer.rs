//! # Tick Pacer
//!
//! Fixed-interval cadence for driving `tick()`.
//!
//! ## Design
//!
//! The pacer must:
//! - Start each tick one interval after the previous one started
//! - Never try to catch up after a late tick (no bursts)
//! - Record how long each tick took against its budget

use std::time::{Duration, Instant};

/// Tick timing statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickStats {
    /// Minimum tick duration observed.
    pub min_tick_us: u64,
    /// Maximum tick duration observed.
    pub max_tick_us: u64,
    /// Average tick duration (rolling).
    pub avg_tick_us: u64,
    /// Number of late ticks (took longer than the interval).
    pub late_ticks: u64,
    /// Total ticks measured.
    pub total_ticks: u64,
}

impl Default for TickStats {
    fn default() -> Self {
        Self {
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            avg_tick_us: 0,
            late_ticks: 0,
            total_ticks: 0,
        }
    }
}

/// Fixed-interval tick controller.
pub struct TickPacer {
    interval: Duration,
    next_due: Instant,
    tick_count: u64,
    stats: TickStats,
}

impl TickPacer {
    /// Creates a pacer whose first tick is due immediately.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: Instant::now(),
            tick_count: 0,
            stats: TickStats::default(),
        }
    }

    /// Sleeps until the next tick is due.
    pub fn wait_for_next_tick(&self) {
        let now = Instant::now();
        if self.next_due > now {
            std::thread::sleep(self.next_due - now);
        }
    }

    /// Marks the start of a tick and schedules the next one.
    ///
    /// Returns the tick start time for duration measurement.
    #[must_use]
    pub fn begin_tick(&mut self) -> Instant {
        let start = Instant::now();
        // A late tick pushes the schedule back instead of queueing catch-up ticks.
        self.next_due = (self.next_due + self.interval).max(start);
        self.tick_count += 1;
        start
    }

    /// Marks the end of a tick.
    ///
    /// Records statistics about tick duration.
    pub fn end_tick(&mut self, start: Instant) {
        let duration = start.elapsed();
        let duration_us = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        self.stats.total_ticks += 1;
        self.stats.min_tick_us = self.stats.min_tick_us.min(duration_us);
        self.stats.max_tick_us = self.stats.max_tick_us.max(duration_us);

        // Rolling average
        self.stats.avg_tick_us = if self.stats.total_ticks == 1 {
            duration_us
        } else {
            (self.stats.avg_tick_us.saturating_mul(15).saturating_add(duration_us)) / 16
        };

        if duration > self.interval {
            self.stats.late_ticks += 1;
        }
    }

    /// Returns the current tick count.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Returns tick statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Returns the target interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pacer_creation() {
        let pacer = TickPacer::new(Duration::from_millis(100));
        assert_eq!(pacer.tick_count(), 0);
        assert_eq!(pacer.interval(), Duration::from_millis(100));
        assert_eq!(pacer.stats().total_ticks, 0);
    }

    #[test]
    fn test_first_tick_is_immediate() {
        let pacer = TickPacer::new(Duration::from_secs(60));
        let before = Instant::now();
        pacer.wait_for_next_tick();
        assert!(before.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_interval_is_respected() {
        let mut pacer = TickPacer::new(Duration::from_millis(20));
        let begin = Instant::now();
        for _ in 0..3 {
            pacer.wait_for_next_tick();
            let start = pacer.begin_tick();
            pacer.end_tick(start);
        }
        // Ticks at 0, 20 and 40 ms.
        assert!(begin.elapsed() >= Duration::from_millis(40));
        assert_eq!(pacer.tick_count(), 3);
    }

    #[test]
    fn test_stats_tracking() {
        let mut pacer = TickPacer::new(Duration::from_millis(1));
        for _ in 0..5 {
            pacer.wait_for_next_tick();
            let start = pacer.begin_tick();
            std::thread::sleep(Duration::from_millis(2));
            pacer.end_tick(start);
        }

        let stats = pacer.stats();
        assert_eq!(stats.total_ticks, 5);
        assert_eq!(stats.late_ticks, 5);
        assert!(stats.min_tick_us >= 2_000);
        assert!(stats.min_tick_us <= stats.avg_tick_us);
        assert!(stats.avg_tick_us <= stats.max_tick_us);
    }
}
