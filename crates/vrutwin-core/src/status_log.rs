//! Status log
//!
//! The scrolling log shown next to the twin. It keeps the most recent lines
//! only; older ones scroll away. Besides lifecycle and truck/pulse events,
//! a routine status message is picked at random every rotation interval while
//! the simulation runs.

use crate::config::LogConfig;
use crate::timer::{FiredTimer, TimerId, TimerKind, TimerQueue};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Routine messages the unit reports while running
pub const STATUS_MESSAGES: &[&str] = &[
    "Compressor discharge pressure nominal",
    "Carbon bed temperature stable",
    "Vapor inlet flow steady",
    "Condensate return pump active",
    "Hydrocarbon outlet concentration within limits",
    "Separator liquid level normal",
    "Vacuum regeneration cycle complete",
    "Absorbent circulation rate nominal",
];

/// Severity of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Routine status
    Info,
    /// Something happened (truck, pulse, lifecycle)
    Event,
}

/// One line of the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    /// Simulation time (ms since mount)
    pub at_ms: u64,
    /// Routine status or simulation event
    pub level: LogLevel,
    /// Display text
    pub message: String,
}

/// Capped log with periodic status messages
#[derive(Debug)]
pub struct StatusLog {
    capacity: usize,
    rotation: Duration,
    lines: VecDeque<LogLine>,
    rng: StdRng,
    rotation_timer: Option<TimerId>,
}

impl StatusLog {
    /// Create an empty log
    pub fn new(config: LogConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let capacity = config.capacity.max(1);
        Self {
            capacity,
            rotation: Duration::from_millis(config.rotation_ms),
            lines: VecDeque::with_capacity(capacity),
            rng,
            rotation_timer: None,
        }
    }

    /// Append a line, evicting the oldest when full
    pub fn push(&mut self, at: Duration, level: LogLevel, message: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(LogLine {
            at_ms: at.as_millis() as u64,
            level,
            message: message.into(),
        });
    }

    /// Start routine messages
    pub fn arm(&mut self, now: Duration, timers: &mut TimerQueue) {
        if self.rotation_timer.is_none() {
            self.rotation_timer = Some(timers.schedule(TimerKind::LogRotation, now + self.rotation));
        }
    }

    /// Stop routine messages
    pub fn disarm(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.rotation_timer.take() {
            timers.cancel(id);
        }
    }

    /// Handle a fired timer: append a status message and re-arm.
    /// Returns true if the timer belonged to this log.
    pub fn on_timer(&mut self, fired: &FiredTimer, timers: &mut TimerQueue) -> bool {
        if fired.kind != TimerKind::LogRotation || self.rotation_timer != Some(fired.id) {
            return false;
        }
        self.rotation_timer = None;

        let idx = self.rng.gen_range(0..STATUS_MESSAGES.len());
        self.push(fired.deadline, LogLevel::Info, STATUS_MESSAGES[idx]);
        self.arm(fired.deadline, timers);
        true
    }

    /// Lines, oldest first
    pub fn lines(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    /// Number of lines held
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drop every line
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(capacity: usize) -> StatusLog {
        StatusLog::new(LogConfig {
            capacity,
            rotation_ms: 2_000,
            seed: Some(7),
        })
    }

    #[test]
    fn test_evicts_oldest() {
        let mut log = seeded(3);
        for i in 0..5u64 {
            log.push(Duration::from_secs(i), LogLevel::Event, format!("line {}", i));
        }
        let messages: Vec<_> = log.lines().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_rotation_appends_and_rearms() {
        let mut timers = TimerQueue::new();
        let mut log = seeded(8);
        log.arm(Duration::ZERO, &mut timers);

        for second in [2u64, 4, 6] {
            let fired = timers.drain_expired(Duration::from_secs(second));
            assert_eq!(fired.len(), 1);
            assert!(log.on_timer(&fired[0], &mut timers));
        }
        assert_eq!(log.len(), 3);
        assert!(log.lines().all(|l| STATUS_MESSAGES.contains(&l.message.as_str())));
        assert_eq!(timers.pending(), 1);
    }

    #[test]
    fn test_same_seed_same_messages() {
        let run = || {
            let mut timers = TimerQueue::new();
            let mut log = seeded(8);
            log.arm(Duration::ZERO, &mut timers);
            for second in 1..=5u64 {
                for fired in timers.drain_expired(Duration::from_secs(second * 2)) {
                    log.on_timer(&fired, &mut timers);
                }
            }
            log.lines().map(|l| l.message.clone()).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_disarm_cancels() {
        let mut timers = TimerQueue::new();
        let mut log = seeded(8);
        log.arm(Duration::ZERO, &mut timers);
        log.disarm(&mut timers);
        assert!(timers.is_empty());
    }
}
