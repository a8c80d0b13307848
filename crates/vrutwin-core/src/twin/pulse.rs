//! Buffer-tank pulse trigger
//!
//! Each time the recovered volume fills another buffer tank the twin shows a
//! short secondary flow (the tank auto-transferring). The flag is raised when
//! liters reach the next multiple of the tank size and cleared by a timer.

use crate::config::PulseConfig;
use crate::timer::{FiredTimer, TimerId, TimerKind, TimerQueue};
use std::time::Duration;

/// Derives the transient secondary-flow flag from liters recovered
#[derive(Debug, Clone)]
pub struct PulseTrigger {
    threshold: f64,
    visible_for: Duration,
    visible: bool,
    last_trigger_liters: f64,
    clear_timer: Option<TimerId>,
    trigger_count: u64,
}

impl PulseTrigger {
    /// Create a trigger with no pulse fired yet
    pub fn new(config: PulseConfig) -> Self {
        Self {
            threshold: config.threshold_liters,
            visible_for: config.visible_for(),
            visible: false,
            last_trigger_liters: 0.0,
            clear_timer: None,
            trigger_count: 0,
        }
    }

    /// Feed the latest liters value. Returns true if a pulse fired.
    ///
    /// Crossing several multiples between two observations fires once; the
    /// bookkeeping snaps to the highest multiple reached.
    pub fn observe(&mut self, liters: f64, now: Duration, timers: &mut TimerQueue) -> bool {
        if liters < self.last_trigger_liters + self.threshold {
            return false;
        }

        self.visible = true;
        self.last_trigger_liters = (liters / self.threshold).floor() * self.threshold;
        self.trigger_count += 1;

        if let Some(previous) = self.clear_timer.take() {
            timers.cancel(previous);
        }
        self.clear_timer = Some(timers.schedule(TimerKind::PulseClear, now + self.visible_for));

        tracing::debug!(
            liters,
            band = self.last_trigger_liters,
            "Buffer tank full, secondary flow pulse"
        );
        true
    }

    /// Handle a fired timer. Returns true if it cleared the flag.
    pub fn on_timer(&mut self, fired: &FiredTimer) -> bool {
        if fired.kind != TimerKind::PulseClear || self.clear_timer != Some(fired.id) {
            return false;
        }
        self.clear_timer = None;
        self.visible = false;
        true
    }

    /// Clear the flag and bookkeeping, cancelling any pending clear
    pub fn reset(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.clear_timer.take() {
            timers.cancel(id);
        }
        self.visible = false;
        self.last_trigger_liters = 0.0;
    }

    /// Align the bookkeeping with a volume reached earlier, without firing.
    ///
    /// Used when resuming from a frozen value so bands already passed do not
    /// pulse again.
    pub fn rebase(&mut self, liters: f64) {
        self.last_trigger_liters = (liters / self.threshold).floor() * self.threshold;
    }

    /// Whether the secondary flow is showing
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Last multiple of the threshold that fired
    pub fn last_trigger_liters(&self) -> f64 {
        self.last_trigger_liters
    }

    /// Pulses fired since creation
    pub fn trigger_count(&self) -> u64 {
        self.trigger_count
    }

    /// Pending clear timer, if any
    pub fn clear_timer(&self) -> Option<TimerId> {
        self.clear_timer
    }
}
