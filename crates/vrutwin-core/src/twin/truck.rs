//! Truck visitation cycle
//!
//! A delivery truck parks at the start, drives up to the dispenser, fills for
//! a while with the hose connected, drives off and reappears at the start:
//!
//! ```text
//! Idle --cycle delay--> Arriving --reached--> Filling --fill time--> Leaving
//!   ^                                                                   |
//!   +------------------------- Resetting <--------reached---------------+
//! ```
//!
//! State changes go through the pure [`transition`] function. [`TruckCycle`]
//! wraps it with the position, the frame motion and the timers that produce
//! the time-based events.

use crate::config::TruckConfig;
use crate::geometry::Position;
use crate::timer::{FiredTimer, TimerId, TimerKind, TimerQueue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the truck is in its visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruckState {
    /// Parked at the start position
    #[default]
    Idle,
    /// Driving toward the dispenser
    Arriving,
    /// Parked at the dispenser with the hose connected
    Filling,
    /// Driving toward the exit
    Leaving,
    /// Jumping back to the start position
    Resetting,
}

/// Inputs to the truck state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruckEvent {
    /// The idle wait elapsed
    CycleDelayElapsed,
    /// The truck got within epsilon of its target
    ReachedTarget,
    /// The fill time elapsed
    FillElapsed,
    /// The truck was put back at the start
    Reset,
    /// The simulation stopped
    Stop,
}

/// Next state for `event` in `state`. Events that do not apply leave the
/// state unchanged.
pub fn transition(state: TruckState, event: TruckEvent) -> TruckState {
    use TruckEvent as E;
    use TruckState as S;

    match (state, event) {
        (_, E::Stop) => S::Idle,
        (S::Idle, E::CycleDelayElapsed) => S::Arriving,
        (S::Arriving, E::ReachedTarget) => S::Filling,
        (S::Filling, E::FillElapsed) => S::Leaving,
        (S::Leaving, E::ReachedTarget) => S::Resetting,
        (S::Resetting, E::Reset) => S::Idle,
        (s, _) => s,
    }
}

/// A state change, with the time it happened at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruckTransition {
    /// State before the change
    pub from: TruckState,
    /// State after the change
    pub to: TruckState,
    /// Time since mount
    pub at: Duration,
}

/// The truck, its position and its pending timer
#[derive(Debug, Clone)]
pub struct TruckCycle {
    config: TruckConfig,
    state: TruckState,
    position: Position,
    /// Cycle delay while idle, fill duration while filling
    timer: Option<TimerId>,
}

impl TruckCycle {
    /// Create an idle truck at the start position
    pub fn new(config: TruckConfig) -> Self {
        Self {
            position: config.start_position,
            config,
            state: TruckState::Idle,
            timer: None,
        }
    }

    /// Current state
    pub fn state(&self) -> TruckState {
        self.state
    }

    /// Current position
    pub fn position(&self) -> Position {
        self.position
    }

    /// Whether the hose is drawn between truck and dispenser
    pub fn hose_connected(&self) -> bool {
        self.state == TruckState::Filling
    }

    /// Pending cycle-delay or fill timer
    pub fn pending_timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// The simulation started running: arm the idle wait
    pub fn start(&mut self, now: Duration, timers: &mut TimerQueue) {
        if self.state == TruckState::Idle && self.timer.is_none() {
            self.arm(TimerKind::CycleDelay, now + self.config.cycle_delay(), timers);
        }
    }

    /// The simulation stopped: back to idle at the start, nothing pending
    pub fn stop(&mut self, now: Duration, timers: &mut TimerQueue) -> Option<TruckTransition> {
        if let Some(id) = self.timer.take() {
            timers.cancel(id);
        }
        self.position = self.config.start_position;
        self.apply(TruckEvent::Stop, now)
    }

    /// Handle a fired timer. Timers this truck no longer owns are ignored.
    pub fn on_timer(&mut self, fired: &FiredTimer) -> Option<TruckTransition> {
        if self.timer != Some(fired.id) {
            return None;
        }
        self.timer = None;

        let now = fired.deadline;
        match fired.kind {
            TimerKind::CycleDelay => self.apply(TruckEvent::CycleDelayElapsed, now),
            TimerKind::FillDuration => self.apply(TruckEvent::FillElapsed, now),
            _ => None,
        }
    }

    /// Advance motion by one frame of `dt`, returning the transitions made
    pub fn advance(
        &mut self,
        dt: Duration,
        now: Duration,
        timers: &mut TimerQueue,
    ) -> Vec<TruckTransition> {
        let mut changes = Vec::new();

        let target = match self.state {
            TruckState::Arriving => self.config.filling_position,
            TruckState::Leaving => self.config.end_position,
            _ => return changes,
        };

        let factor = (self.config.speed * dt.as_secs_f64()).min(1.0);
        self.position = self.position.lerp(target, factor);

        if self.position.distance(target) >= self.config.arrival_epsilon {
            return changes;
        }

        self.position = target;
        changes.extend(self.apply(TruckEvent::ReachedTarget, now));

        match self.state {
            TruckState::Filling => {
                self.arm(TimerKind::FillDuration, now + self.config.fill_duration(), timers);
            }
            TruckState::Resetting => {
                self.position = self.config.start_position;
                changes.extend(self.apply(TruckEvent::Reset, now));
                self.arm(TimerKind::CycleDelay, now + self.config.cycle_delay(), timers);
            }
            _ => {}
        }

        changes
    }

    fn arm(&mut self, kind: TimerKind, deadline: Duration, timers: &mut TimerQueue) {
        if let Some(previous) = self.timer.take() {
            timers.cancel(previous);
        }
        self.timer = Some(timers.schedule(kind, deadline));
    }

    fn apply(&mut self, event: TruckEvent, now: Duration) -> Option<TruckTransition> {
        let next = transition(self.state, event);
        if next == self.state {
            return None;
        }
        tracing::debug!(from = ?self.state, to = ?next, ?event, "Truck transition");
        let change = TruckTransition {
            from: self.state,
            to: next,
            at: now,
        };
        self.state = next;
        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use TruckEvent as E;
        use TruckState as S;

        assert_eq!(transition(S::Idle, E::CycleDelayElapsed), S::Arriving);
        assert_eq!(transition(S::Arriving, E::ReachedTarget), S::Filling);
        assert_eq!(transition(S::Filling, E::FillElapsed), S::Leaving);
        assert_eq!(transition(S::Leaving, E::ReachedTarget), S::Resetting);
        assert_eq!(transition(S::Resetting, E::Reset), S::Idle);
    }

    #[test]
    fn test_inapplicable_events_are_ignored() {
        use TruckEvent as E;
        use TruckState as S;

        assert_eq!(transition(S::Idle, E::ReachedTarget), S::Idle);
        assert_eq!(transition(S::Arriving, E::FillElapsed), S::Arriving);
        assert_eq!(transition(S::Filling, E::CycleDelayElapsed), S::Filling);
        assert_eq!(transition(S::Leaving, E::Reset), S::Leaving);
    }

    #[test]
    fn test_stop_from_any_state() {
        for s in [
            TruckState::Idle,
            TruckState::Arriving,
            TruckState::Filling,
            TruckState::Leaving,
            TruckState::Resetting,
        ] {
            assert_eq!(transition(s, TruckEvent::Stop), TruckState::Idle);
        }
    }

    #[test]
    fn test_start_arms_cycle_delay_once() {
        let mut timers = TimerQueue::new();
        let mut truck = TruckCycle::new(TruckConfig::default());
        truck.start(Duration::ZERO, &mut timers);
        truck.start(Duration::from_secs(1), &mut timers);
        assert_eq!(timers.pending(), 1);
        assert_eq!(
            timers.deadline(truck.pending_timer().unwrap()),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_exponential_approach_never_overshoots() {
        let mut timers = TimerQueue::new();
        let config = TruckConfig::default();
        let mut truck = TruckCycle::new(config);
        truck.start(Duration::ZERO, &mut timers);
        let fired = timers.drain_expired(Duration::from_secs(10));
        truck.on_timer(&fired[0]);
        assert_eq!(truck.state(), TruckState::Arriving);

        let dt = Duration::from_millis(16);
        let mut last_distance = truck.position().distance(config.filling_position);
        for _ in 0..10 {
            truck.advance(dt, Duration::from_secs(10), &mut timers);
            let d = truck.position().distance(config.filling_position);
            assert!(d < last_distance);
            assert!(truck.position().x <= config.filling_position.x);
            last_distance = d;
        }
    }

    #[test]
    fn test_foreign_timer_ignored() {
        let mut timers = TimerQueue::new();
        let mut truck = TruckCycle::new(TruckConfig::default());
        let other = timers.schedule(TimerKind::CycleDelay, Duration::ZERO);
        let fired = FiredTimer {
            id: other,
            kind: TimerKind::CycleDelay,
            deadline: Duration::ZERO,
        };
        assert!(truck.on_timer(&fired).is_none());
        assert_eq!(truck.state(), TruckState::Idle);
    }
}
