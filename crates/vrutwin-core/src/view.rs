//! Simulation View
//!
//! One mounted twin: accrual clock, pulse trigger, truck, vapor flow and the
//! status log, sharing a single [`TimerQueue`]. Nothing here reads a clock;
//! the owner calls [`SimulationView::on_tick`] on the accrual interval and
//! [`SimulationView::on_frame`] on every display frame, passing the time
//! since mount.
//!
//! Stopping, switching facility and tearing down all cancel every pending
//! timer, so no callback can act on a view after its owner has moved on.

use crate::config::TwinConfig;
use crate::facility::FacilityType;
use crate::geometry::Position;
use crate::status_log::{LogLevel, LogLine, StatusLog};
use crate::timer::{TimerKind, TimerQueue};
use crate::twin::{
    AccrualClock, AccrualReading, Pricing, PulseTrigger, TruckCycle, TruckState, TruckTransition,
    VaporFlow,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Read-only view of a twin at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    /// Identifies this mount
    pub session_id: Uuid,
    /// Wall-clock time of mount
    pub mounted_at: DateTime<Utc>,
    /// Selected facility
    pub facility: FacilityType,
    /// Whether accrual and the truck cycle are running
    pub is_running: bool,
    /// Time since mount (ms)
    pub elapsed_ms: u64,
    /// Liters recovered
    pub liters_recovered: f64,
    /// Revenue for the recovered liters
    pub revenue_generated: f64,
    /// CO2 prevented (kg)
    pub emissions_prevented: f64,
    /// Current truck state
    pub truck_state: TruckState,
    /// Current truck position
    pub truck_position: Position,
    /// Hose attached (truck filling)
    pub hose_connected: bool,
    /// Buffer tank transfer pulse showing
    pub secondary_flow_visible: bool,
    /// Last multiple of the tank size that fired a pulse
    pub last_trigger_liters: f64,
    /// Pulses fired since mount
    pub pulse_count: u64,
    /// Particles per second, in [`crate::twin::IntakePath::ALL`] order
    pub intake_emission_rates: [f64; 3],
    /// Timers still scheduled
    pub pending_timers: usize,
    /// Status log, oldest first
    pub recent_log: Vec<LogLine>,
}

impl SimulationSnapshot {
    /// Liters with derived values
    pub fn reading(&self) -> AccrualReading {
        AccrualReading {
            liters_recovered: self.liters_recovered,
            revenue_generated: self.revenue_generated,
            emissions_prevented: self.emissions_prevented,
        }
    }
}

/// A mounted digital twin
#[derive(Debug)]
pub struct SimulationView {
    session_id: Uuid,
    mounted_at: DateTime<Utc>,
    config: TwinConfig,
    running: bool,
    torn_down: bool,
    last_seen: Duration,
    accrual: AccrualClock,
    pulse: PulseTrigger,
    truck: TruckCycle,
    vapor: VaporFlow,
    log: StatusLog,
    timers: TimerQueue,
}

impl SimulationView {
    /// Mount a fresh view: stopped, zero liters, truck idle at the start
    pub fn mount(config: TwinConfig) -> Self {
        let pricing = Pricing {
            price_per_liter: config.price_per_liter,
            co2_kg_per_liter: config.co2_kg_per_liter,
        };
        let session_id = Uuid::new_v4();
        tracing::info!(%session_id, facility = %config.facility, "Simulation view mounted");

        Self {
            session_id,
            mounted_at: Utc::now(),
            running: false,
            torn_down: false,
            last_seen: Duration::ZERO,
            accrual: AccrualClock::new(config.facility, config.rates, pricing),
            pulse: PulseTrigger::new(config.pulse),
            truck: TruckCycle::new(config.truck),
            vapor: VaporFlow::new(config.vapor),
            log: StatusLog::new(config.log),
            timers: TimerQueue::new(),
            config,
        }
    }

    /// Session id assigned at mount
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Configuration the view was mounted with
    pub fn config(&self) -> &TwinConfig {
        &self.config
    }

    /// Whether the simulation is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether [`SimulationView::teardown`] was called
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Current facility
    pub fn facility(&self) -> FacilityType {
        self.accrual.facility()
    }

    /// Current liters and derived values
    pub fn reading(&self) -> AccrualReading {
        self.accrual.reading()
    }

    /// Truck state
    pub fn truck_state(&self) -> TruckState {
        self.truck.state()
    }

    /// Truck position
    pub fn truck_position(&self) -> Position {
        self.truck.position()
    }

    /// Whether the secondary flow pulse is showing
    pub fn secondary_flow_visible(&self) -> bool {
        self.pulse.is_visible()
    }

    /// Pulses fired since mount
    pub fn pulse_count(&self) -> u64 {
        self.pulse.trigger_count()
    }

    /// Timers still pending
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Status log, oldest first
    pub fn log_lines(&self) -> impl Iterator<Item = &LogLine> {
        self.log.lines()
    }

    /// Play or pause
    pub fn set_running(&mut self, running: bool, now: Duration) {
        if self.torn_down || running == self.running {
            return;
        }
        self.observe(now);

        if running {
            self.running = true;
            self.accrual.resume(now);
            self.pulse.rebase(self.accrual.liters());
            self.truck.start(now, &mut self.timers);
            self.log.arm(now, &mut self.timers);
            self.log.push(now, LogLevel::Event, "Simulation started");
            tracing::info!(session_id = %self.session_id, liters = self.accrual.liters(), "Simulation running");
        } else {
            self.halt(now);
            self.log.push(now, LogLevel::Event, "Simulation paused");
            tracing::info!(session_id = %self.session_id, liters = self.accrual.liters(), "Simulation paused");
        }
    }

    /// Switch facility. Liters go back to zero and the simulation stops; the
    /// caller restarts it explicitly.
    pub fn set_facility(&mut self, facility: FacilityType, now: Duration) {
        if self.torn_down || facility == self.accrual.facility() {
            return;
        }
        self.observe(now);
        self.halt(now);
        self.accrual.change_facility(facility);
        self.log.clear();
        self.log.push(
            now,
            LogLevel::Event,
            format!("Facility set to {}", facility.profile().display_name),
        );
        tracing::info!(session_id = %self.session_id, %facility, "Facility changed");
    }

    /// Accrual interval callback
    pub fn on_tick(&mut self, now: Duration) {
        if self.torn_down {
            return;
        }
        self.observe(now);
        self.fire_timers(now);

        if !self.running {
            return;
        }
        let liters = self.accrual.tick(now);
        if self.pulse.observe(liters, now, &mut self.timers) {
            let band = self.pulse.last_trigger_liters();
            self.log.push(
                now,
                LogLevel::Event,
                format!("Buffer tank full at {:.0} L, transferring", band),
            );
        }
    }

    /// Display frame callback; `dt` is the time since the previous frame
    pub fn on_frame(&mut self, now: Duration, dt: Duration) {
        if self.torn_down {
            return;
        }
        self.observe(now);
        self.fire_timers(now);

        if !self.running {
            return;
        }
        let changes = self.truck.advance(dt, now, &mut self.timers);
        for change in changes {
            self.log_truck(change);
        }
    }

    /// Snapshot for display
    pub fn snapshot(&self) -> SimulationSnapshot {
        let reading = self.accrual.reading();
        SimulationSnapshot {
            session_id: self.session_id,
            mounted_at: self.mounted_at,
            facility: self.accrual.facility(),
            is_running: self.running,
            elapsed_ms: self.last_seen.as_millis() as u64,
            liters_recovered: reading.liters_recovered,
            revenue_generated: reading.revenue_generated,
            emissions_prevented: reading.emissions_prevented,
            truck_state: self.truck.state(),
            truck_position: self.truck.position(),
            hose_connected: self.truck.hose_connected(),
            secondary_flow_visible: self.pulse.is_visible(),
            last_trigger_liters: self.pulse.last_trigger_liters(),
            pulse_count: self.pulse.trigger_count(),
            intake_emission_rates: self.vapor.emission_rates(self.truck.state(), self.running),
            pending_timers: self.timers.pending(),
            recent_log: self.log.lines().cloned().collect(),
        }
    }

    /// Unmount: cancel everything. Later calls are no-ops.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        let cancelled = self.timers.cancel_all();
        self.accrual.stop();
        self.running = false;
        self.torn_down = true;
        tracing::info!(session_id = %self.session_id, cancelled, "Simulation view torn down");
    }

    fn halt(&mut self, now: Duration) {
        self.running = false;
        self.accrual.stop();
        self.pulse.reset(&mut self.timers);
        if let Some(change) = self.truck.stop(now, &mut self.timers) {
            self.log_truck(change);
        }
        self.log.disarm(&mut self.timers);

        let leftover = self.timers.cancel_all();
        if leftover > 0 {
            tracing::warn!(leftover, "Cancelled timers left behind after stop");
        }
    }

    fn fire_timers(&mut self, now: Duration) {
        for fired in self.timers.drain_expired(now) {
            match fired.kind {
                TimerKind::PulseClear => {
                    self.pulse.on_timer(&fired);
                }
                TimerKind::CycleDelay | TimerKind::FillDuration => {
                    if let Some(change) = self.truck.on_timer(&fired) {
                        self.log_truck(change);
                    }
                }
                TimerKind::LogRotation => {
                    self.log.on_timer(&fired, &mut self.timers);
                }
            }
        }
    }

    fn log_truck(&mut self, change: TruckTransition) {
        let message = match change.to {
            TruckState::Arriving => "Tanker truck arriving",
            TruckState::Filling => "Tanker connected, vapor balance active",
            TruckState::Leaving => "Delivery complete, tanker departing",
            TruckState::Resetting => "Tanker cleared the site",
            TruckState::Idle if change.from == TruckState::Resetting => "Waiting for next delivery",
            TruckState::Idle => "Tanker recalled",
        };
        self.log.push(change.at, LogLevel::Event, message);
    }

    fn observe(&mut self, now: Duration) {
        if now > self.last_seen {
            self.last_seen = now;
        }
    }
}
