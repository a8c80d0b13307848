//! Accrual clock
//!
//! Liters recovered are a pure function of run time: while running,
//! `liters = (now - virtual_start) * rate`. Pausing freezes the value and
//! resuming recomputes `virtual_start` so that accrual continues from the
//! frozen amount instead of jumping.

use crate::config::FacilityRates;
use crate::facility::FacilityType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Conversion factors for the derived values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    /// Revenue per liter
    pub price_per_liter: f64,
    /// CO2 prevented per liter (kg)
    pub co2_kg_per_liter: f64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            price_per_liter: 0.7,
            co2_kg_per_liter: 2.3,
        }
    }
}

/// Liters with the values derived from them
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccrualReading {
    /// Liters recovered so far
    pub liters_recovered: f64,
    /// Revenue for those liters
    pub revenue_generated: f64,
    /// CO2 kept out of the air (kg)
    pub emissions_prevented: f64,
}

impl AccrualReading {
    /// Derive revenue and emissions from a liters value
    pub fn from_liters(liters: f64, pricing: Pricing) -> Self {
        Self {
            liters_recovered: liters,
            revenue_generated: liters * pricing.price_per_liter,
            emissions_prevented: liters * pricing.co2_kg_per_liter,
        }
    }
}

/// Linear time-to-liters counter
#[derive(Debug, Clone)]
pub struct AccrualClock {
    facility: FacilityType,
    rates: FacilityRates,
    pricing: Pricing,
    is_running: bool,
    rate_per_second: f64,
    /// Seconds since mount at which accrual would have started from zero.
    /// May be negative when resuming early with a large carried amount.
    virtual_start_secs: f64,
    liters: f64,
}

impl AccrualClock {
    /// Create a stopped clock at zero liters
    pub fn new(facility: FacilityType, rates: FacilityRates, pricing: Pricing) -> Self {
        Self {
            facility,
            rates,
            pricing,
            is_running: false,
            rate_per_second: rates.for_facility(facility),
            virtual_start_secs: 0.0,
            liters: 0.0,
        }
    }

    /// Begin (or resume) accruing from `current_liters` at `rate` L/s
    pub fn start(&mut self, current_liters: f64, rate: f64, now: Duration) {
        let current = current_liters.max(0.0);
        let offset = if rate > 0.0 { current / rate } else { 0.0 };
        self.virtual_start_secs = now.as_secs_f64() - offset;
        self.rate_per_second = rate.max(0.0);
        self.liters = current;
        self.is_running = true;
        tracing::debug!(
            liters = current,
            rate,
            virtual_start = self.virtual_start_secs,
            "Accrual started"
        );
    }

    /// Resume from the frozen value at the facility's rate
    pub fn resume(&mut self, now: Duration) {
        let rate = self.rates.for_facility(self.facility);
        self.start(self.liters, rate, now);
    }

    /// Recompute liters for `now`. Has no effect while stopped.
    pub fn tick(&mut self, now: Duration) -> f64 {
        if self.is_running {
            let computed = (now.as_secs_f64() - self.virtual_start_secs) * self.rate_per_second;
            // A tick delivered with a stale timestamp must not move the value backwards
            if computed > self.liters {
                self.liters = computed;
            }
        }
        self.liters
    }

    /// Freeze the current value
    pub fn stop(&mut self) {
        if self.is_running {
            tracing::debug!(liters = self.liters, "Accrual stopped");
        }
        self.is_running = false;
    }

    /// Switch facility: zero liters and stop. The caller restarts explicitly.
    pub fn change_facility(&mut self, facility: FacilityType) {
        self.facility = facility;
        self.rate_per_second = self.rates.for_facility(facility);
        self.liters = 0.0;
        self.virtual_start_secs = 0.0;
        self.is_running = false;
    }

    /// Current facility
    pub fn facility(&self) -> FacilityType {
        self.facility
    }

    /// Whether the clock is accruing
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Active rate (L/s)
    pub fn rate_per_second(&self) -> f64 {
        self.rate_per_second
    }

    /// Last computed liters
    pub fn liters(&self) -> f64 {
        self.liters
    }

    /// Liters with derived revenue and emissions
    pub fn reading(&self) -> AccrualReading {
        AccrualReading::from_liters(self.liters, self.pricing)
    }
}
