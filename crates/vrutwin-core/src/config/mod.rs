//! Twin Configuration
//!
//! Every tuning constant of the twin lives here. The values are presentation
//! tuned (a 14 L buffer tank, a 15 s fill, a 10 s gap between trucks) and are
//! kept as plain configuration rather than derived from anything physical.
//!
//! Configuration files are JSON; every field is optional and falls back to
//! its default.

mod error;

pub use error::ConfigError;

use crate::facility::FacilityType;
use crate::geometry::Position;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for one simulation view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwinConfig {
    /// Facility selected when the view mounts
    pub facility: FacilityType,
    /// Recovery rate per facility type (L/s)
    pub rates: FacilityRates,
    /// Revenue per recovered liter
    pub price_per_liter: f64,
    /// CO2 prevented per recovered liter (kg)
    pub co2_kg_per_liter: f64,
    /// Accrual tick interval (ms)
    pub tick_interval_ms: u64,
    /// Frame interval for truck motion (ms)
    pub frame_interval_ms: u64,
    /// Truck cycle tuning
    pub truck: TruckConfig,
    /// Buffer-tank pulse tuning
    pub pulse: PulseConfig,
    /// Vapor intake particle tuning
    pub vapor: VaporConfig,
    /// Status log tuning
    pub log: LogConfig,
}

impl Default for TwinConfig {
    fn default() -> Self {
        Self {
            facility: FacilityType::Gas,
            rates: FacilityRates::default(),
            price_per_liter: 0.7,
            co2_kg_per_liter: 2.3,
            tick_interval_ms: 100,
            frame_interval_ms: 16,
            truck: TruckConfig::default(),
            pulse: PulseConfig::default(),
            vapor: VaporConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Recovery rates in liters per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityRates {
    /// Gas station rate
    pub gas: f64,
    /// Storage terminal rate
    pub storage: f64,
}

impl Default for FacilityRates {
    fn default() -> Self {
        Self {
            gas: FacilityType::Gas.default_rate(),
            storage: FacilityType::Storage.default_rate(),
        }
    }
}

impl FacilityRates {
    /// Rate for the given facility
    pub fn for_facility(&self, facility: FacilityType) -> f64 {
        match facility {
            FacilityType::Gas => self.gas,
            FacilityType::Storage => self.storage,
        }
    }
}

/// Truck visitation cycle tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruckConfig {
    /// Time spent at the filling position (ms)
    pub fill_duration_ms: u64,
    /// Idle time between visits (ms)
    pub cycle_delay_ms: u64,
    /// Exponential approach factor per second
    pub speed: f64,
    /// Distance at which a target counts as reached
    pub arrival_epsilon: f64,
    /// Parking spot the truck starts from
    pub start_position: Position,
    /// Spot next to the dispenser where the hose connects
    pub filling_position: Position,
    /// Spot the truck drives off to
    pub end_position: Position,
}

impl Default for TruckConfig {
    fn default() -> Self {
        Self {
            fill_duration_ms: 15_000,
            cycle_delay_ms: 10_000,
            speed: 2.0,
            arrival_epsilon: 0.1,
            start_position: Position::new(-30.0, 0.0, 4.0),
            filling_position: Position::new(0.0, 0.0, 4.0),
            end_position: Position::new(30.0, 0.0, 4.0),
        }
    }
}

impl TruckConfig {
    /// Fill duration as a [`Duration`]
    pub fn fill_duration(&self) -> Duration {
        Duration::from_millis(self.fill_duration_ms)
    }

    /// Cycle delay as a [`Duration`]
    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms)
    }
}

/// Buffer-tank pulse tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Buffer tank volume; a pulse fires at each multiple (L)
    pub threshold_liters: f64,
    /// How long the secondary flow stays visible (ms)
    pub visible_ms: u64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            threshold_liters: 14.0,
            visible_ms: 3_000,
        }
    }
}

impl PulseConfig {
    /// Visibility window as a [`Duration`]
    pub fn visible_for(&self) -> Duration {
        Duration::from_millis(self.visible_ms)
    }
}

/// Vapor particle emission tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaporConfig {
    /// Baseline particles per second, scaled per intake path
    pub base_rate: f64,
    /// Multiplier applied while a truck is filling
    pub filling_multiplier: f64,
}

impl Default for VaporConfig {
    fn default() -> Self {
        Self {
            base_rate: 12.0,
            filling_multiplier: 5.0,
        }
    }
}

/// Status log tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Number of lines kept
    pub capacity: usize,
    /// Interval between routine status messages (ms)
    pub rotation_ms: u64,
    /// Seed for message selection; entropy when absent
    pub seed: Option<u64>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: 8,
            rotation_ms: 2_000,
            seed: None,
        }
    }
}

impl TwinConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        tracing::info!("Loaded twin config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TwinConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("rates.gas", self.rates.gas)?;
        positive("rates.storage", self.rates.storage)?;
        non_negative("price_per_liter", self.price_per_liter)?;
        non_negative("co2_kg_per_liter", self.co2_kg_per_liter)?;
        nonzero_ms("tick_interval_ms", self.tick_interval_ms)?;
        nonzero_ms("frame_interval_ms", self.frame_interval_ms)?;
        nonzero_ms("truck.fill_duration_ms", self.truck.fill_duration_ms)?;
        nonzero_ms("truck.cycle_delay_ms", self.truck.cycle_delay_ms)?;
        positive("truck.speed", self.truck.speed)?;
        positive("truck.arrival_epsilon", self.truck.arrival_epsilon)?;
        positive("pulse.threshold_liters", self.pulse.threshold_liters)?;
        nonzero_ms("pulse.visible_ms", self.pulse.visible_ms)?;
        non_negative("vapor.base_rate", self.vapor.base_rate)?;
        non_negative("vapor.filling_multiplier", self.vapor.filling_multiplier)?;
        nonzero_ms("log.rotation_ms", self.log.rotation_ms)?;
        if self.log.capacity == 0 {
            return Err(ConfigError::invalid("log.capacity", "must hold at least one line"));
        }
        Ok(())
    }

    /// Recovery rate for a facility (L/s)
    pub fn recovery_rate(&self, facility: FacilityType) -> f64 {
        self.rates.for_facility(facility)
    }

    /// Accrual tick interval
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Frame interval
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be > 0, got {}", value)))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be >= 0, got {}", value)))
    }
}

fn nonzero_ms(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be at least 1 ms"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_tuning() {
        let config = TwinConfig::default();
        assert_eq!(config.recovery_rate(FacilityType::Gas), 0.5);
        assert_eq!(config.recovery_rate(FacilityType::Storage), 5.0);
        assert_eq!(config.truck.fill_duration(), Duration::from_secs(15));
        assert_eq!(config.truck.cycle_delay(), Duration::from_secs(10));
        assert_eq!(config.pulse.threshold_liters, 14.0);
        assert_eq!(config.pulse.visible_for(), Duration::from_secs(3));
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TwinConfig::from_json(r#"{ "facility": "storage", "pulse": { "visible_ms": 500 } }"#)
            .unwrap();
        assert_eq!(config.facility, FacilityType::Storage);
        assert_eq!(config.pulse.visible_ms, 500);
        assert_eq!(config.pulse.threshold_liters, 14.0);
        assert_eq!(config.price_per_liter, 0.7);
    }

    #[test]
    fn test_rejects_zero_rate() {
        let err = TwinConfig::from_json(r#"{ "rates": { "gas": 0.0 } }"#).unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "rates.gas"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_empty_log() {
        let err = TwinConfig::from_json(r#"{ "log": { "capacity": 0 } }"#).unwrap_err();
        assert!(err.to_string().contains("log.capacity"));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = TwinConfig::from_json("{ facility: gas").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
