//! Vapor intake flow
//!
//! Three fixed intake paths carry vapor particles into the unit. While a
//! truck is filling, displaced vapor surges and every path emits at a
//! multiple of its baseline rate.

use super::TruckState;
use crate::config::VaporConfig;
use serde::{Deserialize, Serialize};

/// Fixed intake paths of the recovery unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakePath {
    /// Nozzle return line at the dispenser
    Dispenser,
    /// Underground tank vent stack
    TankVent,
    /// Vapor balance line on the delivery truck
    TruckIntake,
}

impl IntakePath {
    /// All paths, in emission-rate array order
    pub const ALL: [IntakePath; 3] = [
        IntakePath::Dispenser,
        IntakePath::TankVent,
        IntakePath::TruckIntake,
    ];

    /// Share of the baseline rate this path carries
    pub fn weight(self) -> f64 {
        match self {
            IntakePath::Dispenser => 1.0,
            IntakePath::TankVent => 0.5,
            IntakePath::TruckIntake => 1.5,
        }
    }
}

/// Particle emission rates along the intake paths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VaporFlow {
    base_rate: f64,
    filling_multiplier: f64,
}

impl VaporFlow {
    /// Create from configuration
    pub fn new(config: VaporConfig) -> Self {
        Self {
            base_rate: config.base_rate,
            filling_multiplier: config.filling_multiplier,
        }
    }

    /// Multiplier for the given truck state
    pub fn multiplier(&self, truck: TruckState) -> f64 {
        if truck == TruckState::Filling {
            self.filling_multiplier
        } else {
            1.0
        }
    }

    /// Particles per second on one path
    pub fn emission_rate(&self, path: IntakePath, truck: TruckState, running: bool) -> f64 {
        if !running {
            return 0.0;
        }
        self.base_rate * path.weight() * self.multiplier(truck)
    }

    /// Rates for [`IntakePath::ALL`]
    pub fn emission_rates(&self, truck: TruckState, running: bool) -> [f64; 3] {
        IntakePath::ALL.map(|path| self.emission_rate(path, truck, running))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surge_while_filling() {
        let flow = VaporFlow::new(VaporConfig::default());
        assert_eq!(flow.emission_rates(TruckState::Idle, true), [12.0, 6.0, 18.0]);
        assert_eq!(flow.emission_rates(TruckState::Filling, true), [60.0, 30.0, 90.0]);
        assert_eq!(flow.emission_rates(TruckState::Leaving, true), [12.0, 6.0, 18.0]);
    }

    #[test]
    fn test_no_flow_when_stopped() {
        let flow = VaporFlow::new(VaporConfig::default());
        assert_eq!(flow.emission_rates(TruckState::Filling, false), [0.0; 3]);
    }
}
