//! # VRU Twin Core Library
//!
//! Core functionality for the vapor recovery unit digital twin.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - An accrual clock turning run time into recovered liters, revenue and
//!   prevented emissions
//! - The truck visitation state machine that drives the decorative scene
//! - The buffer-tank pulse trigger and vapor intake flow model
//! - A timer registry that owns every pending timeout of a simulation view
//! - A tokio driver running a view from independent tick and frame intervals
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use vrutwin_core::{config::TwinConfig, driver, facility::FacilityType};
//!
//! let handle = driver::spawn(TwinConfig::default());
//! handle.set_facility(FacilityType::Storage).await?;
//! handle.start().await?;
//! tokio::time::sleep(Duration::from_secs(5)).await;
//! println!("Recovered: {:.1} L", handle.latest().liters_recovered);
//! let last = handle.shutdown().await?;
//! ```

pub mod config;
pub mod driver;
pub mod facility;
pub mod geometry;
pub mod status_log;
pub mod timer;
pub mod twin;
pub mod view;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ConfigError, TwinConfig};
    pub use crate::driver::{fast_forward, spawn, DriverError, TwinCommand, TwinHandle};
    pub use crate::facility::{FacilityProfile, FacilityType};
    pub use crate::geometry::Position;
    pub use crate::timer::{TimerId, TimerKind, TimerQueue};
    pub use crate::twin::{
        AccrualClock, AccrualReading, IntakePath, PulseTrigger, TruckCycle, TruckEvent,
        TruckState, VaporFlow,
    };
    pub use crate::view::{SimulationSnapshot, SimulationView};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
