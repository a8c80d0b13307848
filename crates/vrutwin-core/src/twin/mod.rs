//! Digital Twin
//!
//! The accrual clock, the buffer-tank pulse trigger, the truck visitation
//! cycle and the vapor intake flow. None of these own a clock; callers pass
//! the current time (since mount) into every operation.

mod accrual;
mod pulse;
mod truck;
mod vapor;

pub use accrual::{AccrualClock, AccrualReading, Pricing};
pub use pulse::PulseTrigger;
pub use truck::{transition, TruckCycle, TruckEvent, TruckState, TruckTransition};
pub use vapor::{IntakePath, VaporFlow};
