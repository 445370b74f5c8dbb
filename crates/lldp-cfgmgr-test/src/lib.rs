//! Integration test infrastructure for the LLDP interface reconciler
//!
//! Provides:
//! - A simulated device that interprets the LLDP command set
//! - Fixture structs for common reconciliation scenarios
//! - Order-independent command set assertions
//! - Device state verification helpers

pub mod fixtures;
pub mod sim_device;
mod verification;

pub use fixtures::*;
pub use sim_device::SimulatedDevice;
pub use verification::*;
