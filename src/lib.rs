//! SumpWatch — appliance monitor core
//!
//! Hardware-independent half of the firmware: configuration, monitor state,
//! duty-cycle tracking and the round-robin cloud reporter. Builds and tests
//! on the host; the ESP-IDF drivers and tasks live in the binary.

pub mod config;
pub mod duty;
pub mod events;
pub mod monitor;
pub mod report;
pub mod schedule;
pub mod sensing;
