//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the rules of the soil probe: the calibration
//! workflow, LED feedback and periodic telemetry, orchestrated by
//! [`service::AppService`]. All interaction with hardware and the network
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod events;
pub mod persistence;
pub mod ports;
pub mod service;
