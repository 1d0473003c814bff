//! SoilSense firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the adapters
//! used by the device binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(feature = "espidf")]` within each module; host builds get
//! simulation backends instead.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod pins;

pub mod adapters;
pub mod drivers;
pub mod sensors;
