//! Sensor subsystem.
//!
//! The node carries a single analog soil probe; see [`soil::SoilSensor`].

pub mod soil;
