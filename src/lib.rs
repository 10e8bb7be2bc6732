//! # PS4 Controller Library
//!
//! Translate gamepad input reports into robot commands.
//!
//! Each report is fanned out into a velocity command, two actuator speed
//! setpoints (digger arm and digger drum) and, while the start button is held,
//! an autonomy toggle request.

pub mod bus;
pub mod config;
pub mod controller;
pub mod error;
pub mod msg;
pub mod node;
pub mod params;
