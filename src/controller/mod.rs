//! # Controller Module
//!
//! Gamepad input translation.
//!
//! This module handles:
//! - Resolving axis/button assignments and scales at startup
//! - Registering the node's inbound and outbound topics
//! - Turning each input report into drive, actuator and autonomy commands

pub mod mapper;
pub mod topics;

pub use mapper::InputMapper;
