//! # MOVR Teleop Library
//!
//! Drive an Ackermann vehicle from a gamepad.
//!
//! This library provides the core functionality for translating joystick
//! snapshots into steering/speed commands, plus the transports and driver
//! loop that turn it into a runnable teleoperation node.

pub mod config;
pub mod error;
pub mod gamepad;
pub mod messages;
pub mod teleop;
pub mod telemetry;
pub mod transport;
