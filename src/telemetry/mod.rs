//! # Telemetry Module
//!
//! Records published drive commands to JSONL files with rotation.
//!
//! This module handles:
//! - Formatting each command as one JSON line with a UTC timestamp
//! - Writing to rotating log files (max N records per file)
//! - Retaining only the last M files

pub mod command_log;

pub use command_log::{CommandLog, CommandRecord};
