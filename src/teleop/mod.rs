//! # Teleop Module
//!
//! Joystick-to-drive-command translation and the node that drives it.
//!
//! This module handles:
//! - Linear range remapping ([`remap`])
//! - Translating one joystick snapshot into one drive command ([`translator`])
//! - Pulling snapshots from a source and publishing commands ([`node`])

pub mod node;
pub mod remap;
pub mod translator;

pub use node::{NodeStats, TeleopNode};
pub use remap::remap;
pub use translator::InputTranslator;
