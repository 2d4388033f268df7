//! # Transport Module
//!
//! Seams between the teleop node and the messaging layer around it.
//!
//! The node only sees two traits:
//! - [`JoystickSource`]: yields joystick snapshots in arrival order
//! - [`CommandSink`]: accepts drive commands
//!
//! Implementations:
//! - [`jsonl`]: JSON Lines over any async reader/writer (stdin/stdout in the binary)
//! - [`topic`]: bounded in-process channel pair

use async_trait::async_trait;

use crate::error::Result;
use crate::messages::{DriveCommand, JoystickState};

pub mod jsonl;
pub mod topic;

/// Stream of joystick snapshots.
#[async_trait]
pub trait JoystickSource: Send {
    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the stream has ended. An `Err` for a single message
    /// (e.g. one undecodable line) does not end the stream.
    async fn next_state(&mut self) -> Option<Result<JoystickState>>;
}

/// Destination for drive commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandSink: Send {
    /// Publishes one command.
    async fn publish(&mut self, command: DriveCommand) -> Result<()>;
}
