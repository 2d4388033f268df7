//! # Teleop Node
//!
//! Receive/dispatch loop around [`InputTranslator`].
//!
//! The node owns its output sink for its whole lifetime. For every joystick
//! snapshot it receives it:
//!
//! 1. Translates the snapshot into a [`DriveCommand`]
//! 2. Publishes the command to the sink
//! 3. Appends the command to the command log, if one is attached
//!
//! Snapshots that cannot be translated (too few buttons/axes, undecodable
//! message) are logged and dropped. Transport failures end the loop.
//!
//! ## Usage
//!
//! ```no_run
//! use movr_teleop::teleop::TeleopNode;
//! use movr_teleop::transport::jsonl::{JsonLinesSink, JsonLinesSource};
//! use tokio::io::BufReader;
//!
//! # #[tokio::main]
//! # async fn main() -> movr_teleop::error::Result<()> {
//! let mut source = JsonLinesSource::new(BufReader::new(tokio::io::stdin()));
//! let mut node = TeleopNode::new(JsonLinesSink::new(tokio::io::stdout()));
//! let stats = node.spin(&mut source).await?;
//! println!("published {} commands", stats.published);
//! # Ok(())
//! # }
//! ```

use tracing::{debug, info, warn};

use super::translator::InputTranslator;
use crate::error::Result;
use crate::messages::{DriveCommand, JoystickState};
use crate::telemetry::CommandLog;
use crate::transport::{CommandSink, JoystickSource};

/// Default number of published commands between status log messages.
pub const DEFAULT_STATUS_INTERVAL: u64 = 1000;

/// Event counters for one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStats {
    /// Snapshots received, including dropped ones.
    pub received: u64,
    /// Commands published.
    pub published: u64,
    /// Snapshots dropped without publishing.
    pub dropped: u64,
}

/// Joystick teleoperation node.
pub struct TeleopNode<K> {
    translator: InputTranslator,
    sink: K,
    command_log: Option<CommandLog>,
    status_interval: u64,
    stats: NodeStats,
}

impl<K: CommandSink> TeleopNode<K> {
    /// Creates a node publishing to `sink`.
    pub fn new(sink: K) -> Self {
        Self {
            translator: InputTranslator::new(),
            sink,
            command_log: None,
            status_interval: DEFAULT_STATUS_INTERVAL,
            stats: NodeStats::default(),
        }
    }

    /// Records every published command to `log`.
    #[must_use]
    pub fn with_command_log(mut self, log: CommandLog) -> Self {
        self.command_log = Some(log);
        self
    }

    /// Logs a status line every `interval` published commands (minimum 1).
    #[must_use]
    pub fn with_status_interval(mut self, interval: u64) -> Self {
        self.status_interval = interval.max(1);
        self
    }

    /// Counters so far.
    pub fn stats(&self) -> NodeStats {
        self.stats
    }

    /// Returns the sink, consuming the node.
    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Handles one joystick snapshot.
    ///
    /// Returns the published command, or `None` if the snapshot was dropped.
    ///
    /// # Errors
    ///
    /// Returns error if publishing to the sink fails.
    pub async fn on_joy(&mut self, state: &JoystickState) -> Result<Option<DriveCommand>> {
        self.stats.received += 1;

        let command = match self.translator.handle_event(state) {
            Ok(command) => command,
            Err(e) if e.is_recoverable() => {
                self.drop_event(&e.to_string());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        self.sink.publish(command).await?;
        self.stats.published += 1;
        debug!(
            "Published steering_angle={} speed={}",
            command.steering_angle, command.speed
        );

        if let Some(log) = self.command_log.as_mut() {
            if let Err(e) = log.record(&command) {
                warn!("Failed to record command: {}", e);
            }
        }

        if self.stats.published % self.status_interval == 0 {
            info!(
                "Published {} commands ({} received, {} dropped)",
                self.stats.published, self.stats.received, self.stats.dropped
            );
        }

        Ok(Some(command))
    }

    /// Processes snapshots from `source` until it ends.
    ///
    /// # Errors
    ///
    /// Returns the first non-recoverable error from the source or sink.
    pub async fn spin<S: JoystickSource + ?Sized>(&mut self, source: &mut S) -> Result<NodeStats> {
        while let Some(next) = source.next_state().await {
            match next {
                Ok(state) => {
                    self.on_joy(&state).await?;
                }
                Err(e) if e.is_recoverable() => {
                    self.stats.received += 1;
                    self.drop_event(&e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Joystick input ended: {} received, {} published, {} dropped",
            self.stats.received, self.stats.published, self.stats.dropped
        );
        Ok(self.stats)
    }

    fn drop_event(&mut self, reason: &str) {
        self.stats.dropped += 1;
        warn!("Dropping joystick event: {}", reason);
    }
}
