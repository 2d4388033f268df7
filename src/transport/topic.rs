//! # In-Process Topics
//!
//! Bounded publish/subscribe channel for running the node inside a larger
//! tokio application, or for wiring it up in tests.
//!
//! ```
//! use movr_teleop::messages::JoystickState;
//! use movr_teleop::transport::topic::topic;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> movr_teleop::error::Result<()> {
//! let (joy_pub, mut joy_sub) = topic::<JoystickState>("joy", 16);
//! joy_pub.send(JoystickState::new(vec![0, 1], vec![0.0, 0.0])).await?;
//! assert!(joy_sub.recv().await.is_some());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{CommandSink, JoystickSource};
use crate::error::{Result, TeleopError};
use crate::messages::{DriveCommand, JoystickState};

/// Creates a topic holding up to `capacity` undelivered messages.
///
/// Publishing waits while the topic is full, so messages are never dropped
/// or reordered.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn topic<T>(name: &str, capacity: usize) -> (Publisher<T>, Subscriber<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        Publisher {
            name: name.to_string(),
            tx,
        },
        Subscriber {
            name: name.to_string(),
            rx,
        },
    )
}

/// Sending end of a topic.
#[derive(Debug, Clone)]
pub struct Publisher<T> {
    name: String,
    tx: mpsc::Sender<T>,
}

impl<T> Publisher<T> {
    /// Topic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sends one message.
    ///
    /// # Errors
    ///
    /// Returns [`TeleopError::TopicClosed`] if the subscriber was dropped.
    pub async fn send(&self, message: T) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| TeleopError::TopicClosed(self.name.clone()))
    }
}

/// Receiving end of a topic.
#[derive(Debug)]
pub struct Subscriber<T> {
    name: String,
    rx: mpsc::Receiver<T>,
}

impl<T> Subscriber<T> {
    /// Topic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Receives the next message, or `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}

#[async_trait]
impl JoystickSource for Subscriber<JoystickState> {
    async fn next_state(&mut self) -> Option<Result<JoystickState>> {
        self.recv().await.map(Ok)
    }
}

#[async_trait]
impl CommandSink for Publisher<DriveCommand> {
    async fn publish(&mut self, command: DriveCommand) -> Result<()> {
        self.send(command).await
    }
}
