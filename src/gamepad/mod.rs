//! # Gamepad Module
//!
//! Joystick input read directly from a Linux evdev device.
//!
//! This module handles:
//! - Joystick/gamepad detection and connection via evdev
//! - Numbering buttons and axes like the Linux joystick API
//! - Normalizing axes to `[-1.0, 1.0]`
//! - Emitting one [`JoystickState`] per input report

use async_trait::async_trait;
use evdev::EventStream;
use tracing::trace;

use crate::error::{Result, TeleopError};
use crate::messages::JoystickState;
use crate::transport::JoystickSource;

pub mod device;
pub mod state_builder;

pub use device::Gamepad;
pub use state_builder::{AxisInfo, JoyLayout, JoyStateBuilder};

/// Async stream of snapshots from an open gamepad.
pub struct GamepadSource {
    events: EventStream,
    builder: JoyStateBuilder,
    device_path: String,
}

impl std::fmt::Debug for GamepadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GamepadSource")
            .field("device_path", &self.device_path)
            .field("layout", self.builder.layout())
            .finish_non_exhaustive()
    }
}

impl GamepadSource {
    fn new(events: EventStream, builder: JoyStateBuilder, device_path: String) -> Self {
        Self {
            events,
            builder,
            device_path,
        }
    }

    /// Device path being read.
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl JoystickSource for GamepadSource {
    async fn next_state(&mut self) -> Option<Result<JoystickState>> {
        loop {
            let event = match self.events.next_event().await {
                Ok(event) => event,
                Err(e) => {
                    return Some(Err(TeleopError::Gamepad(format!(
                        "Failed to read {}: {}",
                        self.device_path, e
                    ))))
                }
            };
            trace!("evdev event: {:?}", event);

            if let Some(state) = self.builder.process_event(&event) {
                return Some(Ok(state));
            }
        }
    }
}
