//! # Gamepad Device Module
//!
//! Detects and opens a joystick or gamepad through the Linux evdev interface.
//!
//! ## Detection
//!
//! A device qualifies when it reports:
//! - An `ABS_X` absolute axis
//! - At least one button in the joystick/gamepad range (`BTN_TRIGGER` to `BTN_THUMBR`)
//!
//! Keyboards, mice and touchpads are skipped this way.

use evdev::{AbsoluteAxisType, Device, Key};
use std::path::Path;
use tracing::{debug, info};

use super::state_builder::JoyStateBuilder;
use super::GamepadSource;
use crate::error::{Result, TeleopError};

/// Directory scanned for input devices.
const INPUT_DIR: &str = "/dev/input";

/// Open joystick/gamepad device.
pub struct Gamepad {
    device: Device,
    device_path: String,
}

impl std::fmt::Debug for Gamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gamepad")
            .field("device_path", &self.device_path)
            .field("name", &self.device.name())
            .finish_non_exhaustive()
    }
}

impl Gamepad {
    /// Detect and open the first joystick or gamepad
    ///
    /// Scans `/dev/input/event*` in sorted order so the choice is
    /// deterministic when several controllers are connected.
    ///
    /// # Errors
    ///
    /// - `GamepadNotFound`: no qualifying device
    /// - `Gamepad`: `/dev/input` missing or unreadable
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use movr_teleop::gamepad::Gamepad;
    ///
    /// let gamepad = Gamepad::open()?;
    /// println!("Connected to gamepad at: {}", gamepad.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open() -> Result<Self> {
        let input_dir = Path::new(INPUT_DIR);

        if !input_dir.exists() {
            return Err(TeleopError::Gamepad(format!("{} directory not found", INPUT_DIR)));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| TeleopError::Gamepad(format!("Failed to read {}: {}", INPUT_DIR, e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TeleopError::Gamepad(format!("Failed to read directory entry: {}", e)))?;

        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();

            let is_event_node = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with("event"));
            if !is_event_node {
                continue;
            }

            match Device::open(&path) {
                Ok(device) => {
                    debug!(
                        "Found input device: {} ({})",
                        path.display(),
                        device.name().unwrap_or("unnamed")
                    );

                    if is_joystick(&device) {
                        let device_path = path.to_string_lossy().to_string();
                        info!(
                            "Found joystick {} at: {}",
                            device.name().unwrap_or("unnamed"),
                            device_path
                        );
                        return Ok(Self { device, device_path });
                    }
                }
                Err(e) => {
                    // Permission denied or other errors - skip device
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(TeleopError::GamepadNotFound)
    }

    /// Open a specific event device
    ///
    /// # Errors
    ///
    /// Returns `Gamepad` error if the device cannot be opened or is not a
    /// joystick/gamepad.
    pub fn open_path(path: &str) -> Result<Self> {
        let device = Device::open(path)
            .map_err(|e| TeleopError::Gamepad(format!("Failed to open {}: {}", path, e)))?;

        if !is_joystick(&device) {
            return Err(TeleopError::Gamepad(format!(
                "{} is not a joystick or gamepad",
                path
            )));
        }

        info!("Opened joystick {} at: {}", device.name().unwrap_or("unnamed"), path);
        Ok(Self {
            device,
            device_path: path.to_string(),
        })
    }

    /// Open `path`, or auto-detect when it is empty
    ///
    /// # Errors
    ///
    /// See [`Gamepad::open`] and [`Gamepad::open_path`].
    pub fn open_configured(path: &str) -> Result<Self> {
        if path.is_empty() {
            Self::open()
        } else {
            Self::open_path(path)
        }
    }

    /// Get the device path of this gamepad
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Human-readable device name, if the driver reports one
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Start streaming snapshots from this gamepad
    ///
    /// # Errors
    ///
    /// Returns error if the device state cannot be read or the device cannot
    /// be registered with the async runtime.
    pub fn into_source(self, invert_axes: bool) -> Result<GamepadSource> {
        let builder = JoyStateBuilder::from_device(&self.device, invert_axes)?;
        info!(
            "Gamepad {} layout: {} buttons, {} axes",
            self.name().unwrap_or("unnamed"),
            builder.layout().button_count(),
            builder.layout().axis_count()
        );

        let events = self.device.into_event_stream().map_err(|e| {
            TeleopError::Gamepad(format!("Failed to stream {}: {}", self.device_path, e))
        })?;

        Ok(GamepadSource::new(events, builder, self.device_path))
    }
}

/// Whether a device looks like a joystick or gamepad.
fn is_joystick(device: &Device) -> bool {
    let has_stick = device
        .supported_absolute_axes()
        .is_some_and(|axes| axes.contains(AbsoluteAxisType::ABS_X));

    let has_joy_button = device
        .supported_keys()
        .is_some_and(|keys| keys.iter().any(is_joystick_button));

    has_stick && has_joy_button
}

fn is_joystick_button(key: Key) -> bool {
    (Key::BTN_TRIGGER.code()..=Key::BTN_THUMBR.code()).contains(&key.code())
}
