//! # Message Types
//!
//! The two messages the node exchanges with the outside world:
//!
//! - [`JoystickState`]: one snapshot of every button and axis of an input device
//! - [`DriveCommand`]: steering angle and speed for an Ackermann vehicle
//!
//! Both serialize to JSON with snake_case field names:
//!
//! ```text
//! {"buttons":[0,1,0,0],"axes":[-0.25,0.0,0.0,0.0]}
//! {"steering_angle":-11.25,"speed":150.0}
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// Snapshot of all button and axis readings at one sampling instant.
///
/// Buttons are pressed-levels (`> 0` means pressed). Axes are normalized,
/// typically to `[-1.0, 1.0]`, but nothing enforces that range.
///
/// # Examples
///
/// ```
/// use movr_teleop::messages::JoystickState;
///
/// let state: JoystickState =
///     serde_json::from_str(r#"{"buttons":[true,0],"axes":[0.5,0.0]}"#)?;
/// assert_eq!(state.buttons, vec![1, 0]);
/// assert_eq!(state.button_pressed(0), Some(true));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoystickState {
    /// Button pressed-levels, in device order.
    #[serde(deserialize_with = "deserialize_button_levels")]
    pub buttons: Vec<i32>,
    /// Axis values, in device order.
    pub axes: Vec<f32>,
}

impl JoystickState {
    /// Creates a snapshot from button levels and axis values.
    #[must_use]
    pub fn new(buttons: Vec<i32>, axes: Vec<f32>) -> Self {
        Self { buttons, axes }
    }

    /// Returns whether button `index` is pressed, or `None` if the device
    /// has no such button.
    #[must_use]
    pub fn button_pressed(&self, index: usize) -> Option<bool> {
        self.buttons.get(index).map(|&level| level > 0)
    }

    /// Returns the value of axis `index`, or `None` if the device has no
    /// such axis.
    #[must_use]
    pub fn axis(&self, index: usize) -> Option<f32> {
        self.axes.get(index).copied()
    }
}

/// Steering/speed command for the vehicle.
///
/// Created fresh per joystick event and handed to the output sink by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveCommand {
    /// Steering angle in degrees. Positive steers in the direction of a
    /// positive steering axis.
    pub steering_angle: f32,
    /// Speed in the downstream controller's units.
    pub speed: f32,
}

/// Wire form of a single button: joystick drivers report integer levels,
/// hand-written producers often send booleans.
#[derive(Deserialize)]
#[serde(untagged)]
enum ButtonLevel {
    Level(i32),
    Pressed(bool),
}

impl From<ButtonLevel> for i32 {
    fn from(level: ButtonLevel) -> Self {
        match level {
            ButtonLevel::Level(value) => value,
            ButtonLevel::Pressed(pressed) => i32::from(pressed),
        }
    }
}

fn deserialize_button_levels<'de, D>(deserializer: D) -> std::result::Result<Vec<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let levels = Vec::<ButtonLevel>::deserialize(deserializer)?;
    Ok(levels.into_iter().map(i32::from).collect())
}
