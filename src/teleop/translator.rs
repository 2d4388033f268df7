//! # Input Translator Module
//!
//! Maps a [`JoystickState`] snapshot to a [`DriveCommand`].
//!
//! ## Input Assignments
//!
//! | Input | Index | Function |
//! |-------|-------|----------|
//! | Button | 0 | Decelerate |
//! | Button | 1 | Accelerate |
//! | Axis | 0 | Steering (left stick horizontal) |
//! | Axis | 1 | Left stick vertical (read, not mapped) |
//!
//! ## Speed Selection
//!
//! | Decelerate | Accelerate | Speed |
//! |------------|------------|-------|
//! | pressed | any | 80.0 |
//! | released | pressed | 150.0 |
//! | released | released | 120.0 |
//!
//! ## Usage
//!
//! ```
//! use movr_teleop::messages::JoystickState;
//! use movr_teleop::teleop::InputTranslator;
//!
//! let translator = InputTranslator::new();
//! let state = JoystickState::new(vec![0, 1], vec![0.0, 0.0]);
//! let command = translator.handle_event(&state)?;
//!
//! assert_eq!(command.steering_angle, 0.0);
//! assert_eq!(command.speed, 150.0);
//! # Ok::<(), movr_teleop::error::TeleopError>(())
//! ```

use super::remap::remap;
use crate::error::{Result, TeleopError};
use crate::messages::{DriveCommand, JoystickState};

/// Button and axis indices consulted by the translator.
pub mod inputs {
    /// Decelerate - X on a Logitech gamepad
    pub const DECELERATE_BUTTON: usize = 0;
    /// Accelerate - A on a Logitech gamepad
    pub const ACCELERATE_BUTTON: usize = 1;
    /// Steering - left stick horizontal
    pub const STEERING_AXIS: usize = 0;
    /// Left stick vertical
    pub const VERTICAL_AXIS: usize = 1;

    /// Minimum number of buttons a snapshot must carry.
    pub const MIN_BUTTONS: usize = 2;
    /// Minimum number of axes a snapshot must carry.
    pub const MIN_AXES: usize = 2;
}

/// Normalized stick range.
pub const STICK_MIN: f32 = -1.0;
/// Normalized stick range.
pub const STICK_MAX: f32 = 1.0;

/// Full-lock steering angle in degrees.
pub const STEERING_LIMIT_DEG: f32 = 45.0;

/// Speed while the decelerate button is held.
pub const SPEED_DECELERATE: f32 = 80.0;
/// Speed while only the accelerate button is held.
pub const SPEED_ACCELERATE: f32 = 150.0;
/// Speed with no speed button held.
pub const SPEED_CRUISE: f32 = 120.0;

/// Stateless joystick-to-drive-command translator.
///
/// # Examples
///
/// ```
/// use movr_teleop::messages::JoystickState;
/// use movr_teleop::teleop::InputTranslator;
///
/// // Both speed buttons held: decelerate wins
/// let state = JoystickState::new(vec![1, 1], vec![-1.0, 0.0]);
/// let command = InputTranslator::new().handle_event(&state)?;
///
/// assert_eq!(command.steering_angle, -45.0);
/// assert_eq!(command.speed, 80.0);
/// # Ok::<(), movr_teleop::error::TeleopError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct InputTranslator;

impl InputTranslator {
    /// Creates a new translator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Translates one joystick snapshot into a drive command.
    ///
    /// Out-of-range axis values are not clamped; the steering angle
    /// extrapolates linearly past ±45°.
    ///
    /// # Errors
    ///
    /// Returns [`TeleopError::MalformedInput`] if the snapshot has fewer than
    /// two buttons or fewer than two axes.
    pub fn handle_event(&self, state: &JoystickState) -> Result<DriveCommand> {
        if state.buttons.len() < inputs::MIN_BUTTONS || state.axes.len() < inputs::MIN_AXES {
            return Err(TeleopError::MalformedInput {
                buttons: state.buttons.len(),
                axes: state.axes.len(),
            });
        }

        let decelerate = state.buttons[inputs::DECELERATE_BUTTON] > 0;
        let accelerate = state.buttons[inputs::ACCELERATE_BUTTON] > 0;
        let steering = state.axes[inputs::STEERING_AXIS];
        // Vertical stick has no mapping yet.
        let _vertical = state.axes[inputs::VERTICAL_AXIS];

        Ok(DriveCommand {
            steering_angle: Self::steering_angle(steering),
            speed: Self::select_speed(decelerate, accelerate),
        })
    }

    /// Maps a normalized stick value to a steering angle in degrees.
    fn steering_angle(axis: f32) -> f32 {
        remap(axis, STICK_MIN, STICK_MAX, -STEERING_LIMIT_DEG, STEERING_LIMIT_DEG)
    }

    /// Picks the speed constant. Decelerate takes priority over accelerate.
    fn select_speed(decelerate: bool, accelerate: bool) -> f32 {
        if decelerate {
            SPEED_DECELERATE
        } else if accelerate {
            SPEED_ACCELERATE
        } else {
            SPEED_CRUISE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(buttons: Vec<i32>, axes: Vec<f32>) -> Result<DriveCommand> {
        InputTranslator::new().handle_event(&JoystickState::new(buttons, axes))
    }

    // ==================== Speed Selection Tests ====================

    #[test]
    fn test_accelerate_only() {
        let command = translate(vec![0, 1], vec![0.0, 0.0]).unwrap();
        assert_eq!(command, DriveCommand { steering_angle: 0.0, speed: 150.0 });
    }

    #[test]
    fn test_decelerate_wins_tie() {
        let command = translate(vec![1, 1], vec![-1.0, 0.0]).unwrap();
        assert_eq!(command, DriveCommand { steering_angle: -45.0, speed: 80.0 });
    }

    #[test]
    fn test_no_buttons_cruise() {
        let command = translate(vec![0, 0], vec![1.0, 0.0]).unwrap();
        assert_eq!(command, DriveCommand { steering_angle: 45.0, speed: 120.0 });
    }

    #[test]
    fn test_decelerate_only() {
        let command = translate(vec![1, 0], vec![0.0, 0.0]).unwrap();
        assert_eq!(command.speed, SPEED_DECELERATE);
    }

    #[test]
    fn test_pressed_means_positive_level() {
        // Negative or zero levels are released
        assert_eq!(translate(vec![-1, 0], vec![0.0, 0.0]).unwrap().speed, SPEED_CRUISE);
        assert_eq!(translate(vec![0, 3], vec![0.0, 0.0]).unwrap().speed, SPEED_ACCELERATE);
    }

    // ==================== Steering Tests ====================

    #[test]
    fn test_steering_extrapolates() {
        let command = translate(vec![0, 0], vec![2.0, 0.0]).unwrap();
        assert_eq!(command.steering_angle, 90.0);
    }

    #[test]
    fn test_vertical_axis_ignored() {
        let low = translate(vec![0, 0], vec![0.5, -1.0]).unwrap();
        let high = translate(vec![0, 0], vec![0.5, 1.0]).unwrap();
        assert_eq!(low, high);
    }

    #[test]
    fn test_extra_inputs_ignored() {
        let command = translate(vec![0, 1, 1, 1, 1], vec![0.0, 0.0, 1.0, 1.0]).unwrap();
        assert_eq!(command, DriveCommand { steering_angle: 0.0, speed: 150.0 });
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_too_few_buttons() {
        match translate(vec![1], vec![0.0, 0.0]) {
            Err(TeleopError::MalformedInput { buttons, axes }) => {
                assert_eq!(buttons, 1);
                assert_eq!(axes, 2);
            }
            other => panic!("Expected MalformedInput, got: {:?}", other),
        }
    }

    #[test]
    fn test_too_few_axes() {
        assert!(matches!(
            translate(vec![0, 0], vec![0.0]),
            Err(TeleopError::MalformedInput { buttons: 2, axes: 1 })
        ));
    }

    #[test]
    fn test_empty_state() {
        assert!(translate(vec![], vec![]).is_err());
    }

    // ==================== Purity Tests ====================

    #[test]
    fn test_identical_input_identical_output() {
        let translator = InputTranslator::new();
        let state = JoystickState::new(vec![0, 1], vec![0.337, -0.12]);

        let first = translator.handle_event(&state).unwrap();
        let second = translator.handle_event(&state).unwrap();

        assert_eq!(first.steering_angle.to_bits(), second.steering_angle.to_bits());
        assert_eq!(first.speed.to_bits(), second.speed.to_bits());
    }
}
