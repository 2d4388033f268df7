//! # Joystick State Builder
//!
//! Turns raw evdev events into [`JoystickState`] snapshots.
//!
//! ## Numbering
//!
//! Buttons and axes are numbered the way the Linux joystick API numbers
//! them, so index 0/1 refer to the same physical controls as in any
//! joystick driver:
//!
//! - Buttons: supported key codes from `BTN_MISC` upward in code order,
//!   followed by any lower key codes
//! - Axes: supported absolute axes in code order
//!
//! For a Logitech gamepad in DirectInput mode this gives:
//!
//! | Index | Button | Axis |
//! |-------|--------|------|
//! | 0 | X | Left stick horizontal |
//! | 1 | A | Left stick vertical |
//! | 2 | B | Right stick horizontal |
//! | 3 | Y | Right stick vertical |
//! | 4 | LB | D-Pad horizontal |
//! | 5 | RB | D-Pad vertical |
//!
//! ## Normalization
//!
//! Axis values are mapped from the device's `[minimum, maximum]` onto
//! `[-1.0, 1.0]`. With axis inversion enabled (the joystick-driver
//! convention) left and up read positive.
//!
//! ## Snapshots
//!
//! Events are accumulated until `SYN_REPORT`; one snapshot is produced per
//! report that changed a numbered button or axis.

use evdev::{AbsoluteAxisType, Device, InputEvent, InputEventKind, Key, Synchronization};

use crate::error::Result;
use crate::messages::JoystickState;
use crate::teleop::remap;

/// Normalized axis range.
pub const AXIS_NORMALIZED_MIN: f32 = -1.0;
/// Normalized axis range.
pub const AXIS_NORMALIZED_MAX: f32 = 1.0;

/// Raw range of one absolute axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisInfo {
    pub axis: AbsoluteAxisType,
    pub minimum: i32,
    pub maximum: i32,
}

impl AxisInfo {
    /// Maps a raw reading onto `[-1.0, 1.0]`.
    ///
    /// A degenerate range (`minimum == maximum`) reads as 0.
    #[must_use]
    pub fn normalize(&self, raw: i32, invert: bool) -> f32 {
        if self.minimum == self.maximum {
            return 0.0;
        }
        let value = remap(
            raw as f32,
            self.minimum as f32,
            self.maximum as f32,
            AXIS_NORMALIZED_MIN,
            AXIS_NORMALIZED_MAX,
        );
        if invert {
            -value
        } else {
            value
        }
    }
}

/// Button and axis numbering of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoyLayout {
    buttons: Vec<Key>,
    axes: Vec<AxisInfo>,
}

impl JoyLayout {
    /// Builds a layout from buttons and axes, ordering both like the Linux
    /// joystick API.
    #[must_use]
    pub fn new(mut buttons: Vec<Key>, mut axes: Vec<AxisInfo>) -> Self {
        let misc = Key::BTN_0.code();
        buttons.sort_by_key(|key| (key.code() < misc, key.code()));
        buttons.dedup();
        axes.sort_by_key(|info| info.axis.0);
        axes.dedup_by_key(|info| info.axis.0);
        Self { buttons, axes }
    }

    /// Reads the supported buttons and axes of a device.
    ///
    /// # Errors
    ///
    /// Returns error if the axis ranges cannot be queried.
    pub fn from_device(device: &Device) -> Result<Self> {
        let buttons = device
            .supported_keys()
            .map(|keys| keys.iter().collect())
            .unwrap_or_default();

        let abs_state = device.get_abs_state()?;
        let axes = device
            .supported_absolute_axes()
            .map(|set| {
                set.iter()
                    .filter_map(|axis| {
                        abs_state.get(axis.0 as usize).map(|info| AxisInfo {
                            axis,
                            minimum: info.minimum,
                            maximum: info.maximum,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self::new(buttons, axes))
    }

    /// Number of buttons.
    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    /// Number of axes.
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    fn button_index(&self, key: Key) -> Option<usize> {
        self.buttons.iter().position(|&k| k == key)
    }

    fn axis_index(&self, axis: AbsoluteAxisType) -> Option<usize> {
        self.axes.iter().position(|info| info.axis == axis)
    }
}

/// Accumulates evdev events into joystick snapshots.
///
/// Not thread-safe; feed it from a single task.
#[derive(Debug)]
pub struct JoyStateBuilder {
    layout: JoyLayout,
    invert_axes: bool,
    buttons: Vec<i32>,
    axes: Vec<f32>,
    dirty: bool,
}

impl JoyStateBuilder {
    /// Creates a builder with every button released and every axis at 0.
    #[must_use]
    pub fn new(layout: JoyLayout, invert_axes: bool) -> Self {
        let buttons = vec![0; layout.button_count()];
        let axes = vec![0.0; layout.axis_count()];
        Self {
            layout,
            invert_axes,
            buttons,
            axes,
            dirty: false,
        }
    }

    /// Creates a builder seeded with the device's current button and axis
    /// state.
    ///
    /// # Errors
    ///
    /// Returns error if the device state cannot be queried.
    pub fn from_device(device: &Device, invert_axes: bool) -> Result<Self> {
        let layout = JoyLayout::from_device(device)?;
        let mut builder = Self::new(layout, invert_axes);

        let key_state = device.get_key_state()?;
        for (index, &key) in builder.layout.buttons.iter().enumerate() {
            builder.buttons[index] = i32::from(key_state.contains(key));
        }

        let abs_state = device.get_abs_state()?;
        for (index, info) in builder.layout.axes.iter().enumerate() {
            if let Some(raw) = abs_state.get(info.axis.0 as usize) {
                builder.axes[index] = info.normalize(raw.value, invert_axes);
            }
        }

        Ok(builder)
    }

    /// Layout in use.
    pub fn layout(&self) -> &JoyLayout {
        &self.layout
    }

    /// Current state, whether or not it has been reported yet.
    #[must_use]
    pub fn snapshot(&self) -> JoystickState {
        JoystickState::new(self.buttons.clone(), self.axes.clone())
    }

    /// Processes one event.
    ///
    /// Returns a snapshot on `SYN_REPORT` if any numbered control changed
    /// since the previous snapshot.
    pub fn process_event(&mut self, event: &InputEvent) -> Option<JoystickState> {
        match event.kind() {
            InputEventKind::AbsAxis(axis) => {
                if let Some(index) = self.layout.axis_index(axis) {
                    self.axes[index] = self.layout.axes[index].normalize(event.value(), self.invert_axes);
                    self.dirty = true;
                }
                None
            }
            InputEventKind::Key(key) => {
                if let Some(index) = self.layout.button_index(key) {
                    // Autorepeat (2) still reads as pressed
                    self.buttons[index] = i32::from(event.value() != 0);
                    self.dirty = true;
                }
                None
            }
            InputEventKind::Synchronization(Synchronization::SYN_REPORT) if self.dirty => {
                self.dirty = false;
                Some(self.snapshot())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::EventType;

    fn stick(axis: AbsoluteAxisType) -> AxisInfo {
        AxisInfo { axis, minimum: 0, maximum: 255 }
    }

    fn logitech_layout() -> JoyLayout {
        JoyLayout::new(
            vec![Key::BTN_THUMB, Key::BTN_TRIGGER, Key::BTN_THUMB2, Key::BTN_TOP],
            vec![
                stick(AbsoluteAxisType::ABS_Y),
                stick(AbsoluteAxisType::ABS_X),
                AxisInfo { axis: AbsoluteAxisType::ABS_HAT0X, minimum: -1, maximum: 1 },
            ],
        )
    }

    fn axis_event(axis: AbsoluteAxisType, value: i32) -> InputEvent {
        InputEvent::new(EventType::ABSOLUTE, axis.0, value)
    }

    fn key_event(key: Key, pressed: bool) -> InputEvent {
        InputEvent::new(EventType::KEY, key.code(), i32::from(pressed))
    }

    fn syn_report() -> InputEvent {
        InputEvent::new(EventType::SYNCHRONIZATION, Synchronization::SYN_REPORT.0, 0)
    }

    // ==================== Layout Tests ====================

    #[test]
    fn test_layout_orders_by_code() {
        let layout = logitech_layout();
        assert_eq!(layout.button_index(Key::BTN_TRIGGER), Some(0));
        assert_eq!(layout.button_index(Key::BTN_THUMB), Some(1));
        assert_eq!(layout.axis_index(AbsoluteAxisType::ABS_X), Some(0));
        assert_eq!(layout.axis_index(AbsoluteAxisType::ABS_Y), Some(1));
        assert_eq!(layout.axis_index(AbsoluteAxisType::ABS_HAT0X), Some(2));
    }

    #[test]
    fn test_layout_places_keyboard_keys_last() {
        let layout = JoyLayout::new(vec![Key::KEY_A, Key::BTN_SOUTH], vec![]);
        assert_eq!(layout.button_index(Key::BTN_SOUTH), Some(0));
        assert_eq!(layout.button_index(Key::KEY_A), Some(1));
    }

    // ==================== Normalization Tests ====================

    #[test]
    fn test_normalize_endpoints() {
        let info = stick(AbsoluteAxisType::ABS_X);
        assert_eq!(info.normalize(0, false), -1.0);
        assert_eq!(info.normalize(255, false), 1.0);
    }

    #[test]
    fn test_normalize_inverted() {
        let info = stick(AbsoluteAxisType::ABS_X);
        assert_eq!(info.normalize(0, true), 1.0);
        assert_eq!(info.normalize(255, true), -1.0);
    }

    #[test]
    fn test_normalize_hat() {
        let info = AxisInfo { axis: AbsoluteAxisType::ABS_HAT0X, minimum: -1, maximum: 1 };
        assert_eq!(info.normalize(-1, false), -1.0);
        assert_eq!(info.normalize(0, false), 0.0);
        assert_eq!(info.normalize(1, false), 1.0);
    }

    #[test]
    fn test_normalize_degenerate_range() {
        let info = AxisInfo { axis: AbsoluteAxisType::ABS_X, minimum: 5, maximum: 5 };
        assert_eq!(info.normalize(5, false), 0.0);
    }

    // ==================== Builder Tests ====================

    #[test]
    fn test_builder_starts_released() {
        let builder = JoyStateBuilder::new(logitech_layout(), false);
        let state = builder.snapshot();
        assert_eq!(state.buttons, vec![0, 0, 0, 0]);
        assert_eq!(state.axes, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_snapshot_on_syn_report() {
        let mut builder = JoyStateBuilder::new(logitech_layout(), false);

        assert!(builder.process_event(&key_event(Key::BTN_THUMB, true)).is_none());
        assert!(builder.process_event(&axis_event(AbsoluteAxisType::ABS_X, 255)).is_none());

        let state = builder.process_event(&syn_report()).unwrap();
        assert_eq!(state.buttons, vec![0, 1, 0, 0]);
        assert_eq!(state.axes[0], 1.0);
    }

    #[test]
    fn test_no_snapshot_without_changes() {
        let mut builder = JoyStateBuilder::new(logitech_layout(), false);
        assert!(builder.process_event(&syn_report()).is_none());

        builder.process_event(&key_event(Key::BTN_TRIGGER, true));
        assert!(builder.process_event(&syn_report()).is_some());
        assert!(builder.process_event(&syn_report()).is_none());
    }

    #[test]
    fn test_unmapped_events_ignored() {
        let mut builder = JoyStateBuilder::new(logitech_layout(), false);
        builder.process_event(&key_event(Key::BTN_MODE, true));
        builder.process_event(&axis_event(AbsoluteAxisType::ABS_RZ, 10));
        assert!(builder.process_event(&syn_report()).is_none());
    }

    #[test]
    fn test_button_release() {
        let mut builder = JoyStateBuilder::new(logitech_layout(), false);
        builder.process_event(&key_event(Key::BTN_TRIGGER, true));
        builder.process_event(&syn_report());
        builder.process_event(&key_event(Key::BTN_TRIGGER, false));

        let state = builder.process_event(&syn_report()).unwrap();
        assert_eq!(state.button_pressed(0), Some(false));
    }

    #[test]
    fn test_inverted_stick_left_is_positive() {
        let mut builder = JoyStateBuilder::new(logitech_layout(), true);
        builder.process_event(&axis_event(AbsoluteAxisType::ABS_X, 0));
        let state = builder.process_event(&syn_report()).unwrap();
        assert_eq!(state.axes[0], 1.0);
    }

    #[test]
    fn test_snapshot_feeds_translator() {
        use crate::teleop::InputTranslator;

        let mut builder = JoyStateBuilder::new(logitech_layout(), false);
        builder.process_event(&key_event(Key::BTN_TRIGGER, true)); // X: decelerate
        builder.process_event(&key_event(Key::BTN_THUMB, true)); // A: accelerate
        builder.process_event(&axis_event(AbsoluteAxisType::ABS_X, 0));
        let state = builder.process_event(&syn_report()).unwrap();

        let command = InputTranslator::new().handle_event(&state).unwrap();
        assert_eq!(command.steering_angle, -45.0);
        assert_eq!(command.speed, 80.0);
    }
}
