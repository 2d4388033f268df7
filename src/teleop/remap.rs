//! Linear range remapping.

/// Maps `x` linearly from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// No clamping is applied: inputs outside the input range extrapolate along
/// the same line. `in_min` and `in_max` must differ.
///
/// # Examples
///
/// ```
/// use movr_teleop::teleop::remap;
///
/// assert_eq!(remap(0.0, -1.0, 1.0, -45.0, 45.0), 0.0);
/// assert_eq!(remap(1.0, -1.0, 1.0, -45.0, 45.0), 45.0);
/// assert_eq!(remap(2.0, -1.0, 1.0, -45.0, 45.0), 90.0);
/// ```
#[must_use]
pub fn remap(x: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steer(x: f32) -> f32 {
        remap(x, -1.0, 1.0, -45.0, 45.0)
    }

    #[test]
    fn test_endpoints_and_center() {
        assert_eq!(steer(-1.0), -45.0);
        assert_eq!(steer(0.0), 0.0);
        assert_eq!(steer(1.0), 45.0);
    }

    #[test]
    fn test_unit_range_stays_within_limits() {
        for i in -100..=100 {
            let x = i as f32 / 100.0;
            let angle = steer(x);
            assert!((-45.0..=45.0).contains(&angle), "remap({}) = {}", x, angle);
        }
    }

    #[test]
    fn test_no_clamping_outside_range() {
        assert_eq!(steer(2.0), 90.0);
        assert_eq!(steer(-2.0), -90.0);
    }

    #[test]
    fn test_monotonic() {
        assert!(steer(-0.5) < steer(-0.25));
        assert!(steer(0.25) < steer(0.5));
    }

    #[test]
    fn test_reversed_output_range() {
        assert_eq!(remap(0.0, 0.0, 255.0, 1.0, -1.0), 1.0);
        assert_eq!(remap(255.0, 0.0, 255.0, 1.0, -1.0), -1.0);
    }
}
