//! Turns raw device readings into the normalized `ControlSignal` the car consumes.

use state::{ConfigError, ControlSignal, InputConfig, RawInput};
use tracing::debug;

#[cfg(feature = "gamepad")]
mod gamepad;
#[cfg(feature = "gamepad")]
pub use crate::gamepad::{raw_from_gamepad, update_gamepad, Gamepad, Gilrs};

/// smoothed values closer to zero than this snap to zero, so letting go really means idle
const REST_EPSILON: f32 = 1e-4;

/// Deadzone, rescale and exponential smoothing of the analog axes. The handbrake is passed
/// through untouched. The smoothing accumulator is the only state.
#[derive(Clone, Debug, PartialEq)]
pub struct InputMapper {
    config: InputConfig,
    smoothed: ControlSignal,
}

impl InputMapper {
    pub fn new(config: InputConfig) -> Result<InputMapper, ConfigError> {
        config.validate()?;
        Ok(InputMapper {
            config,
            smoothed: ControlSignal::idle(),
        })
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn map(&mut self, raw: &RawInput) -> ControlSignal {
        let deadzone = self.config.deadzone;
        let steering = apply_deadzone(sanitize("steer", raw.steer).max(-1.0).min(1.0), deadzone);
        let throttle = apply_deadzone(sanitize("throttle", raw.throttle).max(0.0).min(1.0), deadzone);
        let brake = apply_deadzone(sanitize("brake", raw.brake).max(0.0).min(1.0), deadzone);

        let alpha = self.config.smoothing;
        let smoothed = &mut self.smoothed;
        smoothed.steering = smooth(smoothed.steering, steering, alpha);
        smoothed.throttle = smooth(smoothed.throttle, throttle, alpha);
        smoothed.brake = smooth(smoothed.brake, brake, alpha);
        smoothed.handbrake = raw.handbrake;

        *smoothed
    }

    pub fn reset(&mut self) {
        self.smoothed = ControlSignal::idle();
    }
}

fn sanitize(axis: &'static str, value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        debug!(axis, value, "non finite input axis, treating as released");
        0.0
    }
}

/// zero inside the deadzone, the rest stretched so the output still spans the full range
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    let magnitude = value.abs();
    if magnitude < deadzone {
        return 0.0;
    }
    value.signum() * ((magnitude - deadzone) / (1.0 - deadzone)).min(1.0)
}

fn smooth(previous: f32, target: f32, alpha: f32) -> f32 {
    let value = previous + alpha * (target - previous);
    if value.abs() < REST_EPSILON {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unsmoothed() -> InputMapper {
        InputMapper::new(InputConfig {
            deadzone: 0.1,
            smoothing: 1.0,
        })
        .unwrap()
    }

    fn steer(value: f32) -> RawInput {
        RawInput {
            steer: value,
            ..RawInput::default()
        }
    }

    #[test]
    fn deadzone_snaps_to_zero() {
        let mut mapper = unsmoothed();
        assert_eq!(mapper.map(&steer(0.05)).steering, 0.0);
        assert_eq!(mapper.map(&steer(-0.099)).steering, 0.0);
    }

    #[test]
    fn deadzone_rescales_the_rest() {
        let mut mapper = unsmoothed();
        assert_relative_eq!(mapper.map(&steer(0.55)).steering, 0.5, epsilon = 1e-6);
        assert_relative_eq!(mapper.map(&steer(-0.55)).steering, -0.5, epsilon = 1e-6);
        assert_eq!(mapper.map(&steer(1.0)).steering, 1.0);
        assert_eq!(mapper.map(&steer(-7.0)).steering, -1.0);
    }

    #[test]
    fn non_finite_axes_are_released() {
        let mut mapper = unsmoothed();
        let raw = RawInput {
            steer: std::f32::NAN,
            throttle: std::f32::INFINITY,
            brake: std::f32::NEG_INFINITY,
            handbrake: true,
        };
        let controls = mapper.map(&raw);
        assert_eq!(controls.steering, 0.0);
        assert_eq!(controls.throttle, 0.0);
        assert_eq!(controls.brake, 0.0);
        assert!(controls.handbrake);
    }

    #[test]
    fn pedals_never_go_negative() {
        let mut mapper = unsmoothed();
        let raw = RawInput {
            throttle: -1.0,
            brake: -0.5,
            ..RawInput::default()
        };
        let controls = mapper.map(&raw);
        assert_eq!(controls.throttle, 0.0);
        assert_eq!(controls.brake, 0.0);
    }

    #[test]
    fn smoothing_approaches_target_monotonically() {
        let mut mapper = InputMapper::new(InputConfig::default()).unwrap();
        let mut last = 0.0;
        for _ in 0..20 {
            let value = mapper.map(&steer(1.0)).steering;
            assert!(value > last && value <= 1.0);
            last = value;
        }
        assert!(last > 0.99);

        // releasing goes all the way back to idle
        for _ in 0..100 {
            mapper.map(&steer(0.0));
        }
        assert_eq!(mapper.map(&steer(0.0)), ControlSignal::idle());
    }

    #[test]
    fn reset_clears_smoothing() {
        let mut mapper = InputMapper::new(InputConfig::default()).unwrap();
        mapper.map(&steer(1.0));
        mapper.reset();
        let first = mapper.map(&steer(1.0)).steering;
        assert_relative_eq!(first, InputConfig::default().smoothing);
    }

    #[test]
    fn output_is_always_a_valid_signal() {
        let mut mapper = InputMapper::new(InputConfig::default()).unwrap();
        let values = [-3.0, -1.0, -0.5, -0.05, 0.0, 0.08, 0.3, 1.0, 2.5, std::f32::NAN];
        for &a in values.iter() {
            for &b in values.iter() {
                let raw = RawInput {
                    steer: a,
                    throttle: b,
                    brake: a,
                    handbrake: b > 0.0,
                };
                assert!(mapper.map(&raw).is_valid(), "{:?}", raw);
            }
        }
    }

    #[test]
    fn rejects_bad_config() {
        let config = InputConfig {
            deadzone: 1.0,
            smoothing: 0.5,
        };
        assert!(InputMapper::new(config).is_err());
        let config = InputConfig {
            deadzone: 0.1,
            smoothing: 0.0,
        };
        assert!(InputMapper::new(config).is_err());
    }
}
