//! Fade curves for volume ramps
//!
//! A track switch masks the gap with a stepped volume ramp: fade the old
//! output to silence, load the new item, fade back in. Each curve maps the
//! normalized ramp position `t` (0.0..=1.0) to an output gain.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

/// Shape of a volume ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// v(t) = t
    #[default]
    Linear,
    /// v(t) = t², slow start
    Exponential,
    /// v(t) = √t, fast start
    Logarithmic,
    /// v(t) = 0.5 × (1 − cos(πt))
    SCurve,
    /// v(t) = sin(t × π/2)
    EqualPower,
}

/// Direction of a ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    In,
    Out,
}

impl FadeCurve {
    /// Gain while fading in (0.0 at t=0, 1.0 at t=1)
    pub fn fade_in(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            FadeCurve::Linear => t,
            FadeCurve::Exponential => t * t,
            FadeCurve::Logarithmic => t.sqrt(),
            FadeCurve::SCurve => 0.5 * (1.0 - (PI * t).cos()),
            FadeCurve::EqualPower => (t * FRAC_PI_2).sin(),
        }
    }

    /// Gain while fading out (1.0 at t=0, 0.0 at t=1)
    ///
    /// Mirror image of the fade-in so a fade-out followed by a fade-in of the
    /// same curve is symmetric.
    pub fn fade_out(&self, t: f32) -> f32 {
        self.fade_in(1.0 - t.clamp(0.0, 1.0))
    }

    /// Gains for a stepped ramp, one per step
    ///
    /// The last value is exactly the target (0.0 for out, 1.0 for in) so a
    /// completed ramp never leaves the output slightly attenuated.
    pub fn steps(&self, direction: FadeDirection, steps: u32) -> Vec<f32> {
        let steps = steps.max(1);
        (1..=steps)
            .map(|i| {
                if i == steps {
                    return match direction {
                        FadeDirection::In => 1.0,
                        FadeDirection::Out => 0.0,
                    };
                }
                let t = i as f32 / steps as f32;
                match direction {
                    FadeDirection::In => self.fade_in(t),
                    FadeDirection::Out => self.fade_out(t),
                }
            })
            .collect()
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FadeCurve::Linear => "linear",
            FadeCurve::Exponential => "exponential",
            FadeCurve::Logarithmic => "logarithmic",
            FadeCurve::SCurve => "s_curve",
            FadeCurve::EqualPower => "equal_power",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [FadeCurve; 5] = [
        FadeCurve::Linear,
        FadeCurve::Exponential,
        FadeCurve::Logarithmic,
        FadeCurve::SCurve,
        FadeCurve::EqualPower,
    ];

    #[test]
    fn test_endpoints() {
        for curve in ALL {
            assert!(curve.fade_in(0.0).abs() < 1e-4, "{:?} in(0)", curve);
            assert!((curve.fade_in(1.0) - 1.0).abs() < 1e-4, "{:?} in(1)", curve);
            assert!((curve.fade_out(0.0) - 1.0).abs() < 1e-4, "{:?} out(0)", curve);
            assert!(curve.fade_out(1.0).abs() < 1e-4, "{:?} out(1)", curve);
        }
    }

    #[test]
    fn test_linear_twenty_step_ramp() {
        let out = FadeCurve::Linear.steps(FadeDirection::Out, 20);
        assert_eq!(out.len(), 20);
        assert!((out[0] - 0.95).abs() < 1e-6);
        assert!((out[9] - 0.5).abs() < 1e-6);
        assert_eq!(*out.last().unwrap(), 0.0);

        let fade_in = FadeCurve::Linear.steps(FadeDirection::In, 20);
        assert!((fade_in[0] - 0.05).abs() < 1e-6);
        assert_eq!(*fade_in.last().unwrap(), 1.0);
    }

    #[test]
    fn test_steps_are_monotonic() {
        for curve in ALL {
            let gains = curve.steps(FadeDirection::In, 20);
            assert!(gains.windows(2).all(|w| w[0] <= w[1] + 1e-6), "{:?}", curve);
            let gains = curve.steps(FadeDirection::Out, 20);
            assert!(gains.windows(2).all(|w| w[0] + 1e-6 >= w[1]), "{:?}", curve);
        }
    }

    #[test]
    fn test_zero_steps_still_reaches_target() {
        assert_eq!(FadeCurve::Linear.steps(FadeDirection::In, 0), vec![1.0]);
    }
}
