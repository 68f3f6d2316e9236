//! Easing functions for animations
//!
//! Every curve maps normalized progress in `[0, 1]` to eased progress. Back,
//! Elastic and Bounce overshoot that range on purpose. All formulas are
//! evaluated in `f64` and narrowed to `f32` on return.
//!
//! In/Out/InOut variants of a family share one construction: `InOut` plays the
//! `In` curve over the first half of progress and the `Out` curve over the
//! second half, each scaled by 0.5.

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

use crate::error::AnimationError;

const BACK_OVERSHOOT: f64 = 1.70158;
const BACK_OVERSHOOT_IN_OUT: f64 = BACK_OVERSHOOT * 1.525;
const ELASTIC_PERIOD: f64 = 0.3;
const ELASTIC_PERIOD_IN_OUT: f64 = ELASTIC_PERIOD * 1.5;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInCirc,
    EaseOutCirc,
    EaseInOutCirc,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
    EaseInElastic,
    EaseOutElastic,
    EaseInOutElastic,
    CubicBezier(f32, f32, f32, f32),
    /// Any caller-supplied transfer function
    Custom(fn(f32) -> f32),
}

impl Easing {
    /// The fixed catalog of named curves
    pub const ALL: [Easing; 34] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuart,
        Easing::EaseInQuint,
        Easing::EaseOutQuint,
        Easing::EaseInOutQuint,
        Easing::EaseInSine,
        Easing::EaseOutSine,
        Easing::EaseInOutSine,
        Easing::EaseInCirc,
        Easing::EaseOutCirc,
        Easing::EaseInOutCirc,
        Easing::EaseInExpo,
        Easing::EaseOutExpo,
        Easing::EaseInOutExpo,
        Easing::EaseInBack,
        Easing::EaseOutBack,
        Easing::EaseInOutBack,
        Easing::EaseInBounce,
        Easing::EaseOutBounce,
        Easing::EaseInOutBounce,
        Easing::EaseInElastic,
        Easing::EaseOutElastic,
        Easing::EaseInOutElastic,
    ];

    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn | Easing::EaseInQuad => narrow(power_in(t.into(), 2)),
            Easing::EaseOut | Easing::EaseOutQuad => narrow(power_out(t.into(), 2)),
            Easing::EaseInOut | Easing::EaseInOutQuad => {
                narrow(in_out(t.into(), |t| power_in(t, 2), |t| power_out(t, 2)))
            }
            Easing::EaseInCubic => narrow(power_in(t.into(), 3)),
            Easing::EaseOutCubic => narrow(power_out(t.into(), 3)),
            Easing::EaseInOutCubic => {
                narrow(in_out(t.into(), |t| power_in(t, 3), |t| power_out(t, 3)))
            }
            Easing::EaseInQuart => narrow(power_in(t.into(), 4)),
            Easing::EaseOutQuart => narrow(power_out(t.into(), 4)),
            Easing::EaseInOutQuart => {
                narrow(in_out(t.into(), |t| power_in(t, 4), |t| power_out(t, 4)))
            }
            Easing::EaseInQuint => narrow(power_in(t.into(), 5)),
            Easing::EaseOutQuint => narrow(power_out(t.into(), 5)),
            Easing::EaseInOutQuint => {
                narrow(in_out(t.into(), |t| power_in(t, 5), |t| power_out(t, 5)))
            }
            Easing::EaseInSine => narrow(sine_in(t.into())),
            Easing::EaseOutSine => narrow(sine_out(t.into())),
            Easing::EaseInOutSine => narrow(in_out(t.into(), sine_in, sine_out)),
            Easing::EaseInCirc => narrow(circ_in(t.into())),
            Easing::EaseOutCirc => narrow(circ_out(t.into())),
            Easing::EaseInOutCirc => narrow(in_out(t.into(), circ_in, circ_out)),
            Easing::EaseInExpo => narrow(expo_in(t.into())),
            Easing::EaseOutExpo => narrow(expo_out(t.into())),
            Easing::EaseInOutExpo => narrow(in_out(t.into(), expo_in, expo_out)),
            Easing::EaseInBack => narrow(back_in(t.into(), BACK_OVERSHOOT)),
            Easing::EaseOutBack => narrow(back_out(t.into(), BACK_OVERSHOOT)),
            Easing::EaseInOutBack => narrow(in_out(
                t.into(),
                |t| back_in(t, BACK_OVERSHOOT_IN_OUT),
                |t| back_out(t, BACK_OVERSHOOT_IN_OUT),
            )),
            Easing::EaseInBounce => bounce_in(t),
            Easing::EaseOutBounce => narrow(bounce_out(t.into())),
            Easing::EaseInOutBounce => {
                if t < 0.5 {
                    bounce_in(t * 2.0) * 0.5
                } else {
                    narrow(0.5 + bounce_out(f64::from(t) * 2.0 - 1.0) * 0.5)
                }
            }
            Easing::EaseInElastic => narrow(elastic_in(t.into(), ELASTIC_PERIOD)),
            Easing::EaseOutElastic => narrow(elastic_out(t.into(), ELASTIC_PERIOD)),
            Easing::EaseInOutElastic => narrow(in_out(
                t.into(),
                |t| elastic_in(t, ELASTIC_PERIOD_IN_OUT),
                |t| elastic_out(t, ELASTIC_PERIOD_IN_OUT),
            )),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
            Easing::Custom(f) => f(t),
        }
    }

    /// Look up the In/Out/InOut triple of a curve family by name.
    ///
    /// Family names are the ones a curve picker would list: `"ease"`,
    /// `"quadratic"`, `"cubic"`, `"quartic"`, `"quintic"`, `"sine"`,
    /// `"circular"`, `"exponential"`, `"back"`, `"bounce"` and `"elastic"`.
    /// `"linear"` yields `Linear` three times.
    pub fn family(name: &str) -> Option<[Easing; 3]> {
        let triple = match name.to_ascii_lowercase().as_str() {
            "linear" => [Easing::Linear, Easing::Linear, Easing::Linear],
            "ease" => [Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut],
            "quad" | "quadratic" => [
                Easing::EaseInQuad,
                Easing::EaseOutQuad,
                Easing::EaseInOutQuad,
            ],
            "cubic" => [
                Easing::EaseInCubic,
                Easing::EaseOutCubic,
                Easing::EaseInOutCubic,
            ],
            "quart" | "quartic" => [
                Easing::EaseInQuart,
                Easing::EaseOutQuart,
                Easing::EaseInOutQuart,
            ],
            "quint" | "quintic" => [
                Easing::EaseInQuint,
                Easing::EaseOutQuint,
                Easing::EaseInOutQuint,
            ],
            "sine" => [
                Easing::EaseInSine,
                Easing::EaseOutSine,
                Easing::EaseInOutSine,
            ],
            "circ" | "circular" => [
                Easing::EaseInCirc,
                Easing::EaseOutCirc,
                Easing::EaseInOutCirc,
            ],
            "expo" | "exponential" => [
                Easing::EaseInExpo,
                Easing::EaseOutExpo,
                Easing::EaseInOutExpo,
            ],
            "back" => [
                Easing::EaseInBack,
                Easing::EaseOutBack,
                Easing::EaseInOutBack,
            ],
            "bounce" => [
                Easing::EaseInBounce,
                Easing::EaseOutBounce,
                Easing::EaseInOutBounce,
            ],
            "elastic" => [
                Easing::EaseInElastic,
                Easing::EaseOutElastic,
                Easing::EaseInOutElastic,
            ],
            _ => return None,
        };
        Some(triple)
    }

    /// Kebab-case name of a catalog curve, `None` for bezier and custom curves
    pub fn name(&self) -> Option<&'static str> {
        let name = match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
            Easing::EaseInQuad => "ease-in-quad",
            Easing::EaseOutQuad => "ease-out-quad",
            Easing::EaseInOutQuad => "ease-in-out-quad",
            Easing::EaseInCubic => "ease-in-cubic",
            Easing::EaseOutCubic => "ease-out-cubic",
            Easing::EaseInOutCubic => "ease-in-out-cubic",
            Easing::EaseInQuart => "ease-in-quart",
            Easing::EaseOutQuart => "ease-out-quart",
            Easing::EaseInOutQuart => "ease-in-out-quart",
            Easing::EaseInQuint => "ease-in-quint",
            Easing::EaseOutQuint => "ease-out-quint",
            Easing::EaseInOutQuint => "ease-in-out-quint",
            Easing::EaseInSine => "ease-in-sine",
            Easing::EaseOutSine => "ease-out-sine",
            Easing::EaseInOutSine => "ease-in-out-sine",
            Easing::EaseInCirc => "ease-in-circ",
            Easing::EaseOutCirc => "ease-out-circ",
            Easing::EaseInOutCirc => "ease-in-out-circ",
            Easing::EaseInExpo => "ease-in-expo",
            Easing::EaseOutExpo => "ease-out-expo",
            Easing::EaseInOutExpo => "ease-in-out-expo",
            Easing::EaseInBack => "ease-in-back",
            Easing::EaseOutBack => "ease-out-back",
            Easing::EaseInOutBack => "ease-in-out-back",
            Easing::EaseInBounce => "ease-in-bounce",
            Easing::EaseOutBounce => "ease-out-bounce",
            Easing::EaseInOutBounce => "ease-in-out-bounce",
            Easing::EaseInElastic => "ease-in-elastic",
            Easing::EaseOutElastic => "ease-out-elastic",
            Easing::EaseInOutElastic => "ease-in-out-elastic",
            Easing::CubicBezier(..) | Easing::Custom(_) => return None,
        };
        Some(name)
    }
}

impl FromStr for Easing {
    type Err = AnimationError;

    /// Parse a kebab-case curve name such as `ease-out-bounce`.
    ///
    /// `ease` is accepted as the CSS keyword and maps to
    /// `CubicBezier(0.25, 0.1, 0.25, 1.0)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name == "ease" {
            return Ok(Easing::CubicBezier(0.25, 0.1, 0.25, 1.0));
        }
        Easing::ALL
            .iter()
            .find(|easing| easing.name() == Some(name.as_str()))
            .copied()
            .ok_or_else(|| AnimationError::UnknownEasing(s.to_string()))
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
            Easing::Custom(_) => f.write_str("custom"),
            other => f.write_str(other.name().unwrap_or("custom")),
        }
    }
}

#[inline]
fn narrow(value: f64) -> f32 {
    value as f32
}

/// Midpoint swap shared by every InOut variant
#[inline]
fn in_out(t: f64, ease_in: impl Fn(f64) -> f64, ease_out: impl Fn(f64) -> f64) -> f64 {
    let t = t * 2.0;
    if t < 1.0 {
        ease_in(t) * 0.5
    } else {
        0.5 + ease_out(t - 1.0) * 0.5
    }
}

#[inline]
fn power_in(t: f64, n: i32) -> f64 {
    t.powi(n)
}

#[inline]
fn power_out(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

fn sine_in(t: f64) -> f64 {
    1.0 - (t * FRAC_PI_2).cos()
}

fn sine_out(t: f64) -> f64 {
    (t * FRAC_PI_2).sin()
}

fn circ_in(t: f64) -> f64 {
    1.0 - (1.0 - t * t).max(0.0).sqrt()
}

fn circ_out(t: f64) -> f64 {
    let t = t - 1.0;
    (1.0 - t * t).max(0.0).sqrt()
}

fn expo_in(t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    2f64.powf(10.0 * (t - 1.0))
}

fn expo_out(t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    1.0 - 2f64.powf(-10.0 * t)
}

fn back_in(t: f64, s: f64) -> f64 {
    t * t * ((s + 1.0) * t - s)
}

fn back_out(t: f64, s: f64) -> f64 {
    let t = t - 1.0;
    t * t * ((s + 1.0) * t + s) + 1.0
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;

    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// Time reversal of the bounce-out curve, kept in `f32` so that
/// `bounce_in(t) == 1 - bounce_out(1 - t)` holds exactly at the public precision.
#[inline]
fn bounce_in(t: f32) -> f32 {
    1.0 - narrow(bounce_out(f64::from(1.0 - t)))
}

fn elastic_in(t: f64, period: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let phase = period / 4.0;
    let t = t - 1.0;
    -(2f64.powf(10.0 * t) * ((t - phase) * (2.0 * PI) / period).sin())
}

fn elastic_out(t: f64, period: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let phase = period / 4.0;
    2f64.powf(-10.0 * t) * ((t - phase) * (2.0 * PI) / period).sin() + 1.0
}

/// Cubic bezier easing calculation (matches CSS `cubic-bezier()` in browsers).
///
/// Uses Newton-Raphson with binary-search fallback for robustness.
/// Computes in f64 internally to avoid f32 precision jitter at 120fps.
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    // Endpoints are always exact
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let x = f64::from(t);
    let (x1, y1, x2, y2) = (f64::from(x1), f64::from(y1), f64::from(x2), f64::from(y2));

    let mut p = x;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return narrow(bezier_sample(p, y1, y2));
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = x;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - x).abs() < 1e-7 {
            break;
        }
        if val < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    narrow(bezier_sample(p, y1, y2))
}

/// Evaluate cubic bezier at parameter t: B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

/// Derivative of cubic bezier: B'(t) = 3(1-t)²·p1 + 6(1-t)t·(p2-p1) + 3t²·(1-p2)
#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
