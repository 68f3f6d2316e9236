//! Easing curves checked against double-precision reference formulas
//!
//! The references below are written out independently of the library
//! (closed forms, no shared midpoint helper) so a mistake in the shared
//! construction would show up here.

use std::f64::consts::PI;

use tempo_animation::Easing;

const EPSILON: f64 = 1e-5;

fn check(easing: Easing, reference: impl Fn(f64) -> f64) {
    for i in 0..=200 {
        let t = i as f64 / 200.0;
        let actual = f64::from(easing.apply(t as f32));
        let expected = reference(t);
        assert!(
            (actual - expected).abs() < EPSILON,
            "{easing} at {t}: got {actual}, expected {expected}"
        );
    }
}

#[test]
fn power_curves_match_reference() {
    check(Easing::EaseInQuad, |t| t * t);
    check(Easing::EaseOutQuad, |t| t * (2.0 - t));
    check(Easing::EaseInOut, |t| {
        if t < 0.5 {
            2.0 * t * t
        } else {
            -1.0 + (4.0 - 2.0 * t) * t
        }
    });
    check(Easing::EaseInCubic, |t| t * t * t);
    check(Easing::EaseOutCubic, |t| (t - 1.0).powi(3) + 1.0);
    check(Easing::EaseInOutCubic, |t| {
        if t < 0.5 {
            4.0 * t * t * t
        } else {
            1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
        }
    });
    check(Easing::EaseInOutQuart, |t| {
        if t < 0.5 {
            8.0 * t.powi(4)
        } else {
            1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
        }
    });
    check(Easing::EaseInOutQuint, |t| {
        if t < 0.5 {
            16.0 * t.powi(5)
        } else {
            1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
        }
    });
}

#[test]
fn sine_and_circular_match_reference() {
    check(Easing::EaseInSine, |t| 1.0 - (t * PI / 2.0).cos());
    check(Easing::EaseOutSine, |t| (t * PI / 2.0).sin());
    check(Easing::EaseInOutSine, |t| -((PI * t).cos() - 1.0) / 2.0);
    check(Easing::EaseInCirc, |t| 1.0 - (1.0 - t * t).sqrt());
    check(Easing::EaseOutCirc, |t| (1.0 - (t - 1.0).powi(2)).sqrt());
}

#[test]
fn exponential_matches_reference() {
    check(Easing::EaseInExpo, |t| {
        if t == 0.0 {
            0.0
        } else {
            2f64.powf(10.0 * t - 10.0)
        }
    });
    check(Easing::EaseOutExpo, |t| {
        if t == 1.0 {
            1.0
        } else {
            1.0 - 2f64.powf(-10.0 * t)
        }
    });
    check(Easing::EaseInOutExpo, |t| {
        if t == 0.0 {
            0.0
        } else if t == 1.0 {
            1.0
        } else if t < 0.5 {
            2f64.powf(20.0 * t - 10.0) / 2.0
        } else {
            (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
        }
    });
}

#[test]
fn back_matches_reference() {
    let c1 = 1.70158;
    let c2 = c1 * 1.525;
    let c3 = c1 + 1.0;
    check(Easing::EaseInBack, |t| c3 * t * t * t - c1 * t * t);
    check(Easing::EaseOutBack, |t| {
        1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
    });
    check(Easing::EaseInOutBack, |t| {
        if t < 0.5 {
            ((2.0 * t).powi(2) * ((c2 + 1.0) * 2.0 * t - c2)) / 2.0
        } else {
            ((2.0 * t - 2.0).powi(2) * ((c2 + 1.0) * (t * 2.0 - 2.0) + c2) + 2.0) / 2.0
        }
    });
}

fn bounce_out_reference(t: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;
    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

#[test]
fn bounce_matches_reference() {
    check(Easing::EaseOutBounce, bounce_out_reference);
    check(Easing::EaseInBounce, |t| 1.0 - bounce_out_reference(1.0 - t));
    check(Easing::EaseInOutBounce, |t| {
        if t < 0.5 {
            (1.0 - bounce_out_reference(1.0 - 2.0 * t)) / 2.0
        } else {
            (1.0 + bounce_out_reference(2.0 * t - 1.0)) / 2.0
        }
    });
}

#[test]
fn elastic_matches_reference() {
    let c4 = (2.0 * PI) / 3.0;
    let c5 = (2.0 * PI) / 4.5;
    check(Easing::EaseInElastic, |t| {
        if t == 0.0 || t == 1.0 {
            t
        } else {
            -(2f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * c4).sin()
        }
    });
    check(Easing::EaseOutElastic, |t| {
        if t == 0.0 || t == 1.0 {
            t
        } else {
            2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
        }
    });
    check(Easing::EaseInOutElastic, |t| {
        if t == 0.0 || t == 1.0 {
            t
        } else if t < 0.5 {
            -(2f64.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * c5).sin()) / 2.0
        } else {
            (2f64.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * c5).sin()) / 2.0 + 1.0
        }
    });
}

#[test]
fn midpoint_is_continuous_for_every_family() {
    for easing in Easing::ALL {
        let below = easing.apply(0.5 - 1e-6);
        let above = easing.apply(0.5 + 1e-6);
        assert!((below - above).abs() < 5e-3, "{easing}");
    }
}

#[test]
fn bounce_in_is_time_reversed_bounce_out() {
    for i in 0..=100 {
        let t = i as f32 / 100.0;
        assert_eq!(
            Easing::EaseInBounce.apply(t),
            1.0 - Easing::EaseOutBounce.apply(1.0 - t)
        );
    }
}
