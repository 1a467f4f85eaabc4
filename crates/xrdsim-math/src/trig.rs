//! Closed-form and bracketed root finding for sweep-time equations.
//!
//! The central equation is
//!
//! ```text
//! c0 * cos(s * alpha) + c1 * sin(s * alpha) + c2 = 0,    s in (0, 1]
//! ```
//!
//! Substituting `t = tan(s * alpha / 2)` turns it into the quadratic
//! `(c2 - c0) t^2 + 2 c1 t + (c0 + c2) = 0`, and each real root maps back
//! through `s = 2 atan(t) / alpha`.

use std::f64::consts::PI;

/// Relative size below which the quadratic's leading coefficient is zero.
pub const LEADING_EPS: f64 = 1e-12;

/// Relative size below which a negative discriminant is treated as a
/// tangential (double) root instead of "no root".
pub const DISCRIMINANT_EPS: f64 = 1e-12;

/// Slack allowed past `s = 1` before a root is discarded (then clamped).
const DOMAIN_EPS: f64 = 1e-12;

/// Up to two sweep-time roots; a present root always occupies the first slot
/// and two roots are in ascending order.
pub type SweepRoots = (Option<f64>, Option<f64>);

/// Solve `c0 cos(s alpha) + c1 sin(s alpha) + c2 = 0` for `s` in `(0, 1]`.
///
/// Coefficients are normalized by their largest magnitude before the
/// tolerance tests, so the result does not depend on the overall scale.
/// A near-zero leading coefficient falls back to the linear equation in
/// `t`, whose second root sits at `t = inf` (`s = pi / alpha`).
pub fn solve_half_angle(c0: f64, c1: f64, c2: f64, alpha: f64) -> SweepRoots {
    if !(alpha > 0.0) || !alpha.is_finite() {
        return (None, None);
    }
    let scale = c0.abs().max(c1.abs()).max(c2.abs());
    if scale == 0.0 || !scale.is_finite() {
        return (None, None);
    }
    let (c0, c1, c2) = (c0 / scale, c1 / scale, c2 / scale);

    let a = c2 - c0;
    let b = c1;
    let c = c0 + c2;
    // atan covers phi in (-pi, pi); negative angles are the same root one turn later.
    let to_s = |t: f64| {
        let phi = 2.0 * t.atan();
        let phi = if phi < 0.0 { phi + 2.0 * PI } else { phi };
        phi / alpha
    };

    if a.abs() < LEADING_EPS {
        let linear = if b.abs() > LEADING_EPS {
            Some(to_s(-c / (2.0 * b)))
        } else {
            None
        };
        return ordered(linear, Some(PI / alpha));
    }

    let mut discriminant = b * b - a * c;
    if discriminant < 0.0 {
        if discriminant > -DISCRIMINANT_EPS * (b * b + (a * c).abs()) {
            discriminant = 0.0;
        } else {
            return (None, None);
        }
    }

    if discriminant == 0.0 {
        return ordered(Some(to_s(-b / a)), None);
    }

    // q keeps the two terms of the same sign to avoid cancellation.
    let root = discriminant.sqrt();
    let q = -(b + b.signum() * root);
    let t1 = q / a;
    let t2 = c / q;
    ordered(Some(to_s(t1)), Some(to_s(t2)))
}

/// Keep roots inside `(0, 1]` and order them.
fn ordered(first: Option<f64>, second: Option<f64>) -> SweepRoots {
    let keep = |s: Option<f64>| {
        s.filter(|s| s.is_finite() && *s > 0.0 && *s <= 1.0 + DOMAIN_EPS)
            .map(|s| s.min(1.0))
    };
    match (keep(first), keep(second)) {
        (Some(a), Some(b)) if b < a => (Some(b), Some(a)),
        (None, Some(b)) => (Some(b), None),
        pair => pair,
    }
}

/// Bisection on a bracket `[lo, hi]` where `f` changes sign.
///
/// Runs at most `max_iterations` halvings and stops early once the bracket
/// is narrower than `xtol`. Returns `None` if the end points do not bracket
/// a sign change.
pub fn bisect<F>(f: F, lo: f64, hi: f64, max_iterations: usize, xtol: f64) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let (mut lo, mut hi) = (lo.min(hi), lo.max(hi));
    let mut f_lo = f(lo);
    let f_hi = f(hi);
    if f_lo == 0.0 {
        return Some(lo);
    }
    if f_hi == 0.0 {
        return Some(hi);
    }
    if f_lo.signum() == f_hi.signum() || !f_lo.is_finite() || !f_hi.is_finite() {
        return None;
    }

    for _ in 0..max_iterations {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if f_mid == 0.0 {
            return Some(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
        if hi - lo < xtol {
            break;
        }
    }
    if hi - lo >= xtol {
        log::warn!(
            "bisection stopped after {} iterations with bracket width {:e}",
            max_iterations,
            hi - lo
        );
    }
    Some(0.5 * (lo + hi))
}
