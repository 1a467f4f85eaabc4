//! The Laue condition over a sweep.
//!
//! While the incident wavevector turns from `k1` towards `k2` about
//! `r = k1 x k2 / |k1 x k2|`, it reads `k(s) = cos(s a) k1 + sin(s a) (r x k1)`.
//! Elastic scattering off the reciprocal lattice vector `G` requires
//! `|k + G| = |k|`, i.e. `2 k . G + |G|^2 = 0`, which is
//!
//! ```text
//! (k1 . G) cos(s a) + ((r x k1) . G) sin(s a) + |G|^2 / 2 = 0
//! ```
//!
//! and is solved in closed form by [`solve_half_angle`].

use std::f64::consts::PI;

use xrdsim_beam::Beam;
use xrdsim_math::trig::{solve_half_angle, SweepRoots};
use xrdsim_math::{Mat3, Vec3};

/// Reciprocal lattice vector in the lab frame: `G = U B hkl`.
pub fn reciprocal_vector(orientation: &Mat3, lattice: &Mat3, hkl: &[i32; 3]) -> Vec3 {
    let hkl = Vec3::new(hkl[0] as f64, hkl[1] as f64, hkl[2] as f64);
    orientation * (lattice * hkl)
}

/// Bragg angle of a reciprocal lattice vector of length `g_norm`.
///
/// Returns `None` when `|G| lambda / (4 pi) > 1` (the reflection lies
/// outside the limiting sphere) or `G` is zero.
pub fn bragg_angle(g_norm: f64, wavelength: f64) -> Option<f64> {
    let sin_theta = g_norm * wavelength / (4.0 * PI);
    if !(sin_theta > 0.0) || sin_theta > 1.0 {
        return None;
    }
    Some(sin_theta.asin())
}

/// Coefficients `(c0, c1, c2)` of `c0 cos(s a) + c1 sin(s a) + c2 = 0`.
///
/// `c2 = |k1| |G| sin(theta)`, which equals `|G|^2 / 2`. Returns `None`
/// when `G` has no Bragg angle at this wavelength.
pub fn half_angle_coefficients(k1: &Vec3, axis: &Vec3, g: &Vec3, wavelength: f64) -> Option<(f64, f64, f64)> {
    let theta = bragg_angle(g.norm(), wavelength)?;
    let c0 = k1.dot(g);
    let c1 = axis.cross(k1).dot(g);
    let c2 = k1.norm() * g.norm() * theta.sin();
    Some((c0, c1, c2))
}

/// Sweep times in `(0, 1]` at which `g` satisfies the Laue condition.
pub fn diffraction_times(beam: &Beam, g: &Vec3) -> SweepRoots {
    match half_angle_coefficients(beam.k1(), beam.rotation_axis().as_ref(), g, beam.wavelength()) {
        Some((c0, c1, c2)) => solve_half_angle(c0, c1, c2, beam.rotation_angle()),
        None => (None, None),
    }
}
