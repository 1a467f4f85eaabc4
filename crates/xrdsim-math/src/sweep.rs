//! Rigid sweep: a one-parameter family of Rodrigues rotations plus translation.

use crate::{cross_matrix, is_finite, Dir3, MathError, Mat3, Point3, Vec3};

/// Relative threshold on `|from x to| / (|from| |to|)` below which the
/// boundary directions are treated as parallel.
const PARALLEL_EPS: f64 = 1e-12;

/// Coefficients of `a * sin(phi) + b * cos(phi) + c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinCosForm {
    /// Coefficient of `sin(phi)`.
    pub sin: f64,
    /// Coefficient of `cos(phi)`.
    pub cos: f64,
    /// Constant term.
    pub constant: f64,
}

impl SinCosForm {
    /// Evaluate at angle `phi`.
    pub fn eval(&self, phi: f64) -> f64 {
        let (s, c) = phi.sin_cos();
        self.sin * s + self.cos * c + self.constant
    }
}

/// A continuous rigid motion parametrized by sweep time `s` in `[0, 1]`.
///
/// The rotation axis is the normalized cross product of the two boundary
/// directions and the total angle is the angle between them, so that
/// `apply_vec(from, 1)` points along `to`. Points are first moved by
/// `s * translation` and then rotated by `s * angle` about the axis
/// through the origin.
///
/// Axis and angle are fixed at construction; every query is a pure
/// function of `s`.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidSweep {
    axis: Dir3,
    angle: f64,
    translation: Vec3,
    k: Mat3,
    k2: Mat3,
}

impl RigidSweep {
    /// Build the sweep taking direction `from` (s=0) onto direction `to` (s=1).
    ///
    /// # Errors
    ///
    /// Returns [`MathError::DegenerateSweep`] if either direction is zero or
    /// the two are parallel (anti-parallel included), and
    /// [`MathError::NonFiniteInput`] for NaN/infinite components.
    pub fn new(from: &Vec3, to: &Vec3, translation: Vec3) -> Result<Self, MathError> {
        if !is_finite(from) || !is_finite(to) || !is_finite(&translation) {
            return Err(MathError::NonFiniteInput(
                "sweep boundary directions and translation must be finite".to_string(),
            ));
        }
        let scale = from.norm() * to.norm();
        if scale == 0.0 {
            return Err(MathError::DegenerateSweep);
        }
        let cross = from.cross(to);
        let sin_angle = cross.norm();
        if sin_angle / scale < PARALLEL_EPS {
            return Err(MathError::DegenerateSweep);
        }
        let angle = sin_angle.atan2(from.dot(to));
        let axis = Dir3::new_normalize(cross);
        let k = cross_matrix(axis.as_ref());
        let k2 = k * k;
        Ok(Self {
            axis,
            angle,
            translation,
            k,
            k2,
        })
    }

    /// Unit rotation axis.
    pub fn axis(&self) -> &Dir3 {
        &self.axis
    }

    /// Total rotation angle swept between s=0 and s=1 (radians, in `(0, pi)`).
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Translation applied over the full sweep.
    pub fn translation(&self) -> &Vec3 {
        &self.translation
    }

    /// Cross-product operator `K` of the rotation axis.
    pub fn k(&self) -> &Mat3 {
        &self.k
    }

    /// Double cross-product operator `K^2` of the rotation axis.
    pub fn k2(&self) -> &Mat3 {
        &self.k2
    }

    /// Rotation matrix at sweep time `s`: `I + sin(s a) K + (1 - cos(s a)) K^2`.
    pub fn rotation_matrix(&self, s: f64) -> Mat3 {
        let (sin, cos) = (s * self.angle).sin_cos();
        Mat3::identity() + self.k * sin + self.k2 * (1.0 - cos)
    }

    /// Rotate a direction vector (no translation).
    pub fn apply_vec(&self, v: &Vec3, s: f64) -> Vec3 {
        let (sin, cos) = (s * self.angle).sin_cos();
        v + (self.k * v) * sin + (self.k2 * v) * (1.0 - cos)
    }

    /// Translate by `s * translation`, then rotate.
    pub fn apply_point(&self, p: &Point3, s: f64) -> Point3 {
        let moved = p.coords + self.translation * s;
        Point3::from(self.apply_vec(&moved, s))
    }

    /// Rotate a surface normal. Rotations are orthogonal, so normals
    /// transform like directions.
    pub fn apply_normal(&self, n: &Vec3, s: f64) -> Vec3 {
        self.apply_vec(n, s)
    }

    /// Decompose `apply_vec(v, s) . w` as `a sin(s a) + b cos(s a) + c`.
    pub fn decompose(&self, v: &Vec3, w: &Vec3) -> SinCosForm {
        let kv = (self.k * v).dot(w);
        let k2v = (self.k2 * v).dot(w);
        SinCosForm {
            sin: kv,
            cos: -k2v,
            constant: v.dot(w) + k2v,
        }
    }
}
