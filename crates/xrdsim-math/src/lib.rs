#![warn(missing_docs)]

//! Math types for the xrdsim diffraction kernel.
//!
//! Thin wrappers around nalgebra providing domain-specific types
//! for sweep geometry: points, vectors, directions, matrices and
//! tolerance constants, plus the rigid sweep transform and the
//! closed-form trigonometric solvers built on top of it.

mod sweep;
pub mod trig;

pub use sweep::{RigidSweep, SinCosForm};

use nalgebra::{Matrix3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A 3x3 matrix (orientations, lattice matrices, cross-product operators).
pub type Mat3 = Matrix3<f64>;

/// Errors from math-level constructions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    /// The two boundary directions of a sweep are parallel or zero,
    /// so the rotation axis is undefined.
    #[error("degenerate sweep: boundary directions are parallel or zero")]
    DegenerateSweep,

    /// An input contained NaN or infinite components.
    #[error("non-finite input: {0}")]
    NonFiniteInput(String),
}

/// Cross-product operator `K` such that `K * v == axis x v`.
pub fn cross_matrix(axis: &Vec3) -> Mat3 {
    Mat3::new(
        0.0, -axis.z, axis.y, //
        axis.z, 0.0, -axis.x, //
        -axis.y, axis.x, 0.0,
    )
}

/// Returns `true` if every component of `v` is finite.
pub fn is_finite(v: &Vec3) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Linear distance tolerance (sample length units).
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-9 linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-9,
        angular: 1e-9,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if two angles are effectively equal (in radians).
    pub fn angles_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.angular
    }

    /// Linear tolerance scaled by a characteristic length of the geometry.
    ///
    /// Lengths below one leave the tolerance unchanged.
    pub fn scaled(&self, scale: f64) -> f64 {
        self.linear * scale.abs().max(1.0)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
