#![warn(missing_docs)]

//! Swept X-ray beam for the xrdsim diffraction kernel.
//!
//! A [`Beam`] is a convex polyhedron that moves rigidly over a scan: at
//! sweep time `s` its vertices are translated by `s * translation` and then
//! rotated by `s * alpha` about the axis taking wavevector `k1` onto `k2`.
//!
//! - [`Beam::geometry_at`] returns a fresh [`BeamGeometry`] snapshot; nothing
//!   on the beam is mutated, so any number of workers can evaluate
//!   different times concurrently.
//! - [`Beam::proximity_intervals`] finds, in closed form, the sweep times at
//!   which a bounding [`Sphere`] can touch the beam at all.
//! - [`IntervalSet`] holds those times as a minimal sorted list.
//!
//! # Example
//!
//! ```
//! use std::f64::consts::PI;
//! use xrdsim_beam::{Beam, Sphere};
//! use xrdsim_math::{Point3, Vec3};
//!
//! let wavelength = 0.5;
//! let k = 2.0 * PI / wavelength;
//! let vertices: Vec<Point3> = (0..8)
//!     .map(|i| Point3::new((i & 1) as f64 - 0.5, ((i >> 1) & 1) as f64 - 0.5, ((i >> 2) & 1) as f64 - 0.5))
//!     .collect();
//! let beam = Beam::new(&vertices, wavelength, Vec3::x() * k, Vec3::y() * k, Vec3::zeros()).unwrap();
//!
//! let near = Sphere::new(Point3::origin(), 1.0);
//! assert_eq!(beam.proximity_intervals(&near, 50).intervals(), &[(0.0, 1.0)]);
//! ```

mod beam;
mod interval;
mod proximity;

pub use beam::{Beam, BeamGeometry};
pub use interval::IntervalSet;
pub use proximity::Sphere;

use thiserror::Error;
use xrdsim_math::MathError;
use xrdsim_polytope::PolytopeError;

/// Errors from beam construction and evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BeamError {
    /// A boundary wavevector does not have magnitude `2 pi / wavelength`.
    #[error("wavevector magnitude {found} does not match 2*pi/wavelength = {expected}")]
    InvalidWavevector {
        /// Magnitude implied by the wavelength.
        expected: f64,
        /// Magnitude of the offending wavevector.
        found: f64,
    },

    /// Wavelength is not a positive finite number.
    #[error("invalid wavelength: {0}")]
    InvalidWavelength(f64),

    /// Sweep time outside `[0, 1]`.
    #[error("sweep time {0} is outside [0, 1]")]
    InvalidSweepTime(f64),

    /// Sweep construction failed.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Beam or sample polyhedron is degenerate.
    #[error(transparent)]
    Polytope(#[from] PolytopeError),
}

/// Result type for beam operations.
pub type Result<T> = std::result::Result<T, BeamError>;
