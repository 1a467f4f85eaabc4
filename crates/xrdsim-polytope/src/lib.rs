#![warn(missing_docs)]

//! Convex polyhedra for the xrdsim diffraction kernel.
//!
//! Everything here works on small convex polytopes described either by
//! their vertices or by halfspaces `normal . x + offset <= 0`:
//!
//! - [`Halfspace`] - a single oriented plane with unit normal
//! - [`ConvexHull`] - vertices, ordered faces, volume and centroid
//! - [`feasible`] - Chebyshev-centre linear program for an interior point
//! - [`intersect`] - exact intersection of halfspace sets
//! - [`clip`] - batched Cyrus-Beck clipping of parallel lines
//!
//! # Example
//!
//! ```
//! use xrdsim_math::{Point3, Tolerance};
//! use xrdsim_polytope::ConvexHull;
//!
//! let cube: Vec<Point3> = (0..8)
//!     .map(|i| Point3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
//!     .collect();
//! let hull = ConvexHull::new_strict(&cube, &Tolerance::DEFAULT).unwrap();
//! assert!((hull.volume() - 1.0).abs() < 1e-12);
//! ```

pub mod clip;
pub mod feasible;
mod halfspace;
mod hull;
pub mod intersect;

pub use clip::clip_lengths;
pub use feasible::{chebyshev_center, ChebyshevCenter};
pub use halfspace::Halfspace;
pub use hull::{ConvexHull, Face};
pub use intersect::{halfspace_intersection, intersect_halfspaces, intersect_hulls, IntersectOptions};

use thiserror::Error;

/// Errors from polytope construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolytopeError {
    /// The point set does not describe a full-dimensional convex polytope
    /// (too few points, coplanar, duplicated, non-finite, or not in strictly
    /// convex position when that is required).
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
}

/// Result type for polytope operations.
pub type Result<T> = std::result::Result<T, PolytopeError>;
