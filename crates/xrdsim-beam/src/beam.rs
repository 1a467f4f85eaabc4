//! Beam polyhedron and its per-time snapshots.

use std::f64::consts::PI;

use xrdsim_math::{Dir3, Point3, RigidSweep, Tolerance, Vec3};
use xrdsim_polytope::{intersect_hulls, ConvexHull, Halfspace, IntersectOptions};

use crate::{BeamError, Result};

/// Relative tolerance of the wavevector magnitude check.
const WAVEVECTOR_RTOL: f64 = 1e-5;
/// Absolute tolerance of the wavevector magnitude check.
const WAVEVECTOR_ATOL: f64 = 1e-8;

/// A monochromatic X-ray beam swept between two wavevectors.
///
/// Only the `s = 0` geometry is stored. Wavevectors at intermediate times
/// lie in the fan spanned by `k1` and `k2`, and the beam profile turns with
/// them.
#[derive(Debug, Clone)]
pub struct Beam {
    pub(crate) hull: ConvexHull,
    pub(crate) sweep: RigidSweep,
    wavelength: f64,
    k1: Vec3,
    k2: Vec3,
    tolerance: Tolerance,
}

impl Beam {
    /// Build a beam from its `s = 0` vertices.
    ///
    /// Both wavevectors must have magnitude `2 pi / wavelength` and must
    /// not be parallel. `translation` is the total displacement over the
    /// sweep, applied before rotation.
    ///
    /// # Errors
    ///
    /// - [`BeamError::InvalidWavelength`] for a non-positive wavelength
    /// - [`BeamError::InvalidWavevector`] for a wrong magnitude
    /// - [`BeamError::Math`] if `k1` and `k2` are parallel
    /// - [`BeamError::Polytope`] if the vertices are not in strictly convex position
    pub fn new(
        vertices: &[Point3],
        wavelength: f64,
        k1: Vec3,
        k2: Vec3,
        translation: Vec3,
    ) -> Result<Self> {
        Self::with_tolerance(vertices, wavelength, k1, k2, translation, Tolerance::DEFAULT)
    }

    /// As [`Beam::new`] with an explicit geometric tolerance.
    pub fn with_tolerance(
        vertices: &[Point3],
        wavelength: f64,
        k1: Vec3,
        k2: Vec3,
        translation: Vec3,
        tolerance: Tolerance,
    ) -> Result<Self> {
        if !(wavelength > 0.0) || !wavelength.is_finite() {
            return Err(BeamError::InvalidWavelength(wavelength));
        }
        let expected = 2.0 * PI / wavelength;
        for k in [&k1, &k2] {
            let found = k.norm();
            if !((found - expected).abs() <= WAVEVECTOR_ATOL + WAVEVECTOR_RTOL * expected) {
                return Err(BeamError::InvalidWavevector { expected, found });
            }
        }

        let sweep = RigidSweep::new(&k1, &k2, translation)?;
        let hull = ConvexHull::new_strict(vertices, &tolerance)?;

        log::debug!(
            "beam: {} vertices, {} faces, sweep angle {:.6} rad",
            hull.vertices().len(),
            hull.faces().len(),
            sweep.angle()
        );

        Ok(Self {
            hull,
            sweep,
            wavelength,
            k1,
            k2,
            tolerance,
        })
    }

    /// Photon wavelength.
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// Wavevector at `s = 0`.
    pub fn k1(&self) -> &Vec3 {
        &self.k1
    }

    /// Wavevector at `s = 1`.
    pub fn k2(&self) -> &Vec3 {
        &self.k2
    }

    /// The rigid motion driving the beam.
    pub fn sweep(&self) -> &RigidSweep {
        &self.sweep
    }

    /// Unit rotation axis of the sweep.
    pub fn rotation_axis(&self) -> &Dir3 {
        self.sweep.axis()
    }

    /// Total angle swept between `s = 0` and `s = 1`.
    pub fn rotation_angle(&self) -> f64 {
        self.sweep.angle()
    }

    /// Geometric tolerance used for hull construction.
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Vertices at `s = 0`.
    pub fn vertices(&self) -> &[Point3] {
        self.hull.vertices()
    }

    /// Outward halfspaces at `s = 0`.
    pub fn halfspaces(&self) -> Vec<Halfspace> {
        self.hull.halfspaces()
    }

    /// Hull at `s = 0`.
    pub fn hull(&self) -> &ConvexHull {
        &self.hull
    }

    /// Incident wavevector at sweep time `s` (not range checked).
    pub fn wavevector_at(&self, s: f64) -> Vec3 {
        self.sweep.apply_vec(&self.k1, s)
    }

    /// Beam centroid at sweep time `s`.
    ///
    /// # Errors
    ///
    /// [`BeamError::InvalidSweepTime`] when `s` is outside `[0, 1]`.
    pub fn centroid_at(&self, s: f64) -> Result<Point3> {
        check_time(s)?;
        Ok(self.sweep.apply_point(&self.hull.centroid(), s))
    }

    /// Beam geometry at sweep time `s`.
    ///
    /// The hull is rebuilt from the moved vertices rather than by
    /// transforming the cached planes.
    ///
    /// # Errors
    ///
    /// [`BeamError::InvalidSweepTime`] when `s` is outside `[0, 1]`.
    pub fn geometry_at(&self, s: f64) -> Result<BeamGeometry> {
        check_time(s)?;
        let vertices: Vec<Point3> = self
            .hull
            .vertices()
            .iter()
            .map(|v| self.sweep.apply_point(v, s))
            .collect();
        let hull = ConvexHull::new(&vertices, &self.tolerance)?;
        Ok(BeamGeometry {
            time: s,
            hull,
            wavevector: self.wavevector_at(s),
        })
    }
}

fn check_time(s: f64) -> Result<()> {
    if (0.0..=1.0).contains(&s) {
        Ok(())
    } else {
        Err(BeamError::InvalidSweepTime(s))
    }
}

/// The beam frozen at one sweep time.
#[derive(Debug, Clone)]
pub struct BeamGeometry {
    time: f64,
    hull: ConvexHull,
    wavevector: Vec3,
}

impl BeamGeometry {
    /// Sweep time of this snapshot.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Vertices at this time.
    pub fn vertices(&self) -> &[Point3] {
        self.hull.vertices()
    }

    /// Outward halfspaces at this time.
    pub fn halfspaces(&self) -> Vec<Halfspace> {
        self.hull.halfspaces()
    }

    /// Beam hull at this time.
    pub fn hull(&self) -> &ConvexHull {
        &self.hull
    }

    /// Incident wavevector at this time.
    pub fn wavevector(&self) -> &Vec3 {
        &self.wavevector
    }

    /// Beam centroid at this time.
    pub fn centroid(&self) -> Point3 {
        self.hull.centroid()
    }

    /// Intersect with the convex polyhedron spanned by `vertices`.
    ///
    /// Returns `Ok(None)` when the two do not share interior.
    ///
    /// # Errors
    ///
    /// [`BeamError::Polytope`] if `vertices` are not in strictly convex position.
    pub fn intersect(
        &self,
        vertices: &[Point3],
        options: &IntersectOptions,
    ) -> Result<Option<ConvexHull>> {
        let other = ConvexHull::new_strict(vertices, &options.tolerance)?;
        Ok(self.intersect_hull(&other, options))
    }

    /// Intersect with an already built hull, `None` when they do not share interior.
    pub fn intersect_hull(&self, other: &ConvexHull, options: &IntersectOptions) -> Option<ConvexHull> {
        intersect_hulls(&self.hull, other, options)
    }
}
