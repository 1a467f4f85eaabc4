//! Sample elements: convex crystal grains with orientation and lattice.

use std::sync::Arc;

use xrdsim_beam::Sphere;
use xrdsim_math::{Mat3, Point3, Tolerance, Vec3};
use xrdsim_polytope::ConvexHull;

use crate::lattice::strained_lattice_matrix;
use crate::laue::reciprocal_vector;
use crate::{DiffractionError, Phase, Result};

/// Deviation from orthonormality accepted for an orientation matrix.
const ORIENTATION_EPS: f64 = 1e-6;

/// One convex sub-volume of the sample with a single crystal orientation.
#[derive(Debug, Clone)]
pub struct SampleElement {
    hull: ConvexHull,
    orientation: Mat3,
    lattice: Mat3,
    phase: usize,
}

impl SampleElement {
    /// Create an element from its vertices.
    ///
    /// `orientation` (U) maps crystal to lab coordinates and `lattice` is
    /// the element's B matrix; `phase` indexes the owning sample's phases.
    ///
    /// # Errors
    ///
    /// - [`DiffractionError::Polytope`] if the vertices are not in strictly convex position
    /// - [`DiffractionError::InvalidOrientation`] if `orientation` is not a rotation
    pub fn new(vertices: &[Point3], orientation: Mat3, lattice: Mat3, phase: usize) -> Result<Self> {
        let hull = ConvexHull::new_strict(vertices, &Tolerance::DEFAULT)?;
        check_rotation(&orientation)?;
        Ok(Self {
            hull,
            orientation,
            lattice,
            phase,
        })
    }

    /// Create an element whose lattice is the phase's unit cell under a
    /// lab-frame strain.
    pub fn strained(
        vertices: &[Point3],
        orientation: Mat3,
        strain_lab: &Mat3,
        phase: &Phase,
        phase_index: usize,
    ) -> Result<Self> {
        let lattice = strained_lattice_matrix(strain_lab, &orientation, &phase.unit_cell)?;
        Self::new(vertices, orientation, lattice, phase_index)
    }

    /// Element geometry.
    pub fn hull(&self) -> &ConvexHull {
        &self.hull
    }

    /// Crystal-to-lab rotation.
    pub fn orientation(&self) -> &Mat3 {
        &self.orientation
    }

    /// B matrix.
    pub fn lattice(&self) -> &Mat3 {
        &self.lattice
    }

    /// Index of the element's phase.
    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Bounding sphere used by the proximity filter.
    pub fn bounding_sphere(&self) -> Sphere {
        // A valid hull has at least four vertices.
        Sphere::enclosing(self.hull.vertices())
            .unwrap_or_else(|| Sphere::new(self.hull.centroid(), 0.0))
    }

    /// Lab-frame reciprocal lattice vector of a reflection.
    pub fn reciprocal_vector(&self, hkl: &[i32; 3]) -> Vec3 {
        reciprocal_vector(&self.orientation, &self.lattice, hkl)
    }
}

fn check_rotation(u: &Mat3) -> Result<()> {
    let defect = (u * u.transpose() - Mat3::identity()).norm();
    if !(defect < ORIENTATION_EPS) {
        return Err(DiffractionError::InvalidOrientation(format!(
            "U U^T deviates from identity by {:e}",
            defect
        )));
    }
    if u.determinant() < 0.0 {
        return Err(DiffractionError::InvalidOrientation(
            "orientation is a reflection".to_string(),
        ));
    }
    Ok(())
}

/// A polycrystalline sample: elements and the phases they refer to.
#[derive(Debug, Clone)]
pub struct Sample {
    elements: Vec<SampleElement>,
    phases: Vec<Arc<Phase>>,
}

impl Sample {
    /// Create a sample.
    ///
    /// # Errors
    ///
    /// [`DiffractionError::UnknownPhase`] if an element's phase index is out of range.
    pub fn new(elements: Vec<SampleElement>, phases: Vec<Phase>) -> Result<Self> {
        if let Some(bad) = elements.iter().find(|e| e.phase >= phases.len()) {
            return Err(DiffractionError::UnknownPhase(bad.phase));
        }
        Ok(Self {
            elements,
            phases: phases.into_iter().map(Arc::new).collect(),
        })
    }

    /// Sample elements.
    pub fn elements(&self) -> &[SampleElement] {
        &self.elements
    }

    /// Phases shared by the elements.
    pub fn phases(&self) -> &[Arc<Phase>] {
        &self.phases
    }

    /// Phase by index.
    pub fn phase(&self, index: usize) -> Result<&Arc<Phase>> {
        self.phases
            .get(index)
            .ok_or(DiffractionError::UnknownPhase(index))
    }

    /// Total sample volume.
    pub fn volume(&self) -> f64 {
        self.elements.iter().map(|e| e.hull.volume()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    fn cubic_phase() -> Phase {
        Phase::new([4.0, 4.0, 4.0, 90.0, 90.0, 90.0], vec![[1, 0, 0]]).unwrap()
    }

    #[test]
    fn test_bounding_sphere_covers_vertices() {
        let e = SampleElement::new(&tetrahedron(), Mat3::identity(), Mat3::identity(), 0).unwrap();
        let sphere = e.bounding_sphere();
        for v in e.hull().vertices() {
            assert!((v - sphere.center).norm() <= sphere.radius + 1e-12);
        }
        assert!((sphere.center - Point3::new(0.25, 0.25, 0.25)).norm() < 1e-12);
    }

    #[test]
    fn test_orientation_must_be_rotation() {
        let skewed = Mat3::new(1.0, 0.1, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert!(matches!(
            SampleElement::new(&tetrahedron(), skewed, Mat3::identity(), 0),
            Err(DiffractionError::InvalidOrientation(_))
        ));
        let mirror = Mat3::from_diagonal(&Vec3::new(1.0, 1.0, -1.0));
        assert!(SampleElement::new(&tetrahedron(), mirror, Mat3::identity(), 0).is_err());
    }

    #[test]
    fn test_degenerate_element_rejected() {
        let flat = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        assert!(matches!(
            SampleElement::new(&flat, Mat3::identity(), Mat3::identity(), 0),
            Err(DiffractionError::Polytope(_))
        ));
    }

    #[test]
    fn test_reciprocal_vector_uses_orientation() {
        let phase = cubic_phase();
        let u = nalgebra::Rotation3::from_axis_angle(&Vec3::z_axis(), std::f64::consts::FRAC_PI_2).into_inner();
        let e = SampleElement::new(&tetrahedron(), u, phase.lattice_matrix().unwrap(), 0).unwrap();
        let g = e.reciprocal_vector(&[1, 0, 0]);
        assert!((g - Vec3::new(0.0, std::f64::consts::PI / 2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_strained_element() {
        let phase = cubic_phase();
        let strain = Mat3::identity() * 2e-3;
        let e = SampleElement::strained(&tetrahedron(), Mat3::identity(), &strain, &phase, 0).unwrap();
        let g = e.reciprocal_vector(&[1, 0, 0]).norm();
        let g0 = 2.0 * std::f64::consts::PI / 4.0;
        assert!((g - g0 / 1.002).abs() < 1e-9);
    }

    #[test]
    fn test_sample_validates_phase_indices() {
        let e = SampleElement::new(&tetrahedron(), Mat3::identity(), Mat3::identity(), 1).unwrap();
        assert!(matches!(
            Sample::new(vec![e.clone()], vec![cubic_phase()]),
            Err(DiffractionError::UnknownPhase(1))
        ));
        let sample = Sample::new(vec![e], vec![cubic_phase(), cubic_phase()]).unwrap();
        assert!((sample.volume() - 1.0 / 6.0).abs() < 1e-12);
        assert!(sample.phase(1).is_ok());
        assert!(sample.phase(2).is_err());
    }
}
