//! Scattering units: the diffraction events produced by the pipeline.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use xrdsim_math::{Point3, Vec3};
use xrdsim_polytope::{clip_lengths, ConvexHull};

use crate::Phase;

/// Geometry of one diffraction event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffractionEvent {
    /// Sweep time of the event.
    pub time: f64,
    /// Incident wavevector at `time`.
    pub incident: Vec3,
    /// Scattered wavevector `incident + G`.
    pub scattered: Vec3,
    /// Photon wavelength.
    pub wavelength: f64,
    /// Unit rotation axis of the sweep.
    pub rotation_axis: Vec3,
    /// Unit linear polarization of the incident beam.
    pub polarization: Vec3,
    /// Index into the phase's reflection list.
    pub hkl_index: usize,
    /// Index of the originating sample element.
    pub element_index: usize,
}

/// A region of crystal that scatters at a known sweep time.
#[derive(Debug, Clone)]
pub struct ScatteringUnit {
    region: ConvexHull,
    event: DiffractionEvent,
    phase: Arc<Phase>,
    lorentz_tolerance_deg: f64,
}

impl ScatteringUnit {
    /// Create a scattering unit.
    ///
    /// `lorentz_tolerance_deg` is the angular distance from a singular
    /// geometry within which [`ScatteringUnit::lorentz_factor`] reports infinity.
    pub fn new(region: ConvexHull, event: DiffractionEvent, phase: Arc<Phase>, lorentz_tolerance_deg: f64) -> Self {
        Self {
            region,
            event,
            phase,
            lorentz_tolerance_deg,
        }
    }

    /// Scattering region.
    pub fn region(&self) -> &ConvexHull {
        &self.region
    }

    /// Event geometry.
    pub fn event(&self) -> &DiffractionEvent {
        &self.event
    }

    /// Phase of the scattering crystal.
    pub fn phase(&self) -> &Arc<Phase> {
        &self.phase
    }

    /// Sweep time.
    pub fn time(&self) -> f64 {
        self.event.time
    }

    /// Incident wavevector.
    pub fn incident_wavevector(&self) -> &Vec3 {
        &self.event.incident
    }

    /// Scattered wavevector.
    pub fn scattered_wavevector(&self) -> &Vec3 {
        &self.event.scattered
    }

    /// Originating sample element.
    pub fn element_index(&self) -> usize {
        self.event.element_index
    }

    /// Index into the phase's reflection list.
    pub fn hkl_index(&self) -> usize {
        self.event.hkl_index
    }

    /// Miller indices of the reflection.
    pub fn hkl(&self) -> Option<[i32; 3]> {
        self.phase.miller_indices.get(self.event.hkl_index).copied()
    }

    /// Real part of the structure factor, if the phase has a table.
    pub fn real_structure_factor(&self) -> Option<f64> {
        self.structure_factor().map(|f| f[0])
    }

    /// Imaginary part of the structure factor, if the phase has a table.
    pub fn imaginary_structure_factor(&self) -> Option<f64> {
        self.structure_factor().map(|f| f[1])
    }

    fn structure_factor(&self) -> Option<[f64; 2]> {
        self.phase
            .structure_factors
            .as_ref()
            .and_then(|table| table.get(self.event.hkl_index))
            .copied()
    }

    /// Lorentz factor, `+inf` near singular geometries.
    pub fn lorentz_factor(&self) -> f64 {
        lorentz_factor(
            &self.event.incident,
            &self.event.scattered,
            &self.event.rotation_axis,
            self.lorentz_tolerance_deg,
        )
    }

    /// Polarization factor.
    pub fn polarization_factor(&self) -> f64 {
        polarization_factor(&self.event.polarization, &self.event.scattered)
    }

    /// Mean of the region's corner points.
    pub fn centroid(&self) -> Point3 {
        self.region.centroid()
    }

    /// Centre of mass of the region as a uniform solid.
    pub fn center_of_mass(&self) -> Point3 {
        self.region.center_of_mass()
    }

    /// Volume of the region.
    pub fn volume(&self) -> f64 {
        self.region.volume()
    }

    /// Lengths of parallel lines through the region.
    ///
    /// Typically `direction` is the scattered beam direction and the points
    /// are sampled over the region, giving exit path lengths.
    pub fn path_lengths(&self, line_points: &[Point3], direction: &Vec3) -> Vec<f64> {
        let (plane_points, plane_normals) = self.region.face_planes();
        clip_lengths(line_points, direction, &plane_points, &plane_normals)
    }
}

/// Lorentz factor `1 / (sin(2 theta) |sin(eta)|)`.
///
/// `theta` is half the angle between `k` and `k_prime`; `eta` is the
/// angle between `rotation_axis` and the part of `k_prime` orthogonal to
/// `k`. Returns `+inf` when `eta` is within `tolerance_deg` of 0 or 180
/// degrees, or `theta` is below `tolerance_deg`.
pub fn lorentz_factor(k: &Vec3, k_prime: &Vec3, rotation_axis: &Vec3, tolerance_deg: f64) -> f64 {
    let k_sq = k.norm_squared();
    let theta = (k.dot(k_prime) / k_sq).clamp(-1.0, 1.0).acos() / 2.0;
    let k_perp = k_prime - k * (k_prime.dot(k) / k_sq);
    let perp_norm = k_perp.norm();
    if !(perp_norm > 0.0) {
        return f64::INFINITY;
    }
    let axis = rotation_axis.normalize();
    let eta = (axis.dot(&k_perp) / perp_norm).clamp(-1.0, 1.0).acos();

    let (eta_deg, theta_deg) = (eta.to_degrees(), theta.to_degrees());
    if eta_deg < tolerance_deg || eta_deg > 180.0 - tolerance_deg || theta_deg < tolerance_deg {
        return f64::INFINITY;
    }
    1.0 / ((2.0 * theta).sin() * eta.sin().abs())
}

/// Polarization factor `1 - (e . k_prime / |k_prime|)^2`.
pub fn polarization_factor(polarization: &Vec3, k_prime: &Vec3) -> f64 {
    let projection = polarization.dot(&k_prime.normalize());
    1.0 - projection * projection
}

impl Serialize for ScatteringUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let centroid = self.centroid();
        let com = self.center_of_mass();
        let vertices: Vec<[f64; 3]> = self.region.vertices().iter().map(|v| [v.x, v.y, v.z]).collect();
        let to_array = |v: &Vec3| [v.x, v.y, v.z];

        let mut state = serializer.serialize_struct("ScatteringUnit", 13)?;
        state.serialize_field("element_index", &self.event.element_index)?;
        state.serialize_field("hkl_index", &self.event.hkl_index)?;
        state.serialize_field("hkl", &self.hkl())?;
        state.serialize_field("time", &self.event.time)?;
        state.serialize_field("incident_wavevector", &to_array(&self.event.incident))?;
        state.serialize_field("scattered_wavevector", &to_array(&self.event.scattered))?;
        state.serialize_field("wavelength", &self.event.wavelength)?;
        state.serialize_field("lorentz_factor", &self.lorentz_factor())?;
        state.serialize_field("polarization_factor", &self.polarization_factor())?;
        state.serialize_field("volume", &self.volume())?;
        state.serialize_field("centroid", &[centroid.x, centroid.y, centroid.z])?;
        state.serialize_field("center_of_mass", &[com.x, com.y, com.z])?;
        state.serialize_field("vertices", &vertices)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use xrdsim_math::Tolerance;

    fn region() -> ConvexHull {
        let mut pts = Vec::new();
        for &x in &[0.0, 2.0] {
            for &y in &[0.0, 1.0] {
                for &z in &[0.0, 1.0] {
                    pts.push(Point3::new(x, y, z));
                }
            }
        }
        ConvexHull::new_strict(&pts, &Tolerance::DEFAULT).unwrap()
    }

    fn unit(rotation_axis: Vec3, structure_factors: Option<Vec<[f64; 2]>>) -> ScatteringUnit {
        unit_in(region(), rotation_axis, structure_factors)
    }

    fn unit_in(region: ConvexHull, rotation_axis: Vec3, structure_factors: Option<Vec<[f64; 2]>>) -> ScatteringUnit {
        let k = 2.0 * PI;
        let mut phase = Phase::new([4.0, 4.0, 4.0, 90.0, 90.0, 90.0], vec![[1, 0, 0], [0, 2, 0]]).unwrap();
        phase.structure_factors = structure_factors;
        let event = DiffractionEvent {
            time: 0.4,
            incident: Vec3::new(k, 0.0, 0.0),
            scattered: Vec3::new(0.0, k, 0.0),
            wavelength: 1.0,
            rotation_axis,
            polarization: Vec3::y(),
            hkl_index: 1,
            element_index: 7,
        };
        ScatteringUnit::new(region, event, Arc::new(phase), 0.5)
    }

    #[test]
    fn test_lorentz_factor_regular_geometry() {
        // theta = 45 deg, eta = 90 deg: 1 / (sin 90 * sin 90) = 1
        let u = unit(Vec3::z(), None);
        let l = u.lorentz_factor();
        assert!(l.is_finite() && l > 0.0);
        assert!((l - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_lorentz_factor_singular_geometry() {
        // k_perp = (0, k, 0) is along the rotation axis: eta = 0
        let u = unit(Vec3::y(), None);
        assert_eq!(u.lorentz_factor(), f64::INFINITY);
        // anti-parallel: eta = 180
        let u = unit(-Vec3::y(), None);
        assert_eq!(u.lorentz_factor(), f64::INFINITY);
    }

    #[test]
    fn test_lorentz_tolerance_is_configurable() {
        let k = Vec3::new(1.0, 0.0, 0.0);
        let kp = Vec3::new(0.0, 1.0, 0.0);
        // eta = 1 degree from the axis
        let axis = Vec3::new(0.0, 1f64.to_radians().cos(), 1f64.to_radians().sin());
        assert!(lorentz_factor(&k, &kp, &axis, 0.5).is_finite());
        assert_eq!(lorentz_factor(&k, &kp, &axis, 2.0), f64::INFINITY);
        // forward scattering has theta = 0
        assert_eq!(lorentz_factor(&k, &k, &Vec3::z(), 0.5), f64::INFINITY);
    }

    #[test]
    fn test_polarization_factor() {
        // scattered along y with polarization along y: fully suppressed
        let u = unit(Vec3::z(), None);
        assert!(u.polarization_factor().abs() < 1e-12);
        assert!((polarization_factor(&Vec3::z(), &Vec3::new(3.0, 4.0, 0.0)) - 1.0).abs() < 1e-12);
        let p = polarization_factor(&Vec3::x(), &Vec3::new(1.0, 1.0, 0.0));
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_phase_lookups() {
        let u = unit(Vec3::z(), Some(vec![[1.0, 0.0], [3.5, -1.25]]));
        assert_eq!(u.hkl(), Some([0, 2, 0]));
        assert_eq!(u.real_structure_factor(), Some(3.5));
        assert_eq!(u.imaginary_structure_factor(), Some(-1.25));

        let u = unit(Vec3::z(), None);
        assert_eq!(u.real_structure_factor(), None);
        assert_eq!(u.imaginary_structure_factor(), None);
    }

    #[test]
    fn test_region_properties() {
        let u = unit(Vec3::z(), None);
        assert!((u.volume() - 2.0).abs() < 1e-12);
        assert!((u.centroid() - Point3::new(1.0, 0.5, 0.5)).norm() < 1e-12);
        let lengths = u.path_lengths(
            &[Point3::new(-1.0, 0.5, 0.5), Point3::new(-1.0, 3.0, 0.5)],
            &Vec3::x(),
        );
        assert!((lengths[0] - 2.0).abs() < 1e-12);
        assert_eq!(lengths[1], 0.0);
    }

    #[test]
    fn test_centroid_of_asymmetric_region() {
        let pyramid = ConvexHull::new_strict(
            &[
                Point3::new(-1.0, -1.0, 0.0),
                Point3::new(1.0, -1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(-1.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 3.0),
            ],
            &Tolerance::DEFAULT,
        )
        .unwrap();
        let u = unit_in(pyramid, Vec3::z(), None);
        assert!((u.volume() - 4.0).abs() < 1e-12);
        assert!((u.centroid() - Point3::new(0.0, 0.0, 0.6)).norm() < 1e-12);
        assert!((u.center_of_mass() - Point3::new(0.0, 0.0, 0.75)).norm() < 1e-12);
    }

    #[test]
    fn test_serializes_to_json() {
        let u = unit(Vec3::z(), None);
        let json = serde_json::to_value(&u).unwrap();
        assert_eq!(json["element_index"], 7);
        assert_eq!(json["hkl"], serde_json::json!([0, 2, 0]));
        assert_eq!(json["vertices"].as_array().map(|v| v.len()), Some(8));
        assert!((json["volume"].as_f64().unwrap() - 2.0).abs() < 1e-12);
        let com: Vec<f64> = serde_json::from_value(json["center_of_mass"].clone()).unwrap();
        assert!((com[0] - 1.0).abs() < 1e-12 && (com[1] - 0.5).abs() < 1e-12);
    }
}
