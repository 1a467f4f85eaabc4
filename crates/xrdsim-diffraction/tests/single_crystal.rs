//! A single cubic grain in a rotating slab beam, checked against hand-derived events.

use std::f64::consts::PI;

use xrdsim_beam::Beam;
use xrdsim_diffraction::{diffract, lorentz_factor, DiffractionSettings, Phase, Sample, SampleElement};
use xrdsim_math::{Mat3, Point3, Vec3};

const WAVELENGTH: f64 = 0.5;
const CELL: f64 = 4.0;
const SWEEP: f64 = 0.3;

fn cuboid(min: Point3, max: Point3) -> Vec<Point3> {
    let mut pts = Vec::new();
    for &x in &[min.x, max.x] {
        for &y in &[min.y, max.y] {
            for &z in &[min.z, max.z] {
                pts.push(Point3::new(x, y, z));
            }
        }
    }
    pts
}

fn beam() -> Beam {
    let k = 2.0 * PI / WAVELENGTH;
    Beam::new(
        &cuboid(Point3::new(-20.0, -1.0, -1.0), Point3::new(20.0, 1.0, 1.0)),
        WAVELENGTH,
        Vec3::x() * k,
        Vec3::new(SWEEP.cos(), SWEEP.sin(), 0.0) * k,
        Vec3::zeros(),
    )
    .unwrap()
}

fn grain(miller_indices: Vec<[i32; 3]>) -> Sample {
    let phase = Phase::new([CELL, CELL, CELL, 90.0, 90.0, 90.0], miller_indices)
        .unwrap()
        .with_structure_factors(vec![[2.0, 0.5], [2.0, -0.5]])
        .unwrap();
    let b = phase.lattice_matrix().unwrap();
    let element = SampleElement::new(
        &cuboid(Point3::new(-0.25, -0.25, -0.25), Point3::new(0.25, 0.25, 0.25)),
        Mat3::identity(),
        b,
        0,
    )
    .unwrap();
    Sample::new(vec![element], vec![phase]).unwrap()
}

#[test]
fn test_single_reflection_event() {
    // k(phi) = k (cos phi, sin phi, 0) and G = (0, -g, 0) diffract when
    // sin(phi) = g / (2k); (0, 1, 0) would need sin(phi) < 0.
    let units = diffract(&beam(), &grain(vec![[0, -1, 0], [0, 1, 0]]), &DiffractionSettings::default()).unwrap();
    assert_eq!(units.len(), 1);
    let unit = &units[0];

    let k = 2.0 * PI / WAVELENGTH;
    let g = 2.0 * PI / CELL;
    let phi = (g / (2.0 * k)).asin();
    assert!((unit.time() - phi / SWEEP).abs() < 1e-10);
    assert_eq!(unit.hkl(), Some([0, -1, 0]));
    assert_eq!(unit.element_index(), 0);
    assert_eq!(unit.real_structure_factor(), Some(2.0));
    assert_eq!(unit.imaginary_structure_factor(), Some(0.5));

    // The grain sits entirely inside the beam.
    assert!((unit.volume() - 0.125).abs() < 1e-9);
    assert!(unit.centroid().coords.norm() < 1e-9);

    let kp = unit.scattered_wavevector();
    assert!((kp.norm() - k).abs() < 1e-9);
    // theta = phi for this geometry, eta = 90 degrees
    let expected_lorentz = 1.0 / (2.0 * phi).sin();
    assert!((unit.lorentz_factor() - expected_lorentz).abs() < 1e-6 * expected_lorentz);
}

#[test]
fn test_grain_outside_sweep_window() {
    // (-1, 0, 0) needs cos(phi) = g / (2k), far past the 0.3 rad sweep.
    let units = diffract(&beam(), &grain(vec![[-1, 0, 0], [1, 0, 0]]), &DiffractionSettings::default()).unwrap();
    assert!(units.is_empty());
}

#[test]
fn test_lorentz_scenarios() {
    let k = Vec3::new(1.0, 0.0, 0.0);
    // theta = 45 degrees, k' in the plane orthogonal to the axis: eta = 90 degrees
    let kp = Vec3::new(0.0, 1.0, 0.0);
    let finite = lorentz_factor(&k, &kp, &Vec3::z(), 0.5);
    assert!(finite.is_finite() && finite > 0.0);
    // eta = 0 degrees
    assert_eq!(lorentz_factor(&k, &kp, &Vec3::y(), 0.5), f64::INFINITY);
}

#[test]
fn test_results_are_serializable() {
    let units = diffract(&beam(), &grain(vec![[0, -1, 0], [0, 1, 0]]), &DiffractionSettings::default()).unwrap();
    let json = serde_json::to_string(&units).unwrap();
    assert!(json.contains("\"hkl\":[0,-1,0]"));
}
