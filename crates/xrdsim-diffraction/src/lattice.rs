//! Reciprocal lattice (B) matrices from unit cell parameters.
//!
//! The B matrix maps integer Miller indices to reciprocal lattice vectors
//! in the crystal frame, `G_c = B [h, k, l]`, including the `2 pi` factor.
//! It is upper triangular with the first reciprocal axis along x.

use std::f64::consts::PI;

use xrdsim_math::Mat3;

use crate::{DiffractionError, Result};

/// Unit cell `[a, b, c, alpha, beta, gamma]`, lengths in angstrom, angles in degrees.
pub type UnitCell = [f64; 6];

/// B matrix of a unit cell.
///
/// # Errors
///
/// [`DiffractionError::InvalidUnitCell`] for non-positive lengths, angles
/// outside `(0, 180)` or angle combinations with no real cell volume.
pub fn lattice_matrix(unit_cell: &UnitCell) -> Result<Mat3> {
    let [a, b, c, alpha, beta, gamma] = *unit_cell;
    if !unit_cell.iter().all(|v| v.is_finite()) || a <= 0.0 || b <= 0.0 || c <= 0.0 {
        return Err(DiffractionError::InvalidUnitCell(format!(
            "cell lengths must be positive and finite, got {:?}",
            unit_cell
        )));
    }
    if [alpha, beta, gamma].iter().any(|x| *x <= 0.0 || *x >= 180.0) {
        return Err(DiffractionError::InvalidUnitCell(format!(
            "cell angles must lie in (0, 180) degrees, got {:?}",
            unit_cell
        )));
    }

    let (salp, calp) = alpha.to_radians().sin_cos();
    let (sbet, cbet) = beta.to_radians().sin_cos();
    let (sgam, cgam) = gamma.to_radians().sin_cos();

    let volume_factor = 1.0 - calp * calp - cbet * cbet - cgam * cgam + 2.0 * calp * cbet * cgam;
    if volume_factor <= 0.0 {
        return Err(DiffractionError::InvalidUnitCell(format!(
            "cell angles {}, {}, {} do not close a cell",
            alpha, beta, gamma
        )));
    }
    let volume = a * b * c * volume_factor.sqrt();

    let astar = b * c * salp / volume;
    let bstar = a * c * sbet / volume;
    let cstar = a * b * sgam / volume;
    let cbetstar = (calp * cgam - cbet) / (salp * sgam);
    let cgamstar = (calp * cbet - cgam) / (salp * sbet);
    let sbetstar = (1.0 - cbetstar * cbetstar).sqrt();
    let sgamstar = (1.0 - cgamstar * cgamstar).sqrt();

    let b_mat = Mat3::new(
        astar, bstar * cgamstar, cstar * cbetstar, //
        0.0, bstar * sgamstar, -cstar * sbetstar * calp, //
        0.0, 0.0, 1.0 / c,
    );
    Ok(b_mat * (2.0 * PI))
}

/// Direct lattice vectors (as columns) of a B matrix: `A = 2 pi B^-T`.
pub fn direct_lattice(b_mat: &Mat3) -> Option<Mat3> {
    b_mat.transpose().try_inverse().map(|m| m * (2.0 * PI))
}

/// Unit cell parameters recovered from direct lattice column vectors.
pub fn unit_cell_from_direct(direct: &Mat3) -> UnitCell {
    let metric = direct.transpose() * direct;
    let a = metric[(0, 0)].sqrt();
    let b = metric[(1, 1)].sqrt();
    let c = metric[(2, 2)].sqrt();
    let angle = |g: f64, p: f64, q: f64| (g / (p * q)).clamp(-1.0, 1.0).acos().to_degrees();
    [
        a,
        b,
        c,
        angle(metric[(1, 2)], b, c),
        angle(metric[(0, 2)], a, c),
        angle(metric[(0, 1)], a, b),
    ]
}

/// B matrix of a crystal under a small lab-frame strain.
///
/// `strain_lab` is the symmetric strain tensor in lab coordinates and
/// `orientation` the rotation taking crystal to lab coordinates. The strain
/// is rotated into the crystal frame (`U^T e U`), applied to the direct
/// lattice of `unit_cell`, and the B matrix of the deformed cell returned.
///
/// # Errors
///
/// [`DiffractionError::InvalidUnitCell`] if the reference or the deformed
/// cell is invalid.
pub fn strained_lattice_matrix(strain_lab: &Mat3, orientation: &Mat3, unit_cell: &UnitCell) -> Result<Mat3> {
    let strain = orientation.transpose() * strain_lab * orientation;
    let b0 = lattice_matrix(unit_cell)?;
    let direct = direct_lattice(&b0).ok_or_else(|| {
        DiffractionError::InvalidUnitCell("reference lattice matrix is singular".to_string())
    })?;
    let deformed = (Mat3::identity() + strain) * direct;
    lattice_matrix(&unit_cell_from_direct(&deformed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cubic_lattice_matrix() {
        let b = lattice_matrix(&[4.0, 4.0, 4.0, 90.0, 90.0, 90.0]).unwrap();
        let expected = Mat3::identity() * (2.0 * PI / 4.0);
        assert!((b - expected).norm() < 1e-12);
    }

    #[test]
    fn test_hexagonal_d_spacing() {
        // d(100) of a hexagonal cell is a * sqrt(3) / 2
        let a = 3.0;
        let b = lattice_matrix(&[a, a, 5.0, 90.0, 90.0, 120.0]).unwrap();
        let g = b * xrdsim_math::Vec3::new(1.0, 0.0, 0.0);
        let d = 2.0 * PI / g.norm();
        assert_relative_eq!(d, a * 3f64.sqrt() / 2.0, epsilon = 1e-12);
        // d(001) is c
        let g = b * xrdsim_math::Vec3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(2.0 * PI / g.norm(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_direct_lattice_round_trips_cell() {
        let cell = [4.1, 5.3, 6.7, 82.0, 95.0, 103.0];
        let b = lattice_matrix(&cell).unwrap();
        let recovered = unit_cell_from_direct(&direct_lattice(&b).unwrap());
        for (x, y) in cell.iter().zip(&recovered) {
            assert_relative_eq!(x, y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_strain_keeps_lattice() {
        let cell = [4.1, 5.3, 6.7, 82.0, 95.0, 103.0];
        let u = nalgebra::Rotation3::from_euler_angles(0.3, -0.2, 1.1).into_inner();
        let strained = strained_lattice_matrix(&Mat3::zeros(), &u, &cell).unwrap();
        assert!((strained - lattice_matrix(&cell).unwrap()).norm() < 1e-9);
    }

    #[test]
    fn test_isotropic_strain_scales_lattice() {
        let cell = [4.0, 4.0, 4.0, 90.0, 90.0, 90.0];
        let e = 1e-3;
        let u = nalgebra::Rotation3::from_euler_angles(0.7, 0.1, -0.4).into_inner();
        let strained = strained_lattice_matrix(&(Mat3::identity() * e), &u, &cell).unwrap();
        let expected = lattice_matrix(&cell).unwrap() / (1.0 + e);
        assert!((strained - expected).norm() < 1e-9);
    }

    #[test]
    fn test_invalid_cells() {
        assert!(lattice_matrix(&[0.0, 1.0, 1.0, 90.0, 90.0, 90.0]).is_err());
        assert!(lattice_matrix(&[1.0, 1.0, 1.0, 0.0, 90.0, 90.0]).is_err());
        // alpha + beta < gamma cannot close
        assert!(lattice_matrix(&[1.0, 1.0, 1.0, 30.0, 30.0, 120.0]).is_err());
        assert!(lattice_matrix(&[1.0, f64::NAN, 1.0, 90.0, 90.0, 90.0]).is_err());
    }
}
