//! Diffraction settings.

use serde::{Deserialize, Serialize};
use xrdsim_math::{Tolerance, Vec3};
use xrdsim_polytope::IntersectOptions;

use crate::{DiffractionError, Result};

/// Parameters of a diffraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffractionSettings {
    /// Unit linear polarization of the incident beam.
    pub polarization: Vec3,
    /// Distance (degrees) from a singular geometry at which the Lorentz
    /// factor is reported as infinite.
    pub lorentz_tolerance_deg: f64,
    /// Bisection steps per root in the proximity filter.
    pub bisection_max_iterations: usize,
    /// Simplex pivots per overlap test.
    pub lp_max_iterations: usize,
    /// Smallest inscribed-ball radius that counts as beam/element overlap.
    pub min_overlap_margin: f64,
    /// Skip elements whose bounding sphere never meets the beam, and
    /// reflections whose diffraction time falls outside the proximity window.
    pub proximity_filter: bool,
    /// Process elements in parallel.
    pub parallel: bool,
    /// Geometric tolerance.
    pub tolerance: Tolerance,
}

impl Default for DiffractionSettings {
    fn default() -> Self {
        Self {
            polarization: Vec3::y(),
            lorentz_tolerance_deg: 0.5,
            bisection_max_iterations: 50,
            lp_max_iterations: 200,
            min_overlap_margin: 1e-9,
            proximity_filter: true,
            parallel: true,
            tolerance: Tolerance::DEFAULT,
        }
    }
}

impl DiffractionSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !((self.polarization.norm() - 1.0).abs() < 1e-6) {
            return Err(DiffractionError::InvalidSettings(
                "polarization must be a unit vector".into(),
            ));
        }
        if !(0.0..90.0).contains(&self.lorentz_tolerance_deg) {
            return Err(DiffractionError::InvalidSettings(
                "lorentz_tolerance_deg must be in [0, 90)".into(),
            ));
        }
        if self.bisection_max_iterations == 0 || self.lp_max_iterations == 0 {
            return Err(DiffractionError::InvalidSettings(
                "iteration limits must be positive".into(),
            ));
        }
        if !(self.min_overlap_margin >= 0.0) || !self.min_overlap_margin.is_finite() {
            return Err(DiffractionError::InvalidSettings(
                "min_overlap_margin must be non-negative".into(),
            ));
        }
        if !(self.tolerance.linear > 0.0) || !(self.tolerance.angular > 0.0) {
            return Err(DiffractionError::InvalidSettings(
                "tolerances must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Overlap test parameters derived from these settings.
    pub fn intersect_options(&self) -> IntersectOptions {
        IntersectOptions {
            max_lp_iterations: self.lp_max_iterations,
            min_margin: self.min_overlap_margin,
            tolerance: self.tolerance,
        }
    }
}
