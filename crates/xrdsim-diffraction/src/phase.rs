//! Crystallographic phases.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};
use xrdsim_math::{Mat3, Vec3};

use crate::lattice::{direct_lattice, lattice_matrix, UnitCell};
use crate::laue::bragg_angle;
use crate::{DiffractionError, Result};

/// A crystal phase: unit cell and the reflections to consider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// `[a, b, c, alpha, beta, gamma]` (angstrom, degrees).
    pub unit_cell: UnitCell,
    /// Miller indices of the candidate reflections.
    pub miller_indices: Vec<[i32; 3]>,
    /// Structure factor `[re, im]` for each reflection, if known.
    pub structure_factors: Option<Vec<[f64; 2]>>,
}

impl Phase {
    /// Create a phase with an explicit reflection list.
    ///
    /// # Errors
    ///
    /// [`DiffractionError::InvalidUnitCell`] for an invalid unit cell.
    pub fn new(unit_cell: UnitCell, miller_indices: Vec<[i32; 3]>) -> Result<Self> {
        lattice_matrix(&unit_cell)?;
        Ok(Self {
            unit_cell,
            miller_indices,
            structure_factors: None,
        })
    }

    /// Attach one `[re, im]` structure factor per reflection.
    ///
    /// # Errors
    ///
    /// [`DiffractionError::InvalidSettings`] if the table length differs
    /// from the number of reflections.
    pub fn with_structure_factors(mut self, factors: Vec<[f64; 2]>) -> Result<Self> {
        if factors.len() != self.miller_indices.len() {
            return Err(DiffractionError::InvalidSettings(format!(
                "{} structure factors for {} reflections",
                factors.len(),
                self.miller_indices.len()
            )));
        }
        self.structure_factors = Some(factors);
        Ok(self)
    }

    /// Create a phase holding every reflection with Bragg angle in
    /// `[min_bragg, max_bragg]` (radians) at `wavelength`.
    ///
    /// All integer `(h, k, l) != 0` are enumerated; systematic absences are
    /// not removed.
    pub fn with_diffracting_planes(
        unit_cell: UnitCell,
        wavelength: f64,
        min_bragg: f64,
        max_bragg: f64,
    ) -> Result<Self> {
        if !(wavelength > 0.0) || !(min_bragg <= max_bragg) {
            return Err(DiffractionError::InvalidSettings(format!(
                "bad reflection window: wavelength {}, bragg angles [{}, {}]",
                wavelength, min_bragg, max_bragg
            )));
        }
        let b = lattice_matrix(&unit_cell)?;
        let direct = direct_lattice(&b).ok_or_else(|| {
            DiffractionError::InvalidUnitCell("lattice matrix is singular".to_string())
        })?;

        // |h| <= |G| |a_h| / (2 pi) for the direct axis a_h.
        let g_max = 4.0 * PI * max_bragg.min(FRAC_PI_2).sin() / wavelength;
        let bound = |i: usize| (g_max * direct.column(i).norm() / (2.0 * PI)).floor() as i32;
        let (hm, km, lm) = (bound(0), bound(1), bound(2));

        let mut miller_indices = Vec::new();
        for h in -hm..=hm {
            for k in -km..=km {
                for l in -lm..=lm {
                    if (h, k, l) == (0, 0, 0) {
                        continue;
                    }
                    let g = b * Vec3::new(h as f64, k as f64, l as f64);
                    if let Some(theta) = bragg_angle(g.norm(), wavelength) {
                        if theta >= min_bragg && theta <= max_bragg {
                            miller_indices.push([h, k, l]);
                        }
                    }
                }
            }
        }
        log::debug!(
            "phase {:?}: {} reflections with bragg angle in [{:.4}, {:.4}]",
            unit_cell,
            miller_indices.len(),
            min_bragg,
            max_bragg
        );
        Ok(Self {
            unit_cell,
            miller_indices,
            structure_factors: None,
        })
    }

    /// Unstrained B matrix of this phase.
    pub fn lattice_matrix(&self) -> Result<Mat3> {
        lattice_matrix(&self.unit_cell)
    }
}
