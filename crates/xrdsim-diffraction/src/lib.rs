#![warn(missing_docs)]

//! Diffraction for the xrdsim kernel.
//!
//! Turns a swept [`xrdsim_beam::Beam`] and a polycrystalline [`Sample`]
//! into [`ScatteringUnit`]s: for every element the proximity filter narrows
//! the candidate sweep times, the Laue condition is solved in closed form
//! for each reflection of the element's [`Phase`], and at each accepted
//! time the beam snapshot is intersected with the element.
//!
//! # Example
//!
//! ```ignore
//! use xrdsim_diffraction::{diffract, DiffractionSettings};
//!
//! let units = diffract(&beam, &sample, &DiffractionSettings::default())?;
//! for unit in &units {
//!     println!("{:?} at s={:.4}: L={:.3}", unit.hkl(), unit.time(), unit.lorentz_factor());
//! }
//! ```

pub mod error;
pub mod lattice;
pub mod laue;
mod phase;
mod pipeline;
mod sample;
mod scattering_unit;
mod settings;

pub use error::{DiffractionError, Result};
pub use lattice::{lattice_matrix, strained_lattice_matrix, UnitCell};
pub use laue::{diffraction_times, reciprocal_vector};
pub use phase::Phase;
pub use pipeline::diffract;
pub use sample::{Sample, SampleElement};
pub use scattering_unit::{lorentz_factor, polarization_factor, DiffractionEvent, ScatteringUnit};
pub use settings::DiffractionSettings;
