//! Error types for diffraction computations.

use thiserror::Error;
use xrdsim_beam::BeamError;
use xrdsim_polytope::PolytopeError;

/// Errors that can occur while setting up or running diffraction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffractionError {
    /// Invalid diffraction settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Unit cell parameters do not describe a lattice.
    #[error("invalid unit cell: {0}")]
    InvalidUnitCell(String),

    /// Crystal orientation is not a proper rotation.
    #[error("invalid orientation: {0}")]
    InvalidOrientation(String),

    /// A sample element refers to a phase that does not exist.
    #[error("sample element refers to unknown phase {0}")]
    UnknownPhase(usize),

    /// Beam evaluation failed.
    #[error(transparent)]
    Beam(#[from] BeamError),

    /// Sample element geometry is degenerate.
    #[error(transparent)]
    Polytope(#[from] PolytopeError),
}

/// Result type for diffraction operations.
pub type Result<T> = std::result::Result<T, DiffractionError>;
