#![warn(missing_docs)]

//! xrdsim: Laue sweep diffraction geometry in Rust.
//!
//! A polyhedral X-ray beam sweeps through a polycrystalline sample along a
//! rigid rotation plus translation. xrdsim finds, for every sample element
//! and reflection, the exact sweep time at which the Laue condition holds and
//! the exact region of crystal illuminated at that instant.
//!
//! The kernel crates are re-exported; [`SimulationConfig`] and
//! [`Simulation`] tie them together.
//!
//! # Example
//!
//! ```rust,no_run
//! use xrdsim::{Simulation, SimulationConfig};
//! # fn sample() -> xrdsim::diffraction::Sample { unimplemented!() }
//!
//! let config = SimulationConfig::from_path("sweep.toml").unwrap();
//! let sim = Simulation::from_config(&config).unwrap();
//! for unit in sim.run(&sample()).unwrap() {
//!     println!("{:?} s={:.5} V={:.3e}", unit.hkl(), unit.time(), unit.volume());
//! }
//! ```

pub use xrdsim_beam as beam;
pub use xrdsim_diffraction as diffraction;
pub use xrdsim_math as math;
pub use xrdsim_polytope as polytope;

mod config;
mod simulation;

pub use config::{BeamConfig, ConfigError, SimulationConfig};
pub use simulation::Simulation;
pub use xrdsim_beam::{Beam, IntervalSet, Sphere};
pub use xrdsim_diffraction::{DiffractionSettings, Phase, Sample, SampleElement, ScatteringUnit};
