//! A beam paired with its settings, ready to run against samples.

use xrdsim_beam::{Beam, IntervalSet, Sphere};
use xrdsim_diffraction::{diffract, DiffractionSettings, Result, Sample, ScatteringUnit};

use crate::{ConfigError, SimulationConfig};

/// A configured diffraction run.
#[derive(Debug, Clone)]
pub struct Simulation {
    beam: Beam,
    settings: DiffractionSettings,
}

impl Simulation {
    /// Create a simulation, validating the settings.
    pub fn new(beam: Beam, settings: DiffractionSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { beam, settings })
    }

    /// Build the beam described by `config`.
    pub fn from_config(config: &SimulationConfig) -> std::result::Result<Self, ConfigError> {
        let beam = config.beam.build(config.settings.tolerance)?;
        Ok(Self::new(beam, config.settings.clone())?)
    }

    /// The swept beam.
    pub fn beam(&self) -> &Beam {
        &self.beam
    }

    /// Run settings.
    pub fn settings(&self) -> &DiffractionSettings {
        &self.settings
    }

    /// All scattering units produced as the beam sweeps through `sample`.
    pub fn run(&self, sample: &Sample) -> Result<Vec<ScatteringUnit>> {
        diffract(&self.beam, sample, &self.settings)
    }

    /// Sweep-time windows in which each element's bounding sphere can meet the beam.
    pub fn candidate_windows(&self, sample: &Sample) -> Vec<IntervalSet> {
        let spheres: Vec<Sphere> = sample.elements().iter().map(|e| e.bounding_sphere()).collect();
        self.beam
            .proximity_intervals_batch(&spheres, self.settings.bisection_max_iterations)
    }
}
