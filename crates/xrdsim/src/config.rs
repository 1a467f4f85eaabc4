//! TOML simulation configuration.
//!
//! ```toml
//! [beam]
//! vertices = [[-10.0, -1.0, -1.0], [10.0, -1.0, -1.0], ...]
//! wavelength = 0.5
//! k1 = [12.566370614359172, 0.0, 0.0]
//! k2 = [12.004793, 3.713565, 0.0]
//! translation = [0.0, 0.0, 0.0]
//!
//! [settings]
//! lorentz_tolerance_deg = 0.5
//! parallel = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use xrdsim_beam::{Beam, BeamError};
use xrdsim_diffraction::{DiffractionError, DiffractionSettings};
use xrdsim_math::{Point3, Tolerance, Vec3};

/// Errors from loading a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The config could not be written as TOML.
    #[error("failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Settings failed validation.
    #[error("invalid settings: {0}")]
    Invalid(#[from] DiffractionError),
    /// The beam could not be built.
    #[error("invalid beam: {0}")]
    Beam(#[from] BeamError),
}

/// Beam definition in plain arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamConfig {
    /// Beam vertices at `s = 0`.
    pub vertices: Vec<[f64; 3]>,
    /// Photon wavelength.
    pub wavelength: f64,
    /// Wavevector at `s = 0`.
    pub k1: [f64; 3],
    /// Wavevector at `s = 1`.
    pub k2: [f64; 3],
    /// Total beam translation over the sweep.
    #[serde(default)]
    pub translation: [f64; 3],
}

impl BeamConfig {
    /// Build the beam.
    pub fn build(&self, tolerance: Tolerance) -> Result<Beam, BeamError> {
        let vertices: Vec<Point3> = self.vertices.iter().map(|&[x, y, z]| Point3::new(x, y, z)).collect();
        Beam::with_tolerance(
            &vertices,
            self.wavelength,
            Vec3::from(self.k1),
            Vec3::from(self.k2),
            Vec3::from(self.translation),
            tolerance,
        )
    }
}

/// A complete simulation setup: the swept beam and the run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Beam definition.
    pub beam: BeamConfig,
    /// Diffraction settings; omitted fields take their defaults.
    #[serde(default)]
    pub settings: DiffractionSettings,
}

impl SimulationConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loading simulation config from {}", path.as_ref().display());
        Self::from_toml_str(&text)
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Check the settings and that the beam can be built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.settings.validate()?;
        self.beam.build(self.settings.tolerance)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn slab_toml(k2: [f64; 3]) -> String {
        format!(
            r#"
[beam]
vertices = [
    [-10.0, -1.0, -1.0], [10.0, -1.0, -1.0], [10.0, 1.0, -1.0], [-10.0, 1.0, -1.0],
    [-10.0, -1.0, 1.0], [10.0, -1.0, 1.0], [10.0, 1.0, 1.0], [-10.0, 1.0, 1.0],
]
wavelength = 1.0
k1 = [{k}, 0.0, 0.0]
k2 = [{}, {}, {}]

[settings]
lorentz_tolerance_deg = 1.0
parallel = false
"#,
            k2[0],
            k2[1],
            k2[2],
            k = 2.0 * PI,
        )
    }

    fn rotated_k2() -> [f64; 3] {
        let k = 2.0 * PI;
        [k * 0.2f64.cos(), k * 0.2f64.sin(), 0.0]
    }

    #[test]
    fn test_parse_with_defaults() {
        let config = SimulationConfig::from_toml_str(&slab_toml(rotated_k2())).unwrap();
        assert_eq!(config.beam.vertices.len(), 8);
        assert_eq!(config.beam.translation, [0.0; 3]);
        assert_eq!(config.settings.lorentz_tolerance_deg, 1.0);
        assert!(!config.settings.parallel);
        assert_eq!(config.settings.bisection_max_iterations, 50);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SimulationConfig::from_toml_str(&slab_toml(rotated_k2())).unwrap();
        let text = config.to_toml_string().unwrap();
        let back = SimulationConfig::from_toml_str(&text).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_wrong_wavevector_rejected() {
        let err = SimulationConfig::from_toml_str(&slab_toml([1.0, 1.0, 0.0])).unwrap_err();
        assert!(matches!(err, ConfigError::Beam(BeamError::InvalidWavevector { .. })));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let text = slab_toml(rotated_k2()).replace("lorentz_tolerance_deg = 1.0", "lorentz_tolerance_deg = 120.0");
        let err = SimulationConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(DiffractionError::InvalidSettings(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = SimulationConfig::from_toml_str("[beam]\nwavelength = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SimulationConfig::from_path("/nonexistent/xrdsim.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
