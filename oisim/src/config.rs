//! JSON description of a uniform-field sequence experiment.
//!
//! A [`SequenceConfig`] names the wavelength sampling, image geometry,
//! photon levels of the two base images and the modulation over time.
//! [`SequenceConfig::build`] turns it into an [`OiSequence`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::oi::{OiError, OpticalImage};
use crate::sequence::{Composition, ConstructionError, ModulationRegion, OiSequence, XorRule};
use crate::spectral::{WaveError, WaveSamples};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Wave(#[from] WaveError),

    #[error(transparent)]
    Oi(#[from] OiError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Uniform wavelength sampling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveRange {
    pub start_nm: f64,
    pub end_nm: f64,
    pub step_nm: f64,
}

impl Default for WaveRange {
    fn default() -> Self {
        Self {
            start_nm: 400.0,
            end_nm: 700.0,
            step_nm: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub wave: WaveRange,
    pub rows: usize,
    pub cols: usize,
    pub hfov_deg: f64,
    /// Lens to image plane distance; defaults to the optics focal length
    pub distance_m: Option<f64>,
    /// Photon rate of every sample of the fixed image
    pub fixed_photons: f64,
    /// Photon rate of every sample of the modulated image
    pub modulated_photons: f64,
    /// Rescale the fixed image to this mean illuminance, lux
    pub fixed_mean_lux: Option<f64>,
    pub modulation: Vec<f64>,
    /// Timestamps in seconds, or a single step
    pub time_axis: Vec<f64>,
    /// `add`, `blend` or `xor`
    pub composition: String,
    /// Switch threshold for `xor`; scaled mixing when absent
    pub xor_threshold: Option<f64>,
    /// Disk radius of the modulation region; whole frame when absent
    pub region_radius_um: Option<f64>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            wave: WaveRange::default(),
            rows: 32,
            cols: 32,
            hfov_deg: 2.0,
            distance_m: None,
            fixed_photons: 1e15,
            modulated_photons: 5e14,
            fixed_mean_lux: None,
            modulation: vec![0.0, 0.25, 0.5, 0.75, 1.0],
            time_axis: vec![0.01],
            composition: "add".to_string(),
            xor_threshold: None,
            region_radius_um: None,
        }
    }
}

impl SequenceConfig {
    /// Save to JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn composition(&self) -> Result<Composition, ConfigError> {
        let composition = self
            .composition
            .parse::<Composition>()
            .map_err(ConfigError::Invalid)?;
        Ok(match (composition, self.xor_threshold) {
            (Composition::Xor(_), Some(t)) => Composition::Xor(XorRule::Threshold(t)),
            (other, _) => other,
        })
    }

    pub fn region(&self) -> ModulationRegion {
        match self.region_radius_um {
            Some(radius_um) => ModulationRegion::Disk { radius_um },
            None => ModulationRegion::WholeFrame,
        }
    }

    fn base_image(&self, wave: &WaveSamples, photons: f64, name: &str) -> Result<OpticalImage, ConfigError> {
        let mut oi = OpticalImage::uniform(wave.clone(), self.rows, self.cols, photons)?;
        oi.set_name(name);
        oi.set_hfov(self.hfov_deg)?;
        if let Some(distance_m) = self.distance_m {
            oi.set_distance(distance_m)?;
        }
        Ok(oi)
    }

    /// Build the base images and the sequence
    pub fn build(&self) -> Result<OiSequence, ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::Invalid(format!(
                "image size must be non-zero, got {}x{}",
                self.rows, self.cols
            )));
        }
        let wave = WaveSamples::uniform(self.wave.start_nm, self.wave.end_nm, self.wave.step_nm)?;

        let mut fixed = self.base_image(&wave, self.fixed_photons, "fixed")?;
        if let Some(lux) = self.fixed_mean_lux {
            fixed.set_mean_illuminance(lux)?;
        }
        let modulated = self.base_image(&wave, self.modulated_photons, "modulated")?;

        Ok(OiSequence::new(
            fixed,
            modulated,
            self.modulation.clone(),
            self.time_axis.clone(),
            self.composition()?,
            self.region(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_builds() {
        let seq = SequenceConfig::default().build().unwrap();
        assert_eq!(seq.len(), 5);
        assert_eq!(seq.time_axis()[4], 0.04);
        assert_eq!(seq.composition(), Composition::Add);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "rows": 8, "cols": 4, "composition": "xor", "xor_threshold": 0.5 }"#;
        let config: SequenceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.rows, 8);
        assert_eq!(config.hfov_deg, 2.0);
        assert_eq!(
            config.composition().unwrap(),
            Composition::Xor(XorRule::Threshold(0.5))
        );
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sequence.json");
        let config = SequenceConfig {
            region_radius_um: Some(25.0),
            ..SequenceConfig::default()
        };
        config.save_to_file(&path).unwrap();
        let loaded = SequenceConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.region(), ModulationRegion::Disk { radius_um: 25.0 });
    }

    #[test]
    fn test_invalid_composition() {
        let config = SequenceConfig {
            composition: "multiply".to_string(),
            ..SequenceConfig::default()
        };
        assert!(matches!(config.build(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_fixed_mean_lux_applied() {
        let config = SequenceConfig {
            fixed_mean_lux: Some(50.0),
            ..SequenceConfig::default()
        };
        let seq = config.build().unwrap();
        let lux = seq.fixed().mean_illuminance().unwrap();
        assert!((lux - 50.0).abs() < 1e-9 * 50.0);
    }
}
