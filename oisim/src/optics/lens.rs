//! Crystalline lens pigment.
//!
//! The lens absorbs short wavelengths. Its optical density is a unit
//! density spectrum scaled by a scalar peak factor, so transmittance is
//! `10^(-density * unit_density(λ))`.
//!
//! The unit density is stored once on its own source axis and evaluated on
//! the lens's working wavelength grid by linear interpolation. Moving the
//! working grid never touches the stored source table.

use once_cell::sync::Lazy;

use crate::algo::resample_spectrum;
use crate::param::{ParamError, ParamValue};
use crate::spectral::WaveSamples;

/// Short-wavelength absorbance model used for the default lens.
///
/// Density falls off exponentially from its 400nm value and reaches zero
/// by 600nm, following the general shape of human lens density curves.
fn default_unit_density(nm: f64) -> f64 {
    const DENSITY_AT_400: f64 = 1.0;
    const DECAY_NM: f64 = 28.0;
    const CUTOFF_NM: f64 = 600.0;

    if nm >= CUTOFF_NM {
        return 0.0;
    }
    let tail = (-(CUTOFF_NM - 400.0) / DECAY_NM).exp();
    let raw = (-(nm - 400.0) / DECAY_NM).exp();
    DENSITY_AT_400 * (raw - tail) / (1.0 - tail)
}

/// Default unit density sampled every 5nm across 360-800nm
static DEFAULT_UNIT_DENSITY: Lazy<(WaveSamples, Vec<f64>)> = Lazy::new(|| {
    let wave = (0..=88)
        .map(|i| 360.0 + 5.0 * i as f64)
        .collect::<Vec<_>>();
    let values = wave.iter().map(|&nm| default_unit_density(nm)).collect();
    // Hand-built ascending axis, always valid
    let wave = WaveSamples::new(wave).unwrap_or_default();
    (wave, values)
});

/// Accessor vocabulary for [`Lens`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LensParam {
    Name,
    Wave,
    Density,
    UnitDensity,
    Transmittance,
    Absorptance,
}

impl LensParam {
    /// Resolve a normalized name with any `lens` prefix already removed
    pub fn parse(name: &str) -> Result<Self, ParamError> {
        match name {
            "name" => Ok(LensParam::Name),
            "wave" | "wavelength" => Ok(LensParam::Wave),
            "density" | "peakdensity" => Ok(LensParam::Density),
            "unitdensity" => Ok(LensParam::UnitDensity),
            "transmittance" | "transmission" => Ok(LensParam::Transmittance),
            "absorptance" | "absorption" => Ok(LensParam::Absorptance),
            other => Err(ParamError::UnknownParameter(format!("lens {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lens {
    name: String,
    wave: WaveSamples,
    density: f64,
    source_wave: WaveSamples,
    source_unit_density: Vec<f64>,
}

impl Lens {
    /// Default human lens evaluated on `wave`
    pub fn new(wave: WaveSamples) -> Self {
        let (source_wave, source_unit_density) = DEFAULT_UNIT_DENSITY.clone();
        Self {
            name: "lens".to_string(),
            wave,
            density: 1.0,
            source_wave,
            source_unit_density,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Working wavelength grid
    pub fn wave(&self) -> &WaveSamples {
        &self.wave
    }

    /// Move the working grid; the stored density table is unchanged
    pub fn set_wave(&mut self, wave: WaveSamples) {
        self.wave = wave;
    }

    /// Peak density scale factor
    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn set_density(&mut self, density: f64) -> Result<(), ParamError> {
        if !density.is_finite() || density < 0.0 {
            return Err(ParamError::InvalidValue {
                param: "lens density".to_string(),
                reason: format!("must be finite and non-negative, got {density}"),
            });
        }
        self.density = density;
        Ok(())
    }

    /// Unit density on the working grid; zero outside the stored table
    pub fn unit_density(&self) -> Vec<f64> {
        match resample_spectrum(&self.source_wave, &self.wave, &self.source_unit_density) {
            Ok(values) => values.to_vec(),
            // source table lengths are checked on every write
            Err(_) => vec![0.0; self.wave.len()],
        }
    }

    /// Replace the stored unit density with values sampled on the working grid
    pub fn set_unit_density(&mut self, values: Vec<f64>) -> Result<(), ParamError> {
        if values.len() != self.wave.len() {
            return Err(ParamError::InvalidValue {
                param: "lens unit density".to_string(),
                reason: format!(
                    "expected {} samples, got {}",
                    self.wave.len(),
                    values.len()
                ),
            });
        }
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ParamError::InvalidValue {
                param: "lens unit density".to_string(),
                reason: "values must be finite and non-negative".to_string(),
            });
        }
        self.source_wave = self.wave.clone();
        self.source_unit_density = values;
        Ok(())
    }

    /// Spectral optical density, `density * unit_density`
    pub fn optical_density(&self) -> Vec<f64> {
        self.unit_density()
            .into_iter()
            .map(|u| u * self.density)
            .collect()
    }

    /// Fraction of light passed at each working wavelength
    pub fn transmittance(&self) -> Vec<f64> {
        self.optical_density()
            .into_iter()
            .map(|d| 10f64.powf(-d))
            .collect()
    }

    /// Fraction of light absorbed at each working wavelength
    pub fn absorptance(&self) -> Vec<f64> {
        self.transmittance().into_iter().map(|t| 1.0 - t).collect()
    }

    pub fn get_param(&self, param: LensParam) -> ParamValue {
        match param {
            LensParam::Name => ParamValue::Text(self.name.clone()),
            LensParam::Wave => ParamValue::Vector(self.wave.as_slice().to_vec()),
            LensParam::Density => ParamValue::Scalar(self.density),
            LensParam::UnitDensity => ParamValue::Vector(self.unit_density()),
            LensParam::Transmittance => ParamValue::Vector(self.transmittance()),
            LensParam::Absorptance => ParamValue::Vector(self.absorptance()),
        }
    }

    pub fn set_param(&mut self, param: LensParam, value: ParamValue) -> Result<(), ParamError> {
        match param {
            LensParam::Name => {
                let name = value.as_text().ok_or_else(|| type_error("lens name", "text"))?;
                self.set_name(name);
            }
            LensParam::Wave => {
                let nm = value
                    .as_vector()
                    .ok_or_else(|| type_error("lens wave", "vector"))?;
                let wave = WaveSamples::new(nm).map_err(|e| ParamError::InvalidValue {
                    param: "lens wave".to_string(),
                    reason: e.to_string(),
                })?;
                self.set_wave(wave);
            }
            LensParam::Density => {
                let density = value
                    .as_scalar()
                    .ok_or_else(|| type_error("lens density", "scalar"))?;
                self.set_density(density)?;
            }
            LensParam::UnitDensity => {
                let values = value
                    .as_vector()
                    .ok_or_else(|| type_error("lens unit density", "vector"))?;
                self.set_unit_density(values)?;
            }
            LensParam::Transmittance => {
                return Err(ParamError::ReadOnly("lens transmittance".to_string()))
            }
            LensParam::Absorptance => {
                return Err(ParamError::ReadOnly("lens absorptance".to_string()))
            }
        }
        Ok(())
    }
}

impl Default for Lens {
    fn default() -> Self {
        Self::new(WaveSamples::visible())
    }
}

fn type_error(param: &str, expected: &'static str) -> ParamError {
    ParamError::TypeError {
        param: param.to_string(),
        expected,
    }
}
