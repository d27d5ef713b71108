//! Auxiliary optical image state: diffuser settings and a precomputed
//! shift-variant point spread function.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;

use super::OiError;
use crate::spectral::WaveSamples;

/// Optical low-pass filter applied at the image plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffuserMethod {
    #[default]
    Skip,
    /// Isotropic Gaussian blur
    Blur,
    /// Four-spot birefringent splitter
    Birefringent,
}

impl FromStr for DiffuserMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" | "none" => Ok(DiffuserMethod::Skip),
            "blur" => Ok(DiffuserMethod::Blur),
            "birefringent" => Ok(DiffuserMethod::Birefringent),
            _ => Err(format!(
                "Unknown diffuser method: {}. Valid options: skip, blur, birefringent",
                s
            )),
        }
    }
}

impl fmt::Display for DiffuserMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiffuserMethod::Skip => "skip",
            DiffuserMethod::Blur => "blur",
            DiffuserMethod::Birefringent => "birefringent",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diffuser {
    pub method: DiffuserMethod,
    /// Full width at half maximum of the blur, meters
    pub blur_fwhm_m: f64,
}

impl Default for Diffuser {
    fn default() -> Self {
        Self {
            method: DiffuserMethod::Skip,
            blur_fwhm_m: 3e-6,
        }
    }
}

/// Point spread functions tabulated over image height and wavelength.
///
/// Kernels are stored height-major: the kernel for height `h` and
/// wavelength index `w` sits at `h * n_wave + w`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftVariantPsf {
    field_heights_m: Vec<f64>,
    wave: WaveSamples,
    sample_spacing_m: f64,
    kernels: Vec<Array2<f64>>,
}

impl ShiftVariantPsf {
    pub fn new(
        field_heights_m: Vec<f64>,
        wave: WaveSamples,
        sample_spacing_m: f64,
        kernels: Vec<Array2<f64>>,
    ) -> Result<Self, OiError> {
        let expected = field_heights_m.len() * wave.len();
        if field_heights_m.is_empty() || kernels.len() != expected {
            return Err(OiError::InvalidValue {
                param: "psf".to_string(),
                reason: format!(
                    "expected {} kernels for {} heights x {} wavelengths, got {}",
                    expected,
                    field_heights_m.len(),
                    wave.len(),
                    kernels.len()
                ),
            });
        }
        if !sample_spacing_m.is_finite() || sample_spacing_m <= 0.0 {
            return Err(OiError::InvalidValue {
                param: "psf sample spacing".to_string(),
                reason: format!("must be positive, got {sample_spacing_m}"),
            });
        }
        Ok(Self {
            field_heights_m,
            wave,
            sample_spacing_m,
            kernels,
        })
    }

    pub fn field_heights_m(&self) -> &[f64] {
        &self.field_heights_m
    }

    pub fn wave(&self) -> &WaveSamples {
        &self.wave
    }

    pub fn sample_spacing_m(&self) -> f64 {
        self.sample_spacing_m
    }

    /// Kernel for a height index and wavelength index
    pub fn kernel(&self, height_index: usize, wave_index: usize) -> Option<&Array2<f64>> {
        if height_index >= self.field_heights_m.len() || wave_index >= self.wave.len() {
            return None;
        }
        self.kernels.get(height_index * self.wave.len() + wave_index)
    }
}
