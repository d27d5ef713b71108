use shared::units::UnitError;
use thiserror::Error;

use crate::algo::ResampleError;
use crate::param::ParamError;
use crate::radiometry::RadiometryError;
use crate::spectral::WaveError;

/// Errors raised by optical image accessors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OiError {
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Parameter {0} requires a value")]
    MissingValue(String),

    #[error("Parameter {param} expects {expected}, got {actual}")]
    TypeError {
        param: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Unsupported bit depth {0}; only 32 (single) and 64 (double) are supported")]
    UnsupportedPrecision(u32),

    #[error("Parameter {0} is derived and cannot be set")]
    ReadOnly(String),

    #[error("Invalid value for {param}: {reason}")]
    InvalidValue { param: String, reason: String },

    #[error("Image size unknown: no photon data and no companion scene")]
    NoSpatialSize,

    #[error(transparent)]
    Radiometry(#[from] RadiometryError),

    #[error(transparent)]
    Wave(#[from] WaveError),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Resample(#[from] ResampleError),
}

impl From<ParamError> for OiError {
    fn from(err: ParamError) -> Self {
        match err {
            ParamError::UnknownParameter(name) => OiError::UnknownParameter(name),
            ParamError::TypeError { param, expected } => OiError::TypeError {
                param,
                expected,
                actual: "value",
            },
            ParamError::ReadOnly(name) => OiError::ReadOnly(name),
            ParamError::InvalidValue { param, reason } => OiError::InvalidValue { param, reason },
        }
    }
}
