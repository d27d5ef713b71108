//! Values and names exchanged through the string accessor layer.
//!
//! Typed methods on the domain structs are the primary API. The string
//! layer exists for callers that address parameters by name: it parses
//! a name into a closed parameter enum, dispatches, and carries the result
//! back as a [`ParamValue`].

use ndarray::{Array2, Array3};
use thiserror::Error;

use crate::oi::{Diffuser, ShiftVariantPsf};
use crate::optics::{Lens, Optics};

/// Canonical form of a parameter name.
///
/// Lowercased, with spaces, underscores, dots and hyphens removed, so
/// `"Mean Illuminance"`, `"mean_illuminance"` and `"meanilluminance"`
/// all resolve to the same parameter.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '.' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split a namespace prefix off a normalized name.
///
/// Returns the remainder when `name` starts with `prefix`; the remainder
/// is empty when the name is the bare namespace.
pub fn strip_namespace<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    name.strip_prefix(prefix)
}

/// Errors shared by the optics and lens accessors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Parameter {param} expects {expected}")]
    TypeError {
        param: String,
        expected: &'static str,
    },

    #[error("Parameter {0} is derived and cannot be set")]
    ReadOnly(String),

    #[error("Invalid value for {param}: {reason}")]
    InvalidValue { param: String, reason: String },
}

/// A parameter value crossing the string accessor boundary
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Scalar(f64),
    Vector(Vec<f64>),
    /// `(row-direction, col-direction)` pairs such as sample spacing
    Pair(f64, f64),
    /// `(rows, cols)`
    Size(usize, usize),
    Matrix(Array2<f64>),
    Cube(Array3<f64>),
    SingleCube(Array3<f32>),
    /// Integer-typed data; never accepted as photons
    IntegerCube(Array3<i64>),
    Flag(bool),
    /// Centred sample positions `(xs, ys)` along columns and rows
    Support(Vec<f64>, Vec<f64>),
    Optics(Box<Optics>),
    Lens(Box<Lens>),
    Diffuser(Diffuser),
    Psf(Box<ShiftVariantPsf>),
}

impl ParamValue {
    /// Short description of the variant, used in type errors
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Text(_) => "text",
            ParamValue::Scalar(_) => "scalar",
            ParamValue::Vector(_) => "vector",
            ParamValue::Pair(..) => "pair",
            ParamValue::Size(..) => "size",
            ParamValue::Matrix(_) => "matrix",
            ParamValue::Cube(_) => "cube",
            ParamValue::SingleCube(_) => "single precision cube",
            ParamValue::IntegerCube(_) => "integer cube",
            ParamValue::Flag(_) => "flag",
            ParamValue::Support(..) => "spatial support",
            ParamValue::Optics(_) => "optics",
            ParamValue::Lens(_) => "lens",
            ParamValue::Diffuser(_) => "diffuser",
            ParamValue::Psf(_) => "point spread function",
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ParamValue::Scalar(v) => Some(*v),
            ParamValue::Vector(v) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric samples; a scalar is treated as a one-element vector
    pub fn as_vector(&self) -> Option<Vec<f64>> {
        match self {
            ParamValue::Vector(v) => Some(v.clone()),
            ParamValue::Scalar(v) => Some(vec![*v]),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Array2<f64>> {
        match self {
            ParamValue::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_cube(&self) -> Option<&Array3<f64>> {
        match self {
            ParamValue::Cube(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Mean Illuminance"), "meanilluminance");
        assert_eq!(normalize_name("optics.lens.density"), "opticslensdensity");
        assert_eq!(normalize_name("h-fov"), "hfov");
        assert_eq!(normalize_name("depth_map"), "depthmap");
    }

    #[test]
    fn test_strip_namespace() {
        assert_eq!(strip_namespace("opticsfnumber", "optics"), Some("fnumber"));
        assert_eq!(strip_namespace("optics", "optics"), Some(""));
        assert_eq!(strip_namespace("photons", "optics"), None);
    }

    #[test]
    fn test_value_coercion() {
        assert_eq!(ParamValue::Scalar(2.0).as_vector(), Some(vec![2.0]));
        assert_eq!(ParamValue::Vector(vec![3.0]).as_scalar(), Some(3.0));
        assert_eq!(ParamValue::Vector(vec![3.0, 4.0]).as_scalar(), None);
        assert_eq!(ParamValue::Flag(true).kind(), "flag");
    }
}
