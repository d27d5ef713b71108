//! Temporal sequence of optical images.
//!
//! A sequence pairs a fixed (background) image with a modulated image and a
//! weight per time sample. Frames are never stored: each one is composed
//! from the two base images when asked for, so memory stays at two cubes no
//! matter how long the sequence is.
//!
//! # Construction
//!
//! [`OiSequence::new`] is the only way to build a sequence, and it checks
//! everything a frame will later rely on:
//!
//! - both images carry photons of the same size and wavelength axis
//! - sample spacings agree to seven decimal places in microns
//! - the time axis is either one timestamp per weight or a single step,
//!   expanded to `step · [0, 1, ..., N-1]`
//! - every weight is finite and keeps the composite photons non-negative
//!   for the chosen [`Composition`]
//!
//! A constructed sequence has no mutators. Any frame index inside the
//! sequence composes without error.
//!
//! # Timing
//!
//! The time step is the gap between the first two timestamps, or the
//! supplied step for a one-frame sequence. Each frame is taken to last one
//! step, so the duration runs from the first timestamp to the last plus one
//! step. [`OiSequence::max_eye_movements_given_integration_time`] divides
//! that duration by an integration time.
//!
//! # Concurrency
//!
//! The base images are read-only after construction, so
//! [`OiSequence::frames_par`] composes frames on the rayon pool with no
//! locking.

use log::debug;
use ndarray::{Array2, Array3, Zip};
use rayon::prelude::*;
use shared::algo::round_to_decimals;
use shared::units::LengthUnit;
use thiserror::Error;

use super::composition::{compose, Composition, ModulationRegion, XorRule};
use crate::oi::{OiError, OpticalImage};

/// Decimal places, in microns, to which sample spacings must agree
const SPACING_DECIMALS: i32 = 7;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("Modulation function is empty")]
    EmptyModulation,

    #[error("Time axis has {time} samples but the modulation function has {modulation}")]
    LengthMismatch { time: usize, modulation: usize },

    #[error("Time axis must be finite and non-decreasing")]
    UnorderedTimeAxis,

    #[error("Image sizes differ: fixed {fixed:?}, modulated {modulated:?}")]
    SizeMismatch {
        fixed: (usize, usize),
        modulated: (usize, usize),
    },

    #[error("Sample spacings differ: fixed {fixed:?}um, modulated {modulated:?}um")]
    SpacingMismatch {
        fixed: (f64, f64),
        modulated: (f64, f64),
    },

    #[error("Wavelength axes of the fixed and modulated images differ")]
    WaveMismatch,

    #[error("The {0} image has no photon data")]
    MissingPhotons(&'static str),

    #[error("Region radius must be positive, got {0}um")]
    InvalidRegion(f64),

    #[error("Time step must be finite and non-negative, got {0}s")]
    InvalidTimeStep(f64),

    #[error("Modulation weight {weight} at index {index} is not finite")]
    NonFiniteWeight { index: usize, weight: f64 },

    #[error("Modulation weight {weight} at index {index} outside [{min}, {max}]; the frame would hold negative photons")]
    WeightOutOfRange {
        index: usize,
        weight: f64,
        min: f64,
        max: f64,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SequenceError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("Frame index {index} out of range for sequence of {len} frames")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Integration time must be positive, got {0}s")]
    InvalidIntegrationTime(f64),

    #[error("Sequence needs at least two time samples to define a time step")]
    NoTimeStep,

    #[error(transparent)]
    Oi(#[from] OiError),
}

/// Time axis as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum TimeAxis {
    /// Explicit timestamps in seconds, one per modulation sample
    Samples(Vec<f64>),
    /// A single step, expanded to `step · [0, 1, ..., N-1]`
    Step(f64),
}

impl From<Vec<f64>> for TimeAxis {
    /// A one-element vector is read as a step
    fn from(samples: Vec<f64>) -> Self {
        if samples.len() == 1 {
            TimeAxis::Step(samples[0])
        } else {
            TimeAxis::Samples(samples)
        }
    }
}

/// Fixed plus modulated optical images over a time axis
#[derive(Debug, Clone)]
pub struct OiSequence {
    fixed: OpticalImage,
    modulated: OpticalImage,
    modulation: Vec<f64>,
    time_axis: Vec<f64>,
    /// Step supplied by the caller, kept for sequences too short to imply one
    step: Option<f64>,
    composition: Composition,
    region: ModulationRegion,
    /// Region mask over the image, `None` for the whole frame
    mask: Option<Array2<f64>>,
}

impl OiSequence {
    /// Validate the pair and build the sequence.
    ///
    /// Both images must carry photons with the same size, wavelength axis,
    /// and sample spacing to seven decimal places in microns. Every weight
    /// must be finite and keep the composite photons non-negative.
    pub fn new(
        fixed: OpticalImage,
        modulated: OpticalImage,
        modulation: Vec<f64>,
        time_axis: impl Into<TimeAxis>,
        composition: Composition,
        region: ModulationRegion,
    ) -> Result<Self, ConstructionError> {
        if modulation.is_empty() {
            return Err(ConstructionError::EmptyModulation);
        }
        if let Some((index, &weight)) = modulation.iter().enumerate().find(|(_, w)| !w.is_finite()) {
            return Err(ConstructionError::NonFiniteWeight { index, weight });
        }
        let (time_axis, step) = match time_axis.into() {
            TimeAxis::Step(step) if !(step.is_finite() && step >= 0.0) => {
                return Err(ConstructionError::InvalidTimeStep(step))
            }
            TimeAxis::Step(step) => (
                (0..modulation.len()).map(|i| i as f64 * step).collect(),
                Some(step),
            ),
            TimeAxis::Samples(samples) if samples.len() == modulation.len() => (samples, None),
            TimeAxis::Samples(samples) => {
                return Err(ConstructionError::LengthMismatch {
                    time: samples.len(),
                    modulation: modulation.len(),
                })
            }
        };
        let ordered = time_axis.iter().all(|t| t.is_finite())
            && time_axis.windows(2).all(|w| w[1] >= w[0]);
        if !ordered {
            return Err(ConstructionError::UnorderedTimeAxis);
        }

        let fixed_size = fixed
            .cube()
            .spatial_size()
            .ok_or(ConstructionError::MissingPhotons("fixed"))?;
        let modulated_size = modulated
            .cube()
            .spatial_size()
            .ok_or(ConstructionError::MissingPhotons("modulated"))?;
        if fixed_size != modulated_size {
            return Err(ConstructionError::SizeMismatch {
                fixed: fixed_size,
                modulated: modulated_size,
            });
        }
        if fixed.wave() != modulated.wave() {
            return Err(ConstructionError::WaveMismatch);
        }

        let spacing = |oi: &OpticalImage| -> (f64, f64) {
            match oi.sample_spacing(LengthUnit::Micrometers, None) {
                Ok((dy, dx)) => (
                    round_to_decimals(dy, SPACING_DECIMALS),
                    round_to_decimals(dx, SPACING_DECIMALS),
                ),
                // photons were checked above, so size is known
                Err(_) => (f64::NAN, f64::NAN),
            }
        };
        let (fixed_spacing, modulated_spacing) = (spacing(&fixed), spacing(&modulated));
        if fixed_spacing != modulated_spacing {
            return Err(ConstructionError::SpacingMismatch {
                fixed: fixed_spacing,
                modulated: modulated_spacing,
            });
        }

        let mask = match region {
            ModulationRegion::Disk { radius_um } if !(radius_um.is_finite() && radius_um > 0.0) => {
                return Err(ConstructionError::InvalidRegion(radius_um))
            }
            ModulationRegion::WholeFrame => None,
            ModulationRegion::Disk { .. } => {
                let (xs, ys) = fixed
                    .spatial_support(LengthUnit::Micrometers, None)
                    .map_err(|_| ConstructionError::MissingPhotons("fixed"))?;
                region.mask(&xs, &ys)
            }
        };

        let (fixed_photons, modulated_photons) = match (fixed.photons(), modulated.photons()) {
            (Some(f), Some(m)) => (f, m),
            _ => return Err(ConstructionError::MissingPhotons("fixed")),
        };
        let (min, max) = weight_limits(composition, fixed_photons, modulated_photons, mask.as_ref());
        if let Some((index, &weight)) = modulation
            .iter()
            .enumerate()
            .find(|(_, &w)| w < min || w > max)
        {
            return Err(ConstructionError::WeightOutOfRange {
                index,
                weight,
                min,
                max,
            });
        }

        debug!(
            "Built {} sequence of {} frames over {:?} images",
            composition,
            modulation.len(),
            fixed_size
        );
        Ok(Self {
            fixed,
            modulated,
            modulation,
            time_axis,
            step,
            composition,
            region,
            mask,
        })
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.modulation.len()
    }

    /// Always false; construction rejects an empty modulation
    pub fn is_empty(&self) -> bool {
        self.modulation.is_empty()
    }

    pub fn time_axis(&self) -> &[f64] {
        &self.time_axis
    }

    pub fn modulation(&self) -> &[f64] {
        &self.modulation
    }

    pub fn composition(&self) -> Composition {
        self.composition
    }

    pub fn region(&self) -> ModulationRegion {
        self.region
    }

    pub fn fixed(&self) -> &OpticalImage {
        &self.fixed
    }

    pub fn modulated(&self) -> &OpticalImage {
        &self.modulated
    }

    /// Spacing of the first two time samples.
    ///
    /// A single-frame sequence built from a step reports that step.
    pub fn time_step(&self) -> Result<f64, SequenceError> {
        match (self.time_axis.as_slice(), self.step) {
            ([t0, t1, ..], _) => Ok(t1 - t0),
            (_, Some(step)) => Ok(step),
            _ => Err(SequenceError::NoTimeStep),
        }
    }

    /// Span from the first timestamp to the end of the last frame.
    ///
    /// The last frame is taken to last one time step, so a uniform axis of
    /// `N` frames lasts `N` steps.
    pub fn duration(&self) -> Result<f64, SequenceError> {
        let step = self.time_step()?;
        match (self.time_axis.first(), self.time_axis.last()) {
            (Some(first), Some(last)) => Ok(last - first + step),
            _ => Err(SequenceError::NoTimeStep),
        }
    }

    /// How many eye positions of `integration_time` seconds fit in the sequence
    pub fn max_eye_movements_given_integration_time(
        &self,
        integration_time: f64,
    ) -> Result<usize, SequenceError> {
        if !integration_time.is_finite() || integration_time <= 0.0 {
            return Err(SequenceError::InvalidIntegrationTime(integration_time));
        }
        // tolerate rounding when the duration is an exact multiple
        Ok((self.duration()? / integration_time + 1e-9).floor() as usize)
    }

    /// Compose frame `index`.
    ///
    /// The frame is a copy of the fixed image carrying the composite photons.
    pub fn frame_at_index(&self, index: usize) -> Result<OpticalImage, SequenceError> {
        let weight = *self
            .modulation
            .get(index)
            .ok_or(SequenceError::IndexOutOfRange {
                index,
                len: self.len(),
            })?;
        let (fixed, modulated) = match (self.fixed.photons(), self.modulated.photons()) {
            (Some(f), Some(m)) => (f, m),
            _ => return Err(ConstructionError::MissingPhotons("fixed").into()),
        };

        let photons = compose(self.composition, fixed, modulated, weight, self.mask.as_ref());
        let mut frame = self.fixed.clone();
        frame.set_name(format!("{}-frame-{}", self.fixed.name(), index));
        frame.set_photons(photons)?;
        Ok(frame)
    }

    /// Frames in order, each composed when reached
    pub fn frames(&self) -> impl Iterator<Item = Result<OpticalImage, SequenceError>> + '_ {
        (0..self.len()).map(move |i| self.frame_at_index(i))
    }

    /// Compose every frame in parallel
    pub fn frames_par(&self) -> Result<Vec<OpticalImage>, SequenceError> {
        (0..self.len())
            .into_par_iter()
            .map(|i| self.frame_at_index(i))
            .collect()
    }
}

/// Interval of weights for which every composite photon stays non-negative.
///
/// Only pixels inside `mask` constrain the weight; outside it every rule
/// returns the fixed image.
fn weight_limits(
    composition: Composition,
    fixed: &Array3<f64>,
    modulated: &Array3<f64>,
    mask: Option<&Array2<f64>>,
) -> (f64, f64) {
    let (mut min, mut max) = (f64::NEG_INFINITY, f64::INFINITY);
    Zip::indexed(fixed).and(modulated).for_each(|(r, c, _), &f, &m| {
        if mask.map_or(false, |mask| mask[[r, c]] <= 0.0) {
            return;
        }
        match composition {
            // f + w·m
            Composition::Add if m > 0.0 => min = min.max(-f / m),
            // f + w·(m − f)
            Composition::Blend if m > f => min = min.max(-f / (m - f)),
            Composition::Blend if m < f => max = max.min(f / (f - m)),
            // w·m inside the region
            Composition::Xor(XorRule::Scaled) if m > 0.0 => min = min.max(0.0),
            _ => {}
        }
    });
    (min, max)
}
