//! Shared components and utilities for the oisim workspace.
//!
//! Holds the pieces that are not specific to the optical image data model:
//! length units, 1-D interpolation, deterministic parallel processing and
//! photon noise generation.

pub mod algo;
pub mod image_proc;
pub mod units;
