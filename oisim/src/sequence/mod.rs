//! Lazily composed temporal sequences of optical images.

pub mod composition;
pub mod oi_sequence;

pub use composition::{compose, Composition, ModulationRegion, XorRule};
pub use oi_sequence::{ConstructionError, OiSequence, SequenceError, TimeAxis};
