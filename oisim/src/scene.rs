//! Companion scene geometry.
//!
//! An optical image that has not been computed yet has no photon data and
//! therefore no size of its own. Geometric queries accept an explicit
//! companion scene to fall back on instead of consulting any global state.

/// The scene properties an optical image can borrow
pub trait SceneGeometry {
    /// `(rows, cols)` of the scene
    fn size(&self) -> (usize, usize);
}

/// Minimal scene description carrying only what geometry needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneDescriptor {
    pub rows: usize,
    pub cols: usize,
}

impl SceneDescriptor {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }
}

impl SceneGeometry for SceneDescriptor {
    fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}
