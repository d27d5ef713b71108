//! Memoized derived values
//!
//! Derived quantities such as illuminance are computed on first read and
//! kept until the data they derive from is written. Writers must call
//! [`Memoized::invalidate`] at every write site; nothing is invalidated
//! implicitly.

use once_cell::sync::OnceCell;

/// A lazily computed, explicitly invalidated value
#[derive(Debug, Clone)]
pub struct Memoized<T> {
    cell: OnceCell<T>,
}

impl<T> Memoized<T> {
    /// An unset value
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// The cached value, if one is present
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// True when a cached value is present
    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Return the cached value, computing it with `compute` if unset.
    ///
    /// A failed computation leaves the value unset.
    pub fn get_or_try_compute<E, F>(&self, compute: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.cell.get_or_try_init(compute)
    }

    /// Store a value directly, replacing anything cached
    pub fn set(&mut self, value: T) {
        self.cell = OnceCell::with_value(value);
    }

    /// Drop the cached value
    pub fn invalidate(&mut self) {
        self.cell.take();
    }
}

impl<T> Default for Memoized<T> {
    fn default() -> Self {
        Self::new()
    }
}
