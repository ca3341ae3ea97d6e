#![warn(missing_docs)]

//! Surface feature builders.
//!
//! Each builder is a pure function from a configuration value, a
//! [`knobcad_profile::Profile`] and a geometry engine to an optional
//! [`FeatureSolid`]. Degenerate parameters (zero depth, zero count,
//! empty range) yield `Ok(None)`; a missing solid is the normal signal
//! for "nothing to build", never an error.

use knobcad_engine::SolidId;

mod knurling;
mod pointer;
mod spline;
mod thread;

pub use knurling::build_knurling;
pub use pointer::build_pointer;
pub use spline::{build_spline, SplineSite};
pub use thread::build_thread;

/// A generated feature: one root solid, any number of instances sharing
/// its geometry, and the subtraction-set flag.
#[derive(Debug, Clone)]
pub struct FeatureSolid {
    /// The solid owning the geometry.
    pub root: SolidId,
    /// Rotated/translated copies sharing the root's geometry.
    pub instances: Vec<SolidId>,
    /// Whether the whole feature belongs in the subtraction set.
    pub subtractive: bool,
}

impl FeatureSolid {
    /// Root plus all instances.
    pub fn all_ids(&self) -> impl Iterator<Item = SolidId> + '_ {
        std::iter::once(self.root).chain(self.instances.iter().copied())
    }

    /// Total number of solids (root included).
    pub fn solid_count(&self) -> usize {
        1 + self.instances.len()
    }
}
