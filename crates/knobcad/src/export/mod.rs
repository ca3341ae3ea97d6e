//! Output boundaries: serializing generated solids for external tools.

pub mod stl;

pub use stl::to_ascii_stl;
