//! Software version parsing, ordering and constraint matching.

pub mod constraint;
pub mod version;

pub use constraint::{Op, VersionConstraint, VersionRange};
pub use version::{PreRelease, Version, VersionError};
