//! Network datasets plus the address types from `ronin-common`.

pub mod asn;
pub mod public_suffix;

pub use ronin_common::network::{RangeError, cidr, glob, range, target};
pub use ronin_common::utils::ip;
