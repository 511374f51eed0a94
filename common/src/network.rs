//! # Address Sets
//!
//! Every way the toolkit accepts "a bunch of IP addresses":
//!
//! * [`range::IpRange`]: an inclusive `first - last` pair.
//! * [`cidr::Cidr`]: a network block such as `10.0.0.0/24`.
//! * [`glob::IpGlob`]: per-position wildcards such as `10.1.1.*` or `10.1.1.1,3,5`.
//! * [`target::IpTarget`]: any of the above, or a single host, parsed from user input.
//!
//! All of them iterate lazily and in ascending positional order.

use std::net::IpAddr;

use thiserror::Error;

pub mod cidr;
pub mod glob;
pub mod range;
pub mod target;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid IP address '{0}'")]
    InvalidAddress(String),
    #[error("invalid prefix '{0}'")]
    InvalidPrefix(String),
    #[error("prefix {prefix} exceeds {max} bits")]
    PrefixTooLong { prefix: u8, max: u8 },
    #[error("{first} and {last} are not in the same address family")]
    MixedFamilies { first: IpAddr, last: IpAddr },
    #[error("invalid IP glob '{glob}': {reason}")]
    InvalidGlob { glob: String, reason: String },
    #[error("invalid target '{0}'")]
    InvalidTarget(String),
}
