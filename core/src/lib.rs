//! # Ronin Support
//!
//! Helper library for security research scripts. The lower-level crates are
//! re-exported so a single dependency is enough:
//!
//! * **[`common`]**: config, IP ranges/CIDRs/globs, regex catalogue, terminal output.
//! * **[`protocols`]**: TCP/UDP/TLS helpers, proxies, DNS, HTTP.
//!
//! On top of those this crate provides ASN and public-suffix datasets,
//! fuzzing generators, software versions, compression, crypto and string,
//! file and iterator extensions.

pub use ronin_common as common;
pub use ronin_protocols as protocols;

pub mod compression;
pub mod crypto;
pub mod ext;
pub mod fuzzing;
pub mod home;
pub mod network;
pub mod software;
