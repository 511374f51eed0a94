//! # Ronin Common
//!
//! Shared building blocks used by every other crate in the workspace:
//!
//! * **[`config`]**: runtime configuration (cache directory, timeouts, dataset URLs).
//! * **[`network`]**: IP address helpers, ranges, CIDRs, globs and scan targets.
//! * **[`text`]**: the regular-expression catalogue.
//! * **[`terminal`]**: ANSI colouring and the `tracing` formatter used for console output.

pub mod config;
pub mod network;
pub mod terminal;
pub mod text;
pub mod utils;

#[doc(hidden)]
pub use tracing;
