//! Extension traits and helpers for strings, files and iterators.

pub mod file;
pub mod iter;
pub mod string;

pub use iter::IteratorExt;
pub use string::StringExt;
