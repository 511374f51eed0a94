pub mod colors;
pub mod format;
pub mod print;
pub mod spinner;
