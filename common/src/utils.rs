pub mod ip;
pub mod product;
