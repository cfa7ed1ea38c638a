//! Stored-only ZIP writer module.

pub mod builder;
pub mod records;

pub use builder::ZipBuilder;
pub use records::{zip_format, ZipRecord};
