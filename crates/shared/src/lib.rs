//! Domain records, wire shapes and value coercion shared by the insights crates.

pub mod domain;
pub mod error;
pub mod normalize;
pub mod protocol;
