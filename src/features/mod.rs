//! Feature encoding
//!
//! Converts cleaned match records into numeric matrices for model fitting.

pub mod encoding;
pub mod matrix;

pub use encoding::CategoricalEncoder;
pub use matrix::{design_matrices, DesignMatrix};
