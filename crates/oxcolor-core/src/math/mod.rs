//! Math shared by the profile model and the transform engine
//!
//! - 3x3 matrices with a guarded inverse
//! - Bradford chromatic adaptation
//! - Transfer functions and ICC parametric curves

pub mod chromatic_adaptation;
pub mod matrix;
pub mod transfer;

pub use chromatic_adaptation::bradford_matrix;
pub use matrix::Matrix3x3;
pub use transfer::{ParametricCurve, ParametricCurveType, estimate_gamma};
