//! ICC profile codec
//!
//! Reads ICC v2/v4 profiles and writes v4 RGB display profiles. Only the tag
//! types needed for matrix/shaper profiles are decoded; every other tag is
//! carried through untouched.
//!
//! # Example
//!
//! ```ignore
//! use oxcolor_core::icc::IccProfile;
//!
//! let profile = IccProfile::parse(&bytes)?;
//! if profile.is_matrix_shaper() {
//!     let colorants = profile.colorant_matrix();
//! }
//! ```

pub mod header;
pub mod tags;

mod error;
mod parser;
mod types;

pub use error::IccError;
pub use header::{ColorSpace, IccHeader, ProfileClass};
pub use parser::IccProfile;
pub use tags::{CicpData, CurveData, ParametricCurveData, TagData, TextData, Trc, XyzTagData};
pub use types::{S15Fixed16, TagSignature, XyzNumber};
