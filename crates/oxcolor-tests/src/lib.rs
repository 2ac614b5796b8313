//! # oxcolor-tests
//!
//! Cross-validation of oxcolor against independent color engines.
//!
//! - **lcms2**: opens our packed profiles and transforms the same pixels
//! - **moxcms**: parses our profiles and reports colorants, white and cicp
//!
//! Helpers here build the shared fixtures: stock profiles, deterministic
//! pixel patterns and difference statistics.

pub mod accuracy;
pub mod patterns;
pub mod profiles;
pub mod reference;

pub use accuracy::{ChannelDiff, DeltaEStats, compare_rgb8_lab, delta_e_2000};
pub use patterns::Pattern;
pub use profiles::TestProfile;
