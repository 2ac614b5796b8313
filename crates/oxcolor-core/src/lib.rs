//! # oxcolor - color profile model and pixel transforms
//!
//! The color core of an image conversion toolkit.
//!
//! ## Features
//!
//! - **Profiles**: build RGB display profiles from primaries, a tone curve and
//!   a peak luminance; query them back; pack and parse ICC bytes
//! - **nclx**: map profiles to and from the compact (primaries, transfer,
//!   matrix, range) signalling of video-derived containers
//! - **Transforms**: convert interleaved 8/16-bit and float pixels between
//!   profiles, with or without alpha, optionally across threads
//! - **Containers**: decide what a writer signals and what a reader keeps
//!
//! ## Quick Start
//!
//! ```no_run
//! use oxcolor_core::{ColorPrimaries, ColorProfile, Luminance, PixelEncoding, ToneCurve};
//! use oxcolor_core::transform;
//!
//! let srgb = ColorProfile::stock_srgb()?;
//! let pq = ColorProfile::create(&ColorPrimaries::BT2020, ToneCurve::Pq, Luminance::Nits(10000), None)?;
//!
//! let src = [255u8, 128, 64];
//! let mut dst = [0u16; 3];
//! transform(
//!     Some(&srgb),
//!     PixelEncoding::Rgb8,
//!     Some(&pq),
//!     PixelEncoding::Rgb16,
//!     1,
//!     &src,
//!     bytemuck::cast_slice_mut(&mut dst),
//! )?;
//! # Ok::<(), oxcolor_core::Error>(())
//! ```

pub mod color;
pub mod container;
pub mod error;
pub mod icc;
pub mod math;
pub mod nclx;
pub mod pipeline;
pub mod pixel;
pub mod profile;
pub mod raw;
pub mod simd;
pub mod transform;
pub mod types;

pub use container::{
    Adoption, ColorSignal, ContentLightLevel, EncodeDirective, ReadAttributes, WriteParams,
    YuvFormat,
};
pub use error::{Error, ErrorKind, Result};
pub use nclx::{CompactTag, Range};
pub use pixel::{PixelBuffer, PixelEncoding, PixelStorage, SampleFormat};
pub use profile::{ColorProfile, ProfileQuery};
pub use raw::RawBuffer;
pub use transform::{Transform, TransformOptions, transform};
pub use types::{ColorPrimaries, Luminance, ToneCurve};

/// Version of oxcolor
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
