//! Container signalling decisions
//!
//! What an image container writer should put in its colr/clli boxes and
//! encoder settings, and how a reader turns what it found back into a profile
//! and pass-through attributes. No bitstream is produced or parsed here.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::nclx::{self, CompactTag};
use crate::pixel::PixelBuffer;
use crate::profile::ColorProfile;
use crate::types::Luminance;
use crate::{Error, Result};

/// Chroma subsampling requested for the encoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum YuvFormat {
    #[default]
    Yuv444,
    Yuv422,
    Yuv420,
    Yuv400,
    /// Could not be determined from the caller's input
    Invalid,
}

/// Encoder directives supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriteParams {
    /// Signal color at all (colr and clli boxes)
    pub write_profile: bool,
    /// Forced nclx codes; used only when all three are non-zero
    pub nclx: [u16; 3],
    /// 0 means lossless
    pub quality: u8,
    /// -1 with `quantizer_max` -1 selects quality mode
    pub quantizer_min: i32,
    pub quantizer_max: i32,
    /// -1 lets the encoder choose
    pub speed: i32,
    pub tile_rows_log2: u8,
    pub tile_cols_log2: u8,
    pub yuv_format: YuvFormat,
}

impl Default for WriteParams {
    fn default() -> Self {
        Self {
            write_profile: true,
            nclx: [0; 3],
            quality: 0,
            quantizer_min: -1,
            quantizer_max: -1,
            speed: -1,
            tile_rows_log2: 0,
            tile_cols_log2: 0,
            yuv_format: YuvFormat::Yuv444,
        }
    }
}

/// Color signalling chosen for a written image
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSignal {
    /// Caller-supplied nclx codes
    Forced(CompactTag),
    /// Derived nclx codes that describe the profile exactly
    Compact(CompactTag),
    /// Packed ICC bytes
    Embedded(Vec<u8>),
    /// Color signalling disabled
    Omitted,
}

/// Decide how to signal `profile`.
///
/// The profile is packed first and a packing failure is an error. Then:
/// forced codes, a derived nclx match, or the embedded profile.
pub fn choose_signal(
    profile: &ColorProfile,
    depth: u32,
    params: &WriteParams,
) -> Result<ColorSignal> {
    let packed = profile.pack().inspect_err(|e| {
        error!("Failed to create ICC profile: {}", e);
    })?;
    if !params.write_profile {
        return Ok(ColorSignal::Omitted);
    }

    if params.nclx.iter().all(|&code| code != 0) {
        let tag = CompactTag::forced(params.nclx, depth);
        info!("Forcing colr box (nclx): {}", tag);
        return Ok(ColorSignal::Forced(tag));
    }
    match nclx::encode(profile) {
        Ok(tag) => {
            info!("Writing colr box (nclx): {}", tag);
            Ok(ColorSignal::Compact(tag))
        }
        Err(e) => {
            debug!("No nclx form: {}", e);
            info!("Writing colr box (icc): {} bytes", packed.len());
            Ok(ColorSignal::Embedded(packed.to_vec()))
        }
    }
}

/// clli box content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentLightLevel {
    pub max_cll: u16,
    pub max_pall: u16,
}

/// Peak luminance of the profile as clli; unspecified luminance gives 0
pub fn content_light_level(profile: &ColorProfile) -> Result<ContentLightLevel> {
    let nits = profile.query()?.luminance_nits();
    let max_cll = u16::try_from(nits).unwrap_or(u16::MAX);
    info!("Writing clli box : maxCLL: {}", max_cll);
    Ok(ContentLightLevel {
        max_cll,
        max_pall: 0,
    })
}

/// Quality or quantizer control handed to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RateControl {
    /// Quality 1..=100 over the full quantizer range 0..=63
    Quality { quality: u8, lossless: bool },
    /// Explicit quantizers (0 = lossless, 63 = worst)
    Quantizers { min: i32, max: i32 },
}

/// Validated encoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodeDirective {
    pub depth: u32,
    pub yuv_format: YuvFormat,
    pub rate: RateControl,
    pub min_quantizer: i32,
    pub max_quantizer: i32,
    /// `None` for the encoder default
    pub speed: Option<i32>,
    pub tile_rows_log2: u8,
    pub tile_cols_log2: u8,
}

impl EncodeDirective {
    pub fn resolve(params: &WriteParams, depth: u32) -> Result<Self> {
        if !matches!(depth, 8 | 10 | 12) {
            return Err(Error::Unsupported(format!(
                "cannot encode {} bits per channel",
                depth
            )));
        }
        if params.yuv_format == YuvFormat::Invalid {
            error!("Unable to choose YUV format");
            return Err(Error::Unsupported("unable to choose YUV format".to_string()));
        }

        let (rate, min_quantizer, max_quantizer) =
            if params.quantizer_min == -1 && params.quantizer_max == -1 {
                let quality = if params.quality == 0 {
                    100
                } else {
                    params.quality.min(100)
                };
                let lossless = quality == 100;
                info!(
                    "Encoding quality: {}{}",
                    quality,
                    if lossless { " [Lossless]" } else { "" }
                );
                (RateControl::Quality { quality, lossless }, 0, 63)
            } else {
                info!(
                    "Encoding quantizer (0=lossless, 63=worst) min/max: {}/{}    (explicit)",
                    params.quantizer_min, params.quantizer_max
                );
                (
                    RateControl::Quantizers {
                        min: params.quantizer_min,
                        max: params.quantizer_max,
                    },
                    params.quantizer_min,
                    params.quantizer_max,
                )
            };

        if params.tile_rows_log2 != 0 || params.tile_cols_log2 != 0 {
            info!(
                "Encoding tiling (log2): 2^{} rows / 2^{} cols",
                params.tile_rows_log2, params.tile_cols_log2
            );
        } else {
            info!("Encoding tiling (log2): disabled");
        }

        let speed = (params.speed != -1).then_some(params.speed);
        match speed {
            Some(s) => info!("Encoding speed (0=BestQuality, 10=Fastest): {}", s),
            None => info!("Encoding speed (0=BestQuality, 10=Fastest): default"),
        }

        Ok(Self {
            depth,
            yuv_format: params.yuv_format,
            rate,
            min_quantizer,
            max_quantizer,
            speed,
            tile_rows_log2: params.tile_rows_log2,
            tile_cols_log2: params.tile_cols_log2,
        })
    }
}

/// Profile for a decoded image.
///
/// Priority: a copy of the caller's override, the embedded ICC profile (which
/// must parse), the nclx codes, then stock sRGB.
pub fn resolve_read_profile(
    override_profile: Option<&ColorProfile>,
    embedded_icc: Option<&[u8]>,
    compact: Option<&CompactTag>,
    max_cll: u16,
) -> Result<ColorProfile> {
    if let Some(profile) = override_profile {
        return profile.try_clone();
    }
    if let Some(bytes) = embedded_icc.filter(|b| !b.is_empty()) {
        return ColorProfile::parse(bytes, None).inspect_err(|e| {
            error!("Failed parse ICC profile chunk: {}", e);
        });
    }
    if let Some(tag) = compact {
        return nclx::decode(tag, max_cll);
    }
    ColorProfile::stock_srgb()
}

/// What [`adopt_override`] did with the override profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adoption {
    /// The image already held this exact profile
    AlreadyOwned,
    /// The image's profile differed and was replaced
    Replaced,
    /// The image's profile was content-equal; the override was released
    Released,
}

/// Hand an override profile to a decoded image.
///
/// Either the image ends up owning the override, or the override is released
/// here; never both and never neither.
pub fn adopt_override(image: &mut PixelBuffer, override_profile: Arc<ColorProfile>) -> Adoption {
    if Arc::ptr_eq(image.profile(), &override_profile) {
        Adoption::AlreadyOwned
    } else if !image.profile().matches(&override_profile) {
        drop(image.set_profile(override_profile));
        Adoption::Replaced
    } else {
        Adoption::Released
    }
}

/// Replace the image profile with a copy whose luminance is `nits`
pub fn enforce_luminance(image: &mut PixelBuffer, nits: u32) -> Result<()> {
    let mut profile = image.profile().try_clone()?;
    profile.set_luminance(Luminance::Nits(nits))?;
    image.set_profile(Arc::new(profile));
    info!("Overriding profile luminance as: {} nits", nits);
    Ok(())
}

/// Clean aperture (ISO/IEC 14496-12 12.1.4) as stored: fractions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CleanAperture {
    pub width_n: u32,
    pub width_d: u32,
    pub height_n: u32,
    pub height_d: u32,
    pub horiz_off_n: i32,
    pub horiz_off_d: u32,
    pub vert_off_n: i32,
    pub vert_off_d: u32,
}

/// Optional image transforms a container carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerTransforms {
    pub clap: Option<CleanAperture>,
    /// `irot` angle in counter-clockwise quarter turns
    pub irot: Option<u8>,
    /// `imir` axis
    pub imir: Option<u8>,
}

/// Crop rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CropRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Metadata passed through from a container to the decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadAttributes {
    pub crop: Option<CropRect>,
    /// Clockwise quarter turns needed for display
    pub cw_rotations: u8,
    /// 0 for none, otherwise `imir` axis + 1
    pub mirror: u8,
    /// Set for multi-frame files only
    pub frame_index: Option<u32>,
    pub frame_count: Option<u32>,
}

impl ReadAttributes {
    pub fn from_container(
        width: u32,
        height: u32,
        transforms: &ContainerTransforms,
        frame_index: u32,
        frame_count: u32,
    ) -> Result<Self> {
        let mut attrs = ReadAttributes::default();
        if frame_count > 1 {
            debug!(
                "Container holds {} frames, decoding frame {}",
                frame_count, frame_index
            );
            attrs.frame_index = Some(frame_index);
            attrs.frame_count = Some(frame_count);
        }
        if let Some(clap) = &transforms.clap {
            attrs.crop = Some(crop_rect(width, height, clap)?);
        }
        if let Some(angle) = transforms.irot {
            attrs.cw_rotations = (4 - (angle & 3)) % 4;
        }
        if let Some(axis) = transforms.imir {
            attrs.mirror = axis.saturating_add(1);
        }
        Ok(attrs)
    }
}

fn crop_rect(width: u32, height: u32, clap: &CleanAperture) -> Result<CropRect> {
    let div = |n: i64, d: u32| -> Result<i64> {
        if d == 0 {
            return Err(Error::InvalidDimensions(
                "clean aperture has a zero denominator".to_string(),
            ));
        }
        Ok(n / i64::from(d))
    };
    let cropped_w = div(i64::from(clap.width_n), clap.width_d)?;
    let cropped_h = div(i64::from(clap.height_n), clap.height_d)?;
    let off_x = div(i64::from(clap.horiz_off_n), clap.horiz_off_d)?;
    let off_y = div(i64::from(clap.vert_off_n), clap.vert_off_d)?;

    let center_x = off_x + (i64::from(width) - 1) / 2;
    let center_y = off_y + (i64::from(height) - 1) / 2;
    Ok(CropRect {
        x: center_x - (cropped_w - 1) / 2,
        y: center_y - (cropped_h - 1) / 2,
        width: cropped_w,
        height: cropped_h,
    })
}
