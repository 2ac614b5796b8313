//! Compact color signalling (nclx)
//!
//! Maps between the primaries/curve/luminance model and the code triple of
//! ITU-T H.273 that image containers carry in an `nclx` colr box. Matching is
//! a first-hit scan over ordered rule tables; a model with no exact entry has
//! no compact form and the caller embeds the full profile instead.

use std::fmt;

use tracing::{debug, info, warn};

use crate::profile::{ColorProfile, MAX_LUMINANCE, ProfileQuery};
use crate::types::{ColorPrimaries, Luminance, ToneCurve};
use crate::{Error, Result};

/// Per-coordinate tolerance when matching primaries
const PRIMARIES_TOLERANCE: f64 = 0.001;
/// Tolerance when matching a gamma exponent
const GAMMA_TOLERANCE: f64 = 0.001;
/// The only peak luminance a PQ code can express
const PQ_LUMINANCE: u32 = 10000;

/// H.273 `ColourPrimaries`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorPrimariesCode(pub u16);

impl ColorPrimariesCode {
    pub const UNKNOWN: Self = Self(0);
    pub const BT709: Self = Self(1);
    pub const UNSPECIFIED: Self = Self(2);
    pub const BT470M: Self = Self(4);
    pub const BT470BG: Self = Self(5);
    pub const BT601: Self = Self(6);
    pub const SMPTE240: Self = Self(7);
    pub const GENERIC_FILM: Self = Self(8);
    pub const BT2020: Self = Self(9);
    pub const XYZ: Self = Self(10);
    pub const SMPTE431: Self = Self(11);
    pub const SMPTE432: Self = Self(12);
    pub const EBU3213: Self = Self(22);

    /// First table entry matching `primaries`
    pub fn find(primaries: &ColorPrimaries) -> Option<Self> {
        PRIMARIES_TABLE
            .iter()
            .find(|entry| entry.primaries.approx_eq(primaries, PRIMARIES_TOLERANCE))
            .map(|entry| entry.code)
    }

    /// Chromaticities for this code, `None` when it is not in the table
    pub fn primaries(self) -> Option<ColorPrimaries> {
        self.entry().map(|entry| entry.primaries)
    }

    pub fn name(self) -> &'static str {
        self.entry().map_or("Unknown", |entry| entry.name)
    }

    fn entry(self) -> Option<&'static PrimariesEntry> {
        PRIMARIES_TABLE.iter().find(|entry| entry.code == self)
    }

    /// Matrix coefficients paired with these primaries when writing
    pub fn matrix_coefficients(self) -> MatrixCoefficientsCode {
        match self {
            Self::BT709 | Self::BT470BG | Self::UNSPECIFIED | Self::BT601 => {
                MatrixCoefficientsCode::BT601
            }
            Self::BT2020 => MatrixCoefficientsCode::BT2020_NCL,
            _ => MatrixCoefficientsCode::CHROMA_DERIVED_NCL,
        }
    }
}

/// H.273 `TransferCharacteristics`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferCharacteristicsCode(pub u16);

impl TransferCharacteristicsCode {
    pub const UNKNOWN: Self = Self(0);
    pub const BT709: Self = Self(1);
    pub const UNSPECIFIED: Self = Self(2);
    pub const BT470M: Self = Self(4);
    pub const BT470BG: Self = Self(5);
    pub const BT601: Self = Self(6);
    pub const SMPTE240: Self = Self(7);
    pub const LINEAR: Self = Self(8);
    pub const LOG100: Self = Self(9);
    pub const LOG100_SQRT10: Self = Self(10);
    pub const IEC61966: Self = Self(11);
    pub const BT1361: Self = Self(12);
    pub const SRGB: Self = Self(13);
    pub const BT2020_10BIT: Self = Self(14);
    pub const BT2020_12BIT: Self = Self(15);
    pub const PQ: Self = Self(16);
    pub const SMPTE428: Self = Self(17);
    pub const HLG: Self = Self(18);

    pub fn name(self) -> &'static str {
        match self {
            Self::UNKNOWN => "Unknown",
            Self::BT709 => "BT709",
            Self::UNSPECIFIED => "Unspecified",
            Self::BT470M => "2.2g",
            Self::BT470BG => "2.8g",
            Self::BT601 => "BT601",
            Self::SMPTE240 => "SMPTE240",
            Self::LINEAR => "Linear",
            Self::LOG100 => "Log100",
            Self::LOG100_SQRT10 => "Log100Sqrt10",
            Self::IEC61966 => "IEC61966",
            Self::BT1361 => "BT1361",
            Self::SRGB => "SRGB",
            Self::BT2020_10BIT => "BT2020_10",
            Self::BT2020_12BIT => "BT2020_12",
            Self::PQ => "PQ",
            Self::SMPTE428 => "SMPTE428",
            Self::HLG => "HLG",
            _ => "Reserved",
        }
    }
}

/// H.273 `MatrixCoefficients`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixCoefficientsCode(pub u16);

impl MatrixCoefficientsCode {
    pub const IDENTITY: Self = Self(0);
    pub const BT709: Self = Self(1);
    pub const UNSPECIFIED: Self = Self(2);
    pub const FCC: Self = Self(4);
    pub const BT470BG: Self = Self(5);
    pub const BT601: Self = Self(6);
    pub const SMPTE240: Self = Self(7);
    pub const YCGCO: Self = Self(8);
    pub const BT2020_NCL: Self = Self(9);
    pub const BT2020_CL: Self = Self(10);
    pub const SMPTE2085: Self = Self(11);
    pub const CHROMA_DERIVED_NCL: Self = Self(12);
    pub const CHROMA_DERIVED_CL: Self = Self(13);
    pub const ICTCP: Self = Self(14);
}

/// YUV sample range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Range {
    Limited,
    #[default]
    Full,
}

/// Content of an `nclx` colr box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompactTag {
    pub color_primaries: ColorPrimariesCode,
    pub transfer_characteristics: TransferCharacteristicsCode,
    pub matrix_coefficients: MatrixCoefficientsCode,
    pub range: Range,
}

impl CompactTag {
    /// Caller-supplied codes taken as-is, bypassing matching.
    ///
    /// Range is limited above 8 bits per channel and full otherwise.
    pub fn forced(codes: [u16; 3], depth: u32) -> Self {
        Self {
            color_primaries: ColorPrimariesCode(codes[0]),
            transfer_characteristics: TransferCharacteristicsCode(codes[1]),
            matrix_coefficients: MatrixCoefficientsCode(codes[2]),
            range: if depth > 8 { Range::Limited } else { Range::Full },
        }
    }
}

impl fmt::Display for CompactTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "C:{} T:{} M:{} F:{}",
            self.color_primaries.0,
            self.transfer_characteristics.0,
            self.matrix_coefficients.0,
            u8::from(self.range == Range::Full)
        )
    }
}

struct PrimariesEntry {
    code: ColorPrimariesCode,
    name: &'static str,
    primaries: ColorPrimaries,
}

const fn xy(r: [f64; 2], g: [f64; 2], b: [f64; 2], w: [f64; 2]) -> ColorPrimaries {
    ColorPrimaries {
        red: r,
        green: g,
        blue: b,
        white: w,
    }
}

const D65: [f64; 2] = [0.3127, 0.3290];
const ILLUMINANT_C: [f64; 2] = [0.310, 0.316];

/// Priority order: the first match wins, so BT709 shadows Unspecified.
const PRIMARIES_TABLE: &[PrimariesEntry] = &[
    PrimariesEntry {
        code: ColorPrimariesCode::BT709,
        name: "BT709",
        primaries: ColorPrimaries::BT709,
    },
    PrimariesEntry {
        code: ColorPrimariesCode::UNSPECIFIED,
        name: "Unspecified",
        primaries: ColorPrimaries::BT709,
    },
    PrimariesEntry {
        code: ColorPrimariesCode::BT470M,
        name: "BT470M",
        primaries: xy([0.67, 0.33], [0.21, 0.71], [0.14, 0.08], ILLUMINANT_C),
    },
    PrimariesEntry {
        code: ColorPrimariesCode::BT470BG,
        name: "BT470BG",
        primaries: xy([0.64, 0.33], [0.29, 0.60], [0.15, 0.06], D65),
    },
    PrimariesEntry {
        code: ColorPrimariesCode::BT601,
        name: "BT601",
        primaries: xy([0.630, 0.340], [0.310, 0.595], [0.155, 0.070], D65),
    },
    PrimariesEntry {
        code: ColorPrimariesCode::SMPTE240,
        name: "SMPTE240",
        primaries: xy([0.630, 0.340], [0.310, 0.595], [0.155, 0.070], D65),
    },
    PrimariesEntry {
        code: ColorPrimariesCode::GENERIC_FILM,
        name: "GenericFilm",
        primaries: xy([0.681, 0.319], [0.243, 0.692], [0.145, 0.049], ILLUMINANT_C),
    },
    PrimariesEntry {
        code: ColorPrimariesCode::BT2020,
        name: "BT2020",
        primaries: ColorPrimaries::BT2020,
    },
    PrimariesEntry {
        code: ColorPrimariesCode::XYZ,
        name: "XYZ",
        primaries: xy([1.0, 0.0], [0.0, 1.0], [0.0, 0.0], [0.3333, 0.3333]),
    },
    PrimariesEntry {
        code: ColorPrimariesCode::SMPTE431,
        name: "SMPTE431",
        primaries: xy([0.680, 0.320], [0.265, 0.690], [0.150, 0.060], [0.314, 0.351]),
    },
    PrimariesEntry {
        code: ColorPrimariesCode::SMPTE432,
        name: "SMPTE432",
        primaries: ColorPrimaries::P3,
    },
    PrimariesEntry {
        code: ColorPrimariesCode::EBU3213,
        name: "EBU3213",
        primaries: xy([0.630, 0.340], [0.295, 0.605], [0.155, 0.077], D65),
    },
];

struct TransferRule {
    code: TransferCharacteristicsCode,
    matches: fn(&ToneCurve, Luminance) -> bool,
}

fn is_gamma(curve: &ToneCurve, target: f64) -> bool {
    matches!(curve, ToneCurve::Gamma { gamma, .. } if (gamma - target).abs() < GAMMA_TOLERANCE)
}

/// Encoding rules, first match wins. Only PQ may carry a peak luminance.
const TRANSFER_RULES: &[TransferRule] = &[
    TransferRule {
        code: TransferCharacteristicsCode::PQ,
        matches: |c, l| *c == ToneCurve::Pq && l == Luminance::Nits(PQ_LUMINANCE),
    },
    TransferRule {
        code: TransferCharacteristicsCode::HLG,
        matches: |c, l| *c == ToneCurve::Hlg && l == Luminance::Unspecified,
    },
    TransferRule {
        code: TransferCharacteristicsCode::SRGB,
        matches: |c, l| *c == ToneCurve::Srgb && l == Luminance::Unspecified,
    },
    TransferRule {
        code: TransferCharacteristicsCode::BT470M,
        matches: |c, l| is_gamma(c, 2.2) && l == Luminance::Unspecified,
    },
    TransferRule {
        code: TransferCharacteristicsCode::BT470BG,
        matches: |c, l| is_gamma(c, 2.8) && l == Luminance::Unspecified,
    },
];

/// Curve a transfer code decodes to, `None` for codes without one
fn decoded_curve(code: TransferCharacteristicsCode) -> Option<ToneCurve> {
    match code {
        TransferCharacteristicsCode::HLG => Some(ToneCurve::Hlg),
        TransferCharacteristicsCode::PQ => Some(ToneCurve::Pq),
        TransferCharacteristicsCode::BT470M => Some(ToneCurve::gamma(2.2)),
        TransferCharacteristicsCode::BT470BG => Some(ToneCurve::gamma(2.8)),
        TransferCharacteristicsCode::SRGB => Some(ToneCurve::Srgb),
        _ => None,
    }
}

/// Find the compact tag for a model triple.
///
/// Fails with [`Error::NoCompactMatch`] when either the primaries or the
/// curve/luminance pair has no table entry.
pub fn encode_model(query: &ProfileQuery) -> Result<CompactTag> {
    let primaries = ColorPrimariesCode::find(&query.primaries).ok_or_else(|| {
        Error::NoCompactMatch(format!("no standard primaries match ({})", query.primaries))
    })?;
    let transfer = TRANSFER_RULES
        .iter()
        .find(|rule| (rule.matches)(&query.curve, query.luminance))
        .map(|rule| rule.code)
        .ok_or_else(|| {
            Error::NoCompactMatch(format!(
                "no transfer code for curve {} with luminance {}",
                query.curve, query.luminance
            ))
        })?;

    Ok(CompactTag {
        color_primaries: primaries,
        transfer_characteristics: transfer,
        matrix_coefficients: primaries.matrix_coefficients(),
        range: Range::Full,
    })
}

/// Find the compact tag for a profile, see [`encode_model`]
pub fn encode(profile: &ColorProfile) -> Result<CompactTag> {
    let tag = encode_model(&profile.query()?)?;
    info!(
        "{} {} color profile detected; switching to nclx colr box.",
        tag.color_primaries.name(),
        tag.transfer_characteristics.name()
    );
    Ok(tag)
}

/// Model triple for a compact tag.
///
/// Unknown primaries fall back to BT.709 and unsupported transfer codes to
/// gamma 2.2 with a warning. A `max_cll` of 0 means unspecified; PQ without
/// one gets 10000 nits. Values a `lumi` tag cannot hold are clamped.
pub fn decode_model(tag: &CompactTag, max_cll: u16) -> ProfileQuery {
    let primaries = tag
        .color_primaries
        .primaries()
        .unwrap_or(ColorPrimaries::BT709);
    let mut luminance = match u32::from(max_cll) {
        0 => Luminance::Unspecified,
        n if n > MAX_LUMINANCE => {
            warn!(
                "nclx max CLL {} exceeds {} nits, clamping",
                n, MAX_LUMINANCE
            );
            Luminance::Nits(MAX_LUMINANCE)
        }
        n => Luminance::Nits(n),
    };

    let curve = match decoded_curve(tag.transfer_characteristics) {
        Some(curve) => curve,
        None => {
            let fallback = ToneCurve::gamma(2.2);
            warn!(
                "Unsupported nclx transfer characteristics {} ({}), using {}, luminance {}",
                tag.transfer_characteristics.0,
                tag.transfer_characteristics.name(),
                fallback,
                luminance
            );
            fallback
        }
    };
    if curve == ToneCurve::Pq && luminance == Luminance::Unspecified {
        luminance = Luminance::Nits(PQ_LUMINANCE);
    }

    debug!(
        "nclx to ICC: primaries ({}), curve {}, luminance {}",
        primaries, curve, luminance
    );
    ProfileQuery {
        primaries,
        curve,
        luminance,
    }
}

/// Build a full profile from a compact tag, see [`decode_model`]
pub fn decode(tag: &CompactTag, max_cll: u16) -> Result<ColorProfile> {
    let model = decode_model(tag, max_cll);
    let description = describe(tag.color_primaries, &model);
    ColorProfile::create(
        &model.primaries,
        model.curve,
        model.luminance,
        Some(&description),
    )
}

/// e.g. "BT2020 PQ 10000 nits", "BT709 Gamma 2.20"
fn describe(code: ColorPrimariesCode, model: &ProfileQuery) -> String {
    let name = match code.entry() {
        Some(entry) => entry.name,
        None => "BT709",
    };
    match model.luminance {
        Luminance::Unspecified => format!("{} {}", name, model.curve),
        lum => format!("{} {} {}", name, model.curve, lum),
    }
}
