//! Color profiles
//!
//! A [`ColorProfile`] owns an ICC representation built from, or queryable
//! into, the [`ColorPrimaries`] / [`ToneCurve`] / [`Luminance`] model. The
//! packed ICC bytes are produced lazily and cached; they never change after
//! that unless the profile is mutated through [`ColorProfile::set_luminance`].

use std::sync::OnceLock;

use tracing::debug;

use crate::color::{WhitePoint, Xyz, correlated_color_temperature};
use crate::icc::{
    CicpData, CurveData, IccHeader, IccProfile, ParametricCurveData, TagData, TagSignature,
    TextData, XyzTagData,
};
use crate::math::transfer::{self, ParametricCurve};
use crate::math::{Matrix3x3, bradford_matrix, estimate_gamma};
use crate::nclx::{ColorPrimariesCode, TransferCharacteristicsCode};
use crate::raw::RawBuffer;
use crate::types::{ColorPrimaries, Luminance, ToneCurve};
use crate::{Error, Result};

/// Samples in a table curve written for PQ and HLG
const TABLE_CURVE_SIZE: usize = 4096;

/// Largest luminance an s15Fixed16 `lumi` tag can hold
pub(crate) const MAX_LUMINANCE: u32 = 32767;

/// Output of [`ColorProfile::query`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileQuery {
    pub primaries: ColorPrimaries,
    pub curve: ToneCurve,
    pub luminance: Luminance,
}

impl ProfileQuery {
    /// Luminance as a plain number, 0 when the profile has no `lumi` tag
    pub fn luminance_nits(&self) -> u32 {
        self.luminance.nits().unwrap_or(0)
    }
}

/// An ICC color profile plus an optional description
#[derive(Debug)]
pub struct ColorProfile {
    icc: IccProfile,
    description: Option<String>,
    packed: OnceLock<Vec<u8>>,
}

impl ColorProfile {
    /// Build an RGB display profile from the model.
    ///
    /// Colorants are Bradford-adapted to the D50 connection space and the
    /// adaptation is recorded in a `chad` tag. All three channels share one
    /// tone curve. `Complex` curves are written as a pure power law with their
    /// exponent.
    pub fn create(
        primaries: &ColorPrimaries,
        curve: ToneCurve,
        luminance: Luminance,
        description: Option<&str>,
    ) -> Result<Self> {
        curve.validate()?;
        let rgb_to_xyz = primaries.rgb_to_xyz()?;
        let white = primaries.white_point().xyz;
        let chad = bradford_matrix(white, WhitePoint::D50.xyz).ok_or_else(|| {
            Error::DegeneratePrimaries(format!("cannot adapt white {:?} to D50", primaries.white))
        })?;
        let colorants = chad.multiply(&rgb_to_xyz);
        if colorants.inverse().is_none() {
            return Err(Error::DegeneratePrimaries(
                "adapted colorant matrix is singular".to_string(),
            ));
        }

        let mut icc = IccProfile::new(IccHeader::display_rgb());
        if let Some(text) = description {
            icc.set_tag(
                TagSignature::DESC,
                TagData::MultiLocalizedUnicode(TextData::new(text)),
            );
        }
        icc.set_tag(
            TagSignature::MEDIA_WHITE,
            TagData::Xyz(XyzTagData::single(WhitePoint::D50.xyz)),
        );
        for (sig, col) in [
            (TagSignature::RED_COLORANT, 0),
            (TagSignature::GREEN_COLORANT, 1),
            (TagSignature::BLUE_COLORANT, 2),
        ] {
            icc.set_tag(
                sig,
                TagData::Xyz(XyzTagData::single(Xyz::from_array(colorants.column(col)))),
            );
        }
        let trc = trc_tag(&curve);
        icc.set_tag(TagSignature::RED_TRC, trc.clone());
        icc.set_tag(TagSignature::GREEN_TRC, trc.clone());
        icc.set_tag(TagSignature::BLUE_TRC, trc);
        icc.set_tag(TagSignature::CHAD, TagData::matrix(&chad));
        if let Some(cicp) = cicp_tag(primaries, &curve) {
            icc.set_tag(TagSignature::CICP, TagData::Cicp(cicp));
        }

        let mut profile = Self {
            icc,
            description: description.map(str::to_owned),
            packed: OnceLock::new(),
        };
        profile.set_luminance(luminance)?;
        Ok(profile)
    }

    /// Wrap an existing ICC blob.
    ///
    /// When `description` is `None` the profile's own `desc` tag is used.
    pub fn parse(bytes: &[u8], description: Option<&str>) -> Result<Self> {
        let icc = IccProfile::parse(bytes).map_err(|e| Error::ProfileParse(e.to_string()))?;
        let description = description
            .map(str::to_owned)
            .or_else(|| icc.description());
        let size = icc.header.size as usize;
        Ok(Self {
            icc,
            description,
            packed: OnceLock::from(bytes[..size].to_vec()),
        })
    }

    /// BT.709 primaries, gamma 2.4, 300 nits, described as "SRGB"
    pub fn stock_srgb() -> Result<Self> {
        Self::create(
            &ColorPrimaries::BT709,
            ToneCurve::gamma(2.4),
            Luminance::Nits(300),
            Some("SRGB"),
        )
    }

    /// Independent copy made by packing and re-parsing
    pub fn try_clone(&self) -> Result<Self> {
        let bytes = self.pack()?;
        Self::parse(bytes, self.description.as_deref())
    }

    /// Canonical ICC bytes, produced on first use
    pub fn pack(&self) -> Result<&[u8]> {
        if let Some(bytes) = self.packed.get() {
            return Ok(bytes);
        }
        let bytes = self.icc.to_bytes()?;
        Ok(self.packed.get_or_init(|| bytes))
    }

    /// Pack into a raw buffer, replacing its contents
    pub fn pack_into(&self, out: &mut RawBuffer) -> Result<()> {
        match self.pack() {
            Ok(bytes) => {
                out.set(bytes);
                Ok(())
            }
            Err(e) => {
                out.free();
                Err(e)
            }
        }
    }

    /// Content equality by packed bytes
    pub fn matches(&self, other: &Self) -> bool {
        match (self.pack(), other.pack()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Recover primaries, curve and luminance.
    ///
    /// With an invertible `chad` tag the colorants are un-adapted to their
    /// native illuminant. The white point is un-adapted only when it reads as
    /// D50 (within 1 K), since some writers store the native white directly.
    /// The curve comes from the red channel; channels that differ make the
    /// result `Complex`.
    pub fn query(&self) -> Result<ProfileQuery> {
        let icc = &self.icc;
        let red = icc.red_colorant().ok_or(Error::MissingTag("rXYZ"))?;
        let green = icc.green_colorant().ok_or(Error::MissingTag("gXYZ"))?;
        let blue = icc.blue_colorant().ok_or(Error::MissingTag("bXYZ"))?;
        let stored_white = icc.media_white_point().ok_or(Error::MissingTag("wtpt"))?;

        let mut colorants =
            Matrix3x3::from_columns(red.to_array(), green.to_array(), blue.to_array());
        let mut white = stored_white;

        if let Some(inv_chad) = icc.chromatic_adaptation().and_then(|m| m.inverse()) {
            colorants = inv_chad.multiply(&colorants);
            let is_d50 = correlated_color_temperature(stored_white)
                .is_some_and(|k| (k - 5000.0).abs() < 1.0);
            if is_d50 {
                white = Xyz::from_array(inv_chad.multiply_vec(stored_white.to_array()));
            }
        }

        let primaries = ColorPrimaries::from_colorants(&colorants, white)?;
        let curve = self.query_curve();
        let luminance = icc
            .luminance()
            .map(|lumi| Luminance::Nits(lumi.y.round().max(0.0) as u32))
            .unwrap_or(Luminance::Unspecified);

        debug!(
            "Profile query: primaries ({}), curve {}, luminance {}",
            primaries, curve, luminance
        );
        Ok(ProfileQuery {
            primaries,
            curve,
            luminance,
        })
    }

    fn query_curve(&self) -> ToneCurve {
        let icc = &self.icc;
        if let Some(cicp) = icc.cicp() {
            match TransferCharacteristicsCode(cicp.transfer_characteristics as u16) {
                TransferCharacteristicsCode::SRGB => return ToneCurve::Srgb,
                TransferCharacteristicsCode::PQ => return ToneCurve::Pq,
                TransferCharacteristicsCode::HLG => return ToneCurve::Hlg,
                _ => {}
            }
        }

        let Some(red) = icc.red_trc() else {
            return ToneCurve::Unknown;
        };
        if icc.trcs_match() {
            if let Some(gamma) = red.pure_gamma() {
                return ToneCurve::gamma(gamma);
            }
        }
        match estimate_gamma(|x| red.eval(x), f64::INFINITY) {
            Some(gamma) if gamma > 0.0 => ToneCurve::Complex {
                gamma,
                implicit_scale: 1.0,
            },
            _ => ToneCurve::Unknown,
        }
    }

    /// Same primaries and luminance with a linear curve
    pub fn create_linear(&self) -> Result<Self> {
        let query = self.query()?;
        let description = format!("{} (Linear)", self.description.as_deref().unwrap_or(""));
        Self::create(
            &query.primaries,
            ToneCurve::gamma(1.0),
            query.luminance,
            Some(&description),
        )
    }

    /// Replace the `lumi` tag; `Unspecified` removes it
    pub fn set_luminance(&mut self, luminance: Luminance) -> Result<()> {
        match luminance {
            Luminance::Unspecified => {
                self.icc.remove_tag(TagSignature::LUMINANCE);
            }
            Luminance::Nits(nits) if nits > MAX_LUMINANCE => {
                return Err(Error::Unsupported(format!(
                    "luminance {} exceeds {} nits",
                    nits, MAX_LUMINANCE
                )));
            }
            Luminance::Nits(nits) => {
                self.icc.set_tag(
                    TagSignature::LUMINANCE,
                    TagData::Xyz(XyzTagData::single(Xyz::new(0.0, nits as f64, 0.0))),
                );
            }
        }
        self.packed = OnceLock::new();
        Ok(())
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn icc(&self) -> &IccProfile {
        &self.icc
    }

    /// Linear RGB → XYZ relative to the profile's own white (Y = 1 at white).
    ///
    /// `None` when the profile is not a matrix/shaper profile.
    pub(crate) fn native_rgb_to_xyz(&self) -> Option<Matrix3x3> {
        let colorants = self.icc.colorant_matrix()?;
        Some(
            match self.icc.chromatic_adaptation().and_then(|m| m.inverse()) {
                Some(inv_chad) => inv_chad.multiply(&colorants),
                None => colorants,
            },
        )
    }
}

fn trc_tag(curve: &ToneCurve) -> TagData {
    match curve {
        ToneCurve::Srgb => TagData::ParametricCurve(ParametricCurveData {
            curve: ParametricCurve::srgb(),
        }),
        ToneCurve::Pq => TagData::Curve(CurveData::from_fn(TABLE_CURVE_SIZE, transfer::pq_decode)),
        ToneCurve::Hlg => {
            TagData::Curve(CurveData::from_fn(TABLE_CURVE_SIZE, transfer::hlg_decode))
        }
        ToneCurve::Gamma { gamma, .. } | ToneCurve::Complex { gamma, .. } => {
            TagData::ParametricCurve(ParametricCurveData {
                curve: ParametricCurve::gamma(*gamma),
            })
        }
        // Rejected by ToneCurve::validate
        ToneCurve::Unknown => TagData::Curve(CurveData::Identity),
    }
}

/// cicp tag for curves a TRC alone cannot identify
fn cicp_tag(primaries: &ColorPrimaries, curve: &ToneCurve) -> Option<CicpData> {
    let transfer = match curve {
        ToneCurve::Srgb => TransferCharacteristicsCode::SRGB,
        ToneCurve::Pq => TransferCharacteristicsCode::PQ,
        ToneCurve::Hlg => TransferCharacteristicsCode::HLG,
        _ => return None,
    };
    let code = ColorPrimariesCode::find(primaries).unwrap_or(ColorPrimariesCode::UNSPECIFIED);
    Some(CicpData {
        color_primaries: code.0 as u8,
        transfer_characteristics: transfer.0 as u8,
        matrix_coefficients: 0,
        full_range: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-4;

    fn assert_primaries(a: &ColorPrimaries, b: &ColorPrimaries) {
        assert!(a.approx_eq(b, EPS), "primaries differ:\n  {}\n  {}", a, b);
    }

    #[test]
    fn test_query_roundtrip_gamma() {
        for primaries in [
            ColorPrimaries::BT709,
            ColorPrimaries::BT2020,
            ColorPrimaries::P3,
        ] {
            for gamma in [1.0, 1.8, 2.2, 2.4, 2.8] {
                let profile = ColorProfile::create(
                    &primaries,
                    ToneCurve::gamma(gamma),
                    Luminance::Nits(300),
                    Some("test"),
                )
                .unwrap();
                let q = profile.query().unwrap();
                assert_primaries(&q.primaries, &primaries);
                assert_eq!(q.luminance, Luminance::Nits(300));
                match q.curve {
                    ToneCurve::Gamma { gamma: g, .. } => {
                        assert!((g - gamma).abs() < 1e-3, "gamma {} came back {}", gamma, g)
                    }
                    other => panic!("expected gamma, got {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_query_non_d65_white() {
        // DCI white: the white point must be un-adapted from D50
        let dci = ColorPrimaries {
            white: [0.314, 0.351],
            ..ColorPrimaries::P3
        };
        let profile =
            ColorProfile::create(&dci, ToneCurve::gamma(2.6), Luminance::Unspecified, None)
                .unwrap();
        let q = profile.query().unwrap();
        assert_primaries(&q.primaries, &dci);
        assert_eq!(q.luminance, Luminance::Unspecified);
        assert_eq!(q.luminance_nits(), 0);
    }

    #[test]
    fn test_query_named_curves() {
        for curve in [ToneCurve::Srgb, ToneCurve::Pq, ToneCurve::Hlg] {
            let profile =
                ColorProfile::create(&ColorPrimaries::BT2020, curve, Luminance::Unspecified, None)
                    .unwrap();
            let q = profile.try_clone().unwrap().query().unwrap();
            assert_eq!(q.curve, curve);
        }
    }

    #[test]
    fn test_query_complex_without_cicp() {
        let mut profile = ColorProfile::create(
            &ColorPrimaries::BT709,
            ToneCurve::Srgb,
            Luminance::Unspecified,
            None,
        )
        .unwrap();
        profile.icc.remove_tag(TagSignature::CICP);
        profile.packed = OnceLock::new();
        match profile.query().unwrap().curve {
            ToneCurve::Complex { gamma, .. } => assert!(gamma > 2.1 && gamma < 2.35),
            other => panic!("expected complex, got {:?}", other),
        }
    }

    #[test]
    fn test_divergent_channels_are_complex() {
        let mut profile = ColorProfile::create(
            &ColorPrimaries::BT709,
            ToneCurve::gamma(2.2),
            Luminance::Unspecified,
            None,
        )
        .unwrap();
        profile.icc.set_tag(
            TagSignature::BLUE_TRC,
            TagData::ParametricCurve(ParametricCurveData {
                curve: ParametricCurve::gamma(1.8),
            }),
        );
        match profile.query().unwrap().curve {
            ToneCurve::Complex { gamma, .. } => assert!((gamma - 2.2).abs() < 1e-3),
            other => panic!("expected complex, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_trc_is_unknown() {
        let mut profile = ColorProfile::create(
            &ColorPrimaries::BT709,
            ToneCurve::gamma(2.2),
            Luminance::Unspecified,
            None,
        )
        .unwrap();
        profile.icc.remove_tag(TagSignature::RED_TRC);
        assert_eq!(profile.query().unwrap().curve, ToneCurve::Unknown);
    }

    #[test]
    fn test_missing_colorant_fails() {
        let mut profile = ColorProfile::stock_srgb().unwrap();
        profile.icc.remove_tag(TagSignature::GREEN_COLORANT);
        assert!(matches!(profile.query(), Err(Error::MissingTag("gXYZ"))));
        profile.icc.remove_tag(TagSignature::MEDIA_WHITE);
        assert!(matches!(profile.query(), Err(Error::MissingTag("gXYZ"))));
    }

    #[test]
    fn test_profile_without_chad_uses_stored_white() {
        // v2 style: colorants and white stored as-is, no chad
        let mut profile = ColorProfile::stock_srgb().unwrap();
        let native = profile.native_rgb_to_xyz().unwrap();
        for (sig, col) in [
            (TagSignature::RED_COLORANT, 0),
            (TagSignature::GREEN_COLORANT, 1),
            (TagSignature::BLUE_COLORANT, 2),
        ] {
            profile.icc.set_tag(
                sig,
                TagData::Xyz(XyzTagData::single(Xyz::from_array(native.column(col)))),
            );
        }
        profile.icc.set_tag(
            TagSignature::MEDIA_WHITE,
            TagData::Xyz(XyzTagData::single(WhitePoint::D65.xyz)),
        );
        profile.icc.remove_tag(TagSignature::CHAD);
        let q = profile.query().unwrap();
        assert_primaries(&q.primaries, &ColorPrimaries::BT709);
    }

    #[test]
    fn test_degenerate_primaries_rejected() {
        let flat = ColorPrimaries {
            red: [0.3, 0.3],
            green: [0.3, 0.3],
            blue: [0.15, 0.06],
            white: [0.3127, 0.3290],
        };
        let err =
            ColorProfile::create(&flat, ToneCurve::gamma(2.2), Luminance::Unspecified, None)
                .unwrap_err();
        assert!(matches!(err, Error::DegeneratePrimaries(_)));
    }

    #[test]
    fn test_unknown_curve_rejected() {
        let err = ColorProfile::create(
            &ColorPrimaries::BT709,
            ToneCurve::Unknown,
            Luminance::Unspecified,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidCurve(_)));
    }

    #[test]
    fn test_clone_is_idempotent() {
        let original = ColorProfile::stock_srgb().unwrap();
        let once = original.try_clone().unwrap();
        let twice = once.try_clone().unwrap();
        assert!(once.matches(&twice));
        assert!(original.matches(&once));
        assert_eq!(twice.description(), Some("SRGB"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            ColorProfile::parse(b"not a profile", None),
            Err(Error::ProfileParse(_))
        ));
    }

    #[test]
    fn test_parse_reads_description_tag() {
        let profile = ColorProfile::stock_srgb().unwrap();
        let bytes = profile.pack().unwrap().to_vec();
        assert_eq!(ColorProfile::parse(&bytes, None).unwrap().description(), Some("SRGB"));
        assert_eq!(
            ColorProfile::parse(&bytes, Some("override")).unwrap().description(),
            Some("override")
        );
    }

    #[test]
    fn test_create_linear() {
        let profile = ColorProfile::stock_srgb().unwrap();
        let linear = profile.create_linear().unwrap();
        assert_eq!(linear.description(), Some("SRGB (Linear)"));
        let q = linear.query().unwrap();
        assert_eq!(q.curve, ToneCurve::gamma(1.0));
        assert_eq!(q.luminance, Luminance::Nits(300));
        assert_primaries(&q.primaries, &ColorPrimaries::BT709);
    }

    #[test]
    fn test_set_luminance_repacks() {
        let mut profile = ColorProfile::stock_srgb().unwrap();
        let before = profile.pack().unwrap().to_vec();
        profile.set_luminance(Luminance::Nits(1000)).unwrap();
        assert_ne!(profile.pack().unwrap(), before.as_slice());
        assert_eq!(profile.query().unwrap().luminance, Luminance::Nits(1000));
        profile.set_luminance(Luminance::Unspecified).unwrap();
        assert_eq!(profile.query().unwrap().luminance, Luminance::Unspecified);
        assert!(profile.set_luminance(Luminance::Nits(40000)).is_err());
    }

    #[test]
    fn test_pack_into_raw() {
        let profile = ColorProfile::stock_srgb().unwrap();
        let mut raw = RawBuffer::default();
        profile.pack_into(&mut raw).unwrap();
        assert_eq!(raw.as_slice(), profile.pack().unwrap());
        assert_eq!(&raw.as_slice()[36..40], b"acsp");
    }

    #[test]
    fn test_native_matrix_maps_white_to_y1() {
        let profile = ColorProfile::create(
            &ColorPrimaries::BT2020,
            ToneCurve::Pq,
            Luminance::Nits(10000),
            None,
        )
        .unwrap();
        let m = profile.native_rgb_to_xyz().unwrap();
        let white = m.multiply_vec([1.0, 1.0, 1.0]);
        assert!(Xyz::from_array(white).approx_eq(&WhitePoint::D65.xyz, 1e-3));
    }
}
