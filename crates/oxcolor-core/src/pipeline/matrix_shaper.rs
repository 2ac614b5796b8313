//! Native matrix/shaper conversion
//!
//! Source signal → TRC decode → matrix → TRC encode → destination signal.
//! The single matrix folds both profiles' colorant matrices together through
//! the D50 connection space. XYZ endpoints skip their TRC stage and use the
//! profile's un-adapted colorimetry, so XYZ is relative to the profile's own
//! white.

use crate::math::Matrix3x3;
use crate::profile::ColorProfile;
use crate::simd::matrix_multiply_block;
use crate::{Error, Result};

use super::stages::TrcStage;

#[derive(Debug, Clone)]
pub struct MatrixShaper {
    input: Option<TrcStage>,
    /// `None` when the combined matrix is the identity
    matrix: Option<[[f32; 3]; 3]>,
    output: Option<TrcStage>,
}

impl MatrixShaper {
    pub fn new(
        src: &ColorProfile,
        src_is_xyz: bool,
        dst: &ColorProfile,
        dst_is_xyz: bool,
    ) -> Result<Self> {
        let src_to_pcs = to_pcs(src, src_is_xyz)?;
        let pcs_to_dst = to_pcs(dst, dst_is_xyz)?.inverse().ok_or_else(|| {
            Error::DegeneratePrimaries("destination colorant matrix is singular".to_string())
        })?;
        let combined = pcs_to_dst.multiply(&src_to_pcs);

        let input = if src_is_xyz {
            None
        } else {
            Some(shaper(src)?)
        };
        let output = if dst_is_xyz {
            None
        } else {
            Some(shaper(dst)?)
        };

        Ok(Self {
            input,
            matrix: (!combined.is_identity(1e-9)).then(|| combined.to_f32()),
            output,
        })
    }

    pub fn run(&self, block: &mut [[f32; 4]]) {
        if let Some(trc) = &self.input {
            trc.decode_block(block);
        }
        if let Some(m) = &self.matrix {
            matrix_multiply_block(m, block);
        }
        if let Some(trc) = &self.output {
            trc.encode_block(block);
        }
    }
}

fn shaper(profile: &ColorProfile) -> Result<TrcStage> {
    TrcStage::from_profile(profile.icc())
        .ok_or_else(|| Error::Unsupported("profile has no usable RGB tone curves".to_string()))
}

/// Endpoint values → D50 PCS XYZ
fn to_pcs(profile: &ColorProfile, is_xyz: bool) -> Result<Matrix3x3> {
    let colorants = profile
        .icc()
        .colorant_matrix()
        .ok_or_else(|| Error::Unsupported("profile has no colorant matrix".to_string()))?;
    if !is_xyz {
        return Ok(colorants);
    }
    let native_to_rgb = profile
        .native_rgb_to_xyz()
        .and_then(|m| m.inverse())
        .ok_or_else(|| Error::DegeneratePrimaries("colorant matrix is singular".to_string()))?;
    Ok(colorants.multiply(&native_to_rgb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColorPrimaries, Luminance, ToneCurve};

    fn profile(primaries: ColorPrimaries, curve: ToneCurve) -> ColorProfile {
        ColorProfile::create(&primaries, curve, Luminance::Unspecified, None).unwrap()
    }

    #[test]
    fn test_same_profile_is_identity_matrix() {
        let p = profile(ColorPrimaries::BT709, ToneCurve::Srgb);
        let shaper = MatrixShaper::new(&p, false, &p, false).unwrap();
        assert!(shaper.matrix.is_none());
        let mut block = [[0.2, 0.4, 0.6, 1.0]];
        shaper.run(&mut block);
        for (got, want) in block[0].iter().zip([0.2, 0.4, 0.6, 1.0]) {
            assert!((got - want).abs() < 1e-4);
        }
    }

    #[test]
    fn test_white_to_native_xyz() {
        let p = profile(ColorPrimaries::BT2020, ToneCurve::gamma(2.4));
        let shaper = MatrixShaper::new(&p, false, &p, true).unwrap();
        let mut block = [[1.0, 1.0, 1.0, 1.0]];
        shaper.run(&mut block);
        // D65 with Y = 1
        assert!((block[0][0] - 0.9505).abs() < 1e-3);
        assert!((block[0][1] - 1.0).abs() < 1e-3);
        assert!((block[0][2] - 1.0891).abs() < 1e-3);
    }

    #[test]
    fn test_gamut_mapping_direction() {
        let srgb = profile(ColorPrimaries::BT709, ToneCurve::Srgb);
        let p3 = profile(ColorPrimaries::P3, ToneCurve::Srgb);
        let shaper = MatrixShaper::new(&srgb, false, &p3, false).unwrap();
        let mut block = [[1.0, 0.0, 0.0, 1.0]];
        shaper.run(&mut block);
        // sRGB red sits inside P3
        assert!(block[0][0] < 1.0 && block[0][0] > 0.85);
        assert!(block[0][1] > 0.1);
        assert!(block[0][2] > 0.0);
    }
}
