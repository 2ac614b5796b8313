//! Tone curve stages
//!
//! A [`TrcStage`] holds one curve per channel and converts a block of working
//! pixels between encoded signal and linear light.

use crate::icc::{CurveData, IccProfile, Trc};
use crate::math::ParametricCurve;
use crate::math::transfer;
use crate::nclx::TransferCharacteristicsCode;
use crate::simd::{apply_channel, apply_gamma_channel};

/// A single channel's curve
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelCurve {
    Linear,
    Gamma(f32),
    Srgb,
    Pq,
    Hlg,
    Parametric(ParametricCurve),
    Table(CurveData),
}

impl ChannelCurve {
    pub fn from_trc(trc: Trc<'_>) -> Self {
        match trc {
            Trc::Curve(CurveData::Identity) => ChannelCurve::Linear,
            Trc::Curve(CurveData::Gamma(g)) => ChannelCurve::Gamma(*g as f32),
            Trc::Curve(table) => ChannelCurve::Table(table.clone()),
            Trc::Parametric(p) => ChannelCurve::Parametric(*p),
        }
    }

    /// Encoded → linear
    #[inline]
    pub fn decode(&self, x: f32) -> f32 {
        let x = x as f64;
        let y = match self {
            ChannelCurve::Linear => x,
            ChannelCurve::Gamma(g) => transfer::gamma_decode(x, *g as f64),
            ChannelCurve::Srgb => transfer::srgb_decode(x),
            ChannelCurve::Pq => transfer::pq_decode(x),
            ChannelCurve::Hlg => transfer::hlg_decode(x),
            ChannelCurve::Parametric(p) => p.eval(x),
            ChannelCurve::Table(t) => t.eval(x),
        };
        y as f32
    }

    /// Linear → encoded
    #[inline]
    pub fn encode(&self, y: f32) -> f32 {
        let y = y as f64;
        let x = match self {
            ChannelCurve::Linear => y,
            ChannelCurve::Gamma(g) => transfer::gamma_encode(y, *g as f64),
            ChannelCurve::Srgb => transfer::srgb_encode(y),
            ChannelCurve::Pq => transfer::pq_encode(y),
            ChannelCurve::Hlg => transfer::hlg_encode(y),
            ChannelCurve::Parametric(p) => p.eval_inverse(y),
            ChannelCurve::Table(t) => t.eval_inverse(y),
        };
        x as f32
    }
}

/// Red, green and blue curves of one profile
#[derive(Debug, Clone, PartialEq)]
pub struct TrcStage {
    channels: [ChannelCurve; 3],
}

impl TrcStage {
    pub fn new(channels: [ChannelCurve; 3]) -> Self {
        Self { channels }
    }

    /// Curves of a matrix/shaper profile.
    ///
    /// A `cicp` tag naming sRGB, PQ or HLG overrides the sampled TRC tags so
    /// those curves are evaluated exactly.
    pub fn from_profile(icc: &IccProfile) -> Option<Self> {
        let exact = icc.cicp().and_then(|cicp| {
            match TransferCharacteristicsCode(u16::from(cicp.transfer_characteristics)) {
                TransferCharacteristicsCode::SRGB => Some(ChannelCurve::Srgb),
                TransferCharacteristicsCode::PQ => Some(ChannelCurve::Pq),
                TransferCharacteristicsCode::HLG => Some(ChannelCurve::Hlg),
                _ => None,
            }
        });
        if let Some(curve) = exact {
            return Some(Self::new([curve.clone(), curve.clone(), curve]));
        }
        Some(Self::new([
            ChannelCurve::from_trc(icc.red_trc()?),
            ChannelCurve::from_trc(icc.green_trc()?),
            ChannelCurve::from_trc(icc.blue_trc()?),
        ]))
    }

    pub fn decode_block(&self, block: &mut [[f32; 4]]) {
        for (channel, curve) in self.channels.iter().enumerate() {
            match curve {
                ChannelCurve::Linear => {}
                ChannelCurve::Gamma(g) => apply_gamma_channel(block, channel, *g),
                other => apply_channel(block, channel, |v| other.decode(v)),
            }
        }
    }

    pub fn encode_block(&self, block: &mut [[f32; 4]]) {
        for (channel, curve) in self.channels.iter().enumerate() {
            match curve {
                ChannelCurve::Linear => {}
                ChannelCurve::Gamma(g) => apply_gamma_channel(block, channel, 1.0 / *g),
                other => apply_channel(block, channel, |v| other.encode(v)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(curve: ChannelCurve) {
        for i in 0..=20 {
            let x = i as f32 / 20.0;
            let back = curve.encode(curve.decode(x));
            assert!((back - x).abs() < 2e-3, "{:?}: {} -> {}", curve, x, back);
        }
    }

    #[test]
    fn test_curves_invert() {
        roundtrip(ChannelCurve::Gamma(2.2));
        roundtrip(ChannelCurve::Srgb);
        roundtrip(ChannelCurve::Pq);
        roundtrip(ChannelCurve::Hlg);
        roundtrip(ChannelCurve::Parametric(ParametricCurve::srgb()));
        roundtrip(ChannelCurve::Table(CurveData::from_fn(4096, |x| x.powf(1.8))));
    }

    #[test]
    fn test_stage_block() {
        let stage = TrcStage::new([
            ChannelCurve::Gamma(2.0),
            ChannelCurve::Linear,
            ChannelCurve::Srgb,
        ]);
        let mut block = [[0.5, 0.5, 1.0, 0.7]];
        stage.decode_block(&mut block);
        assert!((block[0][0] - 0.25).abs() < 1e-6);
        assert_eq!(block[0][1], 0.5);
        assert!((block[0][2] - 1.0).abs() < 1e-6);
        assert_eq!(block[0][3], 0.7);
        stage.encode_block(&mut block);
        assert!((block[0][0] - 0.5).abs() < 1e-6);
    }
}
