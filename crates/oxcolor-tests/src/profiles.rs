//! Named test profiles

use oxcolor_core::{ColorPrimaries, ColorProfile, Luminance, ToneCurve};

/// Profiles every cross-check runs over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestProfile {
    Srgb,
    Bt709Gamma22,
    Bt709Gamma28,
    DisplayP3,
    Bt2020Pq,
    Bt2020Hlg,
    Bt2020Linear,
    /// The stock 2.4 / 300 nits profile
    Stock,
}

impl TestProfile {
    pub const ALL: [TestProfile; 8] = [
        TestProfile::Srgb,
        TestProfile::Bt709Gamma22,
        TestProfile::Bt709Gamma28,
        TestProfile::DisplayP3,
        TestProfile::Bt2020Pq,
        TestProfile::Bt2020Hlg,
        TestProfile::Bt2020Linear,
        TestProfile::Stock,
    ];

    pub fn primaries(self) -> ColorPrimaries {
        match self {
            TestProfile::DisplayP3 => ColorPrimaries::P3,
            TestProfile::Bt2020Pq | TestProfile::Bt2020Hlg | TestProfile::Bt2020Linear => {
                ColorPrimaries::BT2020
            }
            _ => ColorPrimaries::BT709,
        }
    }

    pub fn curve(self) -> ToneCurve {
        match self {
            TestProfile::Srgb | TestProfile::DisplayP3 => ToneCurve::Srgb,
            TestProfile::Bt709Gamma22 => ToneCurve::gamma(2.2),
            TestProfile::Bt709Gamma28 => ToneCurve::gamma(2.8),
            TestProfile::Bt2020Pq => ToneCurve::Pq,
            TestProfile::Bt2020Hlg => ToneCurve::Hlg,
            TestProfile::Bt2020Linear => ToneCurve::gamma(1.0),
            TestProfile::Stock => ToneCurve::gamma(2.4),
        }
    }

    pub fn luminance(self) -> Luminance {
        match self {
            TestProfile::Bt2020Pq => Luminance::Nits(10000),
            TestProfile::Stock => Luminance::Nits(300),
            _ => Luminance::Unspecified,
        }
    }

    /// Curves sampled from tables in the packed bytes
    pub fn is_tabulated(self) -> bool {
        matches!(self, TestProfile::Bt2020Pq | TestProfile::Bt2020Hlg)
    }

    pub fn build(self) -> ColorProfile {
        ColorProfile::create(
            &self.primaries(),
            self.curve(),
            self.luminance(),
            Some(&format!("{:?}", self)),
        )
        .unwrap_or_else(|e| panic!("cannot build {:?}: {}", self, e))
    }

    pub fn packed(self) -> Vec<u8> {
        self.build()
            .pack()
            .unwrap_or_else(|e| panic!("cannot pack {:?}: {}", self, e))
            .to_vec()
    }
}

/// An sRGB-like profile whose only device-to-PCS data is a lut16 table.
///
/// It carries colorants but no TRC tags, so neither oxcolor nor moxcms sees
/// a matrix/shaper profile and conversions from it take the LUT path. The
/// input tables linearize sRGB and a 2-point grid holds the colorant matrix,
/// which trilinear interpolation reproduces exactly.
pub fn lut_rgb_icc() -> Vec<u8> {
    use moxcms::{LutDataType, LutStore, LutType, LutWarehouse, Matrix3d};

    let mut profile = moxcms::ColorProfile::new_srgb();
    profile.red_trc = None;
    profile.green_trc = None;
    profile.blue_trc = None;
    profile.cicp = None;

    let curve: Vec<u16> = (0..256)
        .map(|i| {
            let v = i as f64 / 255.0;
            let linear = if v <= 0.04045 {
                v / 12.92
            } else {
                ((v + 0.055) / 1.055).powf(2.4)
            };
            (linear * 65535.0).round() as u16
        })
        .collect();
    let input_table = curve.repeat(3);

    let colorants = [
        profile.red_colorant,
        profile.green_colorant,
        profile.blue_colorant,
    ];
    let mut clut = Vec::with_capacity(8 * 3);
    for corner in 0..8usize {
        // Red varies slowest
        let on = [corner & 4 != 0, corner & 2 != 0, corner & 1 != 0];
        let mut xyz = [0.0f64; 3];
        for (lit, c) in on.iter().zip(colorants.iter()) {
            if *lit {
                xyz[0] += c.x;
                xyz[1] += c.y;
                xyz[2] += c.z;
            }
        }
        // lut16 XYZ: 0x8000 is 1.0
        clut.extend(xyz.iter().map(|v| (v * 32768.0).round().min(65535.0) as u16));
    }

    let lut = LutWarehouse::Lut(LutDataType {
        num_input_channels: 3,
        num_output_channels: 3,
        num_clut_grid_points: 2,
        matrix: Matrix3d::IDENTITY,
        num_input_table_entries: 256,
        num_output_table_entries: 2,
        input_table: LutStore::Store16(input_table),
        clut_table: LutStore::Store16(clut),
        output_table: LutStore::Store16([0u16, 65535].repeat(3)),
        lut_type: LutType::Lut16,
    });
    profile.lut_a_to_b_perceptual = Some(lut.clone());
    profile.lut_a_to_b_colorimetric = Some(lut);

    profile
        .encode()
        .unwrap_or_else(|e| panic!("cannot encode LUT profile: {:?}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_profiles_build() {
        for p in TestProfile::ALL {
            let q = p.build().query().unwrap();
            assert!(q.primaries.approx_eq(&p.primaries(), 1e-4), "{:?}", p);
            assert_eq!(q.luminance, p.luminance(), "{:?}", p);
        }
    }
}
