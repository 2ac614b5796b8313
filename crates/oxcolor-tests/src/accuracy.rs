//! Difference metrics between our output and a reference engine
//!
//! Channel differences are the gate for parity tests. CIEDE2000 is reported
//! alongside for sRGB-encoded 8-bit output, where it tracks what a viewer
//! would notice.

/// Per-channel absolute differences
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelDiff {
    pub max: f64,
    pub mean: f64,
    /// Samples that differ at all
    pub mismatched: usize,
    pub count: usize,
}

impl ChannelDiff {
    pub fn between<T: Copy + Into<f64>>(ours: &[T], theirs: &[T]) -> Self {
        assert_eq!(ours.len(), theirs.len(), "buffers differ in length");
        let mut diff = ChannelDiff {
            count: ours.len(),
            ..ChannelDiff::default()
        };
        let mut sum = 0.0;
        for (&a, &b) in ours.iter().zip(theirs) {
            let d = (a.into() - b.into()).abs();
            if d > 0.0 {
                diff.mismatched += 1;
            }
            diff.max = diff.max.max(d);
            sum += d;
        }
        if diff.count > 0 {
            diff.mean = sum / diff.count as f64;
        }
        diff
    }

    pub fn within(&self, tolerance: f64) -> bool {
        self.max <= tolerance
    }
}

/// CIEDE2000 summary
#[derive(Debug, Clone, Copy)]
pub struct DeltaEStats {
    pub mean: f64,
    pub max: f64,
    pub p95: f64,
    pub count: usize,
}

impl DeltaEStats {
    /// Below the just-noticeable difference everywhere
    pub fn is_imperceptible(&self) -> bool {
        self.max < 1.0
    }
}

/// CIEDE2000 with unit weighting factors
pub fn delta_e_2000(lab1: [f64; 3], lab2: [f64; 3]) -> f64 {
    const POW25_7: f64 = 6_103_515_625.0;
    let [l1, a1, b1] = lab1;
    let [l2, a2, b2] = lab2;

    let c_bar = ((a1 * a1 + b1 * b1).sqrt() + (a2 * a2 + b2 * b2).sqrt()) / 2.0;
    let g = 0.5 * (1.0 - (c_bar.powi(7) / (c_bar.powi(7) + POW25_7)).sqrt());
    let (a1p, a2p) = (a1 * (1.0 + g), a2 * (1.0 + g));
    let (c1p, c2p) = ((a1p * a1p + b1 * b1).sqrt(), (a2p * a2p + b2 * b2).sqrt());

    let hue = |b: f64, ap: f64| {
        if b == 0.0 && ap == 0.0 {
            0.0
        } else {
            b.atan2(ap).to_degrees().rem_euclid(360.0)
        }
    };
    let (h1p, h2p) = (hue(b1, a1p), hue(b2, a2p));
    let chroma_zero = c1p * c2p == 0.0;

    let dh = if chroma_zero {
        0.0
    } else if (h2p - h1p).abs() <= 180.0 {
        h2p - h1p
    } else if h2p - h1p > 180.0 {
        h2p - h1p - 360.0
    } else {
        h2p - h1p + 360.0
    };
    let d_l = l2 - l1;
    let d_c = c2p - c1p;
    let d_h = 2.0 * (c1p * c2p).sqrt() * (dh.to_radians() / 2.0).sin();

    let l_bar = (l1 + l2) / 2.0;
    let c_bar_p = (c1p + c2p) / 2.0;
    let h_bar = if chroma_zero {
        h1p + h2p
    } else if (h1p - h2p).abs() <= 180.0 {
        (h1p + h2p) / 2.0
    } else if h1p + h2p < 360.0 {
        (h1p + h2p + 360.0) / 2.0
    } else {
        (h1p + h2p - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (h_bar - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_bar).to_radians().cos()
        + 0.32 * (3.0 * h_bar + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_bar - 63.0).to_radians().cos();
    let l50 = (l_bar - 50.0).powi(2);
    let s_l = 1.0 + 0.015 * l50 / (20.0 + l50).sqrt();
    let s_c = 1.0 + 0.045 * c_bar_p;
    let s_h = 1.0 + 0.015 * c_bar_p * t;
    let theta = 30.0 * (-((h_bar - 275.0) / 25.0).powi(2)).exp();
    let r_c = 2.0 * (c_bar_p.powi(7) / (c_bar_p.powi(7) + POW25_7)).sqrt();
    let r_t = -r_c * (2.0 * theta).to_radians().sin();

    let (tl, tc, th) = (d_l / s_l, d_c / s_c, d_h / s_h);
    (tl * tl + tc * tc + th * th + r_t * tc * th).sqrt()
}

/// XYZ to CIELAB against `white`
pub fn xyz_to_lab(xyz: [f64; 3], white: [f64; 3]) -> [f64; 3] {
    let f = |t: f64| {
        const EPS: f64 = 216.0 / 24389.0;
        const KAPPA: f64 = 24389.0 / 27.0;
        if t > EPS {
            t.cbrt()
        } else {
            (KAPPA * t + 16.0) / 116.0
        }
    };
    let fx = f(xyz[0] / white[0]);
    let fy = f(xyz[1] / white[1]);
    let fz = f(xyz[2] / white[2]);
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

fn srgb8_to_lab(rgb: &[u8]) -> [f64; 3] {
    const D65: [f64; 3] = [0.95047, 1.0, 1.08883];
    let lin = |v: u8| {
        let v = f64::from(v) / 255.0;
        if v <= 0.04045 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };
    let (r, g, b) = (lin(rgb[0]), lin(rgb[1]), lin(rgb[2]));
    let xyz = [
        0.4124564 * r + 0.3575761 * g + 0.1804375 * b,
        0.2126729 * r + 0.7151522 * g + 0.0721750 * b,
        0.0193339 * r + 0.1191920 * g + 0.9503041 * b,
    ];
    xyz_to_lab(xyz, D65)
}

/// CIEDE2000 over two sRGB-encoded RGB8 buffers
pub fn compare_rgb8_lab(ours: &[u8], theirs: &[u8]) -> DeltaEStats {
    assert_eq!(ours.len(), theirs.len());
    let mut des: Vec<f64> = ours
        .chunks_exact(3)
        .zip(theirs.chunks_exact(3))
        .map(|(a, b)| delta_e_2000(srgb8_to_lab(a), srgb8_to_lab(b)))
        .collect();
    des.sort_by(f64::total_cmp);

    let count = des.len();
    let mean = if count == 0 {
        0.0
    } else {
        des.iter().sum::<f64>() / count as f64
    };
    DeltaEStats {
        mean,
        max: des.last().copied().unwrap_or(0.0),
        p95: des.get(count * 95 / 100).copied().unwrap_or(0.0),
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_e_identity() {
        let lab = [50.0, 25.0, -25.0];
        assert!(delta_e_2000(lab, lab) < 1e-9);
    }

    #[test]
    fn test_delta_e_reference_pair() {
        // Sharma, Wu, Dalal test data, pair 1
        let de = delta_e_2000([50.0, 2.6772, -79.7751], [50.0, 0.0, -82.7485]);
        assert!((de - 2.0425).abs() < 1e-4, "deltaE = {}", de);
    }

    #[test]
    fn test_channel_diff() {
        let d = ChannelDiff::between(&[10u8, 20, 30], &[10u8, 22, 29]);
        assert_eq!(d.max, 2.0);
        assert_eq!(d.mismatched, 2);
        assert!(d.within(2.0));
        assert!(!d.within(1.0));
    }

    #[test]
    fn test_white_is_lab_100() {
        let lab = srgb8_to_lab(&[255, 255, 255]);
        assert!((lab[0] - 100.0).abs() < 0.01);
        assert!(lab[1].abs() < 0.05 && lab[2].abs() < 0.05);
    }
}
