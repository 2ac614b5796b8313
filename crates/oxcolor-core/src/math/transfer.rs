//! Transfer functions
//!
//! Decode means encoded signal → linear light, encode is the inverse. Every
//! function here works on normalized values, so PQ is relative to 10000 nits
//! and HLG returns scene light in [0, 1] without the display OOTF.

/// sRGB decode (IEC 61966-2-1)
#[inline]
pub fn srgb_decode(encoded: f64) -> f64 {
    if encoded <= 0.04045 {
        encoded / 12.92
    } else {
        ((encoded + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB encode (IEC 61966-2-1)
#[inline]
pub fn srgb_encode(linear: f64) -> f64 {
    if linear <= 0.0031308 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// y = x^gamma
#[inline]
pub fn gamma_decode(encoded: f64, gamma: f64) -> f64 {
    if encoded <= 0.0 {
        0.0
    } else {
        encoded.powf(gamma)
    }
}

/// y = x^(1/gamma)
#[inline]
pub fn gamma_encode(linear: f64, gamma: f64) -> f64 {
    if linear <= 0.0 {
        0.0
    } else {
        linear.powf(1.0 / gamma)
    }
}

const PQ_M1: f64 = 2610.0 / 16384.0;
const PQ_M2: f64 = 2523.0 / 4096.0 * 128.0;
const PQ_C1: f64 = 3424.0 / 4096.0;
const PQ_C2: f64 = 2413.0 / 4096.0 * 32.0;
const PQ_C3: f64 = 2392.0 / 4096.0 * 32.0;

/// SMPTE ST 2084 EOTF, 1.0 = 10000 nits
#[inline]
pub fn pq_decode(encoded: f64) -> f64 {
    let e = encoded.clamp(0.0, 1.0).powf(1.0 / PQ_M2);
    let num = (e - PQ_C1).max(0.0);
    let den = PQ_C2 - PQ_C3 * e;
    (num / den).powf(1.0 / PQ_M1)
}

/// SMPTE ST 2084 inverse EOTF
#[inline]
pub fn pq_encode(linear: f64) -> f64 {
    let y = linear.clamp(0.0, 1.0).powf(PQ_M1);
    ((PQ_C1 + PQ_C2 * y) / (1.0 + PQ_C3 * y)).powf(PQ_M2)
}

const HLG_A: f64 = 0.17883277;
const HLG_B: f64 = 0.28466892;
const HLG_C: f64 = 0.55991073;

/// ARIB STD-B67 inverse OETF
#[inline]
pub fn hlg_decode(encoded: f64) -> f64 {
    let e = encoded.clamp(0.0, 1.0);
    if e <= 0.5 {
        e * e / 3.0
    } else {
        (((e - HLG_C) / HLG_A).exp() + HLG_B) / 12.0
    }
}

/// ARIB STD-B67 OETF
#[inline]
pub fn hlg_encode(linear: f64) -> f64 {
    let l = linear.clamp(0.0, 1.0);
    if l <= 1.0 / 12.0 {
        (3.0 * l).sqrt()
    } else {
        HLG_A * (12.0 * l - HLG_B).ln() + HLG_C
    }
}

/// ICC Parametric Curve Type
///
/// As defined in ICC.1:2022 Section 10.18
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParametricCurveType {
    /// Type 0: Y = X^g
    Gamma,
    /// Type 1: Y = (aX + b)^g  if X >= -b/a, else 0
    CIE122,
    /// Type 2: Y = (aX + b)^g + c  if X >= -b/a, else c
    IEC61966_3,
    /// Type 3: Y = (aX + b)^g  if X >= d, else cX (sRGB-like)
    IEC61966_2_1,
    /// Type 4: Y = (aX + b)^g + e  if X >= d, else cX + f
    Full,
}

impl ParametricCurveType {
    pub fn from_icc(function_type: u16) -> Option<Self> {
        match function_type {
            0 => Some(Self::Gamma),
            1 => Some(Self::CIE122),
            2 => Some(Self::IEC61966_3),
            3 => Some(Self::IEC61966_2_1),
            4 => Some(Self::Full),
            _ => None,
        }
    }

    pub fn to_icc(self) -> u16 {
        match self {
            Self::Gamma => 0,
            Self::CIE122 => 1,
            Self::IEC61966_3 => 2,
            Self::IEC61966_2_1 => 3,
            Self::Full => 4,
        }
    }

    /// Number of parameters stored in the tag
    pub fn param_count(&self) -> usize {
        match self {
            Self::Gamma => 1,
            Self::CIE122 => 3,
            Self::IEC61966_3 => 4,
            Self::IEC61966_2_1 => 5,
            Self::Full => 7,
        }
    }
}

/// ICC Parametric Curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParametricCurve {
    pub curve_type: ParametricCurveType,
    pub g: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl ParametricCurve {
    /// Pure power curve (type 0)
    pub fn gamma(g: f64) -> Self {
        Self {
            curve_type: ParametricCurveType::Gamma,
            g,
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// sRGB transfer function (type 3)
    pub fn srgb() -> Self {
        Self {
            curve_type: ParametricCurveType::IEC61966_2_1,
            g: 2.4,
            a: 1.0 / 1.055,
            b: 0.055 / 1.055,
            c: 1.0 / 12.92,
            d: 0.04045,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Build from the parameter list as stored in a `para` tag
    pub fn from_params(curve_type: ParametricCurveType, params: &[f64]) -> Option<Self> {
        if params.len() < curve_type.param_count() {
            return None;
        }
        let p = |i: usize, default: f64| params.get(i).copied().unwrap_or(default);
        let mut curve = Self::gamma(params[0]);
        curve.curve_type = curve_type;
        match curve_type {
            ParametricCurveType::Gamma => {}
            ParametricCurveType::CIE122 => {
                curve.a = p(1, 1.0);
                curve.b = p(2, 0.0);
            }
            ParametricCurveType::IEC61966_3 => {
                curve.a = p(1, 1.0);
                curve.b = p(2, 0.0);
                curve.c = p(3, 0.0);
            }
            ParametricCurveType::IEC61966_2_1 => {
                curve.a = p(1, 1.0);
                curve.b = p(2, 0.0);
                curve.c = p(3, 0.0);
                curve.d = p(4, 0.0);
            }
            ParametricCurveType::Full => {
                curve.a = p(1, 1.0);
                curve.b = p(2, 0.0);
                curve.c = p(3, 0.0);
                curve.d = p(4, 0.0);
                curve.e = p(5, 0.0);
                curve.f = p(6, 0.0);
            }
        }
        Some(curve)
    }

    /// Parameters in tag order, trimmed to the count the type stores
    pub fn params(&self) -> Vec<f64> {
        let all = [self.g, self.a, self.b, self.c, self.d, self.e, self.f];
        all[..self.curve_type.param_count()].to_vec()
    }

    /// Evaluate in the decode direction
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        let threshold = if self.a.abs() > 1e-10 {
            -self.b / self.a
        } else {
            0.0
        };

        match self.curve_type {
            ParametricCurveType::Gamma => x.powf(self.g),
            ParametricCurveType::CIE122 => {
                if x >= threshold {
                    (self.a * x + self.b).max(0.0).powf(self.g)
                } else {
                    0.0
                }
            }
            ParametricCurveType::IEC61966_3 => {
                if x >= threshold {
                    (self.a * x + self.b).max(0.0).powf(self.g) + self.c
                } else {
                    self.c
                }
            }
            ParametricCurveType::IEC61966_2_1 => {
                if x >= self.d {
                    (self.a * x + self.b).max(0.0).powf(self.g)
                } else {
                    self.c * x
                }
            }
            ParametricCurveType::Full => {
                if x >= self.d {
                    (self.a * x + self.b).max(0.0).powf(self.g) + self.e
                } else {
                    self.c * x + self.f
                }
            }
        }
    }

    /// Evaluate in the encode direction
    ///
    /// Types 0 and 3 invert in closed form; the others use Newton iteration.
    #[inline]
    pub fn eval_inverse(&self, y: f64) -> f64 {
        let y = y.clamp(0.0, 1.0);

        match self.curve_type {
            ParametricCurveType::Gamma => {
                if self.g.abs() > 1e-10 {
                    y.powf(1.0 / self.g)
                } else {
                    y
                }
            }
            ParametricCurveType::IEC61966_2_1 => {
                if y < self.c * self.d {
                    if self.c.abs() > 1e-10 { y / self.c } else { 0.0 }
                } else if self.a.abs() > 1e-10 && self.g.abs() > 1e-10 {
                    (y.powf(1.0 / self.g) - self.b) / self.a
                } else {
                    y
                }
            }
            _ => {
                let mut x = if self.g.abs() > 1e-10 {
                    y.powf(1.0 / self.g)
                } else {
                    y
                };
                for _ in 0..8 {
                    let fx = self.eval(x) - y;
                    if fx.abs() < 1e-12 {
                        break;
                    }
                    let h = 1e-8;
                    let dfx = (self.eval(x + h) - self.eval(x - h)) / (2.0 * h);
                    if dfx.abs() > 1e-10 {
                        x = (x - fx / dfx).clamp(0.0, 1.0);
                    }
                }
                x
            }
        }
    }
}

/// Sample a decode function into a `size`-entry table over [0, 1]
pub fn build_curve_lut(size: usize, decode: impl Fn(f64) -> f64) -> Vec<f64> {
    let last = size.saturating_sub(1).max(1) as f64;
    (0..size).map(|i| decode(i as f64 / last)).collect()
}

/// Fit a single power-law exponent to an arbitrary decode curve.
///
/// Samples where the output lies strictly inside (0, 1) and the input is above
/// 0.07 each give `ln(y) / ln(x)`; the mean is the estimate. Returns `None`
/// when no sample qualifies or the spread exceeds `max_std_dev`.
pub fn estimate_gamma(decode: impl Fn(f64) -> f64, max_std_dev: f64) -> Option<f64> {
    const SAMPLES: usize = 4096;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut n = 0usize;

    for i in 1..SAMPLES - 1 {
        let x = i as f64 / (SAMPLES - 1) as f64;
        let y = decode(x);
        if y > 0.0 && y < 1.0 && x > 0.07 {
            let g = y.ln() / x.ln();
            sum += g;
            sum_sq += g * g;
            n += 1;
        }
    }

    if n == 0 {
        return None;
    }
    let mean = sum / n as f64;
    let variance = (sum_sq / n as f64 - mean * mean).max(0.0);
    if variance.sqrt() > max_std_dev {
        return None;
    }
    Some(mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_srgb_roundtrip() {
        for i in 0..=255 {
            let encoded = i as f64 / 255.0;
            let roundtrip = srgb_encode(srgb_decode(encoded));
            assert!(
                (roundtrip - encoded).abs() < 1e-10,
                "sRGB roundtrip failed at {}",
                i
            );
        }
        let mid = srgb_decode(0.5);
        assert!(mid > 0.21 && mid < 0.22, "Mid-gray decode: {}", mid);
    }

    #[test]
    fn test_pq_reference_points() {
        assert!(pq_decode(0.0) < 1e-9);
        assert!((pq_decode(1.0) - 1.0).abs() < 1e-9);
        // 100 nits sits near code value 0.508
        let hundred = pq_encode(0.01);
        assert!((hundred - 0.5081).abs() < 1e-3, "PQ(100 nits) = {}", hundred);
        // Zero light encodes to c1^m2, just above code 0
        assert!(pq_encode(0.0) < 1e-6);
        for i in 1..=64 {
            let x = i as f64 / 64.0;
            assert!((pq_encode(pq_decode(x)) - x).abs() < 1e-9, "PQ roundtrip at {}", x);
        }
    }

    #[test]
    fn test_hlg_continuity() {
        // Both branches meet at E' = 0.5, E = 1/12
        assert!((hlg_decode(0.5) - 1.0 / 12.0).abs() < 1e-9);
        assert!((hlg_encode(1.0 / 12.0) - 0.5).abs() < 1e-9);
        assert!((hlg_decode(1.0) - 1.0).abs() < 1e-6);
        // The published constants overshoot 1.0 slightly at the top
        assert!((hlg_encode(hlg_decode(1.0)) - 1.0).abs() < 1e-4);
        for i in 0..64 {
            let x = i as f64 / 64.0;
            assert!((hlg_encode(hlg_decode(x)) - x).abs() < 1e-9, "HLG roundtrip at {}", x);
        }
    }

    #[test]
    fn test_parametric_srgb_matches_closed_form() {
        let curve = ParametricCurve::srgb();
        for i in 0..=255 {
            let x = i as f64 / 255.0;
            assert!((curve.eval(x) - srgb_decode(x)).abs() < 1e-9);
            assert!((curve.eval_inverse(curve.eval(x)) - x).abs() < 1e-8);
        }
    }

    #[test]
    fn test_parametric_type0() {
        let curve = ParametricCurve::gamma(2.2);
        assert!((curve.eval(0.5) - 0.5_f64.powf(2.2)).abs() < EPSILON);
        assert_eq!(curve.params(), vec![2.2]);
    }

    #[test]
    fn test_estimate_gamma() {
        let g = estimate_gamma(|x| x.powf(2.2), 1.0).unwrap();
        assert!((g - 2.2).abs() < 1e-9);

        // sRGB behaves like a ~2.2 power over the sampled range
        let g = estimate_gamma(srgb_decode, 1.0).unwrap();
        assert!(g > 2.1 && g < 2.35, "sRGB estimate {}", g);

        assert!(estimate_gamma(|_| 1.0, 1.0).is_none());
    }

    #[test]
    fn test_curve_lut() {
        let lut = build_curve_lut(256, srgb_decode);
        assert_eq!(lut.len(), 256);
        assert!(lut[0].abs() < EPSILON);
        assert!((lut[255] - 1.0).abs() < EPSILON);
    }
}
