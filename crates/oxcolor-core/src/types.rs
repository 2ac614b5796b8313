//! Public model types: primaries, tone curves and peak luminance
//!
//! These describe a color space independently of any binary encoding. A
//! [`crate::ColorProfile`] is built from them and can be queried back into them.

use std::fmt;

use crate::color::{WhitePoint, Xyz};
use crate::math::Matrix3x3;
use crate::{Error, Result};

/// Chromaticity coordinates (CIE 1931 xy) of the three primaries and white
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorPrimaries {
    pub red: [f64; 2],
    pub green: [f64; 2],
    pub blue: [f64; 2],
    pub white: [f64; 2],
}

impl ColorPrimaries {
    pub const BT709: Self = Self {
        red: [0.64, 0.33],
        green: [0.30, 0.60],
        blue: [0.15, 0.06],
        white: [0.3127, 0.3290],
    };

    pub const BT2020: Self = Self {
        red: [0.708, 0.292],
        green: [0.170, 0.797],
        blue: [0.131, 0.046],
        white: [0.3127, 0.3290],
    };

    /// Display P3 (SMPTE EG 432-1, D65 white)
    pub const P3: Self = Self {
        red: [0.680, 0.320],
        green: [0.265, 0.690],
        blue: [0.150, 0.060],
        white: [0.3127, 0.3290],
    };

    /// Stock primaries by name: "bt709" (or "srgb"), "bt2020", "p3"
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bt709" | "srgb" => Some(Self::BT709),
            "bt2020" => Some(Self::BT2020),
            "p3" => Some(Self::P3),
            _ => None,
        }
    }

    /// `[rx, ry, gx, gy, bx, by, wx, wy]`
    pub fn to_array(&self) -> [f64; 8] {
        [
            self.red[0],
            self.red[1],
            self.green[0],
            self.green[1],
            self.blue[0],
            self.blue[1],
            self.white[0],
            self.white[1],
        ]
    }

    pub fn from_array(v: [f64; 8]) -> Self {
        Self {
            red: [v[0], v[1]],
            green: [v[2], v[3]],
            blue: [v[4], v[5]],
            white: [v[6], v[7]],
        }
    }

    /// Every coordinate within `epsilon` of `other`'s
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array())
            .all(|(a, b)| (a - b).abs() < epsilon)
    }

    /// Check range and that the primaries span a space.
    pub fn validate(&self) -> Result<()> {
        if let Some(v) = self
            .to_array()
            .into_iter()
            .find(|v| !v.is_finite() || !(0.0..=1.0).contains(v))
        {
            return Err(Error::DegeneratePrimaries(format!(
                "coordinate {} outside [0, 1]",
                v
            )));
        }
        if self.white[1] <= 0.0 {
            return Err(Error::DegeneratePrimaries(
                "white point has y = 0".to_string(),
            ));
        }
        self.chromaticity_matrix().inverse().ok_or_else(|| {
            Error::DegeneratePrimaries("red, green and blue are collinear".to_string())
        })?;
        Ok(())
    }

    /// Columns (x, y, 1 - x - y) for red, green, blue
    fn chromaticity_matrix(&self) -> Matrix3x3 {
        let col = |p: [f64; 2]| [p[0], p[1], 1.0 - p[0] - p[1]];
        Matrix3x3::from_columns(col(self.red), col(self.green), col(self.blue))
    }

    pub fn white_point(&self) -> WhitePoint {
        WhitePoint::from_chromaticity(self.white[0], self.white[1])
    }

    /// Linear RGB → XYZ under this white, normalized so white has Y = 1
    pub fn rgb_to_xyz(&self) -> Result<Matrix3x3> {
        self.validate()?;
        let chroma = self.chromaticity_matrix();
        let inv = chroma.inverse().ok_or_else(|| {
            Error::DegeneratePrimaries("red, green and blue are collinear".to_string())
        })?;
        let s = inv.multiply_vec(self.white_point().xyz.to_array());
        Ok(chroma.multiply(&Matrix3x3::diagonal(s[0], s[1], s[2])))
    }

    /// Recover primaries from colorant columns and a white, all in one
    /// illuminant's XYZ
    pub fn from_colorants(colorants: &Matrix3x3, white: Xyz) -> Result<Self> {
        let xy = |v: [f64; 3], name: &str| {
            Xyz::from_array(v)
                .chromaticity()
                .map(|(x, y)| [x, y])
                .ok_or_else(|| Error::DegeneratePrimaries(format!("{} colorant is black", name)))
        };
        Ok(Self {
            red: xy(colorants.column(0), "red")?,
            green: xy(colorants.column(1), "green")?,
            blue: xy(colorants.column(2), "blue")?,
            white: xy(white.to_array(), "white")?,
        })
    }
}

impl fmt::Display for ColorPrimaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "r:{:.3},{:.3} g:{:.3},{:.3} b:{:.3},{:.3} w:{:.4},{:.4}",
            self.red[0],
            self.red[1],
            self.green[0],
            self.green[1],
            self.blue[0],
            self.blue[1],
            self.white[0],
            self.white[1]
        )
    }
}

/// Tone reproduction curve
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToneCurve {
    /// Pure power law
    Gamma { gamma: f64, implicit_scale: f64 },
    /// IEC 61966-2-1
    Srgb,
    /// SMPTE ST 2084
    Pq,
    /// ARIB STD-B67
    Hlg,
    /// Some other curve, approximated by `gamma`
    Complex { gamma: f64, implicit_scale: f64 },
    /// No curve information
    Unknown,
}

impl ToneCurve {
    /// Power curve with unit implicit scale
    pub fn gamma(gamma: f64) -> Self {
        Self::Gamma {
            gamma,
            implicit_scale: 1.0,
        }
    }

    /// Exponent carried by `Gamma` and `Complex`
    pub fn exponent(&self) -> Option<f64> {
        match self {
            Self::Gamma { gamma, .. } | Self::Complex { gamma, .. } => Some(*gamma),
            _ => None,
        }
    }

    /// Same variant, ignoring the carried values
    pub fn same_kind(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Reject curves that cannot be written into a profile
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Unknown => Err(Error::InvalidCurve(
                "an unknown curve cannot be encoded".to_string(),
            )),
            Self::Gamma { gamma, .. } | Self::Complex { gamma, .. }
                if !(gamma.is_finite() && *gamma > 0.0) =>
            {
                Err(Error::InvalidCurve(format!(
                    "exponent must be positive, got {}",
                    gamma
                )))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ToneCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gamma { gamma, .. } => write!(f, "Gamma {:.2}", gamma),
            Self::Srgb => f.write_str("sRGB"),
            Self::Pq => f.write_str("PQ"),
            Self::Hlg => f.write_str("HLG"),
            Self::Complex { gamma, .. } => write!(f, "Complex ~{:.2}", gamma),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Peak luminance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Luminance {
    /// Not stated; distinct from `Nits(0)`
    #[default]
    Unspecified,
    Nits(u32),
}

impl Luminance {
    pub fn nits(&self) -> Option<u32> {
        match self {
            Self::Unspecified => None,
            Self::Nits(n) => Some(*n),
        }
    }
}

impl fmt::Display for Luminance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => f.write_str("unspecified"),
            Self::Nits(n) => write!(f, "{} nits", n),
        }
    }
}
