//! Reference white points

use crate::color::Xyz;

/// A named white point with Y normalized to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhitePoint {
    pub name: &'static str,
    pub xyz: Xyz,
}

impl WhitePoint {
    pub const fn new(name: &'static str, x: f64, y: f64, z: f64) -> Self {
        Self {
            name,
            xyz: Xyz::new(x, y, z),
        }
    }

    /// ICC profile connection space illuminant, as encoded in the header
    pub const D50: Self = Self::new("D50", 0.9642, 1.0, 0.8249);

    /// D65 from its xy chromaticity (0.3127, 0.3290)
    pub const D65: Self = Self::new("D65", 0.3127 / 0.3290, 1.0, (1.0 - 0.3127 - 0.3290) / 0.3290);

    /// Anonymous white point from xy chromaticity
    pub fn from_chromaticity(x: f64, y: f64) -> Self {
        Self {
            name: "custom",
            xyz: Xyz::from_xyy(x, y, 1.0),
        }
    }

    pub fn chromaticity(&self) -> (f64, f64) {
        self.xyz.chromaticity().unwrap_or((0.0, 0.0))
    }
}
