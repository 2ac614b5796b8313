//! CIE XYZ tristimulus values

use std::ops::{Add, Mul, Sub};

/// CIE 1931 XYZ color coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Xyz {
    pub x: f64,
    /// Luminance
    pub y: f64,
    pub z: f64,
}

impl Xyz {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
            z: arr[2],
        }
    }

    #[inline]
    pub const fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Chromaticity (x, y); `None` for a zero-sum value
    #[inline]
    pub fn chromaticity(&self) -> Option<(f64, f64)> {
        let sum = self.x + self.y + self.z;
        if sum.abs() > 1e-12 && sum.is_finite() {
            Some((self.x / sum, self.y / sum))
        } else {
            None
        }
    }

    /// XYZ from xyY; a zero y yields black
    #[inline]
    pub fn from_xyy(x: f64, y: f64, big_y: f64) -> Self {
        if y > 0.0 {
            Self {
                x: (x * big_y) / y,
                y: big_y,
                z: ((1.0 - x - y) * big_y) / y,
            }
        } else {
            Self::new(0.0, 0.0, 0.0)
        }
    }

    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

impl Add for Xyz {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Xyz {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Xyz {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xyy_roundtrip() {
        let xyz = Xyz::new(0.4124, 0.2126, 0.0193);
        let (x, y) = xyz.chromaticity().unwrap();
        let back = Xyz::from_xyy(x, y, xyz.y);
        assert!(xyz.approx_eq(&back, 1e-12));
    }

    #[test]
    fn test_black_has_no_chromaticity() {
        assert!(Xyz::default().chromaticity().is_none());
        assert_eq!(Xyz::from_xyy(0.3, 0.0, 1.0), Xyz::default());
    }

    #[test]
    fn test_ops() {
        let a = Xyz::new(1.0, 2.0, 3.0);
        let b = Xyz::new(0.5, 0.5, 0.5);
        assert_eq!(a + b, Xyz::new(1.5, 2.5, 3.5));
        assert_eq!(a - b, Xyz::new(0.5, 1.5, 2.5));
        assert_eq!(a * 2.0, Xyz::new(2.0, 4.0, 6.0));
    }
}
