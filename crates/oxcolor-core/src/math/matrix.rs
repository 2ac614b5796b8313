//! 3x3 matrix type for colorant and adaptation math
//!
//! All operations use f64; matrices are only narrowed to f32 once a pixel
//! pipeline is assembled.

use std::ops::{Index, IndexMut, Mul};

/// Relative singularity threshold for [`Matrix3x3::inverse`]
const SINGULAR_EPSILON: f64 = 1e-10;

/// A 3x3 matrix, row-major: m[row][col]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3x3 {
    pub m: [[f64; 3]; 3],
}

impl Matrix3x3 {
    #[inline]
    pub const fn new(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self::diagonal(1.0, 1.0, 1.0)
    }

    #[inline]
    pub const fn diagonal(d0: f64, d1: f64, d2: f64) -> Self {
        Self {
            m: [[d0, 0.0, 0.0], [0.0, d1, 0.0], [0.0, 0.0, d2]],
        }
    }

    /// Build a matrix whose columns are the given vectors
    #[inline]
    pub const fn from_columns(c0: [f64; 3], c1: [f64; 3], c2: [f64; 3]) -> Self {
        Self {
            m: [
                [c0[0], c1[0], c2[0]],
                [c0[1], c1[1], c2[1]],
                [c0[2], c1[2], c2[2]],
            ],
        }
    }

    #[inline]
    pub fn column(&self, col: usize) -> [f64; 3] {
        [self.m[0][col], self.m[1][col], self.m[2][col]]
    }

    /// M × v
    #[inline]
    pub fn multiply_vec(&self, v: [f64; 3]) -> [f64; 3] {
        [
            self.m[0][0] * v[0] + self.m[0][1] * v[1] + self.m[0][2] * v[2],
            self.m[1][0] * v[0] + self.m[1][1] * v[1] + self.m[1][2] * v[2],
            self.m[2][0] * v[0] + self.m[2][1] * v[1] + self.m[2][2] * v[2],
        ]
    }

    /// self × other
    #[inline]
    pub fn multiply(&self, other: &Self) -> Self {
        let mut result = Self::diagonal(0.0, 0.0, 0.0);
        for i in 0..3 {
            for j in 0..3 {
                result.m[i][j] = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j];
            }
        }
        result
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Guarded inverse.
    ///
    /// The determinant is compared against the cube of the largest element, so
    /// the test does not depend on the overall scale of the matrix. Returns
    /// `None` for near-singular or non-finite input.
    pub fn inverse(&self) -> Option<Self> {
        let scale = self
            .m
            .iter()
            .flatten()
            .fold(0.0f64, |acc, v| acc.max(v.abs()));
        if !scale.is_finite() || scale == 0.0 {
            return None;
        }

        let det = self.determinant();
        if !det.is_finite() || det.abs() <= SINGULAR_EPSILON * scale * scale * scale {
            return None;
        }

        let inv_det = 1.0 / det;
        let m = &self.m;

        Some(Self {
            m: [
                [
                    (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det,
                    (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
                    (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
                ],
                [
                    (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det,
                    (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
                    (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
                ],
                [
                    (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det,
                    (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
                    (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
                ],
            ],
        })
    }

    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(other.m.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.approx_eq(&Self::identity(), epsilon)
    }

    /// Narrow to f32 for the pixel loop
    pub fn to_f32(&self) -> [[f32; 3]; 3] {
        self.m.map(|row| row.map(|v| v as f32))
    }
}

impl Default for Matrix3x3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Index<usize> for Matrix3x3 {
    type Output = [f64; 3];

    fn index(&self, row: usize) -> &Self::Output {
        &self.m[row]
    }
}

impl IndexMut<usize> for Matrix3x3 {
    fn index_mut(&mut self, row: usize) -> &mut Self::Output {
        &mut self.m[row]
    }
}

impl Mul for Matrix3x3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply(&rhs)
    }
}

impl Mul<[f64; 3]> for Matrix3x3 {
    type Output = [f64; 3];

    fn mul(self, rhs: [f64; 3]) -> Self::Output {
        self.multiply_vec(rhs)
    }
}
