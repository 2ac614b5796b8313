//! 3x3 matrix over a block of working pixels

use multiversion::multiversion;

/// Rounding bound of a three-term f32 dot product, with headroom for inputs
/// that were themselves stored as f32
const DOT_NOISE: f32 = 16.0 * f32::EPSILON;

#[inline(always)]
fn dot(m: [f32; 3], v: [f32; 3]) -> f32 {
    let x = m[0] * v[0] + m[1] * v[1] + m[2] * v[2];
    let magnitude = (m[0] * v[0]).abs() + (m[1] * v[1]).abs() + (m[2] * v[2]).abs();
    let bound = DOT_NOISE * magnitude;
    if x.abs() <= bound { 0.0 } else { x }
}

/// `rgb = M * rgb` for every quad; the fourth lane is untouched.
///
/// A result within rounding error of zero is stored as exactly zero, so
/// steep encodings near black (PQ) do not amplify cancellation residue.
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn matrix_multiply_block(matrix: &[[f32; 3]; 3], block: &mut [[f32; 4]]) {
    let [row0, row1, row2] = *matrix;

    for px in block.iter_mut() {
        let v = [px[0], px[1], px[2]];

        px[0] = dot(row0, v);
        px[1] = dot(row1, v);
        px[2] = dot(row2, v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_keeps_alpha() {
        let identity = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let mut block = [[0.5, 0.3, 0.7, 0.25]];
        matrix_multiply_block(&identity, &mut block);
        assert_eq!(block[0], [0.5, 0.3, 0.7, 0.25]);
    }

    #[test]
    fn test_cancellation_residue_is_zero() {
        use crate::types::ColorPrimaries;

        for primaries in [ColorPrimaries::BT709, ColorPrimaries::BT2020] {
            let forward = primaries.rgb_to_xyz().unwrap();
            let inverse = forward.inverse().unwrap();
            let mut block = [
                [0.0, 0.5, 1.0, 1.0],
                [0.0, 0.0, 0.2, 1.0],
                [1e-9, 1e-9, 1e-9, 1.0],
            ];
            matrix_multiply_block(&forward.to_f32(), &mut block);
            matrix_multiply_block(&inverse.to_f32(), &mut block);
            assert_eq!(block[0][0], 0.0, "{:?}", block[0]);
            assert_eq!(block[1][0], 0.0, "{:?}", block[1]);
            assert_eq!(block[1][1], 0.0, "{:?}", block[1]);
            assert!((block[0][2] - 1.0).abs() < 1e-5);
            // Dark but uniform values are signal, not residue
            assert!((block[2][0] - 1e-9).abs() < 1e-12, "{:?}", block[2]);
        }
    }

    #[test]
    fn test_bt709_white() {
        let rgb_to_xyz = [
            [0.4124564, 0.3575761, 0.1804375],
            [0.2126729, 0.7151522, 0.0721750],
            [0.0193339, 0.1191920, 0.9503041],
        ];
        let mut block = [[1.0, 1.0, 1.0, 1.0]];
        matrix_multiply_block(&rgb_to_xyz, &mut block);
        assert!((block[0][0] - 0.9505).abs() < 1e-3);
        assert!((block[0][1] - 1.0).abs() < 1e-3);
        assert!((block[0][2] - 1.089).abs() < 1e-3);
    }
}
