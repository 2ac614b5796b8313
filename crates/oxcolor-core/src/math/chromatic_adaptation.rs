//! Chromatic adaptation
//!
//! Bradford is the only method used: ICC v4 `chad` tags are expected to hold a
//! Bradford matrix, and profiles built here write one.
//!
//! References:
//! - ICC.1:2022 Annex E
//! - Lindbloom: http://www.brucelindbloom.com/index.html?Eqn_ChromAdapt.html

use crate::color::Xyz;
use crate::math::Matrix3x3;

/// Bradford matrix: XYZ → LMS (cone response)
const BRADFORD_XYZ_TO_LMS: Matrix3x3 = Matrix3x3::new([
    [0.8951000, 0.2664000, -0.1614000],
    [-0.7502000, 1.7135000, 0.0367000],
    [0.0389000, -0.0685000, 1.0296000],
]);

/// Bradford matrix: LMS → XYZ
const BRADFORD_LMS_TO_XYZ: Matrix3x3 = Matrix3x3::new([
    [0.9869929, -0.1470543, 0.1599627],
    [0.4323053, 0.5183603, 0.0492912],
    [-0.0085287, 0.0400428, 0.9684867],
]);

/// Bradford adaptation from `src_white` to `dst_white`.
///
/// The result maps XYZ measured under the source white to XYZ under the
/// destination white: `XYZ_dst = M × XYZ_src`. Returns `None` when the source
/// white has a zero cone response.
pub fn bradford_matrix(src_white: Xyz, dst_white: Xyz) -> Option<Matrix3x3> {
    let src_lms = BRADFORD_XYZ_TO_LMS.multiply_vec(src_white.to_array());
    let dst_lms = BRADFORD_XYZ_TO_LMS.multiply_vec(dst_white.to_array());

    if src_lms.iter().any(|v| v.abs() < 1e-10 || !v.is_finite()) {
        return None;
    }

    let scale = Matrix3x3::diagonal(
        dst_lms[0] / src_lms[0],
        dst_lms[1] / src_lms[1],
        dst_lms[2] / src_lms[2],
    );

    // M = M_A^-1 × Scale × M_A
    Some(BRADFORD_LMS_TO_XYZ.multiply(&scale.multiply(&BRADFORD_XYZ_TO_LMS)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::WhitePoint;

    #[test]
    fn test_same_white_is_identity() {
        let m = bradford_matrix(WhitePoint::D65.xyz, WhitePoint::D65.xyz).unwrap();
        assert!(m.is_identity(1e-6));
    }

    #[test]
    fn test_maps_white_to_white() {
        let m = bradford_matrix(WhitePoint::D65.xyz, WhitePoint::D50.xyz).unwrap();
        let out = m.multiply_vec(WhitePoint::D65.xyz.to_array());
        let d50 = WhitePoint::D50.xyz.to_array();
        for i in 0..3 {
            assert!((out[i] - d50[i]).abs() < 1e-5, "channel {}: {}", i, out[i]);
        }
    }

    #[test]
    fn test_known_d65_to_d50() {
        // Lindbloom's Bradford D65→D50, first row
        let m = bradford_matrix(WhitePoint::D65.xyz, WhitePoint::D50.xyz).unwrap();
        assert!((m[0][0] - 1.0478).abs() < 1e-3);
        assert!((m[0][1] - 0.0229).abs() < 1e-3);
        assert!((m[0][2] + 0.0501).abs() < 1e-3);
    }

    #[test]
    fn test_rejects_black_white() {
        assert!(bradford_matrix(Xyz::new(0.0, 0.0, 0.0), WhitePoint::D50.xyz).is_none());
    }
}
