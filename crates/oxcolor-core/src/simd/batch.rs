//! Sample unpacking and packing for the f32 working buffer
//!
//! Pixels move through a transform as `[r, g, b, a]` (or `[x, y, z, a]`)
//! f32 quads. Integer samples are normalized by their maximum on the way in
//! and rounded on the way out.

use multiversion::multiversion;

/// A storable channel value
pub trait Sample: bytemuck::Pod + Send + Sync {
    /// Value of full intensity (and full opacity)
    const FULL_SCALE: f32;

    fn to_unit(self) -> f32;

    fn from_unit(v: f32, clamp: bool) -> Self;
}

impl Sample for u8 {
    const FULL_SCALE: f32 = 255.0;

    #[inline(always)]
    fn to_unit(self) -> f32 {
        self as f32 / Self::FULL_SCALE
    }

    #[inline(always)]
    fn from_unit(v: f32, _clamp: bool) -> Self {
        (v.clamp(0.0, 1.0) * Self::FULL_SCALE + 0.5) as u8
    }
}

impl Sample for u16 {
    const FULL_SCALE: f32 = 65535.0;

    #[inline(always)]
    fn to_unit(self) -> f32 {
        self as f32 / Self::FULL_SCALE
    }

    #[inline(always)]
    fn from_unit(v: f32, _clamp: bool) -> Self {
        (v.clamp(0.0, 1.0) * Self::FULL_SCALE + 0.5) as u16
    }
}

impl Sample for f32 {
    const FULL_SCALE: f32 = 1.0;

    #[inline(always)]
    fn to_unit(self) -> f32 {
        self
    }

    #[inline(always)]
    fn from_unit(v: f32, clamp: bool) -> Self {
        if clamp { v.clamp(0.0, 1.0) } else { v }
    }
}

/// Expand `channels`-wide samples into working quads.
///
/// Three-channel input gets an opaque alpha.
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn unpack<S: Sample>(src: &[S], channels: usize, dst: &mut [[f32; 4]]) {
    assert!(channels == 3 || channels == 4);
    assert!(src.len() / channels >= dst.len());

    if channels == 4 {
        for (px, out) in src.chunks_exact(4).zip(dst.iter_mut()) {
            *out = [px[0].to_unit(), px[1].to_unit(), px[2].to_unit(), px[3].to_unit()];
        }
    } else {
        for (px, out) in src.chunks_exact(3).zip(dst.iter_mut()) {
            *out = [px[0].to_unit(), px[1].to_unit(), px[2].to_unit(), 1.0];
        }
    }
}

/// Store working quads as `channels`-wide samples; alpha is dropped for three.
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn pack<S: Sample>(src: &[[f32; 4]], channels: usize, dst: &mut [S], clamp: bool) {
    assert!(channels == 3 || channels == 4);
    assert!(dst.len() / channels >= src.len());

    if channels == 4 {
        for (inp, px) in src.iter().zip(dst.chunks_exact_mut(4)) {
            px[0] = S::from_unit(inp[0], clamp);
            px[1] = S::from_unit(inp[1], clamp);
            px[2] = S::from_unit(inp[2], clamp);
            px[3] = S::from_unit(inp[3], clamp);
        }
    } else {
        for (inp, px) in src.iter().zip(dst.chunks_exact_mut(3)) {
            px[0] = S::from_unit(inp[0], clamp);
            px[1] = S::from_unit(inp[1], clamp);
            px[2] = S::from_unit(inp[2], clamp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_synthesizes_alpha() {
        let src = [255u8, 0, 0, 0, 255, 0];
        let mut work = [[0.0f32; 4]; 2];
        unpack(&src, 3, &mut work);
        assert_eq!(work[0], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(work[1], [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_sample_full_scale() {
        assert_eq!(<u8 as Sample>::FULL_SCALE, 255.0);
        assert_eq!(<u16 as Sample>::FULL_SCALE, 65535.0);
        assert_eq!(255u8.to_unit(), 1.0);
        assert_eq!(65535u16.to_unit(), 1.0);
        assert_eq!(u8::from_unit(0.5, false), 128);
        assert_eq!(u16::from_unit(1.0, false), u16::MAX);
        assert_eq!(u16::from_unit(-3.0, false), 0);
    }

    #[test]
    fn test_u8_roundtrip() {
        let src: Vec<u8> = (0..=255).collect::<Vec<u8>>().repeat(4);
        let mut work = vec![[0.0f32; 4]; 256];
        let mut dst = vec![0u8; 1024];
        unpack(&src, 4, &mut work);
        pack(&work, 4, &mut dst, false);
        assert_eq!(src, dst);
    }

    #[test]
    fn test_depth_rescale_endpoints() {
        let src = [65535u16, 0, 32896];
        let mut work = [[0.0f32; 4]; 1];
        let mut dst = [0u8; 3];
        unpack(&src, 3, &mut work);
        pack(&work, 3, &mut dst, false);
        assert_eq!(dst, [255, 0, 128]);

        let mut wide = [0u16; 4];
        unpack(&dst, 3, &mut work);
        pack(&work, 4, &mut wide, false);
        assert_eq!(wide, [65535, 0, 32896, 65535]);
    }

    #[test]
    fn test_float_clamp_is_optional() {
        let work = [[1.5f32, -0.25, 0.5, 1.0]];
        let mut dst = [0.0f32; 3];
        pack(&work, 3, &mut dst, false);
        assert_eq!(dst, [1.5, -0.25, 0.5]);
        pack(&work, 3, &mut dst, true);
        assert_eq!(dst, [1.0, 0.0, 0.5]);

        let mut bytes = [0u8; 3];
        pack(&work, 3, &mut bytes, false);
        assert_eq!(bytes, [255, 0, 128]);
    }
}
