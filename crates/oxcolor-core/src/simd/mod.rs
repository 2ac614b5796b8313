//! SIMD-dispatched block kernels
//!
//! The `multiversion` crate picks the best instruction set at runtime:
//! - x86-64: SSE4.1, AVX2
//! - ARM64: NEON
//!
//! The scalar fallback is always available.

mod batch;
mod gamma;
mod matrix;

pub use batch::{Sample, pack, unpack};
pub use gamma::{apply_channel, apply_gamma_channel};
pub use matrix::matrix_multiply_block;

/// Name of the instruction set the kernels will dispatch to
pub fn active_features() -> &'static str {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            "AVX2"
        } else if is_x86_feature_detected!("sse4.1") {
            "SSE4.1"
        } else {
            "scalar"
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        "NEON"
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        "scalar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_features() {
        assert!(!active_features().is_empty());
    }
}
