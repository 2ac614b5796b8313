//! Per-channel curve application over a block of working pixels

use multiversion::multiversion;

/// Apply `f` to one channel of every quad
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn apply_channel<F>(block: &mut [[f32; 4]], channel: usize, f: F)
where
    F: Fn(f32) -> f32,
{
    assert!(channel < 3);
    for px in block.iter_mut() {
        px[channel] = f(px[channel]);
    }
}

/// Power curve on one channel; non-positive input maps to 0
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn apply_gamma_channel(block: &mut [[f32; 4]], channel: usize, gamma: f32) {
    assert!(channel < 3);
    for px in block.iter_mut() {
        let v = px[channel];
        px[channel] = if v <= 0.0 { 0.0 } else { v.powf(gamma) };
    }
}
