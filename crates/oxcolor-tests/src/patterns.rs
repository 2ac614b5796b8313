//! Deterministic pixel patterns

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Pattern families
#[derive(Debug, Clone, Copy)]
pub enum Pattern {
    /// Neutral ramp from black to white
    GrayRamp,
    /// Every `n`-th code value on each axis of the RGB cube
    Cube(u8),
    /// Primaries, secondaries, black and white
    Corners,
    /// Seeded random samples
    Random(u64),
}

impl Pattern {
    /// Unit-range RGB triples
    pub fn unit_rgb(self, count: usize) -> Vec<[f32; 3]> {
        match self {
            Pattern::GrayRamp => (0..count)
                .map(|i| {
                    let v = i as f32 / (count.max(2) - 1) as f32;
                    [v, v, v]
                })
                .collect(),
            Pattern::Cube(step) => {
                let step = usize::from(step.max(1));
                let mut codes: Vec<usize> = (0..=255).step_by(step).collect();
                if codes.last() != Some(&255) {
                    codes.push(255);
                }
                let axis: Vec<f32> = codes.into_iter().map(|v| v as f32 / 255.0).collect();
                let mut out = Vec::with_capacity(axis.len().pow(3));
                for &r in &axis {
                    for &g in &axis {
                        for &b in &axis {
                            out.push([r, g, b]);
                        }
                    }
                }
                out.truncate(count);
                out
            }
            Pattern::Corners => [
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 1.0, 0.0],
                [1.0, 0.0, 1.0],
                [0.0, 1.0, 1.0],
                [1.0, 1.0, 1.0],
            ]
            .into_iter()
            .cycle()
            .take(count)
            .collect(),
            Pattern::Random(seed) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                (0..count)
                    .map(|_| [rng.r#gen(), rng.r#gen(), rng.r#gen()])
                    .collect()
            }
        }
    }

    pub fn rgb8(self, count: usize) -> Vec<u8> {
        self.unit_rgb(count)
            .into_iter()
            .flatten()
            .map(|v| (v * 255.0 + 0.5) as u8)
            .collect()
    }

    pub fn rgb16(self, count: usize) -> Vec<u16> {
        self.unit_rgb(count)
            .into_iter()
            .flatten()
            .map(|v| (v * 65535.0 + 0.5) as u16)
            .collect()
    }

    pub fn rgb_f32(self, count: usize) -> Vec<f32> {
        self.unit_rgb(count).into_iter().flatten().collect()
    }

    /// RGB8 with a varying alpha channel appended
    pub fn rgba8(self, count: usize) -> Vec<u8> {
        self.unit_rgb(count)
            .into_iter()
            .enumerate()
            .flat_map(|(i, [r, g, b])| {
                let q = |v: f32| (v * 255.0 + 0.5) as u8;
                [q(r), q(g), q(b), (i * 37 % 256) as u8]
            })
            .collect()
    }
}
