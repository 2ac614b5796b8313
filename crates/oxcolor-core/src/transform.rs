//! Pixel transforms
//!
//! Converts batches of pixels between (profile, encoding) endpoints. Sizes,
//! alignment and the conversion itself are all checked before the first
//! destination byte is written.

use rayon::prelude::*;
use tracing::debug;

use crate::pipeline::Pipeline;
use crate::pixel::{PixelEncoding, SampleFormat};
use crate::profile::ColorProfile;
use crate::simd::{Sample, pack, unpack};
use crate::{Error, Result};

/// Pixels per working block
const BLOCK_PIXELS: usize = 1024;

/// Transform options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformOptions {
    /// Clamp float output to [0, 1]; off keeps out-of-range (HDR) values
    pub clamp_float: bool,
    /// Worker threads for [`Transform::run_parallel`]: 0 is rayon's default,
    /// 1 runs on the calling thread
    pub jobs: usize,
}

impl TransformOptions {
    pub fn with_clamp_float(mut self, clamp: bool) -> Self {
        self.clamp_float = clamp;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }
}

/// A reusable conversion between two endpoints
///
/// Profiles are read once at construction; the transform holds no reference
/// to them afterwards and can be shared across threads.
#[derive(Debug, Clone)]
pub struct Transform {
    pipeline: Pipeline,
    src: PixelEncoding,
    dst: PixelEncoding,
    options: TransformOptions,
}

impl Transform {
    /// Build a transform. `None` on either side reformats without
    /// converting color.
    pub fn new(
        src_profile: Option<&ColorProfile>,
        src_encoding: PixelEncoding,
        dst_profile: Option<&ColorProfile>,
        dst_encoding: PixelEncoding,
        options: TransformOptions,
    ) -> Result<Self> {
        let pipeline = Pipeline::new(src_profile, src_encoding, dst_profile, dst_encoding)?;
        debug!(
            "Transform {:?} -> {:?}: {:?}",
            src_encoding, dst_encoding, pipeline
        );
        Ok(Self {
            pipeline,
            src: src_encoding,
            dst: dst_encoding,
            options,
        })
    }

    pub fn src_encoding(&self) -> PixelEncoding {
        self.src
    }

    pub fn dst_encoding(&self) -> PixelEncoding {
        self.dst
    }

    /// Convert `pixel_count` pixels on the calling thread.
    ///
    /// Buffers hold native-endian samples and may be longer than needed.
    pub fn run(&self, pixel_count: usize, src: &[u8], dst: &mut [u8]) -> Result<()> {
        let (src, dst) = self.checked_buffers(pixel_count, src, dst)?;
        self.write_back(dst, |out| self.run_unchecked(src, out))
    }

    /// Convert `pixel_count` pixels, splitting the batch over rayon workers.
    ///
    /// Every worker owns a disjoint range of the destination.
    pub fn run_parallel(&self, pixel_count: usize, src: &[u8], dst: &mut [u8]) -> Result<()> {
        if self.options.jobs == 1 {
            return self.run(pixel_count, src, dst);
        }
        let (src, dst) = self.checked_buffers(pixel_count, src, dst)?;
        if self.options.jobs == 0 {
            return self.write_back(dst, |out| self.run_chunks(src, out));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.jobs)
            .thread_name(|idx| format!("oxcolor-transform-{}", idx))
            .build()
            .map_err(|e| Error::Transform(format!("cannot start worker pool: {}", e)))?;
        pool.install(|| self.write_back(dst, |out| self.run_chunks(src, out)))
    }

    /// Run `convert` straight into `dst`, or through a staging buffer when
    /// the pipeline can fail after some blocks are done
    fn write_back<F>(&self, dst: &mut [u8], convert: F) -> Result<()>
    where
        F: FnOnce(&mut [u8]) -> Result<()>,
    {
        if self.pipeline.is_external() {
            staged(dst, convert)
        } else {
            convert(dst)
        }
    }

    fn run_chunks(&self, src: &[u8], dst: &mut [u8]) -> Result<()> {
        let src_chunk = BLOCK_PIXELS * self.src.bytes_per_pixel();
        let dst_chunk = BLOCK_PIXELS * self.dst.bytes_per_pixel();
        src.par_chunks(src_chunk)
            .zip(dst.par_chunks_mut(dst_chunk))
            .try_for_each(|(s, d)| self.run_unchecked(s, d))
    }

    /// Trim both buffers to the batch, failing before any write
    fn checked_buffers<'s, 'd>(
        &self,
        pixel_count: usize,
        src: &'s [u8],
        dst: &'d mut [u8],
    ) -> Result<(&'s [u8], &'d mut [u8])> {
        let src_len = byte_len(pixel_count, self.src)?;
        let dst_len = byte_len(pixel_count, self.dst)?;
        if src.len() < src_len {
            return Err(Error::BufferSize {
                expected: src_len,
                actual: src.len(),
            });
        }
        if dst.len() < dst_len {
            return Err(Error::BufferSize {
                expected: dst_len,
                actual: dst.len(),
            });
        }
        let src = &src[..src_len];
        let dst = &mut dst[..dst_len];
        check_alignment(src, self.src.sample_format())?;
        check_alignment(dst, self.dst.sample_format())?;
        Ok((src, dst))
    }

    fn run_unchecked(&self, src: &[u8], dst: &mut [u8]) -> Result<()> {
        match self.src.sample_format() {
            SampleFormat::U8 => self.dispatch_dst(src, dst),
            SampleFormat::U16 => self.dispatch_dst(cast::<u16>(src)?, dst),
            SampleFormat::F32 => self.dispatch_dst(cast::<f32>(src)?, dst),
        }
    }

    fn dispatch_dst<S: Sample>(&self, src: &[S], dst: &mut [u8]) -> Result<()> {
        match self.dst.sample_format() {
            SampleFormat::U8 => self.process(src, dst),
            SampleFormat::U16 => self.process(src, cast_mut::<u16>(dst)?),
            SampleFormat::F32 => self.process(src, cast_mut::<f32>(dst)?),
        }
    }

    fn process<S: Sample, D: Sample>(&self, src: &[S], dst: &mut [D]) -> Result<()> {
        let src_channels = self.src.channels();
        let dst_channels = self.dst.channels();
        let pixels = src.len() / src_channels;
        let mut work = vec![[0.0f32; 4]; pixels.min(BLOCK_PIXELS)];
        let mut scratch = Vec::new();

        for (s, d) in src
            .chunks(BLOCK_PIXELS * src_channels)
            .zip(dst.chunks_mut(BLOCK_PIXELS * dst_channels))
        {
            let block = &mut work[..s.len() / src_channels];
            unpack(s, src_channels, block);
            self.pipeline.run(block, &mut scratch)?;
            pack(block, dst_channels, d, self.options.clamp_float);
        }
        Ok(())
    }
}

/// One-shot conversion with default options on the calling thread
pub fn transform(
    src_profile: Option<&ColorProfile>,
    src_encoding: PixelEncoding,
    dst_profile: Option<&ColorProfile>,
    dst_encoding: PixelEncoding,
    pixel_count: usize,
    src: &[u8],
    dst: &mut [u8],
) -> Result<()> {
    Transform::new(
        src_profile,
        src_encoding,
        dst_profile,
        dst_encoding,
        TransformOptions::default(),
    )?
    .run(pixel_count, src, dst)
}

/// Fill a staging buffer and copy it to `dst` only once `convert` succeeds.
///
/// Staging is backed by `f32` so any sample type can be viewed in it.
fn staged<F>(dst: &mut [u8], convert: F) -> Result<()>
where
    F: FnOnce(&mut [u8]) -> Result<()>,
{
    let mut backing = vec![0.0f32; dst.len().div_ceil(4)];
    let staging = &mut bytemuck::cast_slice_mut::<f32, u8>(&mut backing)[..dst.len()];
    convert(staging)?;
    dst.copy_from_slice(staging);
    Ok(())
}

fn byte_len(pixel_count: usize, encoding: PixelEncoding) -> Result<usize> {
    pixel_count
        .checked_mul(encoding.bytes_per_pixel())
        .ok_or(Error::Overflow("pixel buffer size"))
}

fn check_alignment(bytes: &[u8], format: SampleFormat) -> Result<()> {
    let align = format.bytes_per_sample();
    if (bytes.as_ptr() as usize) % align != 0 {
        return Err(Error::Unsupported(format!(
            "buffer is not aligned for {:?} samples",
            format
        )));
    }
    Ok(())
}

fn cast<S: Sample>(bytes: &[u8]) -> Result<&[S]> {
    bytemuck::try_cast_slice(bytes)
        .map_err(|e| Error::Unsupported(format!("cannot view samples: {:?}", e)))
}

fn cast_mut<S: Sample>(bytes: &mut [u8]) -> Result<&mut [S]> {
    bytemuck::try_cast_slice_mut(bytes)
        .map_err(|e| Error::Unsupported(format!("cannot view samples: {:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColorPrimaries, Luminance, ToneCurve};

    fn srgb() -> ColorProfile {
        ColorProfile::create(
            &ColorPrimaries::BT709,
            ToneCurve::Srgb,
            Luminance::Unspecified,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_staged_failure_leaves_destination_untouched() {
        let mut dst = [7u8; 12];
        let err = staged(&mut dst, |out| {
            out[..6].fill(0xAA);
            Err(Error::Transform("block 1 failed".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, Error::Transform(_)));
        assert_eq!(dst, [7u8; 12]);

        staged(&mut dst, |out| {
            cast_mut::<u16>(out)?.fill(0x0101);
            Ok(())
        })
        .unwrap();
        assert_eq!(dst, [1u8; 12]);
    }

    #[test]
    fn test_alpha_synthesis() {
        let src = [255u8, 0, 0];
        let mut dst = [0u8; 4];
        transform(None, PixelEncoding::Rgb8, None, PixelEncoding::Rgba8, 1, &src, &mut dst)
            .unwrap();
        assert_eq!(dst, [255, 0, 0, 255]);
    }

    #[test]
    fn test_alpha_dropped_then_restored() {
        let src = [255u8, 0, 0, 17];
        let mut rgb = [0u8; 3];
        let mut back = [0u8; 4];
        transform(None, PixelEncoding::Rgba8, None, PixelEncoding::Rgb8, 1, &src, &mut rgb)
            .unwrap();
        transform(None, PixelEncoding::Rgb8, None, PixelEncoding::Rgba8, 1, &rgb, &mut back)
            .unwrap();
        assert_eq!(back, [255, 0, 0, 255]);
    }

    #[test]
    fn test_depth_rescale() {
        let src: Vec<u16> = vec![65535, 0, 0];
        let mut dst = [0u8; 3];
        transform(
            None,
            PixelEncoding::Rgb16,
            None,
            PixelEncoding::Rgb8,
            1,
            bytemuck::cast_slice(&src),
            &mut dst,
        )
        .unwrap();
        assert_eq!(dst, [255, 0, 0]);

        let mut wide = vec![0u16; 4];
        transform(
            None,
            PixelEncoding::Rgb8,
            None,
            PixelEncoding::Rgba16,
            1,
            &dst,
            bytemuck::cast_slice_mut(&mut wide),
        )
        .unwrap();
        assert_eq!(wide, [65535, 0, 0, 65535]);
    }

    #[test]
    fn test_same_profile_is_lossless() {
        let p = srgb();
        let src: Vec<u8> = (0..=255).collect::<Vec<u8>>().repeat(3);
        let mut dst = vec![0u8; src.len()];
        transform(Some(&p), PixelEncoding::Rgb8, Some(&p), PixelEncoding::Rgb8, 256, &src, &mut dst)
            .unwrap();
        assert_eq!(src, dst);
    }

    #[test]
    fn test_short_buffers_fail_without_writing() {
        let t = Transform::new(
            None,
            PixelEncoding::Rgb8,
            None,
            PixelEncoding::Rgb8,
            TransformOptions::default(),
        )
        .unwrap();
        let mut dst = [7u8; 6];
        let err = t.run(2, &[1, 2, 3], &mut dst).unwrap_err();
        assert!(matches!(err, Error::BufferSize { expected: 6, actual: 3 }));
        let err = t.run(3, &[0; 9], &mut dst).unwrap_err();
        assert!(matches!(err, Error::BufferSize { expected: 9, actual: 6 }));
        assert_eq!(dst, [7; 6]);
        assert!(matches!(
            t.run(usize::MAX, &[], &mut dst),
            Err(Error::Overflow(_))
        ));
    }

    #[test]
    fn test_xyz_without_matrix_profile_is_passthrough() {
        let src = [0.25f32, 0.5, 0.75];
        let mut dst = [0.0f32; 3];
        transform(
            None,
            PixelEncoding::XyzF32,
            None,
            PixelEncoding::RgbF32,
            1,
            bytemuck::cast_slice(&src),
            bytemuck::cast_slice_mut(&mut dst),
        )
        .unwrap();
        assert_eq!(src, dst);
    }

    #[test]
    fn test_rgb_to_xyz_white() {
        let p = srgb();
        let src = [255u8, 255, 255];
        let mut xyz = [0.0f32; 3];
        transform(
            Some(&p),
            PixelEncoding::Rgb8,
            Some(&p),
            PixelEncoding::XyzF32,
            1,
            &src,
            bytemuck::cast_slice_mut(&mut xyz),
        )
        .unwrap();
        assert!((xyz[0] - 0.9505).abs() < 1e-3);
        assert!((xyz[1] - 1.0).abs() < 1e-3);
        assert!((xyz[2] - 1.0891).abs() < 1e-3);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let src_profile = srgb();
        let dst_profile = ColorProfile::create(
            &ColorPrimaries::BT2020,
            ToneCurve::Pq,
            Luminance::Nits(10000),
            None,
        )
        .unwrap();
        let pixels = 5000;
        let src: Vec<u8> = (0..pixels * 4).map(|i| (i * 7 % 256) as u8).collect();
        let mut serial = vec![0u16; pixels * 4];
        let mut parallel = vec![0u16; pixels * 4];

        for (jobs, out) in [(1, &mut serial), (3, &mut parallel)] {
            Transform::new(
                Some(&src_profile),
                PixelEncoding::Rgba8,
                Some(&dst_profile),
                PixelEncoding::Rgba16,
                TransformOptions::default().with_jobs(jobs),
            )
            .unwrap()
            .run_parallel(pixels, &src, bytemuck::cast_slice_mut(out))
            .unwrap();
        }
        assert_eq!(serial, parallel);
        // Alpha carried through and rescaled
        assert_eq!(parallel[3], 21 * 257);
    }
}
