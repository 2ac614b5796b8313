//! Pixel encodings and the image buffer

use std::sync::Arc;

use crate::container::ReadAttributes;
use crate::profile::ColorProfile;
use crate::transform::{Transform, TransformOptions};
use crate::{Error, Result};

/// Storage type of one channel value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleFormat {
    U8,
    U16,
    F32,
}

impl SampleFormat {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::U16 => 2,
            SampleFormat::F32 => 4,
        }
    }
}

/// Interleaved pixel layout accepted by the transform engine.
///
/// Multi-byte samples are native-endian. Float RGB is nominally [0, 1];
/// `XyzF32` holds XYZ relative to the profile white (Y = 1 at white).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelEncoding {
    Rgb8,
    Rgba8,
    Rgb16,
    Rgba16,
    RgbF32,
    RgbaF32,
    XyzF32,
}

impl PixelEncoding {
    /// RGB(A) encoding for a bit depth: 8, 9..=16 or 32 (float)
    pub fn for_depth(depth: u32, alpha: bool) -> Result<Self> {
        Ok(match (depth, alpha) {
            (8, false) => PixelEncoding::Rgb8,
            (8, true) => PixelEncoding::Rgba8,
            (9..=16, false) => PixelEncoding::Rgb16,
            (9..=16, true) => PixelEncoding::Rgba16,
            (32, false) => PixelEncoding::RgbF32,
            (32, true) => PixelEncoding::RgbaF32,
            _ => {
                return Err(Error::InvalidDimensions(format!(
                    "unsupported bit depth {}",
                    depth
                )));
            }
        })
    }

    pub fn channels(self) -> usize {
        if self.has_alpha() { 4 } else { 3 }
    }

    pub fn has_alpha(self) -> bool {
        matches!(
            self,
            PixelEncoding::Rgba8 | PixelEncoding::Rgba16 | PixelEncoding::RgbaF32
        )
    }

    pub fn is_xyz(self) -> bool {
        self == PixelEncoding::XyzF32
    }

    pub fn sample_format(self) -> SampleFormat {
        match self {
            PixelEncoding::Rgb8 | PixelEncoding::Rgba8 => SampleFormat::U8,
            PixelEncoding::Rgb16 | PixelEncoding::Rgba16 => SampleFormat::U16,
            PixelEncoding::RgbF32 | PixelEncoding::RgbaF32 | PixelEncoding::XyzF32 => {
                SampleFormat::F32
            }
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        self.channels() * self.sample_format().bytes_per_sample()
    }
}

/// Typed sample storage
#[derive(Debug, Clone, PartialEq)]
pub enum PixelStorage {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
}

impl PixelStorage {
    fn zeroed(format: SampleFormat, len: usize) -> Self {
        match format {
            SampleFormat::U8 => PixelStorage::U8(vec![0; len]),
            SampleFormat::U16 => PixelStorage::U16(vec![0; len]),
            SampleFormat::F32 => PixelStorage::F32(vec![0.0; len]),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PixelStorage::U8(v) => v.as_slice(),
            PixelStorage::U16(v) => bytemuck::cast_slice(v),
            PixelStorage::F32(v) => bytemuck::cast_slice(v),
        }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            PixelStorage::U8(v) => v.as_mut_slice(),
            PixelStorage::U16(v) => bytemuck::cast_slice_mut(v),
            PixelStorage::F32(v) => bytemuck::cast_slice_mut(v),
        }
    }
}

/// A decoded image: pixels plus the one profile describing them.
///
/// Storage always matches the declared depth: 8 bits in `u8`, 9 to 16 bits in
/// `u16` scaled to the full 16-bit range, 32 in `f32`. Changing encoding
/// always goes through a [`Transform`].
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    depth: u32,
    encoding: PixelEncoding,
    storage: PixelStorage,
    profile: Arc<ColorProfile>,
    attributes: ReadAttributes,
}

impl PixelBuffer {
    /// Zero-filled image
    pub fn new(
        width: u32,
        height: u32,
        depth: u32,
        alpha: bool,
        profile: Arc<ColorProfile>,
    ) -> Result<Self> {
        let encoding = PixelEncoding::for_depth(depth, alpha)?;
        let len = sample_count(width, height, encoding)?;
        Ok(Self {
            width,
            height,
            depth,
            encoding,
            storage: PixelStorage::zeroed(encoding.sample_format(), len),
            profile,
            attributes: ReadAttributes::default(),
        })
    }

    /// Wrap existing samples; their type and length must fit `depth`
    pub fn from_storage(
        width: u32,
        height: u32,
        depth: u32,
        alpha: bool,
        storage: PixelStorage,
        profile: Arc<ColorProfile>,
    ) -> Result<Self> {
        let mut image = Self::new(0, 0, depth, alpha, profile)?;
        let expected = sample_count(width, height, image.encoding)?;
        let (format, actual) = match &storage {
            PixelStorage::U8(v) => (SampleFormat::U8, v.len()),
            PixelStorage::U16(v) => (SampleFormat::U16, v.len()),
            PixelStorage::F32(v) => (SampleFormat::F32, v.len()),
        };
        if format != image.encoding.sample_format() {
            return Err(Error::InvalidDimensions(format!(
                "{:?} samples cannot hold depth {}",
                format, depth
            )));
        }
        if actual != expected {
            return Err(Error::BufferSize { expected, actual });
        }
        image.width = width;
        image.height = height;
        image.storage = storage;
        Ok(image)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn encoding(&self) -> PixelEncoding {
        self.encoding
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn storage(&self) -> &PixelStorage {
        &self.storage
    }

    /// Sample bytes in native endianness. The length and sample type stay
    /// fixed by the buffer's encoding.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.storage.as_bytes_mut()
    }

    /// Samples of an 8-bit buffer
    pub fn samples_u8_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.storage {
            PixelStorage::U8(v) => Some(v),
            _ => None,
        }
    }

    /// Samples of a 9 to 16-bit buffer
    pub fn samples_u16_mut(&mut self) -> Option<&mut [u16]> {
        match &mut self.storage {
            PixelStorage::U16(v) => Some(v),
            _ => None,
        }
    }

    /// Samples of a float buffer
    pub fn samples_f32_mut(&mut self) -> Option<&mut [f32]> {
        match &mut self.storage {
            PixelStorage::F32(v) => Some(v),
            _ => None,
        }
    }

    pub fn profile(&self) -> &Arc<ColorProfile> {
        &self.profile
    }

    /// Replace the profile, returning the previous one
    pub fn set_profile(&mut self, profile: Arc<ColorProfile>) -> Arc<ColorProfile> {
        std::mem::replace(&mut self.profile, profile)
    }

    /// Consume the image, keeping only its profile
    pub fn take_profile(self) -> Arc<ColorProfile> {
        self.profile
    }

    pub fn attributes(&self) -> &ReadAttributes {
        &self.attributes
    }

    pub fn set_attributes(&mut self, attributes: ReadAttributes) {
        self.attributes = attributes;
    }

    /// New image at another depth/alpha, converted into `profile`
    /// (or left in the current one when `None`). Attributes carry over.
    pub fn convert(
        &self,
        depth: u32,
        alpha: bool,
        profile: Option<Arc<ColorProfile>>,
        options: TransformOptions,
    ) -> Result<Self> {
        let target = profile.unwrap_or_else(|| Arc::clone(&self.profile));
        let mut out = Self::new(self.width, self.height, depth, alpha, Arc::clone(&target))?;
        let transform = Transform::new(
            Some(&self.profile),
            self.encoding,
            Some(&target),
            out.encoding,
            options,
        )?;
        transform.run_parallel(
            self.pixel_count(),
            self.storage.as_bytes(),
            out.storage.as_bytes_mut(),
        )?;
        out.attributes = self.attributes;
        Ok(out)
    }
}

fn sample_count(width: u32, height: u32, encoding: PixelEncoding) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(encoding.channels()))
        .ok_or(Error::Overflow("image sample count"))
}
