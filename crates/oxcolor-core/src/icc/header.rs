//! ICC Profile Header
//!
//! The ICC profile header is exactly 128 bytes and contains basic profile information.
//! See ICC.1:2022 Section 7.2.

use super::error::IccError;
use super::types::XyzNumber;
use crate::color::WhitePoint;

/// Profile file signature - must be 'acsp' (0x61637370)
pub const PROFILE_SIGNATURE: u32 = 0x61637370;

/// Header size, also the minimum valid profile size
pub const HEADER_SIZE: usize = 128;

fn be32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// ICC Profile Header (128 bytes)
#[derive(Debug, Clone, PartialEq)]
pub struct IccHeader {
    /// Profile size in bytes
    pub size: u32,
    /// Preferred CMM type signature
    pub cmm_type: u32,
    /// Profile version (major.minor.patch)
    pub version: ProfileVersion,
    /// Device class (display, input, output, etc.)
    pub device_class: ProfileClass,
    /// Color space of data (RGB, CMYK, etc.)
    pub color_space: ColorSpace,
    /// Profile connection space (XYZ or Lab)
    pub pcs: ColorSpace,
    /// Creation date, kept verbatim
    pub creation_date: [u8; 12],
    /// Primary platform signature
    pub platform: u32,
    /// Profile flags
    pub flags: u32,
    /// Device manufacturer signature
    pub manufacturer: u32,
    /// Device model signature
    pub model: u32,
    /// Device attributes
    pub attributes: u64,
    /// Rendering intent
    pub rendering_intent: RenderingIntent,
    /// PCS illuminant (should be D50)
    pub illuminant: XyzNumber,
    /// Profile creator signature
    pub creator: u32,
    /// Profile ID (MD5 hash, or zero)
    pub profile_id: [u8; 16],
}

impl IccHeader {
    /// Header for a v4.3 display-class RGB profile with an XYZ connection space.
    pub fn display_rgb() -> Self {
        Self {
            size: 0,
            cmm_type: 0,
            version: ProfileVersion {
                major: 4,
                minor: 3,
                patch: 0,
            },
            device_class: ProfileClass::Display,
            color_space: ColorSpace::Rgb,
            pcs: ColorSpace::Xyz,
            creation_date: [0; 12],
            platform: 0,
            flags: 0,
            manufacturer: 0,
            model: 0,
            attributes: 0,
            rendering_intent: RenderingIntent::Perceptual,
            illuminant: XyzNumber::from_xyz(WhitePoint::D50.xyz),
            creator: u32::from_be_bytes(*b"oxcl"),
            profile_id: [0; 16],
        }
    }

    /// Parse header from bytes
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < HEADER_SIZE {
            return Err(IccError::TooSmall {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let signature = be32(data, 36);
        if signature != PROFILE_SIGNATURE {
            return Err(IccError::InvalidSignature(signature));
        }

        let mut creation_date = [0u8; 12];
        creation_date.copy_from_slice(&data[24..36]);
        let mut profile_id = [0u8; 16];
        profile_id.copy_from_slice(&data[84..100]);
        let mut attributes = [0u8; 8];
        attributes.copy_from_slice(&data[56..64]);

        Ok(Self {
            size: be32(data, 0),
            cmm_type: be32(data, 4),
            version: ProfileVersion {
                major: data[8],
                minor: data[9] >> 4,
                patch: data[9] & 0x0F,
            },
            device_class: ProfileClass::from_u32(be32(data, 12))?,
            color_space: ColorSpace::from_u32(be32(data, 16))?,
            pcs: ColorSpace::from_u32(be32(data, 20))?,
            creation_date,
            platform: be32(data, 40),
            flags: be32(data, 44),
            manufacturer: be32(data, 48),
            model: be32(data, 52),
            attributes: u64::from_be_bytes(attributes),
            // Only the low 16 bits carry the intent
            rendering_intent: RenderingIntent::from_u32(be32(data, 64) & 0xFFFF)?,
            illuminant: XyzNumber::from_bytes(&data[68..80]).unwrap_or_default(),
            creator: be32(data, 80),
            profile_id,
        })
    }

    /// Check the declared size against the data
    pub fn validate(&self, data_len: usize) -> Result<(), IccError> {
        if (self.size as usize) < HEADER_SIZE || self.size as usize > data_len {
            return Err(IccError::SizeMismatch {
                header_size: self.size,
                actual_size: data_len,
            });
        }
        Ok(())
    }

    /// Serialize into the first 128 bytes of `out`
    pub fn write(&self, out: &mut [u8; HEADER_SIZE]) {
        out.fill(0);
        out[0..4].copy_from_slice(&self.size.to_be_bytes());
        out[4..8].copy_from_slice(&self.cmm_type.to_be_bytes());
        out[8] = self.version.major;
        out[9] = (self.version.minor << 4) | (self.version.patch & 0x0F);
        out[12..16].copy_from_slice(&self.device_class.to_u32().to_be_bytes());
        out[16..20].copy_from_slice(&self.color_space.to_u32().to_be_bytes());
        out[20..24].copy_from_slice(&self.pcs.to_u32().to_be_bytes());
        out[24..36].copy_from_slice(&self.creation_date);
        out[36..40].copy_from_slice(&PROFILE_SIGNATURE.to_be_bytes());
        out[40..44].copy_from_slice(&self.platform.to_be_bytes());
        out[44..48].copy_from_slice(&self.flags.to_be_bytes());
        out[48..52].copy_from_slice(&self.manufacturer.to_be_bytes());
        out[52..56].copy_from_slice(&self.model.to_be_bytes());
        out[56..64].copy_from_slice(&self.attributes.to_be_bytes());
        out[64..68].copy_from_slice(&self.rendering_intent.to_u32().to_be_bytes());
        out[68..80].copy_from_slice(&self.illuminant.to_bytes());
        out[80..84].copy_from_slice(&self.creator.to_be_bytes());
        out[84..100].copy_from_slice(&self.profile_id);
    }

    /// Check if this is a matrix/TRC capable RGB profile
    pub fn is_rgb_device(&self) -> bool {
        matches!(
            self.device_class,
            ProfileClass::Display | ProfileClass::Input | ProfileClass::Output
        ) && matches!(self.color_space, ColorSpace::Rgb)
    }
}

/// ICC Profile Version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

/// ICC Profile Class (Device Class)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileClass {
    Input,
    Display,
    Output,
    DeviceLink,
    ColorSpace,
    Abstract,
    NamedColor,
}

impl ProfileClass {
    pub fn from_u32(val: u32) -> Result<Self, IccError> {
        match &val.to_be_bytes() {
            b"scnr" => Ok(Self::Input),
            b"mntr" => Ok(Self::Display),
            b"prtr" => Ok(Self::Output),
            b"link" => Ok(Self::DeviceLink),
            b"spac" => Ok(Self::ColorSpace),
            b"abst" => Ok(Self::Abstract),
            b"nmcl" => Ok(Self::NamedColor),
            _ => Err(IccError::InvalidProfileClass(val)),
        }
    }

    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes(match self {
            Self::Input => *b"scnr",
            Self::Display => *b"mntr",
            Self::Output => *b"prtr",
            Self::DeviceLink => *b"link",
            Self::ColorSpace => *b"spac",
            Self::Abstract => *b"abst",
            Self::NamedColor => *b"nmcl",
        })
    }
}

/// ICC data/connection color space
///
/// Only the spaces this crate can reason about get a named variant; any other
/// registered signature is carried through as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Xyz,
    Lab,
    Rgb,
    Gray,
    Cmyk,
    YCbCr,
    Other(u32),
}

impl ColorSpace {
    pub fn from_u32(val: u32) -> Result<Self, IccError> {
        let bytes = val.to_be_bytes();
        match &bytes {
            b"XYZ " => Ok(Self::Xyz),
            b"Lab " => Ok(Self::Lab),
            b"RGB " => Ok(Self::Rgb),
            b"GRAY" => Ok(Self::Gray),
            b"CMYK" => Ok(Self::Cmyk),
            b"YCbr" => Ok(Self::YCbCr),
            _ if bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b' ') => {
                Ok(Self::Other(val))
            }
            _ => Err(IccError::InvalidColorSpace(val)),
        }
    }

    pub fn to_u32(&self) -> u32 {
        match self {
            Self::Xyz => u32::from_be_bytes(*b"XYZ "),
            Self::Lab => u32::from_be_bytes(*b"Lab "),
            Self::Rgb => u32::from_be_bytes(*b"RGB "),
            Self::Gray => u32::from_be_bytes(*b"GRAY"),
            Self::Cmyk => u32::from_be_bytes(*b"CMYK"),
            Self::YCbCr => u32::from_be_bytes(*b"YCbr"),
            Self::Other(v) => *v,
        }
    }
}

/// ICC Rendering Intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingIntent {
    #[default]
    Perceptual,
    RelativeColorimetric,
    Saturation,
    AbsoluteColorimetric,
}

impl RenderingIntent {
    pub fn from_u32(val: u32) -> Result<Self, IccError> {
        match val {
            0 => Ok(Self::Perceptual),
            1 => Ok(Self::RelativeColorimetric),
            2 => Ok(Self::Saturation),
            3 => Ok(Self::AbsoluteColorimetric),
            _ => Err(IccError::InvalidRenderingIntent(val)),
        }
    }

    pub fn to_u32(&self) -> u32 {
        match self {
            Self::Perceptual => 0,
            Self::RelativeColorimetric => 1,
            Self::Saturation => 2,
            Self::AbsoluteColorimetric => 3,
        }
    }
}
