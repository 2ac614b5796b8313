//! ICC codec error types

use std::fmt;

/// Errors that can occur when reading or writing ICC profiles
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IccError {
    /// Profile data is too small
    TooSmall { expected: usize, actual: usize },
    /// Invalid profile signature (should be 'acsp')
    InvalidSignature(u32),
    /// Profile size in header doesn't match data
    SizeMismatch {
        header_size: u32,
        actual_size: usize,
    },
    /// Tag offset is out of bounds
    TagOutOfBounds {
        tag: u32,
        offset: u32,
        size: u32,
        profile_size: usize,
    },
    /// Tag payload does not have the type the caller asked for
    InvalidTagType { tag: u32, type_sig: u32 },
    /// Invalid color space
    InvalidColorSpace(u32),
    /// Invalid profile class
    InvalidProfileClass(u32),
    /// Invalid rendering intent
    InvalidRenderingIntent(u32),
    /// Corrupted or invalid data
    CorruptedData(String),
    /// Serialized profile would exceed the 32-bit size field
    TooLarge(usize),
}

impl fmt::Display for IccError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { expected, actual } => {
                write!(
                    f,
                    "Profile too small: expected {} bytes, got {}",
                    expected, actual
                )
            }
            Self::InvalidSignature(sig) => {
                write!(
                    f,
                    "Invalid profile signature: 0x{:08X} (expected 'acsp')",
                    sig
                )
            }
            Self::SizeMismatch {
                header_size,
                actual_size,
            } => {
                write!(
                    f,
                    "Size mismatch: header says {} bytes, data is {} bytes",
                    header_size, actual_size
                )
            }
            Self::TagOutOfBounds {
                tag,
                offset,
                size,
                profile_size,
            } => {
                write!(
                    f,
                    "Tag '{}' out of bounds: offset {} + size {} > profile size {}",
                    fourcc(*tag),
                    offset,
                    size,
                    profile_size
                )
            }
            Self::InvalidTagType { tag, type_sig } => {
                write!(
                    f,
                    "Invalid type '{}' for tag '{}'",
                    fourcc(*type_sig),
                    fourcc(*tag)
                )
            }
            Self::InvalidColorSpace(cs) => {
                write!(f, "Invalid color space: 0x{:08X}", cs)
            }
            Self::InvalidProfileClass(class) => {
                write!(f, "Invalid profile class: 0x{:08X}", class)
            }
            Self::InvalidRenderingIntent(intent) => {
                write!(f, "Invalid rendering intent: {}", intent)
            }
            Self::CorruptedData(msg) => {
                write!(f, "Corrupted data: {}", msg)
            }
            Self::TooLarge(size) => {
                write!(f, "Profile of {} bytes does not fit a 32-bit size", size)
            }
        }
    }
}

impl std::error::Error for IccError {}

/// Render a signature as its four ASCII characters, falling back to hex.
pub(crate) fn fourcc(sig: u32) -> String {
    let bytes = sig.to_be_bytes();
    if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        bytes.iter().map(|&b| b as char).collect()
    } else {
        format!("0x{:08X}", sig)
    }
}
