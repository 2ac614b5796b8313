//! Error types for oxcolor

use thiserror::Error;

use crate::icc::IccError;

/// Result type for oxcolor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure category, for callers that only care about the class of problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bytes or sizes that cannot be interpreted
    Malformed,
    /// A valid request this crate has no way to satisfy
    Unsupported,
    /// A profile lacks data the operation needs
    Missing,
    /// File system failure
    Io,
}

/// Errors that can occur in oxcolor operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to parse ICC profile
    #[error("Profile parse error: {0}")]
    ProfileParse(String),

    /// Low-level ICC decoding failure
    #[error("ICC error: {0}")]
    Icc(#[from] IccError),

    /// A mandatory tag is absent
    #[error("Profile is missing the {0} tag")]
    MissingTag(&'static str),

    /// Primaries do not span a colour space
    #[error("Degenerate primaries: {0}")]
    DegeneratePrimaries(String),

    /// Tone curve cannot be encoded
    #[error("Invalid tone curve: {0}")]
    InvalidCurve(String),

    /// No nclx triple expresses this profile
    #[error("No compact tag matches: {0}")]
    NoCompactMatch(String),

    /// Requested combination is not implemented
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Transform creation failed
    #[error("Transform error: {0}")]
    Transform(String),

    /// Buffer size mismatch
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Image geometry or container metadata out of range
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// A computed length does not fit in usize
    #[error("Size overflow: {0}")]
    Overflow(&'static str),

    /// Compressor did not reach a clean end of stream
    #[error("Deflate failed: {0}")]
    Deflate(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProfileParse(_)
            | Self::Icc(_)
            | Self::BufferSize { .. }
            | Self::InvalidDimensions(_)
            | Self::Overflow(_)
            | Self::Deflate(_) => ErrorKind::Malformed,
            Self::MissingTag(_) => ErrorKind::Missing,
            Self::DegeneratePrimaries(_)
            | Self::InvalidCurve(_)
            | Self::NoCompactMatch(_)
            | Self::Unsupported(_)
            | Self::Transform(_) => ErrorKind::Unsupported,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}
