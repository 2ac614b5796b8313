//! Growable byte buffer used to carry packed profiles and other payloads

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use miniz_oxide::deflate::core::{
    CompressorOxide, TDEFLFlush, TDEFLStatus, compress, create_comp_flags_from_zip_params,
};
use tracing::error;

use crate::{Error, Result};

/// zlib default compression level
const DEFLATE_LEVEL: i32 = 6;
/// Positive window bits select the zlib wrapper
const DEFLATE_WINDOW_BITS: i32 = 15;

/// Owned byte buffer.
///
/// An empty buffer holds no storage at all; `set` with no bytes releases it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBuffer {
    data: Vec<u8>,
}

impl RawBuffer {
    /// Zero-filled buffer of `size` bytes
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Resize, keeping the first `min(old, new)` bytes. New bytes are zero.
    pub fn reallocate(&mut self, new_size: usize) {
        if new_size == self.data.len() {
            return;
        }
        let mut fresh = vec![0; new_size];
        let keep = new_size.min(self.data.len());
        fresh[..keep].copy_from_slice(&self.data[..keep]);
        self.data = fresh;
    }

    /// Replace the contents. An empty slice frees the storage.
    pub fn set(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            self.free();
        } else {
            self.reallocate(bytes.len());
            self.data.copy_from_slice(bytes);
        }
    }

    pub fn free(&mut self) {
        self.data = Vec::new();
    }

    /// Compress `src` into `dst` as a zlib-wrapped DEFLATE stream.
    ///
    /// Output is limited to `size + 6 + ceil(size / 16384) * 5` bytes (one
    /// block minimum). Anything short of a finished stream is an error and
    /// leaves `dst` empty.
    pub fn deflate(dst: &mut RawBuffer, src: &[u8]) -> Result<()> {
        let result = deflate_bound(src.len())
            .ok_or(Error::Overflow("deflate output size"))
            .and_then(|bound| deflate_into(src, bound));
        match result {
            Ok(out) => {
                dst.data = out;
                Ok(())
            }
            Err(e) => {
                error!("failed to deflate {} bytes: {}", src.len(), e);
                dst.free();
                Err(e)
            }
        }
    }

    /// Standard base64 without line breaks
    pub fn to_base64(&self) -> Result<String> {
        base64_encoded_len(self.data.len()).ok_or(Error::Overflow("base64 output size"))?;
        Ok(STANDARD.encode(&self.data))
    }

    /// `data:{mime};base64,{payload}`
    pub fn to_data_uri(&self, mime: &str) -> Result<String> {
        let payload = self.to_base64()?;
        Ok(format!("data:{};base64,{}", mime, payload))
    }

    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_vec(std::fs::read(path)?))
    }

    /// Read at most `max_bytes` from the start of a file.
    ///
    /// A file that yields no bytes is an error.
    pub fn read_file_header(path: impl AsRef<Path>, max_bytes: usize) -> Result<Self> {
        let path = path.as_ref();
        let mut data = Vec::with_capacity(max_bytes);
        File::open(path)?
            .take(max_bytes as u64)
            .read_to_end(&mut data)?;
        if data.is_empty() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("no bytes read from {}", path.display()),
            )));
        }
        Ok(Self::from_vec(data))
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut f = File::create(path)?;
        f.write_all(&self.data)?;
        Ok(())
    }

    pub fn file_size(path: impl AsRef<Path>) -> Result<u64> {
        Ok(std::fs::metadata(path)?.len())
    }
}

impl From<Vec<u8>> for RawBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}

impl AsRef<[u8]> for RawBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Worst-case zlib output for `size` input bytes
pub fn deflate_bound(size: usize) -> Option<usize> {
    let blocks = size.div_ceil(16384).max(1);
    size.checked_add(6)?.checked_add(blocks.checked_mul(5)?)
}

/// Base64 output length plus a terminator, `None` on overflow
pub fn base64_encoded_len(size: usize) -> Option<usize> {
    (size.checked_mul(4)? / 3).checked_add(4 + 1)
}

fn deflate_into(src: &[u8], bound: usize) -> Result<Vec<u8>> {
    let flags = create_comp_flags_from_zip_params(DEFLATE_LEVEL, DEFLATE_WINDOW_BITS, 0);
    let mut compressor = CompressorOxide::new(flags);
    let mut out = vec![0; bound];
    let (status, consumed, written) = compress(&mut compressor, src, &mut out, TDEFLFlush::Finish);
    if !matches!(status, TDEFLStatus::Done) || consumed != src.len() {
        return Err(Error::Deflate(format!(
            "compressor stopped with {:?} after {} of {} bytes",
            status,
            consumed,
            src.len()
        )));
    }
    out.truncate(written);
    Ok(out)
}
