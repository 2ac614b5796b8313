//! Text Tag Types
//!
//! - text: ASCII text
//! - desc: v2 profile description
//! - mluc: v4 multi-localized Unicode
//!
//! See ICC.1:2022 Sections 10.24 (text), 10.14 (desc), 10.15 (mluc)

use crate::icc::error::IccError;
use crate::icc::types::TypeSignature;

/// Type signature plus reserved bytes
const TYPE_HEADER_LEN: usize = 8;

/// Text tag data
#[derive(Debug, Clone, PartialEq)]
pub struct TextData {
    /// Primary text content (first record, usually en-US)
    pub text: String,
    /// Localized versions (locale -> text)
    pub localized: Vec<(String, String)>,
}

impl TextData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            localized: Vec::new(),
        }
    }

    /// Parse 'text' type (null-terminated ASCII)
    pub fn parse_text(data: &[u8]) -> Result<Self, IccError> {
        Ok(Self::new(ascii_until_nul(data)))
    }

    /// Parse 'desc' type; only the ASCII part is read
    pub fn parse_desc(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < 4 {
            return Err(IccError::CorruptedData(
                "Description tag too small".to_string(),
            ));
        }

        let ascii_count = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        let ascii = data
            .get(4..4usize.saturating_add(ascii_count))
            .ok_or_else(|| IccError::CorruptedData("Description ASCII data truncated".to_string()))?;

        Ok(Self::new(ascii_until_nul(ascii)))
    }

    /// Parse 'mluc' type.
    ///
    /// String offsets in the records count from the start of the tag, which is
    /// eight bytes before `data`.
    pub fn parse_mluc(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < 8 {
            return Err(IccError::CorruptedData("mluc tag too small".to_string()));
        }

        let record_count = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        let record_size = u32::from_be_bytes([data[4], data[5], data[6], data[7]]) as usize;

        if record_size < 12 {
            return Err(IccError::CorruptedData(
                "mluc record size too small".to_string(),
            ));
        }

        let mut localized = Vec::new();
        for i in 0..record_count {
            let Some(record) = i
                .checked_mul(record_size)
                .and_then(|o| o.checked_add(8))
                .and_then(|o| data.get(o..o.checked_add(12)?))
            else {
                break;
            };

            let locale: String = format!(
                "{}{}-{}{}",
                record[0] as char, record[1] as char, record[2] as char, record[3] as char
            );
            let str_len = u32::from_be_bytes([record[4], record[5], record[6], record[7]]) as usize;
            let str_offset =
                u32::from_be_bytes([record[8], record[9], record[10], record[11]]) as usize;

            let text = str_offset
                .checked_sub(TYPE_HEADER_LEN)
                .and_then(|start| data.get(start..start.checked_add(str_len)?))
                .and_then(decode_utf16be);
            if let Some(text) = text {
                localized.push((locale, text));
            }
        }

        let text = localized
            .first()
            .map(|(_, t)| t.clone())
            .unwrap_or_default();
        Ok(Self { text, localized })
    }

    /// Encode as a single en-US 'mluc' record
    pub fn encode_mluc(&self) -> Vec<u8> {
        let utf16: Vec<u8> = self
            .text
            .encode_utf16()
            .flat_map(|c| c.to_be_bytes())
            .collect();
        // type header + count + record size + one 12-byte record
        let string_offset = (TYPE_HEADER_LEN + 8 + 12) as u32;

        let mut out = Vec::with_capacity(string_offset as usize + utf16.len());
        out.extend_from_slice(&TypeSignature::MLUC.0.to_be_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&1u32.to_be_bytes());
        out.extend_from_slice(&12u32.to_be_bytes());
        out.extend_from_slice(b"enUS");
        out.extend_from_slice(&(utf16.len() as u32).to_be_bytes());
        out.extend_from_slice(&string_offset.to_be_bytes());
        out.extend_from_slice(&utf16);
        out
    }

    /// Text for the first locale starting with `lang`
    pub fn get_locale(&self, lang: &str) -> Option<&str> {
        self.localized
            .iter()
            .find(|(locale, _)| locale.starts_with(lang))
            .map(|(_, text)| text.as_str())
    }
}

fn ascii_until_nul(data: &[u8]) -> String {
    data.iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}

/// Decode UTF-16BE bytes to String, stopping at a nul
fn decode_utf16be(data: &[u8]) -> Option<String> {
    if data.len() % 2 != 0 {
        return None;
    }

    let utf16: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .take_while(|&c| c != 0)
        .collect();

    String::from_utf16(&utf16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text() {
        let text = TextData::parse_text(b"Hello, World!\0").unwrap();
        assert_eq!(text.text, "Hello, World!");
    }

    #[test]
    fn test_parse_desc() {
        let mut data = vec![0, 0, 0, 6];
        data.extend_from_slice(b"sRGB\0\0");
        assert_eq!(TextData::parse_desc(&data).unwrap().text, "sRGB");

        let truncated = [0, 0, 0, 40, b's'];
        assert!(TextData::parse_desc(&truncated).is_err());
    }

    #[test]
    fn test_parse_mluc_offsets_from_tag_start() {
        let mut data = vec![
            0, 0, 0, 1, // record count
            0, 0, 0, 12, // record size
        ];
        data.extend_from_slice(&[
            b'e', b'n', b'U', b'S', //
            0, 0, 0, 8, // 4 UTF-16 chars
            0, 0, 0, 28, // 8 (type header) + 8 + 12
        ]);
        data.extend_from_slice(&[0x00, b'T', 0x00, b'e', 0x00, b's', 0x00, b't']);

        let text = TextData::parse_mluc(&data).unwrap();
        assert_eq!(text.text, "Test");
        assert_eq!(text.get_locale("en"), Some("Test"));
    }

    #[test]
    fn test_mluc_encode_parse() {
        let original = TextData::new("Display P3 – ünïcode");
        let bytes = original.encode_mluc();
        assert_eq!(&bytes[0..4], b"mluc");
        let parsed = TextData::parse_mluc(&bytes[TYPE_HEADER_LEN..]).unwrap();
        assert_eq!(parsed.text, original.text);
        assert_eq!(parsed.localized[0].0, "en-US");
    }

    #[test]
    fn test_decode_utf16be() {
        let data = [0x00, 0x48, 0x00, 0x65, 0x00, 0x6C, 0x00, 0x6C, 0x00, 0x6F];
        assert_eq!(decode_utf16be(&data).unwrap(), "Hello");
        assert!(decode_utf16be(&data[..3]).is_none());
    }
}
