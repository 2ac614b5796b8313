//! ICC profile reader and writer
//!
//! An ICC profile consists of:
//! 1. A 128-byte header
//! 2. A tag table listing all tags
//! 3. Tag data (may overlap/share data)
//!
//! Each tag keeps the exact bytes it was read from, so writing a parsed profile
//! back out preserves tag payloads this module cannot decode.

use std::collections::HashMap;

use super::error::IccError;
use super::header::{HEADER_SIZE, IccHeader};
use super::tags::{CicpData, TagData, Trc};
use super::types::TagSignature;
use crate::color::Xyz;
use crate::math::Matrix3x3;

/// Size of one tag table entry: signature, offset, size
const TAG_ENTRY_SIZE: usize = 12;

/// A tag and its serialized form
#[derive(Debug, Clone, PartialEq)]
struct TagEntry {
    signature: u32,
    data: TagData,
    encoded: Vec<u8>,
}

/// An ICC profile in memory
#[derive(Debug, Clone, PartialEq)]
pub struct IccProfile {
    pub header: IccHeader,
    /// Tags in table order
    tags: Vec<TagEntry>,
}

impl IccProfile {
    /// Empty profile with the given header
    pub fn new(header: IccHeader) -> Self {
        Self {
            header,
            tags: Vec::new(),
        }
    }

    /// Parse an ICC profile from bytes
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        let header = IccHeader::parse(data)?;
        header.validate(data.len())?;
        // Anything past the declared size is not part of the profile
        let data = &data[..header.size as usize];

        if data.len() < HEADER_SIZE + 4 {
            return Err(IccError::TooSmall {
                expected: HEADER_SIZE + 4,
                actual: data.len(),
            });
        }
        let count = u32::from_be_bytes([data[128], data[129], data[130], data[131]]) as usize;
        let table_end = count
            .checked_mul(TAG_ENTRY_SIZE)
            .and_then(|n| n.checked_add(HEADER_SIZE + 4))
            .filter(|&end| end <= data.len())
            .ok_or(IccError::TooSmall {
                expected: HEADER_SIZE + 4 + count.saturating_mul(TAG_ENTRY_SIZE),
                actual: data.len(),
            })?;

        let mut tags = Vec::with_capacity(count);
        for entry in data[HEADER_SIZE + 4..table_end].chunks_exact(TAG_ENTRY_SIZE) {
            let signature = u32::from_be_bytes([entry[0], entry[1], entry[2], entry[3]]);
            let offset = u32::from_be_bytes([entry[4], entry[5], entry[6], entry[7]]);
            let size = u32::from_be_bytes([entry[8], entry[9], entry[10], entry[11]]);

            let bytes = (offset as usize)
                .checked_add(size as usize)
                .and_then(|end| data.get(offset as usize..end))
                .ok_or(IccError::TagOutOfBounds {
                    tag: signature,
                    offset,
                    size,
                    profile_size: data.len(),
                })?;

            // Tags that fail to decode are kept opaque
            let parsed = TagData::parse(bytes).unwrap_or_else(|_| TagData::Unknown {
                type_sig: bytes
                    .get(0..4)
                    .map_or(0, |s| u32::from_be_bytes([s[0], s[1], s[2], s[3]])),
                data: bytes.to_vec(),
            });

            // Duplicate signatures: first entry wins
            if tags.iter().all(|t: &TagEntry| t.signature != signature) {
                tags.push(TagEntry {
                    signature,
                    data: parsed,
                    encoded: bytes.to_vec(),
                });
            }
        }

        Ok(Self { header, tags })
    }

    /// Serialize the profile.
    ///
    /// Size and tag offsets are recomputed. Tag data is 4-byte aligned and
    /// byte-identical payloads share one block. The profile ID is written as
    /// zero.
    pub fn to_bytes(&self) -> Result<Vec<u8>, IccError> {
        let table_len = HEADER_SIZE + 4 + self.tags.len() * TAG_ENTRY_SIZE;
        let mut out = vec![0u8; table_len];
        let mut placed: HashMap<&[u8], (u32, u32)> = HashMap::new();
        let mut table = Vec::with_capacity(self.tags.len());

        for tag in &self.tags {
            let block = tag.encoded.as_slice();
            let (offset, size) = match placed.get(block) {
                Some(&location) => location,
                None => {
                    let offset = to_u32(out.len())?;
                    let size = to_u32(block.len())?;
                    out.extend_from_slice(block);
                    out.resize(out.len().next_multiple_of(4), 0);
                    placed.insert(block, (offset, size));
                    (offset, size)
                }
            };
            table.push((tag.signature, offset, size));
        }

        let mut header = self.header.clone();
        header.size = to_u32(out.len())?;
        header.profile_id = [0; 16];
        let mut header_bytes = [0u8; HEADER_SIZE];
        header.write(&mut header_bytes);
        out[..HEADER_SIZE].copy_from_slice(&header_bytes);

        out[128..132].copy_from_slice(&to_u32(self.tags.len())?.to_be_bytes());
        for (i, (signature, offset, size)) in table.into_iter().enumerate() {
            let at = HEADER_SIZE + 4 + i * TAG_ENTRY_SIZE;
            out[at..at + 4].copy_from_slice(&signature.to_be_bytes());
            out[at + 4..at + 8].copy_from_slice(&offset.to_be_bytes());
            out[at + 8..at + 12].copy_from_slice(&size.to_be_bytes());
        }

        Ok(out)
    }

    pub fn get_tag(&self, sig: TagSignature) -> Option<&TagData> {
        self.tags
            .iter()
            .find(|t| t.signature == sig.0)
            .map(|t| &t.data)
    }

    pub fn has_tag(&self, sig: TagSignature) -> bool {
        self.get_tag(sig).is_some()
    }

    /// Insert or replace a tag
    pub fn set_tag(&mut self, sig: TagSignature, data: TagData) {
        let encoded = data.encode();
        let entry = TagEntry {
            signature: sig.0,
            data,
            encoded,
        };
        match self.tags.iter_mut().find(|t| t.signature == sig.0) {
            Some(existing) => *existing = entry,
            None => self.tags.push(entry),
        }
    }

    pub fn remove_tag(&mut self, sig: TagSignature) -> Option<TagData> {
        let idx = self.tags.iter().position(|t| t.signature == sig.0)?;
        Some(self.tags.remove(idx).data)
    }

    pub fn tag_signatures(&self) -> impl Iterator<Item = TagSignature> + '_ {
        self.tags.iter().map(|t| TagSignature(t.signature))
    }

    pub fn description(&self) -> Option<String> {
        self.get_tag(TagSignature::DESC)
            .and_then(|t| t.as_text())
            .map(|t| t.text.clone())
    }

    fn xyz_tag(&self, sig: TagSignature) -> Option<Xyz> {
        self.get_tag(sig)
            .and_then(|t| t.as_xyz())
            .and_then(|xyz| xyz.to_xyz())
    }

    pub fn red_colorant(&self) -> Option<Xyz> {
        self.xyz_tag(TagSignature::RED_COLORANT)
    }

    pub fn green_colorant(&self) -> Option<Xyz> {
        self.xyz_tag(TagSignature::GREEN_COLORANT)
    }

    pub fn blue_colorant(&self) -> Option<Xyz> {
        self.xyz_tag(TagSignature::BLUE_COLORANT)
    }

    pub fn media_white_point(&self) -> Option<Xyz> {
        self.xyz_tag(TagSignature::MEDIA_WHITE)
    }

    /// Luminance tag, Y in cd/m²
    pub fn luminance(&self) -> Option<Xyz> {
        self.xyz_tag(TagSignature::LUMINANCE)
    }

    /// Colorant matrix with rXYZ/gXYZ/bXYZ as columns
    pub fn colorant_matrix(&self) -> Option<Matrix3x3> {
        Some(Matrix3x3::from_columns(
            self.red_colorant()?.to_array(),
            self.green_colorant()?.to_array(),
            self.blue_colorant()?.to_array(),
        ))
    }

    pub fn chromatic_adaptation(&self) -> Option<Matrix3x3> {
        self.get_tag(TagSignature::CHAD).and_then(|t| t.as_matrix())
    }

    pub fn red_trc(&self) -> Option<Trc<'_>> {
        self.get_tag(TagSignature::RED_TRC).and_then(|t| t.as_trc())
    }

    pub fn green_trc(&self) -> Option<Trc<'_>> {
        self.get_tag(TagSignature::GREEN_TRC).and_then(|t| t.as_trc())
    }

    pub fn blue_trc(&self) -> Option<Trc<'_>> {
        self.get_tag(TagSignature::BLUE_TRC).and_then(|t| t.as_trc())
    }

    /// True when the three TRC tags are stored identically
    pub fn trcs_match(&self) -> bool {
        let data = |sig: TagSignature| self.get_tag(sig);
        let red = data(TagSignature::RED_TRC);
        red.is_some()
            && red == data(TagSignature::GREEN_TRC)
            && red == data(TagSignature::BLUE_TRC)
    }

    pub fn cicp(&self) -> Option<CicpData> {
        self.get_tag(TagSignature::CICP).and_then(|t| t.as_cicp()).copied()
    }

    /// RGB device profile with colorants and three usable TRCs
    pub fn is_matrix_shaper(&self) -> bool {
        self.header.is_rgb_device()
            && self.colorant_matrix().is_some()
            && self.red_trc().is_some()
            && self.green_trc().is_some()
            && self.blue_trc().is_some()
    }
}

fn to_u32(n: usize) -> Result<u32, IccError> {
    u32::try_from(n).map_err(|_| IccError::TooLarge(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icc::tags::{CurveData, TextData, XyzTagData};

    fn create_minimal_profile() -> Vec<u8> {
        let mut data = vec![0u8; 132];
        data[0..4].copy_from_slice(&132u32.to_be_bytes());
        data[8] = 4;
        data[9] = 0x30;
        data[12..16].copy_from_slice(b"mntr");
        data[16..20].copy_from_slice(b"RGB ");
        data[20..24].copy_from_slice(b"XYZ ");
        data[36..40].copy_from_slice(b"acsp");
        data
    }

    #[test]
    fn test_parse_minimal_profile() {
        let profile = IccProfile::parse(&create_minimal_profile()).unwrap();
        assert_eq!(profile.header.version.major, 4);
        assert_eq!(profile.tag_signatures().count(), 0);
        assert!(!profile.is_matrix_shaper());
    }

    #[test]
    fn test_profile_too_small() {
        assert!(IccProfile::parse(&[0u8; 64]).is_err());
    }

    #[test]
    fn test_tag_out_of_bounds() {
        let mut data = create_minimal_profile();
        data[131] = 1;
        data.extend_from_slice(b"wtpt");
        data.extend_from_slice(&1000u32.to_be_bytes());
        data.extend_from_slice(&20u32.to_be_bytes());
        let len = data.len() as u32;
        data[0..4].copy_from_slice(&len.to_be_bytes());

        match IccProfile::parse(&data) {
            Err(IccError::TagOutOfBounds { offset, .. }) => assert_eq!(offset, 1000),
            other => panic!("expected TagOutOfBounds, got {:?}", other),
        }
    }

    #[test]
    fn test_tag_table_overflow() {
        let mut data = create_minimal_profile();
        data[128..132].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(
            IccProfile::parse(&data),
            Err(IccError::TooSmall { .. })
        ));
    }

    #[test]
    fn test_write_then_parse() {
        let mut profile = IccProfile::new(IccHeader::display_rgb());
        profile.set_tag(
            TagSignature::MEDIA_WHITE,
            TagData::Xyz(XyzTagData::single(Xyz::new(0.9642, 1.0, 0.8249))),
        );
        let trc = TagData::Curve(CurveData::Gamma(2.2));
        profile.set_tag(TagSignature::RED_TRC, trc.clone());
        profile.set_tag(TagSignature::GREEN_TRC, trc.clone());
        profile.set_tag(TagSignature::BLUE_TRC, trc);
        profile.set_tag(TagSignature::DESC, TagData::MultiLocalizedUnicode(TextData::new("test")));

        let bytes = profile.to_bytes().unwrap();
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(
            u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize,
            bytes.len()
        );

        let parsed = IccProfile::parse(&bytes).unwrap();
        assert_eq!(parsed.description().as_deref(), Some("test"));
        assert!(parsed.trcs_match());
        assert_eq!(parsed.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_identical_tags_share_storage() {
        let mut profile = IccProfile::new(IccHeader::display_rgb());
        let trc = TagData::Curve(CurveData::from_fn(1024, |x| x * x));
        profile.set_tag(TagSignature::RED_TRC, trc.clone());
        profile.set_tag(TagSignature::GREEN_TRC, trc.clone());
        profile.set_tag(TagSignature::BLUE_TRC, trc);

        let bytes = profile.to_bytes().unwrap();
        // header + count + 3 entries + one 12 + 2048 byte curve
        assert_eq!(bytes.len(), 128 + 4 + 36 + 12 + 2048);
    }

    #[test]
    fn test_set_and_remove_tag() {
        let mut profile = IccProfile::new(IccHeader::display_rgb());
        let white = TagData::Xyz(XyzTagData::single(Xyz::new(1.0, 1.0, 1.0)));
        profile.set_tag(TagSignature::LUMINANCE, white.clone());
        profile.set_tag(TagSignature::LUMINANCE, white);
        assert_eq!(profile.tag_signatures().count(), 1);
        assert!(profile.remove_tag(TagSignature::LUMINANCE).is_some());
        assert!(!profile.has_tag(TagSignature::LUMINANCE));
    }
}
