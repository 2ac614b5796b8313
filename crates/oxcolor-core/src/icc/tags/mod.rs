//! ICC tag payloads
//!
//! Every tag starts with a 4-byte type signature and 4 reserved bytes, then
//! type-specific data. See ICC.1:2022 Section 10.

mod cicp;
mod curves;
mod text;
mod xyz;

pub use cicp::CicpData;
pub use curves::{CurveData, ParametricCurveData, Trc};
pub use text::TextData;
pub use xyz::XyzTagData;

use super::error::IccError;
use super::types::{S15Fixed16, TypeSignature};
use crate::math::Matrix3x3;

/// Parsed tag data
#[derive(Debug, Clone, PartialEq)]
pub enum TagData {
    /// Colorants, white point
    Xyz(XyzTagData),
    Curve(CurveData),
    ParametricCurve(ParametricCurveData),
    /// text or desc
    Text(TextData),
    MultiLocalizedUnicode(TextData),
    /// s15Fixed16 array (chad)
    Sf32(Vec<f64>),
    Cicp(CicpData),
    /// Unrecognized type; `data` holds the full tag bytes
    Unknown { type_sig: u32, data: Vec<u8> },
}

impl TagData {
    /// Parse a tag from its bytes (starting at the tag offset in the profile)
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < 8 {
            return Err(IccError::CorruptedData(
                "Tag data too small for header".to_string(),
            ));
        }

        let type_sig = TypeSignature(u32::from_be_bytes([data[0], data[1], data[2], data[3]]));
        let type_data = &data[8..];

        Ok(match type_sig {
            TypeSignature::XYZ => TagData::Xyz(XyzTagData::parse(type_data)?),
            TypeSignature::CURVE => TagData::Curve(CurveData::parse(type_data)?),
            TypeSignature::PARA => TagData::ParametricCurve(ParametricCurveData::parse(type_data)?),
            TypeSignature::TEXT => TagData::Text(TextData::parse_text(type_data)?),
            TypeSignature::DESC => TagData::Text(TextData::parse_desc(type_data)?),
            TypeSignature::MLUC => TagData::MultiLocalizedUnicode(TextData::parse_mluc(type_data)?),
            TypeSignature::SF32 => TagData::Sf32(
                type_data
                    .chunks_exact(4)
                    .map(|c| S15Fixed16::from_be_bytes([c[0], c[1], c[2], c[3]]).to_f64())
                    .collect(),
            ),
            TypeSignature::CICP => TagData::Cicp(CicpData::parse(type_data)?),
            _ => TagData::Unknown {
                type_sig: type_sig.0,
                data: data.to_vec(),
            },
        })
    }

    /// Serialize to tag bytes, type header included
    pub fn encode(&self) -> Vec<u8> {
        match self {
            TagData::Xyz(xyz) => xyz.encode(),
            TagData::Curve(curve) => curve.encode(),
            TagData::ParametricCurve(curve) => curve.encode(),
            TagData::Text(text) | TagData::MultiLocalizedUnicode(text) => text.encode_mluc(),
            TagData::Sf32(values) => {
                let mut out = Vec::with_capacity(8 + values.len() * 4);
                out.extend_from_slice(&TypeSignature::SF32.0.to_be_bytes());
                out.extend_from_slice(&[0; 4]);
                for v in values {
                    out.extend_from_slice(&S15Fixed16::from_f64(*v).to_be_bytes());
                }
                out
            }
            TagData::Cicp(cicp) => cicp.encode(),
            TagData::Unknown { data, .. } => data.clone(),
        }
    }

    /// 3x3 row-major matrix from an sf32 tag
    pub fn matrix(m: &Matrix3x3) -> Self {
        TagData::Sf32(m.m.iter().flatten().copied().collect())
    }

    pub fn as_xyz(&self) -> Option<&XyzTagData> {
        match self {
            TagData::Xyz(xyz) => Some(xyz),
            _ => None,
        }
    }

    pub fn as_trc(&self) -> Option<Trc<'_>> {
        match self {
            TagData::Curve(curve) => Some(Trc::Curve(curve)),
            TagData::ParametricCurve(para) => Some(Trc::Parametric(&para.curve)),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextData> {
        match self {
            TagData::Text(text) | TagData::MultiLocalizedUnicode(text) => Some(text),
            _ => None,
        }
    }

    /// First nine sf32 values as a row-major matrix
    pub fn as_matrix(&self) -> Option<Matrix3x3> {
        match self {
            TagData::Sf32(v) if v.len() >= 9 => Some(Matrix3x3::new([
                [v[0], v[1], v[2]],
                [v[3], v[4], v[5]],
                [v[6], v[7], v[8]],
            ])),
            _ => None,
        }
    }

    pub fn as_cicp(&self) -> Option<&CicpData> {
        match self {
            TagData::Cicp(cicp) => Some(cicp),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unknown_type() {
        let data = [b'u', b'n', b'k', b'n', 0, 0, 0, 0, 1, 2, 3, 4];

        let tag = TagData::parse(&data).unwrap();
        match &tag {
            TagData::Unknown { type_sig, .. } => {
                assert_eq!(*type_sig, u32::from_be_bytes(*b"unkn"));
            }
            other => panic!("Expected Unknown tag type, got {:?}", other),
        }
        // Unknown payloads are written back untouched
        assert_eq!(tag.encode(), data);
    }

    #[test]
    fn test_sf32_matrix() {
        let m = Matrix3x3::new([[1.0, 0.5, -0.25], [0.0, 1.0, 0.0], [0.125, 0.0, 2.0]]);
        let bytes = TagData::matrix(&m).encode();
        assert_eq!(bytes.len(), 8 + 36);
        let parsed = TagData::parse(&bytes).unwrap();
        assert_eq!(parsed.as_matrix().unwrap(), m);
    }

    #[test]
    fn test_short_sf32_is_not_a_matrix() {
        assert!(TagData::Sf32(vec![1.0; 8]).as_matrix().is_none());
    }
}
