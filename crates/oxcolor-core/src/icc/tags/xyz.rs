//! XYZ Tag Type (ICC.1:2022 Section 10.31)

use crate::color::Xyz;
use crate::icc::error::IccError;
use crate::icc::types::{TypeSignature, XyzNumber};

/// XYZ tag data - one or more XYZ values
#[derive(Debug, Clone, PartialEq)]
pub struct XyzTagData {
    pub values: Vec<XyzNumber>,
}

impl XyzTagData {
    pub fn single(xyz: Xyz) -> Self {
        Self {
            values: vec![XyzNumber::from_xyz(xyz)],
        }
    }

    /// Parse XYZ data from bytes (after type signature and reserved bytes)
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < 12 {
            return Err(IccError::CorruptedData("XYZ tag too small".to_string()));
        }

        let values: Vec<XyzNumber> = data
            .chunks_exact(12)
            .filter_map(XyzNumber::from_bytes)
            .collect();

        Ok(Self { values })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + 12 * self.values.len());
        out.extend_from_slice(&TypeSignature::XYZ.0.to_be_bytes());
        out.extend_from_slice(&[0; 4]);
        for v in &self.values {
            out.extend_from_slice(&v.to_bytes());
        }
        out
    }

    /// First XYZ value
    pub fn to_xyz(&self) -> Option<Xyz> {
        self.values.first().map(|v| v.to_xyz())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_values() {
        let mut data = Vec::new();
        data.extend_from_slice(&XyzNumber::from_xyz(Xyz::new(0.5, 0.25, 0.125)).to_bytes());
        data.extend_from_slice(&XyzNumber::from_xyz(Xyz::new(1.0, 1.0, 1.0)).to_bytes());
        let tag = XyzTagData::parse(&data).unwrap();
        assert_eq!(tag.values.len(), 2);
        assert_eq!(tag.to_xyz().unwrap(), Xyz::new(0.5, 0.25, 0.125));
    }

    #[test]
    fn test_encode_layout() {
        let bytes = XyzTagData::single(Xyz::new(1.0, 0.0, 0.0)).encode();
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[0..4], b"XYZ ");
        assert_eq!(&bytes[8..12], &[0, 1, 0, 0]);
    }

    #[test]
    fn test_too_small() {
        assert!(XyzTagData::parse(&[0; 8]).is_err());
    }
}
