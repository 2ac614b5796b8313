//! cicp Tag Type (ICC.1:2022 Section 10.3)
//!
//! Coding-independent code points (ITU-T H.273) stored inside an ICC profile.

use crate::icc::error::IccError;
use crate::icc::types::TypeSignature;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CicpData {
    pub color_primaries: u8,
    pub transfer_characteristics: u8,
    pub matrix_coefficients: u8,
    pub full_range: bool,
}

impl CicpData {
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        match data {
            [p, t, m, r, ..] => Ok(Self {
                color_primaries: *p,
                transfer_characteristics: *t,
                matrix_coefficients: *m,
                full_range: *r != 0,
            }),
            _ => Err(IccError::CorruptedData("cicp tag too small".to_string())),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(12);
        out.extend_from_slice(&TypeSignature::CICP.0.to_be_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&[
            self.color_primaries,
            self.transfer_characteristics,
            self.matrix_coefficients,
            self.full_range as u8,
        ]);
        out
    }
}
