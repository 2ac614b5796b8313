//! Curve Tag Types
//!
//! - curv: identity, single gamma, or lookup table
//! - para: ICC parametric function
//!
//! See ICC.1:2022 Sections 10.6 (curv) and 10.18 (para)

use crate::icc::error::IccError;
use crate::icc::types::{S15Fixed16, TypeSignature, U8Fixed8};
use crate::math::transfer::{ParametricCurve, ParametricCurveType, build_curve_lut};

/// Curve tag data (curv type)
#[derive(Debug, Clone, PartialEq)]
pub enum CurveData {
    /// count = 0
    Identity,
    /// count = 1, u8Fixed8 exponent
    Gamma(f64),
    /// count > 1, u16 samples
    Table(Vec<u16>),
}

impl CurveData {
    /// Parse curve data from bytes (after type signature and reserved bytes)
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < 4 {
            return Err(IccError::CorruptedData("Curve tag too small".to_string()));
        }

        let count = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;

        match count {
            0 => Ok(CurveData::Identity),
            1 => {
                if data.len() < 6 {
                    return Err(IccError::CorruptedData(
                        "Curve gamma value missing".to_string(),
                    ));
                }
                let raw = U8Fixed8(u16::from_be_bytes([data[4], data[5]]));
                Ok(CurveData::Gamma(raw.to_f64()))
            }
            _ => {
                let required_len = count
                    .checked_mul(2)
                    .and_then(|n| n.checked_add(4))
                    .ok_or_else(|| IccError::CorruptedData("Curve count overflow".to_string()))?;
                if data.len() < required_len {
                    return Err(IccError::CorruptedData(format!(
                        "Curve table too small: need {} bytes, have {}",
                        required_len,
                        data.len()
                    )));
                }

                let table = data[4..required_len]
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                Ok(CurveData::Table(table))
            }
        }
    }

    /// Sample a decode function into a table curve
    pub fn from_fn(size: usize, decode: impl Fn(f64) -> f64) -> Self {
        CurveData::Table(
            build_curve_lut(size, decode)
                .into_iter()
                .map(|y| (y.clamp(0.0, 1.0) * 65535.0).round() as u16)
                .collect(),
        )
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&TypeSignature::CURVE.0.to_be_bytes());
        out.extend_from_slice(&[0; 4]);
        match self {
            CurveData::Identity => out.extend_from_slice(&0u32.to_be_bytes()),
            CurveData::Gamma(g) => {
                out.extend_from_slice(&1u32.to_be_bytes());
                out.extend_from_slice(&U8Fixed8::from_f64(*g).0.to_be_bytes());
            }
            CurveData::Table(table) => {
                out.extend_from_slice(&(table.len() as u32).to_be_bytes());
                for v in table {
                    out.extend_from_slice(&v.to_be_bytes());
                }
            }
        }
        out
    }

    /// Evaluate the curve at a given input (0.0 to 1.0)
    pub fn eval(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);

        match self {
            CurveData::Identity => x,
            CurveData::Gamma(g) => x.powf(*g),
            CurveData::Table(table) => {
                if table.len() < 2 {
                    return table.first().map_or(x, |&v| v as f64 / 65535.0);
                }

                let pos = x * (table.len() - 1) as f64;
                let idx = pos.floor() as usize;
                if idx >= table.len() - 1 {
                    return table[table.len() - 1] as f64 / 65535.0;
                }
                let frac = pos - idx as f64;
                let v0 = table[idx] as f64;
                let v1 = table[idx + 1] as f64;
                (v0 + frac * (v1 - v0)) / 65535.0
            }
        }
    }

    /// Inverse evaluation by binary search on monotonic tables
    pub fn eval_inverse(&self, y: f64) -> f64 {
        let y = y.clamp(0.0, 1.0);

        match self {
            CurveData::Identity => y,
            CurveData::Gamma(g) => {
                if *g == 0.0 {
                    y
                } else {
                    y.powf(1.0 / *g)
                }
            }
            CurveData::Table(table) => {
                if table.len() < 2 {
                    return y;
                }
                let target = y * 65535.0;
                let lo = table.partition_point(|&v| (v as f64) < target);
                if lo == 0 {
                    return 0.0;
                }
                if lo >= table.len() {
                    return 1.0;
                }
                let v0 = table[lo - 1] as f64;
                let v1 = table[lo] as f64;
                let t = if v1 > v0 { (target - v0) / (v1 - v0) } else { 0.0 };
                ((lo - 1) as f64 + t) / (table.len() - 1) as f64
            }
        }
    }
}

/// Parametric curve data (para type)
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricCurveData {
    pub curve: ParametricCurve,
}

impl ParametricCurveData {
    /// Parse parametric curve from bytes (after type signature and reserved bytes)
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < 4 {
            return Err(IccError::CorruptedData(
                "Parametric curve too small".to_string(),
            ));
        }

        let func_type = u16::from_be_bytes([data[0], data[1]]);
        let curve_type = ParametricCurveType::from_icc(func_type).ok_or_else(|| {
            IccError::CorruptedData(format!("Unknown parametric curve type: {}", func_type))
        })?;

        let params: Vec<f64> = data[4..]
            .chunks_exact(4)
            .take(curve_type.param_count())
            .map(|c| S15Fixed16::from_be_bytes([c[0], c[1], c[2], c[3]]).to_f64())
            .collect();

        let curve = ParametricCurve::from_params(curve_type, &params).ok_or_else(|| {
            IccError::CorruptedData(format!(
                "Parametric curve type {} needs {} parameters, found {}",
                func_type,
                curve_type.param_count(),
                params.len()
            ))
        })?;

        Ok(Self { curve })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&TypeSignature::PARA.0.to_be_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&self.curve.curve_type.to_icc().to_be_bytes());
        out.extend_from_slice(&[0; 2]);
        for p in self.curve.params() {
            out.extend_from_slice(&S15Fixed16::from_f64(p).to_be_bytes());
        }
        out
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.curve.eval(x)
    }
}

/// Either kind of tone reproduction curve tag
#[derive(Debug, Clone, Copy)]
pub enum Trc<'a> {
    Curve(&'a CurveData),
    Parametric(&'a ParametricCurve),
}

impl Trc<'_> {
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Trc::Curve(c) => c.eval(x),
            Trc::Parametric(p) => p.eval(x),
        }
    }

    pub fn eval_inverse(&self, y: f64) -> f64 {
        match self {
            Trc::Curve(c) => c.eval_inverse(y),
            Trc::Parametric(p) => p.eval_inverse(y),
        }
    }

    /// Exponent when the curve is a pure power law (`para` type 0 or a one-entry `curv`)
    pub fn pure_gamma(&self) -> Option<f64> {
        match self {
            Trc::Curve(CurveData::Gamma(g)) => Some(*g),
            Trc::Curve(CurveData::Identity) => Some(1.0),
            Trc::Parametric(p) if p.curve_type == ParametricCurveType::Gamma => Some(p.g),
            _ => None,
        }
    }
}
