//! nclx mapping over the whole code space
//!
//! Every (primaries, transfer) pair a container can carry is decoded, then
//! re-encoded, and must land on its canonical table entry.

use oxcolor_core::nclx::{
    self, ColorPrimariesCode, CompactTag, MatrixCoefficientsCode, Range,
    TransferCharacteristicsCode,
};
use oxcolor_core::{ColorProfile, Error, Luminance, ToneCurve};

const TABLE_PRIMARIES: [u16; 12] = [1, 2, 4, 5, 6, 7, 8, 9, 10, 11, 12, 22];
const SUPPORTED_TRANSFERS: [u16; 5] = [4, 5, 13, 16, 18];

fn tag(primaries: u16, transfer: u16) -> CompactTag {
    CompactTag {
        color_primaries: ColorPrimariesCode(primaries),
        transfer_characteristics: TransferCharacteristicsCode(transfer),
        matrix_coefficients: MatrixCoefficientsCode(0),
        range: Range::Full,
    }
}

/// Primaries code the encoder picks for a decoded code
fn canonical_primaries(code: u16) -> u16 {
    match code {
        // Same chromaticities as an earlier table entry
        2 => 1,
        7 => 6,
        c if TABLE_PRIMARIES.contains(&c) => c,
        // Unknown codes decode as BT.709
        _ => 1,
    }
}

fn canonical_transfer(code: u16) -> u16 {
    if SUPPORTED_TRANSFERS.contains(&code) {
        code
    } else {
        4
    }
}

#[test]
fn test_exhaustive_model_roundtrip() {
    for primaries in 0..=32u16 {
        for transfer in 0..=20u16 {
            let model = nclx::decode_model(&tag(primaries, transfer), 0);
            let encoded = nclx::encode_model(&model).unwrap_or_else(|e| {
                panic!("({}, {}) did not re-encode: {}", primaries, transfer, e)
            });
            assert_eq!(
                encoded.color_primaries.0,
                canonical_primaries(primaries),
                "primaries for ({}, {})",
                primaries,
                transfer
            );
            assert_eq!(
                encoded.transfer_characteristics.0,
                canonical_transfer(transfer),
                "transfer for ({}, {})",
                primaries,
                transfer
            );
            assert_eq!(encoded.range, Range::Full);
        }
    }
}

#[test]
fn test_decoded_profiles_reencode_through_icc() {
    // The XYZ primaries are degenerate as RGB colorants
    for primaries in TABLE_PRIMARIES.into_iter().filter(|&p| p != 10) {
        for transfer in SUPPORTED_TRANSFERS {
            let profile = nclx::decode(&tag(primaries, transfer), 0).unwrap();
            let reparsed = ColorProfile::parse(profile.pack().unwrap(), None).unwrap();
            let encoded = nclx::encode(&reparsed).unwrap();
            assert_eq!(
                (
                    encoded.color_primaries.0,
                    encoded.transfer_characteristics.0
                ),
                (canonical_primaries(primaries), transfer),
                "({}, {}) via {:?}",
                primaries,
                transfer,
                reparsed.description()
            );
        }
    }
}

#[test]
fn test_pq_luminance_rules() {
    let pq = tag(9, 16);

    let model = nclx::decode_model(&pq, 0);
    assert_eq!(model.curve, ToneCurve::Pq);
    assert_eq!(model.luminance, Luminance::Nits(10000));

    // An explicit level is kept, and then has no compact form
    let model = nclx::decode_model(&pq, 1000);
    assert_eq!(model.luminance, Luminance::Nits(1000));
    assert!(matches!(
        nclx::encode_model(&model),
        Err(Error::NoCompactMatch(_))
    ));

    // Any luminance blocks the non-PQ codes
    let model = nclx::decode_model(&tag(1, 13), 400);
    assert_eq!(model.curve, ToneCurve::Srgb);
    assert!(nclx::encode_model(&model).is_err());
}

#[test]
fn test_matrix_coefficients_follow_primaries() {
    let bt709 = nclx::encode_model(&nclx::decode_model(&tag(1, 13), 0)).unwrap();
    assert_eq!(bt709.matrix_coefficients, MatrixCoefficientsCode::BT601);
    let bt2020 = nclx::encode_model(&nclx::decode_model(&tag(9, 16), 0)).unwrap();
    assert_eq!(bt2020.matrix_coefficients, MatrixCoefficientsCode::BT2020_NCL);
}

#[test]
fn test_forced_range_follows_depth() {
    assert_eq!(CompactTag::forced([1, 13, 6], 8).range, Range::Full);
    assert_eq!(CompactTag::forced([9, 16, 9], 10).range, Range::Limited);
    assert_eq!(CompactTag::forced([9, 16, 9], 12).to_string(), "C:9 T:16 M:9 F:0");
}
