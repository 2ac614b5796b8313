//! moxcms parity
//!
//! moxcms parses our packed profiles independently of our own ICC reader.

use oxcolor_core::{
    ColorProfile, ErrorKind, PixelEncoding, Transform, TransformOptions, nclx, transform,
};
use oxcolor_tests::profiles::lut_rgb_icc;
use oxcolor_tests::reference::{moxcms_rgb8, moxcms_view, oxcolor_rgb8};
use oxcolor_tests::{ChannelDiff, Pattern, TestProfile};

const D50: [f64; 3] = [0.9642, 1.0, 0.8249];

fn assert_xyz_close(label: &str, a: [f64; 3], b: [f64; 3], eps: f64) {
    for c in 0..3 {
        assert!(
            (a[c] - b[c]).abs() < eps,
            "{}: {:?} vs {:?}",
            label,
            a,
            b
        );
    }
}

#[test]
fn test_moxcms_reads_colorants() {
    for p in TestProfile::ALL {
        let profile = p.build();
        let view = moxcms_view(&p.packed()).unwrap_or_else(|e| panic!("{:?}: {}", p, e));
        let icc = profile.icc();
        let ours = [
            icc.red_colorant().unwrap(),
            icc.green_colorant().unwrap(),
            icc.blue_colorant().unwrap(),
        ];
        for (name, theirs, xyz) in [
            ("red", view.red, ours[0]),
            ("green", view.green, ours[1]),
            ("blue", view.blue, ours[2]),
        ] {
            assert_xyz_close(
                &format!("{:?} {}", p, name),
                theirs,
                [xyz.x, xyz.y, xyz.z],
                1e-4,
            );
        }
        assert_xyz_close(&format!("{:?} white", p), view.white, D50, 1e-3);
        assert!(view.has_chad, "{:?} lost its chad tag", p);
    }
}

#[test]
fn test_cicp_tag_presence() {
    for p in TestProfile::ALL {
        let expect_cicp = matches!(
            p,
            TestProfile::Srgb | TestProfile::DisplayP3 | TestProfile::Bt2020Pq | TestProfile::Bt2020Hlg
        );
        let view = moxcms_view(&p.packed()).unwrap();
        assert_eq!(view.has_cicp, expect_cicp, "{:?}", p);
    }
}

#[test]
fn test_profiles_survive_moxcms_parse_unchanged() {
    // Our reader and moxcms both accept the bytes; ours re-derives the model
    for p in TestProfile::ALL {
        let bytes = p.packed();
        let parsed = ColorProfile::parse(&bytes, None).unwrap();
        assert!(parsed.matches(&p.build()), "{:?}", p);
        let q = parsed.query().unwrap();
        assert!(q.curve.same_kind(&p.curve()), "{:?}: {:?}", p, q.curve);
        if let Ok(tag) = nclx::encode(&parsed) {
            eprintln!("{:?}: {}", p, tag);
        }
    }
}

#[test]
fn test_rgb8_matches_moxcms() {
    let pairs = [
        (TestProfile::Srgb, TestProfile::DisplayP3),
        (TestProfile::DisplayP3, TestProfile::Srgb),
        (TestProfile::Bt709Gamma22, TestProfile::Srgb),
        (TestProfile::Stock, TestProfile::Bt709Gamma28),
    ];
    let pixels = Pattern::Cube(17).rgb8(usize::MAX);

    for (src, dst) in pairs {
        let ours = oxcolor_rgb8(&src.build(), &dst.build(), &pixels);
        let theirs = moxcms_rgb8(&src.packed(), &dst.packed(), &pixels).unwrap();
        let diff = ChannelDiff::between(&ours, &theirs);
        eprintln!("{:?} -> {:?}: {:?}", src, dst, diff);
        assert!(diff.within(1.0), "{:?} -> {:?}: {:?}", src, dst, diff);
    }
}

// ============================================================================
// LUT-based profiles (delegated to moxcms)
// ============================================================================

#[test]
fn test_lut_profile_matches_moxcms() {
    let lut_icc = lut_rgb_icc();
    let lut = ColorProfile::parse(&lut_icc, None).unwrap();
    assert!(!lut.icc().is_matrix_shaper());

    let pixels = Pattern::Cube(17).rgb8(usize::MAX);
    for dst in [TestProfile::Srgb, TestProfile::DisplayP3, TestProfile::Bt709Gamma22] {
        let ours = oxcolor_rgb8(&lut, &dst.build(), &pixels);
        let theirs = moxcms_rgb8(&lut_icc, &dst.packed(), &pixels).unwrap();
        let diff = ChannelDiff::between(&ours, &theirs);
        eprintln!("LUT -> {:?}: {:?}", dst, diff);
        assert!(diff.within(2.0), "LUT -> {:?}: {:?}", dst, diff);
    }

    // The table is sRGB, so white and black land where they started
    let ends = oxcolor_rgb8(&lut, &TestProfile::Srgb.build(), &[255, 255, 255, 0, 0, 0]);
    for (got, want) in ends.iter().zip([255u8, 255, 255, 0, 0, 0]) {
        assert!((i32::from(*got) - i32::from(want)).abs() <= 2, "{:?}", ends);
    }
}

#[test]
fn test_lut_profile_parallel_matches_serial() {
    let lut = ColorProfile::parse(&lut_rgb_icc(), None).unwrap();
    let dst = TestProfile::DisplayP3.build();
    let pixels = Pattern::Random(7).rgba8(5000);
    let n = pixels.len() / 4;

    let serial = Transform::new(
        Some(&lut),
        PixelEncoding::Rgba8,
        Some(&dst),
        PixelEncoding::Rgba16,
        TransformOptions::default(),
    )
    .unwrap();
    let mut expected = vec![0u16; n * 4];
    serial
        .run(n, &pixels, bytemuck::cast_slice_mut(&mut expected))
        .unwrap();

    let parallel = Transform::new(
        Some(&lut),
        PixelEncoding::Rgba8,
        Some(&dst),
        PixelEncoding::Rgba16,
        TransformOptions::default().with_jobs(3),
    )
    .unwrap();
    let mut got = vec![0u16; n * 4];
    parallel
        .run_parallel(n, &pixels, bytemuck::cast_slice_mut(&mut got))
        .unwrap();

    assert_eq!(expected, got);
    // Alpha is carried around the external engine
    for (px, out) in pixels.chunks_exact(4).zip(got.chunks_exact(4)) {
        assert_eq!(out[3], u16::from(px[3]) * 257);
    }
}

#[test]
fn test_lut_profile_rejects_xyz_before_writing() {
    let lut = ColorProfile::parse(&lut_rgb_icc(), None).unwrap();
    let srgb = TestProfile::Srgb.build();

    let err = Transform::new(
        Some(&lut),
        PixelEncoding::Rgb8,
        Some(&srgb),
        PixelEncoding::XyzF32,
        TransformOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);

    let xyz = [0.5f32, 0.5, 0.5];
    let mut rgb = [7u8; 3];
    let err = transform(
        Some(&srgb),
        PixelEncoding::XyzF32,
        Some(&lut),
        PixelEncoding::Rgb8,
        1,
        bytemuck::cast_slice(&xyz),
        &mut rgb,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
    assert_eq!(rgb, [7, 7, 7]);
}
