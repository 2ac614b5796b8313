//! Reference engine wrappers
//!
//! Every wrapper takes packed ICC bytes, so the reference engines see exactly
//! what a container would carry.

use lcms2::{Flags, Intent, PixelFormat, Profile, Transform};
use oxcolor_core::{ColorProfile, PixelEncoding};

/// RGB8 through lcms2, relative colorimetric, unoptimized so tabulated
/// curves are not resampled into a coarse grid
pub fn lcms2_rgb8(src_icc: &[u8], dst_icc: &[u8], pixels: &[u8]) -> Result<Vec<u8>, String> {
    let src = Profile::new_icc(src_icc).map_err(|e| format!("lcms2 src profile: {}", e))?;
    let dst = Profile::new_icc(dst_icc).map_err(|e| format!("lcms2 dst profile: {}", e))?;
    let transform = Transform::<[u8; 3], [u8; 3]>::new_flags(
        &src,
        PixelFormat::RGB_8,
        &dst,
        PixelFormat::RGB_8,
        Intent::RelativeColorimetric,
        Flags::NO_OPTIMIZE,
    )
    .map_err(|e| format!("lcms2 transform: {}", e))?;

    let input: &[[u8; 3]] = bytemuck::cast_slice(pixels);
    let mut output = vec![[0u8; 3]; input.len()];
    transform.transform_pixels(input, &mut output);
    Ok(output.into_iter().flatten().collect())
}

/// RGB16 through lcms2, relative colorimetric
pub fn lcms2_rgb16(src_icc: &[u8], dst_icc: &[u8], pixels: &[u16]) -> Result<Vec<u16>, String> {
    let src = Profile::new_icc(src_icc).map_err(|e| format!("lcms2 src profile: {}", e))?;
    let dst = Profile::new_icc(dst_icc).map_err(|e| format!("lcms2 dst profile: {}", e))?;
    let transform = Transform::<[u16; 3], [u16; 3]>::new_flags(
        &src,
        PixelFormat::RGB_16,
        &dst,
        PixelFormat::RGB_16,
        Intent::RelativeColorimetric,
        Flags::NO_OPTIMIZE,
    )
    .map_err(|e| format!("lcms2 transform: {}", e))?;

    let input: &[[u16; 3]] = bytemuck::cast_slice(pixels);
    let mut output = vec![[0u16; 3]; input.len()];
    transform.transform_pixels(input, &mut output);
    Ok(output.into_iter().flatten().collect())
}

/// Float RGB to D50 PCS XYZ through lcms2
pub fn lcms2_rgb_to_pcs_xyz(icc: &[u8], rgb: &[[f32; 3]]) -> Result<Vec<[f32; 3]>, String> {
    let src = Profile::new_icc(icc).map_err(|e| format!("lcms2 profile: {}", e))?;
    let xyz = Profile::new_xyz();
    let transform = Transform::<[f32; 3], [f32; 3]>::new(
        &src,
        PixelFormat::RGB_FLT,
        &xyz,
        PixelFormat::XYZ_FLT,
        Intent::RelativeColorimetric,
    )
    .map_err(|e| format!("lcms2 transform: {}", e))?;

    let mut output = vec![[0f32; 3]; rgb.len()];
    transform.transform_pixels(rgb, &mut output);
    Ok(output)
}

/// What moxcms reads out of a profile
#[derive(Debug, Clone)]
pub struct MoxcmsView {
    pub red: [f64; 3],
    pub green: [f64; 3],
    pub blue: [f64; 3],
    pub white: [f64; 3],
    pub has_cicp: bool,
    pub has_chad: bool,
}

pub fn moxcms_view(icc: &[u8]) -> Result<MoxcmsView, String> {
    let p = moxcms::ColorProfile::new_from_slice(icc).map_err(|e| format!("moxcms: {:?}", e))?;
    let xyz = |v: moxcms::Xyzd| [v.x, v.y, v.z];
    Ok(MoxcmsView {
        red: xyz(p.red_colorant),
        green: xyz(p.green_colorant),
        blue: xyz(p.blue_colorant),
        white: xyz(p.white_point),
        has_cicp: p.cicp.is_some(),
        has_chad: p.chromatic_adaptation.is_some(),
    })
}

/// RGB8 through moxcms
pub fn moxcms_rgb8(src_icc: &[u8], dst_icc: &[u8], pixels: &[u8]) -> Result<Vec<u8>, String> {
    use moxcms::{Layout, TransformOptions};

    let src = moxcms::ColorProfile::new_from_slice(src_icc)
        .map_err(|e| format!("moxcms src profile: {:?}", e))?;
    let dst = moxcms::ColorProfile::new_from_slice(dst_icc)
        .map_err(|e| format!("moxcms dst profile: {:?}", e))?;
    let transform = src
        .create_transform_8bit(Layout::Rgb, &dst, Layout::Rgb, TransformOptions::default())
        .map_err(|e| format!("moxcms transform: {:?}", e))?;

    let mut output = vec![0u8; pixels.len()];
    transform
        .transform(pixels, &mut output)
        .map_err(|e| format!("moxcms execute: {:?}", e))?;
    Ok(output)
}

/// RGB8 through oxcolor
pub fn oxcolor_rgb8(src: &ColorProfile, dst: &ColorProfile, pixels: &[u8]) -> Vec<u8> {
    let mut output = vec![0u8; pixels.len()];
    oxcolor_core::transform(
        Some(src),
        PixelEncoding::Rgb8,
        Some(dst),
        PixelEncoding::Rgb8,
        pixels.len() / 3,
        pixels,
        &mut output,
    )
    .expect("oxcolor transform");
    output
}

/// RGB16 through oxcolor
pub fn oxcolor_rgb16(src: &ColorProfile, dst: &ColorProfile, pixels: &[u16]) -> Vec<u16> {
    let mut output = vec![0u16; pixels.len()];
    oxcolor_core::transform(
        Some(src),
        PixelEncoding::Rgb16,
        Some(dst),
        PixelEncoding::Rgb16,
        pixels.len() / 3,
        bytemuck::cast_slice(pixels),
        bytemuck::cast_slice_mut(&mut output),
    )
    .expect("oxcolor transform");
    output
}
