//! Color conversion pipelines
//!
//! A [`Pipeline`] converts a block of working pixels from a source endpoint
//! to a destination endpoint. Matrix/shaper profiles (every profile this
//! crate creates, and most RGB ICC files) run natively. Other RGB profiles,
//! e.g. LUT-based ones, are handed to moxcms.

mod matrix_shaper;
mod stages;

pub use matrix_shaper::MatrixShaper;
pub use stages::{ChannelCurve, TrcStage};

use std::sync::Arc;

use crate::pixel::PixelEncoding;
use crate::profile::ColorProfile;
use crate::{Error, Result};

#[derive(Clone)]
pub enum Pipeline {
    /// Values are copied through; only the encoding changes
    Passthrough,
    Native(MatrixShaper),
    External(Arc<moxcms::TransformF32Executor>),
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pipeline::Passthrough => f.write_str("Passthrough"),
            Pipeline::Native(m) => f.debug_tuple("Native").field(m).finish(),
            Pipeline::External(_) => f.write_str("External(moxcms)"),
        }
    }
}

impl Pipeline {
    /// Pick the conversion between two endpoints.
    ///
    /// A missing profile on either side means format-only reformatting.
    pub fn new(
        src: Option<&ColorProfile>,
        src_encoding: PixelEncoding,
        dst: Option<&ColorProfile>,
        dst_encoding: PixelEncoding,
    ) -> Result<Self> {
        let (Some(src), Some(dst)) = (src, dst) else {
            return Ok(Pipeline::Passthrough);
        };
        let src_xyz = src_encoding.is_xyz();
        let dst_xyz = dst_encoding.is_xyz();
        if src_xyz == dst_xyz && src.matches(dst) {
            return Ok(Pipeline::Passthrough);
        }

        if src.icc().is_matrix_shaper() && dst.icc().is_matrix_shaper() {
            return MatrixShaper::new(src, src_xyz, dst, dst_xyz).map(Pipeline::Native);
        }
        if src_xyz || dst_xyz {
            return Err(Error::Unsupported(
                "XYZ pixels need matrix/shaper profiles on both sides".to_string(),
            ));
        }
        external(src, dst).map(Pipeline::External)
    }

    /// Whether [`Pipeline::run`] can fail part way through a batch
    pub fn is_external(&self) -> bool {
        matches!(self, Pipeline::External(_))
    }

    /// Convert `block` in place. `scratch` is reused across blocks by
    /// pipelines that cannot work in place.
    pub fn run(&self, block: &mut [[f32; 4]], scratch: &mut Vec<[f32; 4]>) -> Result<()> {
        match self {
            Pipeline::Passthrough => Ok(()),
            Pipeline::Native(shaper) => {
                shaper.run(block);
                Ok(())
            }
            Pipeline::External(executor) => {
                scratch.resize(block.len(), [0.0; 4]);
                let out = &mut scratch[..block.len()];
                executor
                    .transform(
                        bytemuck::cast_slice(&*block),
                        bytemuck::cast_slice_mut(&mut *out),
                    )
                    .map_err(|e| Error::Transform(format!("{:?}", e)))?;
                for (px, converted) in block.iter_mut().zip(out.iter()) {
                    px[..3].copy_from_slice(&converted[..3]);
                }
                Ok(())
            }
        }
    }
}

fn external(
    src: &ColorProfile,
    dst: &ColorProfile,
) -> Result<Arc<moxcms::TransformF32Executor>> {
    let open = |p: &ColorProfile| -> Result<moxcms::ColorProfile> {
        moxcms::ColorProfile::new_from_slice(p.pack()?)
            .map_err(|e| Error::Transform(format!("{:?}", e)))
    };
    let src = open(src)?;
    let dst = open(dst)?;
    src.create_transform_f32(
        moxcms::Layout::Rgba,
        &dst,
        moxcms::Layout::Rgba,
        moxcms::TransformOptions::default(),
    )
    .map_err(|e| Error::Transform(format!("{:?}", e)))
}
