//! GPU rendering for the two sensor views.
//!
//! Each renderer owns its GPU resources (pipeline, buffers, textures) and is
//! built once at startup from the loaded shader pair.

mod body;
mod ctx;
mod depth;
mod sink;
pub mod staging;

pub use body::{BodyRenderer, PYRAMID, PyramidVertex};
pub use ctx::RenderCtx;
pub use depth::DepthRenderer;
pub use sink::SurfaceSink;

use crate::assets::ShaderSet;
use crate::error::Result;
use crate::pipeline::DrawCall;
use crate::sensor::{DEPTH_HEIGHT, DEPTH_WIDTH, Modality};

/// The renderer selected by the configured modality.
pub enum SensorRenderer {
    Depth(DepthRenderer),
    Body(BodyRenderer),
}

impl SensorRenderer {
    pub fn new(ctx: &RenderCtx<'_>, shaders: &ShaderSet) -> Result<Self> {
        Ok(match shaders.modality {
            Modality::Depth => {
                SensorRenderer::Depth(DepthRenderer::new(ctx, shaders, DEPTH_WIDTH, DEPTH_HEIGHT)?)
            }
            Modality::Body => SensorRenderer::Body(BodyRenderer::new(ctx, shaders)?),
        })
    }

    pub fn draw_call(&self) -> DrawCall {
        match self {
            SensorRenderer::Depth(_) => DrawCall::DepthQuad,
            SensorRenderer::Body(_) => DrawCall::BodyPyramid,
        }
    }
}
