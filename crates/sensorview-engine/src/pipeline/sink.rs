use crate::error::Result;
use crate::sensor::DepthGrid;

use super::transform::TransformState;

/// The fixed draw each variant issues.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawCall {
    /// Full-screen depth quad: 4 vertices, triangle strip.
    DepthQuad,
    /// Body orientation pyramid: 18 vertices, triangle list.
    BodyPyramid,
}

impl DrawCall {
    pub const fn vertex_count(self) -> u32 {
        match self {
            DrawCall::DepthQuad => 4,
            DrawCall::BodyPyramid => 18,
        }
    }
}

/// GPU-facing side of the frame loop.
///
/// Uploads are synchronous from the caller's view: once a method returns, a
/// following `draw` observes the new contents.
pub trait RenderSink {
    /// Copies every row of `grid` into the dynamic depth texture.
    fn upload_depth(&mut self, grid: &DepthGrid<'_>) -> Result<()>;

    /// Writes the 64-byte transform block into the constant buffer.
    fn upload_transform(&mut self, transform: &TransformState) -> Result<()>;

    /// Clears, binds, draws, presents.
    fn draw(&mut self, call: DrawCall) -> Result<()>;

    /// Width / height of the current render target.
    fn aspect_ratio(&self) -> f32;
}
