use winit::window::Window;

use crate::device::{Gpu, SurfaceErrorAction};
use crate::error::{Error, Result};
use crate::pipeline::{DrawCall, RenderSink, TransformState};
use crate::sensor::DepthGrid;

use super::SensorRenderer;
use super::ctx::begin_clear_pass;

/// [`RenderSink`] backed by the window surface.
///
/// Borrowed for one frame callback; owns nothing.
pub struct SurfaceSink<'a, 'w> {
    gpu: &'a mut Gpu<'w>,
    window: &'a Window,
    renderer: &'a mut SensorRenderer,
    clear: wgpu::Color,
}

impl<'a, 'w> SurfaceSink<'a, 'w> {
    pub fn new(
        gpu: &'a mut Gpu<'w>,
        window: &'a Window,
        renderer: &'a mut SensorRenderer,
        clear: wgpu::Color,
    ) -> Self {
        Self {
            gpu,
            window,
            renderer,
            clear,
        }
    }
}

impl RenderSink for SurfaceSink<'_, '_> {
    fn upload_depth(&mut self, grid: &DepthGrid<'_>) -> Result<()> {
        let ctx = self.gpu.render_ctx();
        match &mut *self.renderer {
            SensorRenderer::Depth(r) => r.upload(&ctx, grid),
            SensorRenderer::Body(_) => Err(Error::GpuCallFailed(
                "depth upload issued to the body renderer".into(),
            )),
        }
    }

    fn upload_transform(&mut self, transform: &TransformState) -> Result<()> {
        let ctx = self.gpu.render_ctx();
        match &mut *self.renderer {
            SensorRenderer::Body(r) => {
                r.upload(&ctx, transform);
                Ok(())
            }
            SensorRenderer::Depth(_) => Err(Error::GpuCallFailed(
                "transform upload issued to the depth renderer".into(),
            )),
        }
    }

    fn draw(&mut self, call: DrawCall) -> Result<()> {
        if call != self.renderer.draw_call() {
            return Err(Error::GpuCallFailed(format!(
                "{call:?} issued to the {:?} renderer",
                self.renderer.draw_call()
            )));
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => Err(Error::GpuCallFailed(
                        "surface out of memory".into(),
                    )),
                    SurfaceErrorAction::Reconfigure | SurfaceErrorAction::SkipFrame => Ok(()),
                };
            }
        };

        {
            let mut pass = begin_clear_pass(&mut frame.encoder, &frame.view, self.clear);
            match &*self.renderer {
                SensorRenderer::Depth(r) => r.draw(&mut pass, call.vertex_count()),
                SensorRenderer::Body(r) => r.draw(&mut pass, call.vertex_count()),
            }
        }

        self.window.pre_present_notify();
        self.gpu.submit(frame);
        Ok(())
    }

    fn aspect_ratio(&self) -> f32 {
        self.gpu.aspect_ratio()
    }
}
