use winit::window::Window;

use crate::device::Gpu;
use crate::render::{RenderCtx, SensorRenderer, SurfaceSink};

/// Per-tick context passed to [`super::App::on_frame`].
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        self.gpu.render_ctx()
    }

    /// Wraps the surface and `renderer` as the frame loop's sink.
    pub fn surface_sink<'s>(
        &'s mut self,
        renderer: &'s mut SensorRenderer,
        clear: wgpu::Color,
    ) -> SurfaceSink<'s, 'w> {
        SurfaceSink::new(&mut *self.gpu, self.window, renderer, clear)
    }
}
