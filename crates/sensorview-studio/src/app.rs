use sensorview_engine::assets::ShaderSet;
use sensorview_engine::core::{App, AppControl, FrameCtx};
use sensorview_engine::pipeline::{FrameLoop, LoopStats};
use sensorview_engine::render::SensorRenderer;
use sensorview_engine::{Error, Result};

/// Drives one [`FrameLoop`] tick per frame callback.
///
/// GPU resources are built and seeded on the first frame, once the device
/// exists. Window resizes refresh them without polling the sensor. The first
/// error stops the loop and is kept for the caller.
pub struct ViewerApp {
    frame_loop: FrameLoop,
    shaders: ShaderSet,
    renderer: Option<SensorRenderer>,
    clear: wgpu::Color,
    failure: Option<Error>,
}

impl ViewerApp {
    pub fn new(frame_loop: FrameLoop, shaders: ShaderSet, clear: wgpu::Color) -> Self {
        Self {
            frame_loop,
            shaders,
            renderer: None,
            clear,
            failure: None,
        }
    }

    /// Closes the sensor session and hands back the loop's outcome.
    pub fn finish(self) -> (LoopStats, Option<Error>) {
        // GPU resources go before the session.
        drop(self.renderer);
        (self.frame_loop.shutdown(), self.failure)
    }

    fn frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<()> {
        if self.renderer.is_none() {
            let mut renderer = SensorRenderer::new(&ctx.render_ctx(), &self.shaders)?;
            self.frame_loop
                .begin(&mut ctx.surface_sink(&mut renderer, self.clear))?;
            self.renderer = Some(renderer);
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        let mut sink = ctx.surface_sink(renderer, self.clear);
        self.frame_loop.tick(&mut sink)?;
        Ok(())
    }

    fn resized(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<()> {
        // Before the first frame there is nothing to refresh; `begin` reads the new size.
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        let mut sink = ctx.surface_sink(renderer, self.clear);
        self.frame_loop.resized(&mut sink)
    }

    fn control(&mut self, outcome: Result<()>) -> AppControl {
        match outcome {
            Ok(()) => AppControl::Continue,
            Err(err) => {
                log::error!("frame loop stopped: {err}");
                self.failure = Some(err);
                AppControl::Exit
            }
        }
    }
}

impl App for ViewerApp {
    fn on_resized(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.failure.is_some() {
            return AppControl::Exit;
        }
        let outcome = self.resized(ctx);
        self.control(outcome)
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.failure.is_some() {
            return AppControl::Exit;
        }
        let outcome = self.frame(ctx);
        self.control(outcome)
    }
}
