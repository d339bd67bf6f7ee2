use anyhow::Result;

use sensorview_engine::assets::{ShaderSet, default_shader_dir};
use sensorview_engine::pipeline::{BodyVariant, DepthVariant, FrameLoop, Variant};
use sensorview_engine::sensor::{Modality, SensorSession};
use sensorview_engine::window::Runtime;

use crate::app::ViewerApp;
use crate::config::Config;
use crate::report::{FatalReporter, failure_code};

/// Process outcome.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExitStatus {
    Clean,
    Failed,
}

/// Runs the viewer until shutdown.
pub trait Host {
    fn run(&mut self, config: &Config, app: &mut ViewerApp) -> Result<()>;
}

/// The winit window runtime.
pub struct WindowHost;

impl Host for WindowHost {
    fn run(&mut self, config: &Config, app: &mut ViewerApp) -> Result<()> {
        Runtime::run(config.runtime_config(), config.gpu_init(), app)
    }
}

/// Starts the viewer and reports the first failure exactly once.
pub fn run_to_exit(
    config: &Config,
    reporter: &mut dyn FatalReporter,
    host: &mut dyn Host,
) -> ExitStatus {
    match run(config, host) {
        Ok(()) => ExitStatus::Clean,
        Err(err) => {
            reporter.report(failure_code(&err), &format!("{err:#}"));
            ExitStatus::Failed
        }
    }
}

fn run(config: &Config, host: &mut dyn Host) -> Result<()> {
    let modality = config.modality();
    let backend = config.backend();
    log::info!("starting {modality} view on {backend:?} sensor");

    let driver = backend.driver()?;
    let session = SensorSession::open(driver.as_ref(), modality)?;

    let variant: Box<dyn Variant> = match modality {
        Modality::Depth => Box::new(DepthVariant::new()),
        Modality::Body => Box::new(BodyVariant::new(config.camera())),
    };
    let frame_loop = FrameLoop::new(session, variant)?;

    let shader_dir = match &config.assets.shader_dir {
        Some(dir) => dir.clone(),
        None => default_shader_dir()?,
    };
    let shaders = ShaderSet::load(&shader_dir, modality)?;

    let mut app = ViewerApp::new(frame_loop, shaders, config.clear_color());
    let hosted = host.run(config, &mut app);

    let (stats, failure) = app.finish();
    log::debug!("final loop stats: {stats:?}");

    hosted?;
    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
