use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use sensorview_engine::device::GpuInit;
use sensorview_engine::logging::LoggingConfig;
use sensorview_engine::pipeline::CameraConfig;
use sensorview_engine::sensor::{Modality, SensorBackend, frame_interval};
use sensorview_engine::window::RuntimeConfig;
use winit::dpi::LogicalSize;

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "sensorview.toml";

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraSection,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModalityName {
    #[default]
    Depth,
    Body,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendName {
    #[default]
    Synthetic,
    Absent,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SensorConfig {
    #[serde(default)]
    pub modality: ModalityName,
    #[serde(default)]
    pub backend: BackendName,
    /// Delivery rate of the synthetic backend.
    #[serde(default = "default_frame_rate")]
    pub frame_rate_hz: f32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WindowConfig {
    pub title: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_clear_color")]
    pub clear_color: [f64; 4],
    #[serde(default = "default_vsync")]
    pub vsync: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraSection {
    #[serde(default = "default_eye")]
    pub eye: [f32; 3],
    #[serde(default = "default_target")]
    pub target: [f32; 3],
    #[serde(default = "default_up")]
    pub up: [f32; 3],
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AssetsConfig {
    /// Replaces `<exe dir>/shaders`.
    pub shader_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingSection {
    /// `env_logger` filter; wins over `RUST_LOG`.
    pub filter: Option<String>,
}

fn default_frame_rate() -> f32 { 30.0 }
fn default_clear_color() -> [f64; 4] { [0.3, 0.3, 0.3, 1.0] }
fn default_vsync() -> bool { true }
fn default_eye() -> [f32; 3] { [0.0, 0.0, -3.0] }
fn default_target() -> [f32; 3] { [0.0, 0.0, 5.0] }
fn default_up() -> [f32; 3] { [0.0, 1.0, 0.0] }
fn default_fov() -> f32 { 50.0 }
fn default_near() -> f32 { 0.01 }
fn default_far() -> f32 { 1000.0 }

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            modality: ModalityName::default(),
            backend: BackendName::default(),
            frame_rate_hz: default_frame_rate(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: default_clear_color(),
            vsync: default_vsync(),
        }
    }
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            eye: default_eye(),
            target: default_target(),
            up: default_up(),
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        ensure!(
            frame_interval(config.sensor.frame_rate_hz).is_some(),
            "[sensor] frame_rate_hz = {} has no usable frame period",
            config.sensor.frame_rate_hz
        );
        Ok(config)
    }

    /// Explicit path, else `sensorview.toml` in the working directory, else defaults.
    pub fn discover(explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::load(local);
        }
        Ok(Self::default())
    }

    pub fn modality(&self) -> Modality {
        match self.sensor.modality {
            ModalityName::Depth => Modality::Depth,
            ModalityName::Body => Modality::Body,
        }
    }

    pub fn backend(&self) -> SensorBackend {
        match self.sensor.backend {
            BackendName::Synthetic => SensorBackend::Synthetic {
                frame_rate_hz: self.sensor.frame_rate_hz,
            },
            BackendName::Absent => SensorBackend::Absent,
        }
    }

    /// Window size defaults to the modality's native layout.
    pub fn runtime_config(&self) -> RuntimeConfig {
        let modality = self.modality();
        let (w, h) = match modality {
            Modality::Depth => (640, 530),
            Modality::Body => (1280, 720),
        };

        RuntimeConfig {
            title: self
                .window
                .title
                .clone()
                .unwrap_or_else(|| format!("sensorview - {modality}")),
            initial_size: LogicalSize::new(
                self.window.width.unwrap_or(w) as f64,
                self.window.height.unwrap_or(h) as f64,
            ),
        }
    }

    pub fn gpu_init(&self) -> GpuInit {
        GpuInit {
            prefer_srgb: false,
            vsync: self.render.vsync,
            ..GpuInit::default()
        }
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.render.clear_color;
        wgpu::Color { r, g, b, a }
    }

    pub fn camera(&self) -> CameraConfig {
        let c = &self.camera;
        CameraConfig {
            eye: c.eye.into(),
            target: c.target.into(),
            up: c.up.into(),
            fov_y_degrees: c.fov_degrees,
            near: c.near,
            far: c.far,
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            filter: self.logging.filter.clone(),
            ..LoggingConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_depth_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.modality(), Modality::Depth);
        assert_eq!(config.backend(), SensorBackend::Synthetic { frame_rate_hz: 30.0 });

        let rt = config.runtime_config();
        assert_eq!(rt.initial_size, LogicalSize::new(640.0, 530.0));
        assert_eq!(config.clear_color(), wgpu::Color { r: 0.3, g: 0.3, b: 0.3, a: 1.0 });
        assert!(config.gpu_init().vsync);
        assert!(!config.gpu_init().prefer_srgb);
        assert_eq!(config.camera(), CameraConfig::default());
    }

    #[test]
    fn body_modality_uses_wide_window() {
        let config = Config::parse("[sensor]\nmodality = \"body\"\n").unwrap();
        assert_eq!(config.modality(), Modality::Body);
        assert_eq!(config.runtime_config().initial_size, LogicalSize::new(1280.0, 720.0));
        assert_eq!(config.runtime_config().title, "sensorview - body");
    }

    #[test]
    fn explicit_sections_override_defaults() {
        let config = Config::parse(
            r#"
            [sensor]
            backend = "absent"

            [window]
            title = "bench"
            width = 800

            [render]
            vsync = false

            [camera]
            fov_degrees = 60.0

            [assets]
            shader_dir = "/opt/sensorview/shaders"

            [logging]
            filter = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend(), SensorBackend::Absent);
        let rt = config.runtime_config();
        assert_eq!(rt.title, "bench");
        assert_eq!(rt.initial_size, LogicalSize::new(800.0, 530.0));
        assert!(!config.gpu_init().vsync);
        assert_eq!(config.camera().fov_y_degrees, 60.0);
        assert_eq!(config.camera().near, 0.01);
        assert_eq!(
            config.assets.shader_dir.as_deref(),
            Some(Path::new("/opt/sensorview/shaders"))
        );
        assert_eq!(config.logging().filter.as_deref(), Some("debug"));
    }

    #[test]
    fn unknown_modality_is_rejected() {
        assert!(Config::parse("[sensor]\nmodality = \"infrared\"\n").is_err());
        assert!(Config::parse("[sensor]\nbackend = \"usb\"\n").is_err());
    }

    #[test]
    fn frame_rate_without_a_usable_period_is_rejected() {
        assert!(Config::parse("[sensor]\nframe_rate_hz = 1e-20\n").is_err());
        assert!(Config::parse("[sensor]\nframe_rate_hz = 0.0\n").is_err());
        assert!(Config::parse("[sensor]\nframe_rate_hz = -30.0\n").is_err());

        let slow = Config::parse("[sensor]\nframe_rate_hz = 0.5\n").unwrap();
        assert_eq!(slow.backend(), SensorBackend::Synthetic { frame_rate_hz: 0.5 });
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let missing = std::env::temp_dir().join("sensorview-no-such-config.toml");
        assert!(Config::discover(Some(missing)).is_err());
    }
}
