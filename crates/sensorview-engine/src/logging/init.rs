use std::sync::Once;

/// Crates whose info-level output is noise for this application.
const QUIET_MODULES: [&str; 4] = ["wgpu_core", "wgpu_hal", "naga", "winit"];

/// Logger configuration.
///
/// `filter` follows the `env_logger` filter syntax (e.g. "info",
/// "sensorview_engine=debug,wgpu_core=warn").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Filter precedence: explicit configuration, then `RUST_LOG`, then `info`.
pub fn resolve_filter(configured: Option<&str>, env: Option<&str>) -> String {
    let usable = |f: &str| !f.trim().is_empty();
    configured
        .filter(|f| usable(f))
        .or(env.filter(|f| usable(f)))
        .unwrap_or("info")
        .trim()
        .to_string()
}

/// Initializes the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let env = std::env::var("RUST_LOG").ok();
        let filter = resolve_filter(config.filter.as_deref(), env.as_deref());

        let mut builder = env_logger::Builder::new();
        for module in QUIET_MODULES {
            builder.filter_module(module, log::LevelFilter::Warn);
        }
        // Parsed last so explicit directives win over the quiet defaults.
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logging initialized with filter '{filter}'");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_beats_environment() {
        assert_eq!(resolve_filter(Some("debug"), Some("warn")), "debug");
    }

    #[test]
    fn environment_used_when_unconfigured() {
        assert_eq!(resolve_filter(None, Some("trace")), "trace");
    }

    #[test]
    fn blank_values_fall_back_to_info() {
        assert_eq!(resolve_filter(None, None), "info");
        assert_eq!(resolve_filter(Some("  "), None), "info");
        assert_eq!(resolve_filter(Some(""), Some("warn")), "warn");
    }
}
