mod app;
mod config;
mod report;
mod startup;

use std::path::PathBuf;
use std::process::ExitCode;

use sensorview_engine::logging::{LoggingConfig, init_logging};

use config::Config;
use report::{DialogReporter, FatalReporter, STARTUP_FAILED};
use startup::{ExitStatus, WindowHost, run_to_exit};

fn main() -> ExitCode {
    let config = match Config::discover(std::env::args_os().nth(1).map(PathBuf::from)) {
        Ok(config) => config,
        Err(err) => {
            init_logging(LoggingConfig::default());
            DialogReporter.report(STARTUP_FAILED, &format!("{err:#}"));
            return ExitCode::FAILURE;
        }
    };

    init_logging(config.logging());

    match run_to_exit(&config, &mut DialogReporter, &mut WindowHost) {
        ExitStatus::Clean => ExitCode::SUCCESS,
        ExitStatus::Failed => ExitCode::FAILURE,
    }
}
