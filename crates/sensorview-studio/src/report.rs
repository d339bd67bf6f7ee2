use sensorview_engine::Error;

/// Code used for failures outside the pipeline taxonomy (configuration, window).
pub const STARTUP_FAILED: &str = "StartupFailed";

/// Surfaces a fatal error to the user, once.
pub trait FatalReporter {
    fn report(&mut self, code: &str, message: &str);
}

/// Blocking native message box.
pub struct DialogReporter;

impl FatalReporter for DialogReporter {
    fn report(&mut self, code: &str, message: &str) {
        log::error!("[{code}] {message}");

        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(format!("sensorview: {code}"))
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

/// Stable code of the first pipeline error in `err`'s chain.
pub fn failure_code(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|e| e.downcast_ref::<Error>())
        .map(Error::code)
        .unwrap_or(STARTUP_FAILED)
}
