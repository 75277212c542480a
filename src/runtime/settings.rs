use std::path::PathBuf;

use tracing::warn;

use crate::config;

/// Load settings from `path` (else the default location), falling back to
/// defaults when the file is broken or invalid.
///
/// Returns the settings plus a warning to log once logging is up.
pub fn load_settings(path: Option<PathBuf>) -> (config::Settings, Option<String>) {
    let path = path.or_else(config::resolve_config_path);
    match config::Settings::load_from(path) {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                (
                    config::Settings::default(),
                    Some(format!("invalid config, using defaults: {msg}")),
                )
            } else {
                (s, None)
            }
        }
        // Config is optional; failures should not prevent the app from starting.
        Err(e) => (
            config::Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}

pub fn report(problem: Option<&str>) {
    if let Some(msg) = problem {
        warn!("{msg}");
    }
}
