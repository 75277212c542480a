use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load_from` reads an optional config file, then applies environment
/// variables (prefix `SPINDLE__`) on top, and falls back to struct defaults.
impl Settings {
    /// Load settings using `path` as the config file, if any.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = &path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("SPINDLE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=2).contains(&self.ui.grid_span) {
            return Err("ui.grid_span must be 1 or 2".to_string());
        }
        if self.ui.poll_interval_ms == 0 {
            return Err("ui.poll_interval_ms must be >= 1".to_string());
        }
        if self.ui.artwork_rotation_ms == 0 {
            return Err("ui.artwork_rotation_ms must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err("audio.volume must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `SPINDLE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("SPINDLE_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/spindle/config.toml`
/// or `~/.config/spindle/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_home("XDG_CONFIG_HOME", ".config").map(|d| d.join("spindle").join("config.toml"))
}

/// Default log file under `$XDG_STATE_HOME/spindle/` or `~/.local/state/spindle/`.
pub fn default_log_path() -> Option<PathBuf> {
    xdg_home("XDG_STATE_HOME", ".local/state").map(|d| d.join("spindle").join("spindle.log"))
}

fn xdg_home(var: &str, fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(fallback))
    }
}
