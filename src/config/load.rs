use std::{
    env,
    path::{Path, PathBuf},
};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `RONDO__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("RONDO")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.playback.volume > 100 {
            return Err("playback.volume must be between 0 and 100".to_string());
        }
        if let Some(entry) = self.tracks.iter().find(|t| t.file.as_os_str().is_empty()) {
            return Err(format!("track \"{}\" has an empty file path", entry.title));
        }
        Ok(())
    }
}

/// Resolve the config path from `RONDO_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("RONDO_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/rondo/config.toml`
/// or `~/.config/rondo/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("rondo").join("config.toml"))
}

const TEMPLATE_HEADER: &str = "\
# rondo configuration.
#
# Tracks play in the order they appear here. Example entry:
#
#   [[tracks]]
#   title = \"First song\"
#   file = \"/home/you/Music/first.mp3\"
#   duration = \"2:04\"

";

/// Seed a starter config at `path` on first run so the track list has an
/// obvious home. Existing files are left untouched.
pub fn write_template(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let defaults = toml::to_string_pretty(&Settings::default())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let mut body = String::from(TEMPLATE_HEADER);
    body.push_str(&defaults);
    std::fs::write(path, body)
}
