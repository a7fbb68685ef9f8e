use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/rondo/config.toml` or
/// `~/.config/rondo/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `RONDO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub audio: AudioSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
    /// The playlist: an ordered, fixed list of tracks. An empty list is
    /// valid; the player starts with nothing loaded.
    pub tracks: Vec<TrackEntry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playback: PlaybackSettings::default(),
            audio: AudioSettings::default(),
            controls: ControlsSettings::default(),
            ui: UiSettings::default(),
            log: LogSettings::default(),
            tracks: Vec::new(),
        }
    }
}

/// One playlist entry as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackEntry {
    pub title: String,
    pub file: PathBuf,
    /// Duration shown in the track list. Display-only; the playable
    /// duration is probed from the file once it loads.
    #[serde(default = "default_track_duration")]
    pub duration: String,
}

fn default_track_duration() -> String {
    "0:00".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether to request playback as soon as the player starts.
    pub autoplay: bool,
    /// Default repeat mode.
    pub repeat_mode: RepeatModeSetting,
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Initial volume, 0-100.
    pub volume: u8,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            autoplay: false,
            repeat_mode: RepeatModeSetting::None,
            shuffle: false,
            volume: 80,
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatModeSetting {
    #[serde(alias = "off")]
    None,
    #[serde(alias = "repeat_one", alias = "repeat-one")]
    One,
    #[serde(alias = "repeat_all", alias = "repeat-all", alias = "loop")]
    All,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { scrub_seconds: 5 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// How long a transient notification stays on screen (milliseconds).
    pub notification_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ rondo: round and round it goes ~ ".to_string(),
            notification_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Optional log file. With no file set, logging is disabled entirely
    /// so the terminal stays clean.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Log filter directives, `tracing` env-filter syntax.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: None,
            filter: "info".to_string(),
        }
    }
}
