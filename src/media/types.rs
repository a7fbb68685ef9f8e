//! Media-thread command and event types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug)]
pub enum MediaCmd {
    /// Load the given file into a paused sink, replacing the current one.
    Load { path: PathBuf, generation: u64 },
    /// Start or resume playback of the loaded track.
    Play { generation: u64 },
    /// Pause playback immediately.
    Pause,
    /// Seek to an absolute position in the current track.
    Seek { position: Duration },
    /// Set the output volume in the backend's native 0.0-1.0 range.
    SetVolume(f32),
    /// Quit the media thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Asynchronous outcomes reported by the media thread.
#[derive(Debug)]
pub enum MediaEvent {
    /// The track loaded; metadata (probed duration) is available.
    Ready {
        generation: u64,
        duration: Option<Duration>,
    },
    /// A play request succeeded.
    Playing { generation: u64 },
    /// A play request failed.
    Rejected {
        generation: u64,
        reason: RejectReason,
    },
    /// Periodic elapsed-time update while playing.
    Position { generation: u64, elapsed: Duration },
    /// The track finished on its own.
    Ended { generation: u64 },
    /// The track could not be loaded.
    Failed { generation: u64, error: MediaError },
}

impl MediaEvent {
    /// The load generation this event belongs to.
    pub fn generation(&self) -> u64 {
        match self {
            Self::Ready { generation, .. }
            | Self::Playing { generation, .. }
            | Self::Rejected { generation, .. }
            | Self::Position { generation, .. }
            | Self::Ended { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }
}

/// Why a play request was turned down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No usable audio output device right now; a later request may work.
    DeviceUnavailable,
    /// Any other backend failure.
    Backend(String),
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("could not open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
}
