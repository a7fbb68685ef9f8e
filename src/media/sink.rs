//! Helpers for creating `rodio` sinks and probing track metadata.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::MediaError;

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    handle: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<Sink, MediaError> {
    let file = File::open(path).map_err(|source| MediaError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let source = Decoder::new(BufReader::new(file))
        .map_err(|source| MediaError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        // `skip_duration` is the seeking primitive; even Duration::ZERO is fine.
        .skip_duration(start_at);

    let sink = Sink::connect_new(handle.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}

/// Probe the playable duration from the file's tags. `None` when the file
/// cannot be read as tagged audio; the caller treats that as "metadata
/// not available yet".
pub(super) fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
}
