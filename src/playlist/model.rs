use std::path::PathBuf;

use crate::config::TrackEntry;

/// One playable audio item.
#[derive(Clone, Debug)]
pub struct Track {
    pub title: String,
    pub source: PathBuf,
    /// Duration string rendered in the track list, straight from config.
    pub display_duration: String,
}

/// Ordered sequence of tracks, fixed at startup. Empty is valid.
#[derive(Clone, Debug, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Build the playlist from config entries, in order.
    pub fn from_entries(entries: &[TrackEntry]) -> Self {
        let tracks = entries
            .iter()
            .map(|entry| Track {
                title: title_for(entry),
                source: entry.file.clone(),
                display_duration: entry.duration.trim().to_string(),
            })
            .collect();
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

fn title_for(entry: &TrackEntry) -> String {
    let title = entry.title.trim();
    if !title.is_empty() {
        return title.to_string();
    }

    entry
        .file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string()
}
