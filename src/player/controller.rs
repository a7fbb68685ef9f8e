use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::media::{MediaCmd, MediaEvent, RejectReason};
use crate::playlist::Playlist;

/// Lifecycle phase of the current track.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Unloaded,
    Loading,
    Playing,
    Paused,
    Ended,
    Errored,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Unloaded
    }
}

/// What happens when the current track finishes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RepeatMode {
    None,
    One,
    All,
}

/// Four-tier state of the volume indicator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VolumeIcon {
    Muted,
    Low,
    Mid,
    High,
}

/// A transient on-screen message, expired by the event loop after the
/// configured duration.
#[derive(Clone, Debug)]
pub struct Notification {
    pub text: String,
    pub shown_at: Instant,
}

/// The playback state machine. One instance per session; the media
/// backend is injected as a command channel and the renderer reads
/// derived values.
pub struct PlaylistController {
    playlist: Playlist,
    media: Sender<MediaCmd>,

    phase: Phase,
    current: Option<usize>,
    /// Whether playback is (or is meant to be) running. Survives track
    /// changes so next/previous can resume on the new track.
    playing: bool,
    /// A play request is in flight; its outcome event is still welcome.
    awaiting_play: bool,
    repeat: RepeatMode,
    shuffle: bool,
    /// Play order over playlist indices; identity unless shuffled.
    order: Vec<usize>,
    volume: u8,

    /// Load epoch. Bumped on every load; events from older generations
    /// are dropped.
    generation: u64,
    duration: Option<Duration>,
    position: Duration,
    notification: Option<Notification>,
}

impl PlaylistController {
    pub fn new(playlist: Playlist, media: Sender<MediaCmd>) -> Self {
        let order = (0..playlist.len()).collect();
        Self {
            playlist,
            media,
            phase: Phase::Unloaded,
            current: None,
            playing: false,
            awaiting_play: false,
            repeat: RepeatMode::None,
            shuffle: false,
            order,
            volume: 80,
            generation: 0,
            duration: None,
            position: Duration::ZERO,
            notification: None,
        }
    }

    /// Load the track at `index`. Out-of-range indices and an empty
    /// playlist are silent no-ops.
    pub fn load_track(&mut self, index: usize) {
        let Some(track) = self.playlist.get(index) else {
            return;
        };

        self.generation += 1;
        self.current = Some(index);
        self.duration = None;
        self.position = Duration::ZERO;
        self.phase = Phase::Loading;
        let _ = self.media.send(MediaCmd::Load {
            path: track.source.clone(),
            generation: self.generation,
        });
    }

    /// Request playback. The outcome arrives later as a `Playing` or
    /// `Rejected` event; the playing flag is only set on success.
    pub fn play(&mut self) {
        if self.playlist.is_empty() {
            self.notify_empty_playlist();
            return;
        }
        if self.current.is_none() {
            self.load_track(self.first_in_order());
        }
        self.awaiting_play = true;
        let _ = self.media.send(MediaCmd::Play {
            generation: self.generation,
        });
    }

    /// Pause playback. Synchronous; always succeeds.
    pub fn pause(&mut self) {
        self.playing = false;
        self.awaiting_play = false;
        if self.phase == Phase::Playing || self.phase == Phase::Loading {
            self.phase = Phase::Paused;
        }
        let _ = self.media.send(MediaCmd::Pause);
    }

    pub fn toggle_play_pause(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn next_track(&mut self) {
        self.change_track(true);
    }

    pub fn previous_track(&mut self) {
        self.change_track(false);
    }

    fn change_track(&mut self, forward: bool) {
        if self.playlist.is_empty() {
            self.notify_empty_playlist();
            return;
        }
        let target = self
            .step_in_order(forward)
            .unwrap_or_else(|| self.first_in_order());
        self.jump_to(target);
    }

    /// Explicit jump to an arbitrary index. Invalid indices are silent
    /// no-ops; playback resumes on the new track if it was active.
    pub fn select_track(&mut self, index: usize) {
        if self.playlist.is_empty() {
            self.notify_empty_playlist();
            return;
        }
        if index >= self.playlist.len() {
            return;
        }
        self.jump_to(index);
    }

    fn jump_to(&mut self, index: usize) {
        let resume = self.playing;
        self.load_track(index);
        if resume {
            self.play();
        }
    }

    /// Playback-continuation policy, applied when the current track
    /// finishes on its own.
    pub fn on_media_ended(&mut self) {
        let Some(current) = self.current else {
            return;
        };

        match self.repeat {
            RepeatMode::One => {
                // Replay the same track from the start.
                self.load_track(current);
                self.play();
            }
            RepeatMode::All => self.advance_after_end(),
            RepeatMode::None if !self.is_last_in_order() => self.advance_after_end(),
            RepeatMode::None => {
                // End of the playlist: stop here, re-armed at position
                // zero so a later play starts from the beginning.
                self.playing = false;
                self.awaiting_play = false;
                self.load_track(current);
                self.phase = Phase::Ended;
            }
        }
    }

    fn advance_after_end(&mut self) {
        let target = self
            .step_in_order(true)
            .unwrap_or_else(|| self.first_in_order());
        let resume = self.playing;
        self.load_track(target);
        if resume {
            self.play();
        }
    }

    /// Seek to a fraction of the track. A no-op until the duration is
    /// known, since there is nothing to scale by before metadata loads.
    pub fn seek_to(&mut self, fraction: f64) {
        let Some(duration) = self.duration else {
            return;
        };
        if !fraction.is_finite() {
            return;
        }

        let target = duration.mul_f64(fraction.clamp(0.0, 1.0));
        self.position = target;
        let _ = self.media.send(MediaCmd::Seek { position: target });
    }

    /// Relative scrub in whole seconds, expressed through `seek_to`.
    pub fn seek_by(&mut self, seconds: i64) {
        let Some(duration) = self.duration else {
            return;
        };
        if duration.is_zero() {
            return;
        }

        let target = (self.position.as_secs_f64() + seconds as f64).max(0.0);
        self.seek_to(target / duration.as_secs_f64());
    }

    /// Set the volume (0-100, clamped). The scaled 0.0-1.0 value is
    /// forwarded to the backend.
    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
        let _ = self
            .media
            .send(MediaCmd::SetVolume(f32::from(self.volume) / 100.0));
    }

    pub fn volume_up(&mut self) {
        self.set_volume(self.volume.saturating_add(10));
    }

    pub fn volume_down(&mut self) {
        self.set_volume(self.volume.saturating_sub(10));
    }

    /// Icon tier for the current volume: muted at 0, low below 30, mid
    /// below 70, high from 70 up.
    pub fn volume_icon(&self) -> VolumeIcon {
        match self.volume {
            0 => VolumeIcon::Muted,
            1..=29 => VolumeIcon::Low,
            30..=69 => VolumeIcon::Mid,
            _ => VolumeIcon::High,
        }
    }

    /// Cycle `none -> all -> one -> none`.
    pub fn cycle_repeat_mode(&mut self) {
        self.repeat = match self.repeat {
            RepeatMode::None => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::None,
        };
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Toggle shuffle: a fresh random permutation on, identity order off.
    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
        self.order = (0..self.playlist.len()).collect();
        if self.shuffle {
            self.order.shuffle(&mut rand::rng());
        }
    }

    pub fn set_shuffle(&mut self, on: bool) {
        if self.shuffle != on {
            self.toggle_shuffle();
        }
    }

    /// Apply an asynchronous outcome from the media backend. Events from
    /// a superseded load generation are logged and dropped.
    pub fn on_media_event(&mut self, event: MediaEvent) {
        if event.generation() != self.generation {
            debug!(?event, "dropping stale media event");
            return;
        }

        match event {
            MediaEvent::Ready { duration, .. } => {
                self.duration = duration;
                if self.phase == Phase::Loading && !self.playing && !self.awaiting_play {
                    self.phase = Phase::Paused;
                }
            }
            MediaEvent::Playing { .. } => {
                if self.awaiting_play || self.playing {
                    self.awaiting_play = false;
                    self.playing = true;
                    self.phase = Phase::Playing;
                } else {
                    debug!("dropping playback confirmation, pause already requested");
                }
            }
            MediaEvent::Rejected { reason, .. } => {
                if !self.awaiting_play {
                    debug!(?reason, "dropping rejection for a superseded play request");
                    return;
                }
                self.awaiting_play = false;
                self.playing = false;
                match reason {
                    RejectReason::DeviceUnavailable => {
                        self.phase = Phase::Paused;
                        self.notify("Audio device unavailable, press space to retry");
                    }
                    RejectReason::Backend(_) => {
                        self.phase = Phase::Errored;
                        self.notify("Playback failed");
                    }
                }
            }
            MediaEvent::Position { elapsed, .. } => {
                self.position = elapsed;
            }
            MediaEvent::Ended { .. } => self.on_media_ended(),
            MediaEvent::Failed { error, .. } => {
                warn!(%error, "track failed to load");
                self.playing = false;
                self.awaiting_play = false;
                self.phase = Phase::Errored;
                let text = match self.current.and_then(|i| self.playlist.get(i)) {
                    Some(track) => format!("Could not load \"{}\"", track.title),
                    None => "Could not load the track".to_string(),
                };
                self.notify(text);
            }
        }
    }

    // Derived values read by the renderer.

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    /// Title of the current track; `None` when nothing is loaded.
    pub fn current_title(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.playlist.get(i))
            .map(|t| t.title.as_str())
    }

    /// Playback progress as a 0.0-1.0 fraction; 0.0 before metadata.
    pub fn progress_fraction(&self) -> f64 {
        match self.duration {
            Some(d) if !d.is_zero() => {
                (self.position.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    pub fn elapsed_text(&self) -> String {
        format_time(self.position.as_secs_f64())
    }

    /// Total-duration text; the `0:00` sentinel before metadata loads.
    pub fn duration_text(&self) -> String {
        match self.duration {
            Some(d) => format_time(d.as_secs_f64()),
            None => format_time(f64::NAN),
        }
    }

    /// Glyph for the transport toggle: pause while playing, play otherwise.
    pub fn transport_glyph(&self) -> &'static str {
        if self.playing { "⏸" } else { "▶" }
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Drop the active notification once it has been visible for `ttl`.
    pub fn expire_notification(&mut self, ttl: Duration) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| n.shown_at.elapsed() >= ttl)
        {
            self.notification = None;
        }
    }

    fn notify(&mut self, text: impl Into<String>) {
        self.notification = Some(Notification {
            text: text.into(),
            shown_at: Instant::now(),
        });
    }

    fn notify_empty_playlist(&mut self) {
        self.notify("Playlist is empty: add tracks in config.toml");
    }

    fn first_in_order(&self) -> usize {
        self.order.first().copied().unwrap_or(0)
    }

    fn is_last_in_order(&self) -> bool {
        match self.current {
            Some(current) => self.order.last() == Some(&current),
            None => true,
        }
    }

    /// The neighbouring index in play order, wrapping at both ends.
    fn step_in_order(&self, forward: bool) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        let current = self.current?;
        let pos = self
            .order
            .iter()
            .position(|&i| i == current)
            .unwrap_or(0);
        let next = if forward {
            (pos + 1) % self.order.len()
        } else if pos == 0 {
            self.order.len() - 1
        } else {
            pos - 1
        };
        Some(self.order[next])
    }
}

/// Format seconds as `M:SS` with zero-padded seconds. Non-finite or
/// negative input (no metadata yet) renders the `0:00` sentinel.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
