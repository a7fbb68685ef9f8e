use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use super::sink::{create_sink_at, probe_duration};
use super::types::{MediaCmd, MediaEvent, RejectReason};

/// How often the thread wakes up to publish position and detect track end.
const TICK: Duration = Duration::from_millis(200);

pub(super) fn spawn_media_thread(
    rx: Receiver<MediaCmd>,
    events: Sender<MediaEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || Backend::new(events).run(&rx))
}

struct Backend {
    events: Sender<MediaEvent>,
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    /// Source of the loaded track; kept around so seeks and re-plays can
    /// rebuild the sink.
    path: Option<PathBuf>,
    generation: u64,
    paused: bool,
    // Start instant plus accumulated elapsed while paused.
    started_at: Option<Instant>,
    accumulated: Duration,
    volume: f32,
}

impl Backend {
    fn new(events: Sender<MediaEvent>) -> Self {
        Self {
            events,
            stream: None,
            sink: None,
            path: None,
            generation: 0,
            paused: true,
            started_at: None,
            accumulated: Duration::ZERO,
            volume: 1.0,
        }
    }

    fn run(mut self, rx: &Receiver<MediaCmd>) {
        loop {
            match rx.recv_timeout(TICK) {
                Ok(MediaCmd::Load { path, generation }) => self.load(path, generation),
                Ok(MediaCmd::Play { generation }) => self.play(generation),
                Ok(MediaCmd::Pause) => self.pause(),
                Ok(MediaCmd::Seek { position }) => self.seek(position),
                Ok(MediaCmd::SetVolume(v)) => self.set_volume(v),
                Ok(MediaCmd::Quit { fade_out_ms }) => {
                    self.quit(fade_out_ms);
                    break;
                }
                Err(RecvTimeoutError::Timeout) => self.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    /// Open the output stream on demand. Absence of a device is not fatal:
    /// loads still succeed (metadata only) and play requests get rejected.
    fn ensure_stream(&mut self) {
        if self.stream.is_some() {
            return;
        }
        match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped. That's
                // useful in debugging, but noisy for a TUI app.
                stream.log_on_drop(false);
                self.stream = Some(stream);
            }
            Err(e) => warn!("no audio output device: {e}"),
        }
    }

    fn load(&mut self, path: PathBuf, generation: u64) {
        debug!(?path, generation, "loading track");

        // A superseded load is not cancelled; its sink is simply replaced.
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.generation = generation;
        self.paused = true;
        self.started_at = None;
        self.accumulated = Duration::ZERO;

        let duration = probe_duration(&path);

        self.ensure_stream();
        if let Some(stream) = self.stream.as_ref() {
            match create_sink_at(stream, &path, Duration::ZERO) {
                Ok(sink) => {
                    sink.set_volume(self.volume);
                    self.sink = Some(sink);
                }
                Err(error) => {
                    warn!(%error, "load failed");
                    self.path = Some(path);
                    let _ = self.events.send(MediaEvent::Failed { generation, error });
                    return;
                }
            }
        }

        self.path = Some(path);
        let _ = self.events.send(MediaEvent::Ready {
            generation,
            duration,
        });
    }

    fn play(&mut self, generation: u64) {
        if self.sink.is_none() && !self.rebuild_sink(generation) {
            return;
        }

        if let Some(sink) = self.sink.as_ref() {
            sink.play();
            if self.paused || self.started_at.is_none() {
                self.started_at = Some(Instant::now());
            }
            self.paused = false;
            let _ = self.events.send(MediaEvent::Playing { generation });
        }
    }

    /// Re-arm the sink from the remembered path, e.g. after the track
    /// drained or the output device reappeared. Reports a rejection and
    /// returns false when that is not possible.
    fn rebuild_sink(&mut self, generation: u64) -> bool {
        self.ensure_stream();

        let reason = match (self.stream.as_ref(), self.path.as_ref()) {
            (Some(stream), Some(path)) => {
                match create_sink_at(stream, path, self.accumulated) {
                    Ok(sink) => {
                        sink.set_volume(self.volume);
                        self.sink = Some(sink);
                        return true;
                    }
                    Err(error) => RejectReason::Backend(error.to_string()),
                }
            }
            (None, _) => RejectReason::DeviceUnavailable,
            (_, None) => RejectReason::Backend("nothing loaded".to_string()),
        };

        let _ = self.events.send(MediaEvent::Rejected { generation, reason });
        false
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        if let Some(started) = self.started_at.take() {
            self.accumulated += started.elapsed();
        }
        self.paused = true;
    }

    /// Scrubbing: rebuild the sink and skip into the file, keeping the
    /// paused/playing state.
    fn seek(&mut self, position: Duration) {
        let Some(path) = self.path.clone() else {
            return;
        };
        self.ensure_stream();
        let Some(stream) = self.stream.as_ref() else {
            return;
        };

        if let Some(old) = self.sink.take() {
            old.stop();
        }

        match create_sink_at(stream, &path, position) {
            Ok(sink) => {
                sink.set_volume(self.volume);
                if self.paused {
                    self.started_at = None;
                } else {
                    sink.play();
                    self.started_at = Some(Instant::now());
                }
                self.sink = Some(sink);
                self.accumulated = position;
                let _ = self.events.send(MediaEvent::Position {
                    generation: self.generation,
                    elapsed: position,
                });
            }
            Err(error) => {
                warn!(%error, "seek failed");
                let _ = self.events.send(MediaEvent::Failed {
                    generation: self.generation,
                    error,
                });
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(self.volume);
        }
    }

    fn tick(&mut self) {
        if self.paused || self.sink.is_none() {
            return;
        }

        let drained = self.sink.as_ref().is_some_and(|s| s.empty());
        if drained {
            // Report the end once and drop the sink. What happens next
            // (repeat, advance, stop) is the controller's call.
            self.sink = None;
            self.paused = true;
            self.started_at = None;
            self.accumulated = Duration::ZERO;
            let _ = self.events.send(MediaEvent::Ended {
                generation: self.generation,
            });
        } else {
            let elapsed = self.accumulated
                + self
                    .started_at
                    .map_or(Duration::ZERO, |started| started.elapsed());
            let _ = self.events.send(MediaEvent::Position {
                generation: self.generation,
                elapsed,
            });
        }
    }

    fn quit(&mut self, fade_out_ms: u64) {
        if let Some(sink) = self.sink.as_ref() {
            fade_out_sink(sink, fade_out_ms);
            sink.stop();
        }
    }
}

/// Fade the sink from its current volume down to silence.
fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    let start = sink.volume();
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(start * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
