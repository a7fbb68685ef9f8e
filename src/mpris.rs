//! MPRIS (org.mpris.MediaPlayer2) integration over D-Bus.
//!
//! Exposes the transport surface to desktop media keys and tools like
//! `playerctl`. Remote commands are forwarded to the runtime event loop
//! as `ControlCmd`s; playback state flows the other way through the
//! shared state behind `MprisHandle`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::warn;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::player::Phase;
use crate::playlist::Track;

/// Remote transport commands, handled by the runtime event loop.
#[derive(Clone, Debug)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Next,
    Prev,
    /// Volume in the MPRIS 0.0-1.0 range.
    SetVolume(f64),
}

#[derive(Debug, Default)]
struct SharedState {
    phase: Phase,
    title: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
    volume: f64,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_phase(&self, phase: Phase) {
        if let Ok(mut s) = self.state.lock() {
            s.phase = phase;
        }
    }

    pub fn set_volume(&self, volume: f64) {
        if let Ok(mut s) = self.state.lock() {
            s.volume = volume;
        }
    }

    /// Publish metadata for the given track, or clear it with `None`.
    pub fn set_track_metadata(
        &self,
        index: Option<usize>,
        track: Option<&Track>,
        length: Option<Duration>,
    ) {
        if let Ok(mut s) = self.state.lock() {
            s.title = track.map(|t| t.title.clone());
            s.url = track.map(|t| format!("file://{}", t.source.display()));
            s.length_micros = length.map(|d| d.as_micros() as i64);
            s.track_id = index.and_then(|i| {
                ObjectPath::try_from(format!("/org/mpris/MediaPlayer2/track/{i}"))
                    .ok()
                    .map(Into::into)
            });
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "rondo"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        // There is no stopped state beyond pause; position resets happen
        // only through track ends and explicit seeks.
        let _ = self.tx.send(ControlCmd::Pause);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        // NOTE: This returns a &'static str; we map state into static strings.
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.phase {
            Phase::Playing => "Playing",
            Phase::Loading | Phase::Paused | Phase::Errored => "Paused",
            Phase::Unloaded | Phase::Ended => "Stopped",
        }
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.state.lock().map(|s| s.volume).unwrap_or(0.0)
    }

    #[zbus(property)]
    fn set_volume(&mut self, volume: f64) {
        let _ = self
            .tx
            .send(ControlCmd::SetVolume(volume.clamp(0.0, 1.0)));
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(track_id) = &s.track_id {
            insert_value(
                &mut map,
                "mpris:trackid",
                Value::from(track_id.clone().into_inner()),
            );
        }
        if let Some(title) = &s.title {
            insert_value(&mut map, "xesam:title", Value::from(title.clone()));
        }
        if let Some(url) = &s.url {
            insert_value(&mut map, "xesam:url", Value::from(url.clone()));
        }
        if let Some(length) = s.length_micros {
            insert_value(&mut map, "mpris:length", Value::from(length));
        }

        map
    }
}

fn insert_value(map: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    if let Ok(owned) = OwnedValue::try_from(value) {
        map.insert(key.to_string(), owned);
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let path = "/org/mpris/MediaPlayer2";

            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!("MPRIS: failed to connect to session bus: {e}");
                    return;
                }
            };

            if let Err(e) = connection.request_name("org.mpris.MediaPlayer2.rondo").await {
                warn!("MPRIS: failed to acquire name: {e}");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server.at(path, RootIface { tx: tx.clone() }).await {
                warn!("MPRIS: failed to register root iface: {e}");
                return;
            }

            if let Err(e) = object_server
                .at(
                    path,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!("MPRIS: failed to register player iface: {e}");
                return;
            }

            // Keep the service alive.
            loop {
                Timer::after(std::time::Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}
