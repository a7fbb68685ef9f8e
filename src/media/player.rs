use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use super::backend::spawn_media_thread;
use super::types::{MediaCmd, MediaEvent};

/// Handle to the media thread. Commands go in through `send`; outcomes
/// come back on the event receiver returned by [`MediaPlayer::spawn`].
pub struct MediaPlayer {
    tx: Sender<MediaCmd>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl MediaPlayer {
    pub fn spawn() -> (Self, Receiver<MediaEvent>) {
        let (tx, rx) = mpsc::channel::<MediaCmd>();
        let (event_tx, event_rx) = mpsc::channel::<MediaEvent>();
        let join = spawn_media_thread(rx, event_tx);

        (
            Self {
                tx,
                join: Mutex::new(Some(join)),
            },
            event_rx,
        )
    }

    /// A cloneable command sender, injected into the controller.
    pub fn sender(&self) -> Sender<MediaCmd> {
        self.tx.clone()
    }

    pub fn send(&self, cmd: MediaCmd) -> Result<(), mpsc::SendError<MediaCmd>> {
        self.tx.send(cmd)
    }

    /// Ask the thread to fade out and stop, then wait for it to finish.
    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(MediaCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }
}
