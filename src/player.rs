//! Playback core: the `PlaylistController` state machine.
//!
//! The controller owns all playback state (current track, playing flag,
//! repeat mode, shuffle order, volume) and is only ever entered from the
//! runtime event loop. It drives the audio thread through `MediaCmd`s and
//! reacts to its asynchronous outcomes in `on_media_event`; the renderer
//! reads derived values from it every frame.

mod controller;

pub use controller::*;

#[cfg(test)]
mod tests;
