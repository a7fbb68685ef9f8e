//! Playlist model: the fixed, ordered list of tracks the player runs on.

mod model;

pub use model::*;
