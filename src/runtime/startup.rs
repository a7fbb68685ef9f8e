use crate::config::{RepeatModeSetting, Settings};
use crate::player::{PlaylistController, RepeatMode};

/// Seed the controller from `[playback]` settings: volume, repeat mode,
/// shuffle, the first track, and the optional autoplay attempt.
pub fn apply_playback_defaults(controller: &mut PlaylistController, settings: &Settings) {
    controller.set_volume(settings.playback.volume);
    controller.set_repeat_mode(match settings.playback.repeat_mode {
        RepeatModeSetting::None => RepeatMode::None,
        RepeatModeSetting::One => RepeatMode::One,
        RepeatModeSetting::All => RepeatMode::All,
    });
    controller.set_shuffle(settings.playback.shuffle);

    if !controller.playlist().is_empty() {
        controller.load_track(0);
        if settings.playback.autoplay {
            controller.play();
        }
    }
}
