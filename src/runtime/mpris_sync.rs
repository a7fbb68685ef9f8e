use crate::mpris::MprisHandle;
use crate::player::PlaylistController;

pub fn update_mpris(mpris: &MprisHandle, controller: &PlaylistController) {
    let index = controller.current_index();
    let track = index.and_then(|i| controller.playlist().get(i));
    mpris.set_track_metadata(index, track, controller.duration());
    mpris.set_phase(controller.phase());
    mpris.set_volume(f64::from(controller.volume()) / 100.0);
}
