use super::*;
use crate::config::TrackEntry;
use crate::media::{MediaCmd, MediaEvent, RejectReason};
use crate::playlist::Playlist;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

fn controller_with(titles: &[&str]) -> (PlaylistController, Receiver<MediaCmd>) {
    let entries: Vec<TrackEntry> = titles
        .iter()
        .map(|t| TrackEntry {
            title: (*t).to_string(),
            file: PathBuf::from(format!("/music/{t}.mp3")),
            duration: "2:04".to_string(),
        })
        .collect();
    let playlist = Playlist::from_entries(&entries);
    let (tx, rx) = mpsc::channel();
    (PlaylistController::new(playlist, tx), rx)
}

fn drain(rx: &Receiver<MediaCmd>) -> Vec<MediaCmd> {
    let mut cmds = Vec::new();
    while let Ok(cmd) = rx.try_recv() {
        cmds.push(cmd);
    }
    cmds
}

fn last_load_generation(cmds: &[MediaCmd]) -> u64 {
    cmds.iter()
        .rev()
        .find_map(|cmd| match cmd {
            MediaCmd::Load { generation, .. } => Some(*generation),
            _ => None,
        })
        .expect("no Load command was sent")
}

/// Walk the controller through a successful load + play handshake.
/// Returns the load generation the backend would be reporting under.
fn start_playing(ctl: &mut PlaylistController, rx: &Receiver<MediaCmd>, secs: u64) -> u64 {
    ctl.play();
    let generation = last_load_generation(&drain(rx));
    ctl.on_media_event(MediaEvent::Ready {
        generation,
        duration: Some(Duration::from_secs(secs)),
    });
    ctl.on_media_event(MediaEvent::Playing { generation });
    assert!(ctl.is_playing());
    generation
}

#[test]
fn load_track_sets_index_and_title() {
    let (mut ctl, rx) = controller_with(&["Alpha", "Beta", "Gamma"]);

    for (i, title) in ["Alpha", "Beta", "Gamma"].iter().enumerate() {
        ctl.load_track(i);
        assert_eq!(ctl.current_index(), Some(i));
        assert_eq!(ctl.current_title(), Some(*title));
        assert_eq!(ctl.phase(), Phase::Loading);
    }

    let loads: Vec<PathBuf> = drain(&rx)
        .into_iter()
        .filter_map(|cmd| match cmd {
            MediaCmd::Load { path, .. } => Some(path),
            _ => None,
        })
        .collect();
    assert_eq!(
        loads,
        vec![
            PathBuf::from("/music/Alpha.mp3"),
            PathBuf::from("/music/Beta.mp3"),
            PathBuf::from("/music/Gamma.mp3"),
        ]
    );
}

#[test]
fn load_track_ignores_out_of_range_indices() {
    let (mut ctl, rx) = controller_with(&["Alpha"]);
    ctl.load_track(5);
    assert_eq!(ctl.current_index(), None);
    assert_eq!(ctl.phase(), Phase::Unloaded);
    assert!(drain(&rx).is_empty());
}

#[test]
fn next_wraps_to_first_and_previous_wraps_to_last() {
    let (mut ctl, _rx) = controller_with(&["Alpha", "Beta", "Gamma"]);
    ctl.load_track(2);
    ctl.next_track();
    assert_eq!(ctl.current_index(), Some(0));

    ctl.previous_track();
    assert_eq!(ctl.current_index(), Some(2));
}

#[test]
fn three_track_walk_lands_on_the_middle_track() {
    let (mut ctl, _rx) = controller_with(&["Alpha", "Beta", "Gamma"]);
    ctl.load_track(0);
    ctl.next_track();
    ctl.next_track();
    ctl.previous_track();
    assert_eq!(ctl.current_index(), Some(1));
}

#[test]
fn transport_is_a_noop_on_an_empty_playlist() {
    let (mut ctl, rx) = controller_with(&[]);

    ctl.next_track();
    ctl.previous_track();
    ctl.select_track(0);
    assert_eq!(ctl.current_index(), None);
    assert!(drain(&rx).is_empty());
    assert!(ctl.notification().is_some());
}

#[test]
fn play_on_an_empty_playlist_notifies_and_stays_unloaded() {
    let (mut ctl, rx) = controller_with(&[]);

    ctl.play();
    assert!(drain(&rx).is_empty());
    assert!(!ctl.is_playing());
    assert_eq!(ctl.phase(), Phase::Unloaded);
    assert!(ctl.notification().is_some());
}

#[test]
fn play_confirmation_sets_playing_and_phase() {
    let (mut ctl, rx) = controller_with(&["Alpha"]);
    ctl.load_track(0);
    start_playing(&mut ctl, &rx, 120);
    assert_eq!(ctl.phase(), Phase::Playing);
    assert_eq!(ctl.transport_glyph(), "⏸");
}

#[test]
fn pause_always_succeeds_and_toggle_dispatches() {
    let (mut ctl, rx) = controller_with(&["Alpha"]);
    ctl.load_track(0);
    start_playing(&mut ctl, &rx, 120);

    ctl.toggle_play_pause();
    assert!(!ctl.is_playing());
    assert_eq!(ctl.phase(), Phase::Paused);
    assert_eq!(ctl.transport_glyph(), "▶");
    assert!(
        drain(&rx)
            .iter()
            .any(|cmd| matches!(cmd, MediaCmd::Pause))
    );

    ctl.toggle_play_pause();
    assert!(
        drain(&rx)
            .iter()
            .any(|cmd| matches!(cmd, MediaCmd::Play { .. }))
    );
}

#[test]
fn track_change_resumes_when_playback_was_active() {
    let (mut ctl, rx) = controller_with(&["Alpha", "Beta"]);
    ctl.load_track(0);
    start_playing(&mut ctl, &rx, 120);

    ctl.next_track();
    assert_eq!(ctl.current_index(), Some(1));
    let cmds = drain(&rx);
    assert!(cmds.iter().any(|cmd| matches!(cmd, MediaCmd::Load { .. })));
    assert!(
        cmds.iter()
            .any(|cmd| matches!(cmd, MediaCmd::Play { .. }))
    );
}

#[test]
fn track_change_stays_paused_when_playback_was_not_active() {
    let (mut ctl, rx) = controller_with(&["Alpha", "Beta"]);
    ctl.load_track(0);
    drain(&rx);

    ctl.next_track();
    assert_eq!(ctl.current_index(), Some(1));
    let cmds = drain(&rx);
    assert!(cmds.iter().any(|cmd| matches!(cmd, MediaCmd::Load { .. })));
    assert!(
        !cmds
            .iter()
            .any(|cmd| matches!(cmd, MediaCmd::Play { .. }))
    );
}

#[test]
fn ended_with_repeat_one_replays_the_same_track() {
    let (mut ctl, rx) = controller_with(&["Alpha", "Beta", "Gamma"]);
    ctl.set_repeat_mode(RepeatMode::One);
    ctl.load_track(1);
    let generation = start_playing(&mut ctl, &rx, 120);
    ctl.on_media_event(MediaEvent::Position {
        generation,
        elapsed: Duration::from_secs(119),
    });
    assert_eq!(ctl.position(), Duration::from_secs(119));

    ctl.on_media_ended();
    assert_eq!(ctl.current_index(), Some(1));
    assert_eq!(ctl.position(), Duration::ZERO);
    let cmds = drain(&rx);
    assert!(cmds.iter().any(|cmd| matches!(cmd, MediaCmd::Load { .. })));
    assert!(
        cmds.iter()
            .any(|cmd| matches!(cmd, MediaCmd::Play { .. }))
    );
}

#[test]
fn ended_with_repeat_none_advances_until_the_last_track() {
    let (mut ctl, rx) = controller_with(&["Alpha", "Beta", "Gamma"]);
    ctl.load_track(0);
    start_playing(&mut ctl, &rx, 120);

    ctl.on_media_ended();
    assert_eq!(ctl.current_index(), Some(1));
    assert!(ctl.is_playing());
    drain(&rx);
}

#[test]
fn ended_with_repeat_none_on_the_last_track_stops_at_zero() {
    let (mut ctl, rx) = controller_with(&["Alpha", "Beta", "Gamma"]);
    ctl.load_track(2);
    start_playing(&mut ctl, &rx, 120);

    ctl.on_media_ended();
    assert_eq!(ctl.current_index(), Some(2));
    assert!(!ctl.is_playing());
    assert_eq!(ctl.position(), Duration::ZERO);
    assert_eq!(ctl.phase(), Phase::Ended);
    // Re-armed but not replayed.
    let cmds = drain(&rx);
    assert!(cmds.iter().any(|cmd| matches!(cmd, MediaCmd::Load { .. })));
    assert!(
        !cmds
            .iter()
            .any(|cmd| matches!(cmd, MediaCmd::Play { .. }))
    );
}

#[test]
fn ended_with_repeat_all_wraps_from_the_last_track() {
    let (mut ctl, rx) = controller_with(&["Alpha", "Beta"]);
    ctl.set_repeat_mode(RepeatMode::All);
    ctl.load_track(1);
    start_playing(&mut ctl, &rx, 120);

    ctl.on_media_ended();
    assert_eq!(ctl.current_index(), Some(0));
    assert!(ctl.is_playing());
}

#[test]
fn seek_before_duration_is_known_is_a_noop() {
    let (mut ctl, rx) = controller_with(&["Alpha"]);
    ctl.load_track(0);
    drain(&rx);

    ctl.seek_to(0.5);
    assert_eq!(ctl.position(), Duration::ZERO);
    assert!(drain(&rx).is_empty());
}

#[test]
fn seek_scales_and_clamps_the_fraction() {
    let (mut ctl, rx) = controller_with(&["Alpha"]);
    ctl.load_track(0);
    let generation = last_load_generation(&drain(&rx));
    ctl.on_media_event(MediaEvent::Ready {
        generation,
        duration: Some(Duration::from_secs(100)),
    });

    ctl.seek_to(0.25);
    ctl.seek_to(2.0);
    ctl.seek_to(-1.0);
    let seeks: Vec<Duration> = drain(&rx)
        .into_iter()
        .filter_map(|cmd| match cmd {
            MediaCmd::Seek { position } => Some(position),
            _ => None,
        })
        .collect();
    assert_eq!(
        seeks,
        vec![
            Duration::from_secs(25),
            Duration::from_secs(100),
            Duration::ZERO,
        ]
    );
}

#[test]
fn format_time_pads_seconds_and_uses_the_sentinel() {
    assert_eq!(format_time(f64::NAN), "0:00");
    assert_eq!(format_time(f64::INFINITY), "0:00");
    assert_eq!(format_time(-3.0), "0:00");
    assert_eq!(format_time(0.0), "0:00");
    assert_eq!(format_time(65.0), "1:05");
    assert_eq!(format_time(3599.0), "59:59");
}

#[test]
fn volume_icon_tiers_have_exact_cutoffs() {
    let (mut ctl, _rx) = controller_with(&["Alpha"]);

    ctl.set_volume(0);
    assert_eq!(ctl.volume_icon(), VolumeIcon::Muted);
    ctl.set_volume(29);
    assert_eq!(ctl.volume_icon(), VolumeIcon::Low);
    ctl.set_volume(30);
    assert_eq!(ctl.volume_icon(), VolumeIcon::Mid);
    ctl.set_volume(69);
    assert_eq!(ctl.volume_icon(), VolumeIcon::Mid);
    ctl.set_volume(70);
    assert_eq!(ctl.volume_icon(), VolumeIcon::High);
    ctl.set_volume(100);
    assert_eq!(ctl.volume_icon(), VolumeIcon::High);
}

#[test]
fn volume_steps_clamp_and_scale_to_the_backend_range() {
    let (mut ctl, rx) = controller_with(&["Alpha"]);

    ctl.set_volume(95);
    ctl.volume_up();
    assert_eq!(ctl.volume(), 100);
    ctl.set_volume(5);
    ctl.volume_down();
    assert_eq!(ctl.volume(), 0);
    ctl.set_volume(200);
    assert_eq!(ctl.volume(), 100);

    let sent: Vec<f32> = drain(&rx)
        .into_iter()
        .filter_map(|cmd| match cmd {
            MediaCmd::SetVolume(v) => Some(v),
            _ => None,
        })
        .collect();
    assert_eq!(sent, vec![0.95, 1.0, 0.05, 0.0, 1.0]);
}

#[test]
fn rejection_reasons_produce_distinct_notifications() {
    let (mut ctl, rx) = controller_with(&["Alpha"]);
    ctl.load_track(0);
    ctl.play();
    let generation = last_load_generation(&drain(&rx));

    ctl.on_media_event(MediaEvent::Rejected {
        generation,
        reason: RejectReason::DeviceUnavailable,
    });
    assert!(!ctl.is_playing());
    assert_eq!(ctl.phase(), Phase::Paused);
    let device_text = ctl.notification().unwrap().text.clone();

    ctl.play();
    ctl.on_media_event(MediaEvent::Rejected {
        generation,
        reason: RejectReason::Backend("boom".to_string()),
    });
    assert_eq!(ctl.phase(), Phase::Errored);
    let backend_text = ctl.notification().unwrap().text.clone();

    assert_ne!(device_text, backend_text);
}

#[test]
fn load_failure_is_reflected_and_notified() {
    let (mut ctl, rx) = controller_with(&["Alpha"]);
    ctl.load_track(0);
    let generation = last_load_generation(&drain(&rx));

    ctl.on_media_event(MediaEvent::Failed {
        generation,
        error: crate::media::MediaError::Open {
            path: "/music/Alpha.mp3".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        },
    });
    assert_eq!(ctl.phase(), Phase::Errored);
    assert!(!ctl.is_playing());
    assert!(ctl.notification().unwrap().text.contains("Alpha"));
}

#[test]
fn stale_events_from_superseded_loads_are_dropped() {
    let (mut ctl, rx) = controller_with(&["Alpha", "Beta"]);
    ctl.load_track(0);
    let stale = last_load_generation(&drain(&rx));
    ctl.load_track(1);
    drain(&rx);

    ctl.on_media_event(MediaEvent::Ready {
        generation: stale,
        duration: Some(Duration::from_secs(100)),
    });
    assert_eq!(ctl.duration(), None);

    ctl.on_media_event(MediaEvent::Position {
        generation: stale,
        elapsed: Duration::from_secs(42),
    });
    assert_eq!(ctl.position(), Duration::ZERO);

    ctl.on_media_event(MediaEvent::Playing { generation: stale });
    assert!(!ctl.is_playing());
}

#[test]
fn playback_confirmation_after_a_pause_is_dropped() {
    let (mut ctl, rx) = controller_with(&["Alpha"]);
    ctl.load_track(0);
    ctl.play();
    let generation = last_load_generation(&drain(&rx));

    // The user pauses before the backend confirms the play request.
    ctl.pause();
    ctl.on_media_event(MediaEvent::Playing { generation });
    assert!(!ctl.is_playing());
    assert_ne!(ctl.phase(), Phase::Playing);
}

#[test]
fn toggle_shuffle_permutes_and_restores_the_play_order() {
    let (mut ctl, _rx) = controller_with(&["Alpha", "Beta", "Gamma", "Delta"]);
    ctl.load_track(0);

    ctl.toggle_shuffle();
    assert!(ctl.shuffle());

    // Walking the whole order visits every track exactly once.
    let mut seen = std::collections::BTreeSet::new();
    seen.insert(ctl.current_index().unwrap());
    for _ in 0..3 {
        ctl.next_track();
        seen.insert(ctl.current_index().unwrap());
    }
    assert_eq!(seen.len(), 4);

    ctl.toggle_shuffle();
    assert!(!ctl.shuffle());
    ctl.load_track(3);
    ctl.next_track();
    assert_eq!(ctl.current_index(), Some(0));
}

#[test]
fn notifications_expire_after_their_ttl() {
    let (mut ctl, _rx) = controller_with(&[]);
    ctl.play();
    assert!(ctl.notification().is_some());

    ctl.expire_notification(Duration::from_secs(3600));
    assert!(ctl.notification().is_some());

    ctl.expire_notification(Duration::ZERO);
    assert!(ctl.notification().is_none());
}
