use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config::Settings;
use crate::media::{MediaEvent, MediaPlayer};
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::{Phase, PlaylistController};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Track-list cursor; independent from the playing track.
    pub selected: usize,
    /// Last-known current index as emitted to MPRIS.
    last_mpris_index: Option<usize>,
    /// Last-known phase as emitted to MPRIS.
    last_mpris_phase: Phase,
    last_mpris_volume: u8,
}

impl EventLoopState {
    /// Construct a new `EventLoopState` seeded from the controller.
    pub fn new(controller: &PlaylistController) -> Self {
        Self {
            selected: controller.current_index().unwrap_or(0),
            last_mpris_index: controller.current_index(),
            last_mpris_phase: controller.phase(),
            last_mpris_volume: controller.volume(),
        }
    }
}

/// Main terminal event loop: drains media events into the controller,
/// draws, and handles keyboard input and remote commands. Returns
/// `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &Settings,
    controller: &mut PlaylistController,
    media: &MediaPlayer,
    media_events: &Receiver<MediaEvent>,
    mpris: &MprisHandle,
    control_rx: &Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let notification_ttl = Duration::from_millis(settings.ui.notification_ms);

    loop {
        // Asynchronous outcomes first, so this frame draws current state.
        while let Ok(ev) = media_events.try_recv() {
            controller.on_media_event(ev);
        }
        controller.expire_notification(notification_ttl);

        // Keep MPRIS in sync even when changes come from auto-advance.
        if controller.current_index() != state.last_mpris_index
            || controller.phase() != state.last_mpris_phase
            || controller.volume() != state.last_mpris_volume
        {
            update_mpris(mpris, controller);
            state.last_mpris_index = controller.current_index();
            state.last_mpris_phase = controller.phase();
            state.last_mpris_volume = controller.volume();
        }

        terminal.draw(|f| {
            ui::draw(
                f,
                controller,
                state.selected,
                &settings.ui,
                &settings.controls,
            );
        })?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, settings, controller, media) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, controller, media, state) {
                    return Ok(());
                }
            }
        }
    }
}

/// Handle one remote command. Returns true when shutdown was requested.
fn handle_control_cmd(
    cmd: ControlCmd,
    settings: &Settings,
    controller: &mut PlaylistController,
    media: &MediaPlayer,
) -> bool {
    match cmd {
        ControlCmd::Quit => {
            media.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return true;
        }
        ControlCmd::Play => controller.play(),
        ControlCmd::Pause => controller.pause(),
        ControlCmd::PlayPause => controller.toggle_play_pause(),
        ControlCmd::Next => controller.next_track(),
        ControlCmd::Prev => controller.previous_track(),
        ControlCmd::SetVolume(v) => {
            controller.set_volume((v.clamp(0.0, 1.0) * 100.0).round() as u8);
        }
    }
    false
}

/// Handle one key press. Returns true when shutdown was requested.
fn handle_key_event(
    key: KeyEvent,
    settings: &Settings,
    controller: &mut PlaylistController,
    media: &MediaPlayer,
    state: &mut EventLoopState,
) -> bool {
    let scrub = settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;

    match key.code {
        KeyCode::Char('q') => {
            media.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return true;
        }
        KeyCode::Char(' ') => controller.toggle_play_pause(),
        KeyCode::Left => controller.previous_track(),
        KeyCode::Right => controller.next_track(),
        KeyCode::Up => controller.volume_up(),
        KeyCode::Down => controller.volume_down(),
        KeyCode::Char('j') => {
            let len = controller.playlist().len();
            if len > 0 {
                state.selected = (state.selected + 1) % len;
            }
        }
        KeyCode::Char('k') => {
            let len = controller.playlist().len();
            if len > 0 {
                state.selected = if state.selected == 0 {
                    len - 1
                } else {
                    state.selected - 1
                };
            }
        }
        KeyCode::Enter => controller.select_track(state.selected),
        KeyCode::Char('r') => controller.cycle_repeat_mode(),
        KeyCode::Char('s') => controller.toggle_shuffle(),
        KeyCode::Char('L') => controller.seek_by(scrub),
        KeyCode::Char('H') => controller.seek_by(-scrub),
        _ => {}
    }

    false
}
