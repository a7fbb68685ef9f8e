use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::media::MediaPlayer;
use crate::mpris::ControlCmd;
use crate::player::PlaylistController;
use crate::playlist::Playlist;

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::init(&settings.log);

    let playlist = Playlist::from_entries(&settings.tracks);
    let (media, media_events) = MediaPlayer::spawn();
    let mut controller = PlaylistController::new(playlist, media.sender());

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    startup::apply_playback_defaults(&mut controller, &settings);
    mpris_sync::update_mpris(&mpris, &controller);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = {
        let mut state = event_loop::EventLoopState::new(&controller);
        event_loop::run(
            &mut terminal,
            &settings,
            &mut controller,
            &media,
            &media_events,
            &mpris,
            &control_rx,
            &mut state,
        )
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
