//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. The
//! renderer is stateless: everything it draws is derived from the
//! controller and the list cursor passed in each frame.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::config::{ControlsSettings, UiSettings};
use crate::player::{PlaylistController, RepeatMode, VolumeIcon};

const EMPTY_PLAYLIST_HINT: &str = "No tracks configured. Add [[tracks]] entries to config.toml";

/// Render the entire UI using the controller state and the list cursor.
pub fn draw(
    frame: &mut Frame,
    controller: &PlaylistController,
    selected: usize,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], ui_settings);
    draw_now_playing(frame, chunks[1], controller);
    draw_track_list(frame, chunks[2], controller, selected);
    draw_footer(frame, chunks[3], controls_settings);

    // Notification toast last, topmost layer.
    draw_notification(frame, controller);
}

fn draw_header(frame: &mut Frame, area: Rect, ui_settings: &UiSettings) {
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" rondo ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, area);
}

fn draw_now_playing(frame: &mut Frame, area: Rect, controller: &PlaylistController) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" now playing ")
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    // Title line with transport glyph and mode indicators.
    let title = controller.current_title().unwrap_or(EMPTY_PLAYLIST_HINT);
    let mut head = format!("{} {}", controller.transport_glyph(), title);
    head.push_str(match controller.repeat_mode() {
        RepeatMode::None => "",
        RepeatMode::One => "  [repeat one]",
        RepeatMode::All => "  [repeat all]",
    });
    if controller.shuffle() {
        head.push_str("  [shuffle]");
    }
    frame.render_widget(Paragraph::new(head), rows[0]);

    let gauge = Gauge::default()
        .ratio(controller.progress_fraction())
        .label(format!(
            "{} / {}",
            controller.elapsed_text(),
            controller.duration_text()
        ))
        .gauge_style(Style::default().fg(Color::Cyan));
    frame.render_widget(gauge, rows[1]);

    frame.render_widget(Paragraph::new(volume_line(controller)), rows[2]);
}

/// Volume readout: tiered icon, ten-cell bar, percentage.
fn volume_line(controller: &PlaylistController) -> String {
    let icon = match controller.volume_icon() {
        VolumeIcon::Muted => "🔇",
        VolumeIcon::Low => "🔈",
        VolumeIcon::Mid => "🔉",
        VolumeIcon::High => "🔊",
    };
    let bar_width = 10usize;
    let filled = (controller.volume() as usize * bar_width) / 100;
    format!(
        "{} {}{} {:>3}%",
        icon,
        "█".repeat(filled),
        "░".repeat(bar_width - filled),
        controller.volume()
    )
}

fn draw_track_list(
    frame: &mut Frame,
    area: Rect,
    controller: &PlaylistController,
    selected: usize,
) {
    let tracks = controller.playlist().tracks();
    if tracks.is_empty() {
        let empty = Paragraph::new(EMPTY_PLAYLIST_HINT)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    }

    let active = controller.current_index();
    let items: Vec<ListItem> = tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let marker = if active == Some(i) { "▶" } else { " " };
            let row = format!(
                "{:02} {} {}  {}",
                i + 1,
                marker,
                track.title,
                track.display_duration
            );
            if active == Some(i) {
                ListItem::new(row).style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                ListItem::new(row)
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" tracks "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(selected.min(tracks.len() - 1)));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_footer(frame: &mut Frame, area: Rect, controls_settings: &ControlsSettings) {
    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, area);
}

fn controls_text(scrub_seconds: u64) -> String {
    format!(
        "[space] play/pause | [←/→] prev/next | [↑/↓] volume | [j/k] move | [enter] play selected | [H/L] scrub -/+{}s | [r] repeat | [s] shuffle | [q] quit",
        scrub_seconds
    )
}

/// Draw the active notification as a toast in the upper-right corner.
fn draw_notification(frame: &mut Frame, controller: &PlaylistController) {
    let Some(note) = controller.notification() else {
        return;
    };

    let area = frame.area();
    if area.width < 12 || area.height < 4 {
        return;
    }

    let width = (note.text.chars().count() as u16 + 4)
        .min(area.width.saturating_sub(2))
        .max(10);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + 1,
        width,
        height: 3,
    };

    frame.render_widget(Clear, rect);
    let toast = Paragraph::new(note.text.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .padding(Padding {
                    left: 1,
                    right: 1,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(toast, rect);
}
