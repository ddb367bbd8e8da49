//! Root layout widget - orchestrates main layout structure

use super::{help, lyrics, now_playing, padded, panel, playlist, truncate_str};
use crate::app::state::{AppState, HitAreas};
use crate::player::Transport;
use crate::tui::theme::get_theme;
use crate::tui::PlayerView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Main layout structure:
/// ┌──────────────────────────┬──────────────────┐
/// │  Song (title / artist)   │                  │
/// ├──────────────────────────┤    Playlist      │
/// │                          │   (toggle: l)    │
/// │         Lyrics           │                  │
/// │                          │                  │
/// ├──────────────────────────┴──────────────────┤
/// │  Player (progress, controls, volume, mode)  │
/// └─────────────────────────────────────────────┘
pub fn render(frame: &mut Frame, view: &PlayerView, state: &mut AppState) {
    let root = frame.area();
    // Panels that are not drawn this frame must not take clicks.
    state.hit = HitAreas::default();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),    // Song + lyrics (+ playlist)
            Constraint::Length(5), // Player bar
        ])
        .split(root);

    let top = if view.playback.playlist_visible {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[0]);
        playlist::render(frame, view, state, cols[1]);
        cols[0]
    } else {
        rows[0]
    };

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Song info
            Constraint::Min(3),    // Lyrics
        ])
        .split(top);

    render_song_info(frame, view, left[0]);
    lyrics::render(frame, view, state, left[1]);
    now_playing::render(frame, view, state, rows[1]);

    if state.help_visible {
        help::render(frame, root);
    }
}

fn render_song_info(frame: &mut Frame, view: &PlayerView, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = panel(&theme, format!(" {} Now Playing ", icons.music));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let padded = padded(inner);
    let width = padded.width as usize;

    let (title, artist) = match view.current_track() {
        Some(t) => (t.title.as_str(), t.artist.as_str()),
        None => ("Not playing", ""),
    };

    let state_label = match view.transport {
        Transport::Loading => " (loading)",
        Transport::Ended => " (ended)",
        _ => "",
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                truncate_str(title, width.saturating_sub(state_label.len())),
                Style::default()
                    .fg(theme.palette.fg_primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(state_label, Style::default().fg(theme.palette.fg_secondary)),
        ]),
        Line::from(Span::styled(
            truncate_str(artist, width),
            Style::default().fg(theme.palette.fg_secondary),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), padded);
}
