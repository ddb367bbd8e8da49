//! Playlist panel - the catalog in order, current track marked

use super::{padded, panel, truncate_str};
use crate::app::state::AppState;
use crate::tui::theme::{get_theme, LoadingSpinner};
use crate::tui::PlayerView;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render(frame: &mut Frame, view: &PlayerView, state: &mut AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let tracks = view.catalog.tracks();
    let block = panel(
        &theme,
        format!(" {} Playlist ({}) ", icons.playlist, tracks.len()),
    );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let padded = padded(inner);
    state.hit.playlist = padded;

    if tracks.is_empty() {
        let msg = if state.catalog_loading {
            format!("{} Loading catalog...", LoadingSpinner::frame(state.tick))
        } else {
            "Catalog is empty. Ctrl+r to fetch.".to_string()
        };
        let empty = Paragraph::new(Line::from(msg))
            .style(Style::default().fg(theme.palette.fg_secondary));
        frame.render_widget(empty, padded);
        return;
    }

    let visible_height = usize::from(padded.height);
    state.playlist.clamp(tracks.len());
    state.playlist.update_scroll(visible_height);

    let current_id = view.playback.current_track_id.as_deref();
    let selected_idx = state.playlist.selected;
    let max_width = padded.width.saturating_sub(7) as usize; // marker + index

    let lines: Vec<Line> = tracks
        .iter()
        .enumerate()
        .skip(state.playlist.scroll_offset)
        .take(visible_height)
        .map(|(i, track)| {
            let is_current = current_id == Some(track.id.as_str());
            let is_selected = i == selected_idx;

            let prefix = if is_current {
                let icon = if view.playback.is_playing { icons.play } else { icons.pause };
                format!("{icon} ")
            } else {
                "  ".to_string()
            };

            let display = if track.artist.is_empty() {
                track.title.clone()
            } else {
                format!("{} - {}", track.title, track.artist)
            };

            let style = if is_selected {
                Style::default()
                    .fg(theme.palette.fg_primary)
                    .bg(theme.palette.bg_highlight)
                    .add_modifier(Modifier::BOLD)
            } else if is_current {
                Style::default()
                    .fg(theme.palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.palette.fg_primary)
            };

            let prefix_style = if is_current {
                Style::default().fg(theme.palette.accent)
            } else {
                Style::default().fg(theme.palette.fg_secondary)
            };

            Line::from(vec![
                Span::styled(prefix, prefix_style),
                Span::styled(
                    format!("{:>3}. ", i + 1),
                    Style::default().fg(theme.palette.fg_secondary),
                ),
                Span::styled(truncate_str(&display, max_width), style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), padded);
}
