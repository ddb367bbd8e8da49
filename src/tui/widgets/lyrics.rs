//! Lyrics panel: every line, the active one highlighted and kept centered.

use super::{padded, panel};
use crate::app::state::AppState;
use crate::lyrics::view::wrap_rows;
use crate::tui::theme::get_theme;
use crate::tui::PlayerView;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render(frame: &mut Frame, view: &PlayerView, state: &mut AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = panel(&theme, format!(" {} Lyrics ", icons.lyrics));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let content = padded(inner);
    state.lyrics.set_viewport(content.width, content.height);
    state.hit.lyrics = content;

    let lyrics = &state.lyrics;
    if lyrics.lines().is_empty() {
        let msg = if view.playback.current_track_id.is_none() {
            "No track loaded"
        } else {
            "No lyrics available"
        };
        let top = content.height.saturating_sub(1) / 2;
        let placeholder = Paragraph::new(Line::from(Span::styled(
            msg,
            Style::default().fg(theme.palette.fg_secondary),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(
            placeholder,
            Rect::new(content.x, content.y + top, content.width, 1.min(content.height)),
        );
        return;
    }

    // Same wrapping as LyricsView so rows line up with line_at_row.
    let width = usize::from(content.width);
    let active = lyrics.active();
    let mut rows: Vec<Line> = Vec::new();
    for (i, line) in lyrics.lines().iter().enumerate() {
        let style = if Some(i) == active {
            Style::default()
                .fg(theme.palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.palette.fg_secondary)
        };
        for row in wrap_rows(&line.text, width) {
            rows.push(Line::from(Span::styled(row, style)));
        }
    }

    let visible: Vec<Line> = rows
        .into_iter()
        .skip(lyrics.scroll_offset())
        .take(usize::from(content.height))
        .collect();
    frame.render_widget(Paragraph::new(visible).alignment(Alignment::Center), content);
}
