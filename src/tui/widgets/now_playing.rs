//! Player bar - progress, transport controls, volume and repeat mode

use super::{format_time, padded, panel, truncate_str};
use crate::app::state::{AppState, ToastKind};
use crate::player::{RepeatMode, Transport};
use crate::tui::theme::{get_theme, Icons};
use crate::tui::PlayerView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render(frame: &mut Frame, view: &PlayerView, state: &mut AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;
    let playback = view.playback;

    let block = panel(&theme, format!(" {} Player ", icons.music));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let padded = padded(inner);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Progress bar
            Constraint::Length(1), // Time + controls + volume
            Constraint::Min(0),    // Toast or status
        ])
        .split(padded);

    let content_width = padded.width.saturating_sub(1) as usize;

    let bar_width = rows[0].width as usize;
    let progress_line = Line::from(Span::styled(
        render_progress_bar(bar_width, playback.progress(), icons),
        Style::default().fg(theme.palette.accent),
    ));
    frame.render_widget(Paragraph::new(progress_line), rows[0]);
    state.hit.progress = rows[0];

    let play_icon = if playback.is_playing { icons.pause } else { icons.play };

    let vol_icon = if playback.muted || playback.volume == 0.0 {
        icons.volume_mute
    } else if playback.volume < 0.5 {
        icons.volume_low
    } else {
        icons.volume_high
    };
    let vol_label = if playback.muted {
        "muted".to_string()
    } else {
        format!("{}%", (playback.volume * 100.0).round() as u32)
    };

    let mode_icon = match playback.repeat_mode {
        RepeatMode::Sequential => icons.repeat,
        RepeatMode::SingleRepeat => icons.repeat_one,
        RepeatMode::Shuffle => icons.shuffle,
    };

    let mut controls_spans = vec![
        Span::styled(
            format!(
                "{}/{}",
                format_time(playback.current_time),
                format_time(playback.duration)
            ),
            Style::default().fg(theme.palette.fg_secondary),
        ),
        Span::raw(" "),
        Span::styled(icons.prev, Style::default().fg(theme.palette.fg_secondary)),
        Span::raw(" "),
        Span::styled(play_icon, Style::default().fg(theme.palette.playing)),
        Span::raw(" "),
        Span::styled(icons.next, Style::default().fg(theme.palette.fg_secondary)),
        Span::raw("  "),
        Span::styled(vol_icon, Style::default().fg(theme.palette.fg_secondary)),
        Span::raw(" "),
        Span::styled(vol_label, Style::default().fg(theme.palette.fg_secondary)),
        Span::raw("  "),
        Span::styled(
            format!("{} {}", mode_icon, playback.repeat_mode.label()),
            Style::default().fg(theme.palette.accent_alt),
        ),
    ];
    if view.transport == Transport::Loading {
        controls_spans.push(Span::raw("  "));
        controls_spans.push(Span::styled(
            icons.loading,
            Style::default().fg(theme.palette.fg_secondary),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(controls_spans)), rows[1]);

    let bottom = match &state.toast {
        Some(toast) if !toast.is_expired() => {
            let (prefix, color) = match toast.kind {
                ToastKind::Success => (icons.success, theme.palette.playing),
                ToastKind::Error => (icons.error, theme.palette.error),
            };
            Line::from(vec![
                Span::styled(format!("{} ", prefix), Style::default().fg(color)),
                Span::styled(
                    truncate_str(&toast.message, content_width.saturating_sub(3)),
                    Style::default().fg(color),
                ),
            ])
        }
        _ => Line::from(Span::styled(
            truncate_str(&state.status, content_width),
            Style::default().fg(theme.palette.fg_secondary),
        )),
    };
    frame.render_widget(Paragraph::new(bottom), rows[2]);
}

fn render_progress_bar(width: usize, ratio: f64, icons: &Icons) -> String {
    if width < 3 {
        return String::new();
    }

    let filled = ((width - 1) as f64 * ratio).round() as usize;
    let empty = width.saturating_sub(filled + 1);

    let mut bar = String::with_capacity(width * 3);
    for _ in 0..filled {
        bar.push_str(icons.progress_full);
    }
    bar.push_str(icons.progress_head);
    for _ in 0..empty {
        bar.push_str(icons.progress_empty);
    }
    bar
}
