//! Keybinding overlay

use super::panel;
use crate::tui::theme::{get_theme, Theme};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let area = centered(area, 64, 20);
    frame.render_widget(Clear, area);

    let block = panel(&theme, format!(" {} Keybinds ", icons.help));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let left_content = vec![
        section_header("Playback", &theme),
        keybind("Space", "Play / pause", &theme),
        keybind("n / Right", "Next track", &theme),
        keybind("p / Left", "Previous track", &theme),
        keybind("]", "Seek forward 10s", &theme),
        keybind("[", "Seek back 10s", &theme),
        keybind("+ / =", "Volume up", &theme),
        keybind("- / _", "Volume down", &theme),
        keybind("m", "Mute", &theme),
        keybind("r", "Cycle repeat mode", &theme),
        Line::default(),
        section_header("Mouse", &theme),
        keybind("Click lyric", "Jump to line", &theme),
        keybind("Click bar", "Seek", &theme),
    ];
    frame.render_widget(Paragraph::new(left_content).wrap(Wrap { trim: false }), cols[0]);

    let right_content = vec![
        section_header("Playlist", &theme),
        keybind("l", "Show / hide", &theme),
        keybind("j / Down", "Move down", &theme),
        keybind("k / Up", "Move up", &theme),
        keybind("g / G", "Top / bottom", &theme),
        keybind("Enter", "Play selected", &theme),
        Line::default(),
        section_header("General", &theme),
        keybind("Ctrl+r", "Refetch catalog", &theme),
        keybind("?", "This help", &theme),
        keybind("Esc", "Close panel", &theme),
        keybind("q", "Quit", &theme),
    ];
    frame.render_widget(Paragraph::new(right_content).wrap(Wrap { trim: false }), cols[1]);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn section_header(title: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![Span::styled(
        format!("━━ {} ━━", title),
        Style::default()
            .fg(theme.palette.accent)
            .add_modifier(Modifier::BOLD),
    )])
}

fn keybind(key: &str, desc: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(
            format!("{:12}", key),
            Style::default()
                .fg(theme.palette.accent_alt)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc.to_string(), Style::default().fg(theme.palette.fg_primary)),
    ])
}
