use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crate::app::state::AppState;
use crossterm::event::{
    self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};
use tokio::sync::mpsc;

pub fn spawn_input_task(tx: mpsc::Sender<Event>, mouse_enabled: bool) {
    tokio::task::spawn_blocking(move || {
        loop {
            if !event::poll(std::time::Duration::from_millis(250)).unwrap_or(false) {
                if tx.is_closed() {
                    break;
                }
                continue;
            }
            let ev = match event::read() {
                Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => InputEvent::Key(k),
                Ok(CtEvent::Mouse(m)) if mouse_enabled => InputEvent::Mouse(m),
                Ok(CtEvent::Resize(_, _)) => InputEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "read terminal event");
                    continue;
                }
            };
            if tx.blocking_send(Event::Input(ev)).is_err() {
                break;
            }
        }
    });
}

pub fn map_input_to_action(state: &AppState, ev: InputEvent) -> Option<Action> {
    match ev {
        InputEvent::Resize => Some(Action::Resize),
        InputEvent::Mouse(m) => map_mouse(state, m),
        InputEvent::Key(k) if state.help_visible => handle_help_overlay(k),
        InputEvent::Key(k) => handle_normal_mode(k),
    }
}

fn handle_help_overlay(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1) => Some(Action::ToggleHelp),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

fn handle_normal_mode(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Esc => Some(Action::Dismiss),

        // Playlist navigation - vim style
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ListUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ListDown),
        KeyCode::Char('g') => Some(Action::GoTop),
        KeyCode::Char('G') => Some(Action::GoBottom),
        KeyCode::Enter => Some(Action::Activate),
        KeyCode::Char('l') => Some(Action::TogglePlaylist),

        // Transport
        KeyCode::Char(' ') => Some(Action::TogglePlay),
        KeyCode::Char('n') | KeyCode::Right => Some(Action::PlayNext),
        KeyCode::Char('p') | KeyCode::Left => Some(Action::PlayPrev),
        KeyCode::Char(']') => Some(Action::SeekForward),
        KeyCode::Char('[') => Some(Action::SeekBack),
        KeyCode::Char('=') | KeyCode::Char('+') => Some(Action::VolumeUp),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::VolumeDown),
        KeyCode::Char('m') => Some(Action::ToggleMute),
        KeyCode::Char('r') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Refresh),
        KeyCode::Char('r') => Some(Action::CycleRepeatMode),

        KeyCode::F(5) => Some(Action::Refresh),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Action::ToggleHelp),

        _ => None,
    }
}

fn map_mouse(state: &AppState, m: MouseEvent) -> Option<Action> {
    let pos = Position::new(m.column, m.row);
    match m.kind {
        MouseEventKind::ScrollUp if state.hit.playlist.contains(pos) => Some(Action::ListUp),
        MouseEventKind::ScrollDown if state.hit.playlist.contains(pos) => Some(Action::ListDown),
        MouseEventKind::Down(MouseButton::Left) => {
            let hit = &state.hit;
            if hit.progress.contains(pos) {
                Some(Action::SeekRatio(ratio_at(hit.progress, m.column)))
            } else if hit.lyrics.contains(pos) {
                state
                    .lyrics
                    .line_at_row(m.row - hit.lyrics.y)
                    .map(Action::SeekToLine)
            } else if hit.playlist.contains(pos) {
                let index = state.playlist.scroll_offset + usize::from(m.row - hit.playlist.y);
                Some(Action::PlayIndex(index))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Horizontal click position inside `area` as 0.0..=1.0.
fn ratio_at(area: Rect, column: u16) -> f64 {
    if area.width <= 1 {
        return 0.0;
    }
    let offset = column.saturating_sub(area.x).min(area.width - 1);
    f64::from(offset) / f64::from(area.width - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn click(column: u16, row: u16) -> InputEvent {
        InputEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_transport_keys() {
        let state = AppState::new();
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char(' '))), Some(Action::TogglePlay));
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char('n'))), Some(Action::PlayNext));
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char('r'))), Some(Action::CycleRepeatMode));
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char('m'))), Some(Action::ToggleMute));
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut state = AppState::new();
        state.help_visible = true;
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char(' '))), None);
        assert_eq!(map_input_to_action(&state, key(KeyCode::Esc)), Some(Action::ToggleHelp));
    }

    #[test]
    fn test_progress_click_maps_to_ratio() {
        let mut state = AppState::new();
        state.hit.progress = Rect::new(10, 20, 101, 1);
        assert_eq!(map_input_to_action(&state, click(10, 20)), Some(Action::SeekRatio(0.0)));
        assert_eq!(map_input_to_action(&state, click(60, 20)), Some(Action::SeekRatio(0.5)));
        assert_eq!(map_input_to_action(&state, click(110, 20)), Some(Action::SeekRatio(1.0)));
    }

    #[test]
    fn test_lyric_click_maps_to_line() {
        let mut state = AppState::new();
        state.lyrics.load(Some("t"), "[00:01.00]one\n[00:02.00]two\n[00:03.00]three");
        state.lyrics.set_viewport(40, 10);
        state.hit.lyrics = Rect::new(0, 5, 40, 10);
        assert_eq!(map_input_to_action(&state, click(3, 6)), Some(Action::SeekToLine(1)));
        assert_eq!(map_input_to_action(&state, click(3, 14)), None);
    }

    #[test]
    fn test_playlist_click_accounts_for_scroll() {
        let mut state = AppState::new();
        state.hit.playlist = Rect::new(50, 2, 30, 10);
        state.playlist.scroll_offset = 4;
        assert_eq!(map_input_to_action(&state, click(55, 3)), Some(Action::PlayIndex(5)));
    }
}
