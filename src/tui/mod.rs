use crate::app::state::AppState;
use crate::catalog::Catalog;
use crate::player::{PlaybackState, Transport};
use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};

pub mod theme;
pub mod widgets;

pub type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Read-only view of the player handed to the widgets each frame.
pub struct PlayerView<'a> {
    pub playback: &'a PlaybackState,
    pub catalog: &'a Catalog,
    pub transport: Transport,
}

impl PlayerView<'_> {
    pub fn current_track(&self) -> Option<&crate::catalog::Track> {
        self.playback
            .current_track_id
            .as_deref()
            .and_then(|id| self.catalog.get(id))
    }
}

pub struct TerminalGuard {
    terminal: TuiTerminal,
}

impl TerminalGuard {
    pub fn enter(mouse: bool) -> anyhow::Result<Self> {
        enable_raw_mode().context("enable raw mode")?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("enter alt screen")?;
        if mouse {
            execute!(stdout, EnableMouseCapture).context("enable mouse capture")?;
        }

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("create terminal")?;

        Ok(Self { terminal })
    }

    pub fn terminal_mut(&mut self) -> &mut TuiTerminal {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best-effort cleanup; don't panic in Drop.
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture);
    }
}

pub fn draw(terminal: &mut TuiTerminal, view: &PlayerView, state: &mut AppState) -> anyhow::Result<()> {
    if state.toast.as_ref().is_some_and(|t| t.is_expired()) {
        state.toast = None;
    }

    terminal
        .draw(|f| {
            widgets::root::render(f, view, state);
        })
        .context("terminal draw")?;
    Ok(())
}

