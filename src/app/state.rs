use crate::lyrics::LyricsView;
use ratatui::layout::Rect;

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: std::time::Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > std::time::Duration::from_secs(3)
    }
}

/// Cursor over the playlist panel.
#[derive(Debug, Clone, Default)]
pub struct PlaylistCursor {
    pub selected: usize,
    pub scroll_offset: usize,
}

impl PlaylistCursor {
    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keep `selected` inside a list of `len` items.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected - visible_height + 1;
        }
    }
}

/// Where the clickable panels were drawn last frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct HitAreas {
    pub lyrics: Rect,
    pub progress: Rect,
    pub playlist: Rect,
}

pub struct AppState {
    pub should_quit: bool,
    pub tick: u64,
    /// Something changed since the last frame.
    pub dirty: bool,

    pub help_visible: bool,
    pub playlist: PlaylistCursor,
    pub lyrics: LyricsView,

    pub catalog_loading: bool,

    pub hit: HitAreas,

    pub toast: Option<Toast>,
    pub status: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            tick: 0,
            dirty: true,
            help_visible: false,
            playlist: PlaylistCursor::default(),
            lyrics: LyricsView::new(),
            catalog_loading: false,
            hit: HitAreas::default(),
            toast: None,
            status: String::new(),
        }
    }

    pub fn toast(&mut self, toast: Toast) {
        self.toast = Some(toast);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut c = PlaylistCursor::default();
        c.select_prev();
        assert_eq!(c.selected, 0);
        for _ in 0..10 {
            c.select_next(3);
        }
        assert_eq!(c.selected, 2);
        c.clamp(1);
        assert_eq!(c.selected, 0);
        c.select_next(0);
        assert_eq!(c.selected, 0);
    }

    #[test]
    fn test_cursor_scrolls_into_view() {
        let mut c = PlaylistCursor::default();
        c.select_last(20);
        c.update_scroll(5);
        assert_eq!(c.scroll_offset, 15);
        c.selected = 3;
        c.update_scroll(5);
        assert_eq!(c.scroll_offset, 3);
    }
}
