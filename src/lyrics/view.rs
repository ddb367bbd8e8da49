//! Lyrics for the current track, the active line, and the panel scroll state.

use super::parser::{self, LyricLine};
use super::resolve_active_index;
use super::scroll::{compute_scroll_offset, ContainerGeometry, LineGeometry, SmoothScroll};
use std::time::Duration;
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Default)]
pub struct LyricsView {
    track_id: Option<String>,
    lines: Vec<LyricLine>,
    active: Option<usize>,
    scroll: SmoothScroll,
    /// Bumped on every reload so late settle timers can be ignored.
    generation: u64,
    width: u16,
    height: u16,
}

impl LyricsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_id(&self) -> Option<&str> {
        self.track_id.as_deref()
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the lines with those parsed from `raw`. Returns the new
    /// generation, to be handed back to [`LyricsView::settle`].
    pub fn load(&mut self, track_id: Option<&str>, raw: &str) -> u64 {
        self.track_id = track_id.map(str::to_string);
        self.lines = parser::parse(raw);
        self.active = None;
        self.scroll.reset(0.0);
        self.generation += 1;
        tracing::debug!(
            track = ?self.track_id,
            lines = self.lines.len(),
            "lyrics loaded"
        );
        self.generation
    }

    /// Resolve the active line for `time`. Returns true if it changed.
    pub fn update_time(&mut self, time: f64) -> bool {
        let active = resolve_active_index(&self.lines, time);
        if active == self.active {
            return false;
        }
        self.active = active;
        self.recenter();
        true
    }

    /// Re-scroll once layout has settled after a reload.
    pub fn settle(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.recenter();
        true
    }

    /// Record the panel size. Re-centers if it changed.
    pub fn set_viewport(&mut self, width: u16, height: u16) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.recenter();
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        self.scroll.tick(dt)
    }

    /// First visible row of the content.
    pub fn scroll_offset(&self) -> usize {
        self.scroll.position().round() as usize
    }

    /// Number of rows each line takes when wrapped to the current width.
    pub fn line_heights(&self) -> Vec<usize> {
        let width = usize::from(self.width.max(1));
        self.lines
            .iter()
            .map(|l| wrap_rows(&l.text, width).len())
            .collect()
    }

    /// Index of the line drawn at `row` of the visible panel.
    pub fn line_at_row(&self, row: u16) -> Option<usize> {
        let content_row = self.scroll_offset() + usize::from(row);
        let mut top = 0;
        for (i, h) in self.line_heights().into_iter().enumerate() {
            if content_row < top + h {
                return Some(i);
            }
            top += h;
        }
        None
    }

    fn recenter(&mut self) {
        let heights = self.line_heights();
        let content: usize = heights.iter().sum();
        let current = self.scroll.target();

        let active = self.active.map(|i| {
            let top: usize = heights[..i].iter().sum();
            LineGeometry {
                top: top as f64 - current,
                height: heights[i] as f64,
            }
        });
        let container = ContainerGeometry {
            height: f64::from(self.height),
        };

        let max_offset = content.saturating_sub(usize::from(self.height)) as f64;
        let target = compute_scroll_offset(container, active, current).min(max_offset);
        self.scroll.scroll_to(target);
    }
}

/// Split `text` into rows of at most `width` terminal cells. Wide (CJK)
/// characters count as two. Always returns at least one row.
pub fn wrap_rows(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width && !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            used = 0;
        }
        row.push(ch);
        used += w;
    }
    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_with(n: usize, height: u16) -> LyricsView {
        let raw: String = (0..n)
            .map(|i| format!("[00:{:02}.00]line {i}\n", i * 2))
            .collect();
        let mut v = LyricsView::new();
        v.load(Some("t"), &raw);
        v.set_viewport(40, height);
        v
    }

    fn settle_animation(v: &mut LyricsView) {
        for _ in 0..200 {
            v.tick(Duration::from_millis(33));
        }
    }

    #[test]
    fn test_active_line_scrolls_to_middle() {
        let mut v = view_with(30, 10);
        assert!(v.update_time(20.0));
        assert_eq!(v.active(), Some(10));
        settle_animation(&mut v);
        // Line 10 is one row tall; its top should sit at row 4 or 5 of 10.
        assert_eq!(v.scroll_offset(), 10 - 4);
        assert_eq!(v.line_at_row(4), Some(10));
    }

    #[test]
    fn test_same_active_line_is_not_a_change() {
        let mut v = view_with(5, 10);
        assert!(v.update_time(2.5));
        assert!(!v.update_time(3.0));
    }

    #[test]
    fn test_scroll_clamped_to_content() {
        let mut v = view_with(12, 10);
        v.update_time(100.0);
        settle_animation(&mut v);
        assert_eq!(v.active(), Some(11));
        assert_eq!(v.scroll_offset(), 2);
    }

    #[test]
    fn test_settle_ignores_old_generation() {
        let mut v = view_with(5, 10);
        let old = v.generation();
        let new = v.load(Some("u"), "[00:01.00]x");
        assert!(!v.settle(old));
        assert!(v.settle(new));
        assert_eq!(v.track_id(), Some("u"));
    }

    #[test]
    fn test_wrapped_line_heights() {
        let mut v = LyricsView::new();
        v.load(None, "[00:01.00]abcdefghij\n[00:02.00]abc");
        v.set_viewport(4, 10);
        assert_eq!(v.line_heights(), vec![3, 1]);
        assert_eq!(v.line_at_row(2), Some(0));
        assert_eq!(v.line_at_row(3), Some(1));
        assert_eq!(v.line_at_row(4), None);
    }

    #[test]
    fn test_wide_characters_wrap_by_cell_width() {
        let mut v = LyricsView::new();
        v.load(None, "[00:01.00]我们一起唱这首歌直到天亮\n[00:02.00]ab");
        v.set_viewport(10, 10);
        // 12 wide characters = 24 cells = 3 rows of 10.
        assert_eq!(v.line_heights(), vec![3, 1]);
        assert_eq!(v.line_at_row(3), Some(1));

        let rows = wrap_rows("我们一起唱这首歌直到天亮", 10);
        assert_eq!(rows, vec!["我们一起唱", "这首歌直到", "天亮"]);
        assert_eq!(wrap_rows("a我", 2), vec!["a", "我"]);
        assert_eq!(wrap_rows("", 5), vec![""]);
    }
}
