//! Synchronized lyrics
//!
//! This module provides:
//! - LRC format parser for synchronized lyrics
//! - Active line resolution for a playback position
//! - Scroll centering for the lyrics panel

pub mod parser;
pub mod scroll;
pub mod view;

pub use parser::{parse, LyricLine};
pub use view::LyricsView;

/// Index of the line to highlight at `current_time`.
///
/// This is the last line whose time is `<= current_time`. Before the first
/// timestamp the first line is still reported as active. `lines` must be
/// sorted by time, as [`parse`] returns them.
pub fn resolve_active_index(lines: &[LyricLine], current_time: f64) -> Option<usize> {
    if lines.is_empty() {
        return None;
    }
    let first_after = lines.partition_point(|l| l.time <= current_time);
    Some(first_after.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<LyricLine> {
        vec![
            LyricLine::new(0.0, "a"),
            LyricLine::new(5.0, "b"),
            LyricLine::new(10.0, "c"),
        ]
    }

    #[test]
    fn test_resolve_active_index() {
        let lines = abc();
        assert_eq!(resolve_active_index(&lines, 7.0), Some(1));
        assert_eq!(resolve_active_index(&lines, 10.0), Some(2));
        assert_eq!(resolve_active_index(&lines, 100.0), Some(2));
        assert_eq!(resolve_active_index(&lines, -1.0), Some(0));
        assert_eq!(resolve_active_index(&[], 3.0), None);
    }

    #[test]
    fn test_before_first_timestamp_shows_first_line() {
        let lines = vec![LyricLine::new(3.0, "x"), LyricLine::new(4.0, "y")];
        assert_eq!(resolve_active_index(&lines, 1.0), Some(0));
    }

    #[test]
    fn test_matches_linear_scan() {
        let lines = parse("[00:01.00]a\n[00:01.00]b\n[00:02.50]c\n[00:04.00]d\n[00:04.00]e");
        let linear = |t: f64| {
            let i = lines.iter().position(|l| l.time > t).unwrap_or(lines.len());
            if i > 0 { i - 1 } else { 0 }
        };
        for step in 0..60 {
            let t = f64::from(step) * 0.1 - 0.5;
            assert_eq!(resolve_active_index(&lines, t), Some(linear(t)), "t={t}");
        }
    }
}
