//! Picks the next or previous track for a repeat mode.

use super::state::RepeatMode;
use crate::catalog::Track;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// Select the track to play after (or before) `current_id`.
///
/// Returns `None` only for an empty catalog. An unknown `current_id` falls
/// back to the first track.
pub fn select_next<'a>(
    tracks: &'a [Track],
    current_id: Option<&str>,
    mode: RepeatMode,
    direction: Direction,
) -> Option<&'a Track> {
    select_next_with(&mut rand::rng(), tracks, current_id, mode, direction)
}

pub fn select_next_with<'a, R: Rng + ?Sized>(
    rng: &mut R,
    tracks: &'a [Track],
    current_id: Option<&str>,
    mode: RepeatMode,
    direction: Direction,
) -> Option<&'a Track> {
    let current = current_id.and_then(|id| tracks.iter().position(|t| t.id == id));
    let Some(current) = current else {
        return tracks.first();
    };
    let len = tracks.len();

    let index = match mode {
        RepeatMode::SingleRepeat => current,
        // Uniform over every track except the current one. No notion of "previous".
        RepeatMode::Shuffle if len == 1 => current,
        RepeatMode::Shuffle => {
            let pick = rng.random_range(0..len - 1);
            if pick >= current { pick + 1 } else { pick }
        }
        RepeatMode::Sequential => match direction {
            Direction::Next => (current + 1) % len,
            Direction::Prev => (current + len - 1) % len,
        },
    };

    tracks.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::make_track;
    use rand::{rngs::StdRng, SeedableRng};

    fn abc() -> Vec<Track> {
        vec![make_track("A"), make_track("B"), make_track("C")]
    }

    fn id(t: Option<&Track>) -> Option<&str> {
        t.map(|t| t.id.as_str())
    }

    #[test]
    fn test_sequential_wraps() {
        let tracks = abc();
        let m = RepeatMode::Sequential;
        assert_eq!(id(select_next(&tracks, Some("C"), m, Direction::Next)), Some("A"));
        assert_eq!(id(select_next(&tracks, Some("A"), m, Direction::Prev)), Some("C"));
        assert_eq!(id(select_next(&tracks, Some("A"), m, Direction::Next)), Some("B"));
        assert_eq!(id(select_next(&tracks, Some("B"), m, Direction::Prev)), Some("A"));
    }

    #[test]
    fn test_single_repeat_keeps_current() {
        let tracks = abc();
        for dir in [Direction::Next, Direction::Prev] {
            assert_eq!(
                id(select_next(&tracks, Some("B"), RepeatMode::SingleRepeat, dir)),
                Some("B")
            );
        }
        let one = vec![make_track("X")];
        assert_eq!(
            id(select_next(&one, Some("X"), RepeatMode::SingleRepeat, Direction::Next)),
            Some("X")
        );
    }

    #[test]
    fn test_shuffle_excludes_current() {
        let tracks = abc();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let t = select_next_with(&mut rng, &tracks, Some("B"), RepeatMode::Shuffle, Direction::Prev)
                .unwrap();
            assert_ne!(t.id, "B");
            seen.insert(t.id.clone());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_shuffle_two_tracks_alternates() {
        let tracks = vec![make_track("A"), make_track("B")];
        assert_eq!(
            id(select_next(&tracks, Some("A"), RepeatMode::Shuffle, Direction::Next)),
            Some("B")
        );
        let one = vec![make_track("A")];
        assert_eq!(
            id(select_next(&one, Some("A"), RepeatMode::Shuffle, Direction::Next)),
            Some("A")
        );
    }

    #[test]
    fn test_unknown_current_falls_back_to_first() {
        let tracks = abc();
        for mode in [RepeatMode::Sequential, RepeatMode::SingleRepeat, RepeatMode::Shuffle] {
            assert_eq!(id(select_next(&tracks, Some("Z"), mode, Direction::Next)), Some("A"));
            assert_eq!(id(select_next(&tracks, None, mode, Direction::Prev)), Some("A"));
        }
    }

    #[test]
    fn test_empty_catalog_selects_nothing() {
        assert!(select_next(&[], Some("A"), RepeatMode::Sequential, Direction::Next).is_none());
    }
}
