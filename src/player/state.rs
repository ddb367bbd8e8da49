use crate::catalog::Track;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    #[default]
    Sequential,
    #[serde(rename = "single")]
    SingleRepeat,
    Shuffle,
}

impl RepeatMode {
    pub fn next(self) -> Self {
        match self {
            RepeatMode::Sequential => RepeatMode::SingleRepeat,
            RepeatMode::SingleRepeat => RepeatMode::Shuffle,
            RepeatMode::Shuffle => RepeatMode::Sequential,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::Sequential => "Repeat: All",
            RepeatMode::SingleRepeat => "Repeat: One",
            RepeatMode::Shuffle => "Shuffle",
        }
    }
}

/// Everything the UI needs to know about playback. Only the controller
/// mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    /// 0.0..=1.0, kept while muted.
    pub volume: f64,
    pub muted: bool,
    pub repeat_mode: RepeatMode,
    pub current_track_id: Option<String>,
    pub playlist_visible: bool,
}

impl PlaybackState {
    pub const DEFAULT_VOLUME: f64 = 0.3;

    /// Volume actually sent to the output.
    pub fn effective_volume(&self) -> f64 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Playback position as a fraction of the duration.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: Self::DEFAULT_VOLUME,
            muted: false,
            repeat_mode: RepeatMode::Sequential,
            current_track_id: None,
            playlist_visible: false,
        }
    }
}

/// The part of a session that survives restarts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub volume: Option<f64>,
    pub repeat_mode: Option<RepeatMode>,
    pub catalog: Vec<Track>,
    pub current_track_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_mode_cycle() {
        let m = RepeatMode::default();
        assert_eq!(m, RepeatMode::Sequential);
        assert_eq!(m.next(), RepeatMode::SingleRepeat);
        assert_eq!(m.next().next(), RepeatMode::Shuffle);
        assert_eq!(m.next().next().next(), RepeatMode::Sequential);
    }

    #[test]
    fn test_repeat_mode_serde_names() {
        assert_eq!(
            serde_json::to_string(&RepeatMode::SingleRepeat).unwrap(),
            "\"single\""
        );
        assert_eq!(
            serde_json::from_str::<RepeatMode>("\"sequential\"").unwrap(),
            RepeatMode::Sequential
        );
    }

    #[test]
    fn test_effective_volume() {
        let mut s = PlaybackState::default();
        assert_eq!(s.effective_volume(), 0.3);
        s.muted = true;
        assert_eq!(s.effective_volume(), 0.0);
        assert_eq!(s.volume, 0.3);
    }
}
