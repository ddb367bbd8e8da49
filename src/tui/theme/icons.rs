//! Nerd Font glyphs (https://www.nerdfonts.com)

#[derive(Debug, Clone)]
pub struct Icons {
    pub play: &'static str,
    pub pause: &'static str,
    pub next: &'static str,
    pub prev: &'static str,

    pub volume_mute: &'static str,
    pub volume_low: &'static str,
    pub volume_high: &'static str,

    // One per repeat mode
    pub repeat: &'static str,
    pub repeat_one: &'static str,
    pub shuffle: &'static str,

    pub success: &'static str,
    pub error: &'static str,
    pub loading: &'static str,
    pub help: &'static str,

    pub music: &'static str,
    pub playlist: &'static str,
    pub lyrics: &'static str,

    pub progress_full: &'static str,
    pub progress_empty: &'static str,
    pub progress_head: &'static str,
}

impl Icons {
    pub const fn nerd() -> Self {
        Self {
            play: "\u{f04b}",        // nf-fa-play
            pause: "\u{f04c}",       // nf-fa-pause
            next: "\u{f051}",        // nf-fa-step_forward
            prev: "\u{f048}",        // nf-fa-step_backward

            volume_mute: "\u{f026}", // nf-fa-volume_off
            volume_low: "\u{f027}",  // nf-fa-volume_down
            volume_high: "\u{f028}", // nf-fa-volume_up

            repeat: "\u{f456}",      // nf-md-repeat
            repeat_one: "\u{f458}",  // nf-md-repeat_once
            shuffle: "\u{f49d}",     // nf-md-shuffle

            success: "\u{f00c}",     // nf-fa-check
            error: "\u{f00d}",       // nf-fa-times
            loading: "\u{f110}",     // nf-fa-spinner
            help: "\u{f059}",        // nf-fa-question_circle

            music: "\u{f001}",       // nf-fa-music
            playlist: "\u{f0cb}",    // nf-fa-list_ol
            lyrics: "\u{f15c}",      // nf-fa-file_text_o

            progress_full: "━",
            progress_empty: "─",
            progress_head: "●",
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self::nerd()
    }
}

pub struct LoadingSpinner;

impl LoadingSpinner {
    pub const BRAILLE: [&'static str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

    /// Advances every 4 ticks.
    pub fn frame(tick: u64) -> &'static str {
        let idx = (tick / 4) as usize % Self::BRAILLE.len();
        Self::BRAILLE[idx]
    }
}
