use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_highlight: Color,
    pub fg_primary: Color,
    pub fg_secondary: Color,
    /// Active lyric line, titles, progress.
    pub accent: Color,
    pub accent_alt: Color,
    pub border: Color,
    pub playing: Color,
    pub error: Color,
}

impl Palette {
    pub const EMBER: Self = Self {
        bg_highlight: Color::Rgb(52, 40, 36),     // #342824
        fg_primary: Color::Rgb(238, 238, 238),    // #eeeeee
        fg_secondary: Color::Rgb(128, 128, 128),  // #808080 inactive lyrics
        accent: Color::Rgb(243, 93, 38),          // #f35d26
        accent_alt: Color::Rgb(250, 160, 110),    // #faa06e
        border: Color::Rgb(70, 70, 70),           // #464646
        playing: Color::Rgb(243, 93, 38),         // #f35d26
        error: Color::Rgb(230, 72, 72),           // #e64848
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::EMBER
    }
}
