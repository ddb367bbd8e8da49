#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    /// Close whatever overlay is open.
    Dismiss,
    ToggleHelp,
    Resize,

    // Transport
    TogglePlay,
    PlayNext,
    PlayPrev,
    SeekForward,
    SeekBack,
    /// Progress bar click, as a fraction of the duration.
    SeekRatio(f64),
    /// Lyric line click: jump to that line and play.
    SeekToLine(usize),
    VolumeUp,
    VolumeDown,
    ToggleMute,
    CycleRepeatMode,

    // Playlist
    TogglePlaylist,
    ListUp,
    ListDown,
    GoTop,
    GoBottom,
    /// Play the selected playlist entry.
    Activate,
    /// Play the playlist entry at this index.
    PlayIndex(usize),

    /// Refetch the catalog.
    Refresh,
}
