use crate::catalog::Catalog;
use crate::player::MediaEvent;

#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    Media(MediaEvent),
    Network(NetworkEvent),
    Ui(UiEvent),
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize,
}

#[derive(Debug, Clone)]
pub enum NetworkEvent {
    CatalogLoaded(Catalog),
    CatalogFailed(String),
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Frame clock for scroll animation and toast expiry.
    Tick,
    /// The lyric view loaded for `generation` has had time to lay out.
    LyricsSettled { generation: u64 },
}
