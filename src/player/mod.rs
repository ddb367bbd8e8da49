//! Playback: the transport state machine, track selection, and the media
//! backend it drives.

pub mod controller;
pub mod mpv;
pub mod selection;
pub mod state;

pub use controller::{PlaybackController, Transport};
pub use selection::Direction;
pub use state::{PlaybackState, RepeatMode, SessionSnapshot};

/// Identifies one `load` call. Events carry the id of the load they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadId(u64);

impl LoadId {
    /// Before any load was issued.
    pub const NONE: LoadId = LoadId(0);

    pub fn next(self) -> Self {
        LoadId(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub load: LoadId,
    pub kind: MediaEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    MetadataReady { duration: f64 },
    TimeProgress { position: f64 },
    /// The source is loaded and playback can start.
    CanPlay,
    Ended,
    Error(String),
}

/// The single audio output. Commands return once issued; their outcome comes
/// back later as [`MediaEvent`]s.
pub trait MediaResource {
    /// Replace the source. The new source starts paused.
    fn load(&mut self, load: LoadId, url: &str) -> anyhow::Result<()>;
    fn play(&mut self) -> anyhow::Result<()>;
    fn pause(&mut self) -> anyhow::Result<()>;
    fn seek(&mut self, seconds: f64) -> anyhow::Result<()>;
    /// `volume` is in 0.0..=1.0.
    fn set_volume(&mut self, volume: f64) -> anyhow::Result<()>;
}

impl<M: MediaResource + ?Sized> MediaResource for Box<M> {
    fn load(&mut self, load: LoadId, url: &str) -> anyhow::Result<()> {
        (**self).load(load, url)
    }

    fn play(&mut self) -> anyhow::Result<()> {
        (**self).play()
    }

    fn pause(&mut self) -> anyhow::Result<()> {
        (**self).pause()
    }

    fn seek(&mut self, seconds: f64) -> anyhow::Result<()> {
        (**self).seek(seconds)
    }

    fn set_volume(&mut self, volume: f64) -> anyhow::Result<()> {
        (**self).set_volume(volume)
    }
}

/// Stand-in used when no audio backend could be started. Every command fails,
/// which the controller treats like a rejected playback.
#[derive(Debug, Clone)]
pub struct DisabledMedia {
    reason: String,
}

impl DisabledMedia {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail(&self) -> anyhow::Result<()> {
        anyhow::bail!("audio backend unavailable: {}", self.reason)
    }
}

impl MediaResource for DisabledMedia {
    fn load(&mut self, _load: LoadId, _url: &str) -> anyhow::Result<()> {
        self.fail()
    }

    fn play(&mut self) -> anyhow::Result<()> {
        self.fail()
    }

    fn pause(&mut self) -> anyhow::Result<()> {
        self.fail()
    }

    fn seek(&mut self, _seconds: f64) -> anyhow::Result<()> {
        self.fail()
    }

    fn set_volume(&mut self, _volume: f64) -> anyhow::Result<()> {
        self.fail()
    }
}
