//! Transport state machine. Sole owner of the media resource.

use super::selection::{select_next, Direction};
use super::state::{PlaybackState, RepeatMode, SessionSnapshot};
use super::{LoadId, MediaEvent, MediaEventKind, MediaResource};
use crate::catalog::{Catalog, Track};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// No source assigned.
    Idle,
    /// Source assigned, waiting for the backend to report it can play.
    Loading,
    /// Loaded and paused.
    Ready,
    Playing,
    /// Reached the end of the source.
    Ended,
}

pub struct PlaybackController<M: MediaResource> {
    media: M,
    state: PlaybackState,
    transport: Transport,
    catalog: Catalog,
    loaded_src: Option<String>,
    load_id: LoadId,
    resume_on_ready: bool,
    publisher: watch::Sender<PlaybackState>,
}

impl<M: MediaResource> PlaybackController<M> {
    pub fn new(media: M) -> Self {
        let state = PlaybackState::default();
        let (publisher, _) = watch::channel(state.clone());
        Self {
            media,
            state,
            transport: Transport::Idle,
            catalog: Catalog::default(),
            loaded_src: None,
            load_id: LoadId::NONE,
            resume_on_ready: false,
            publisher,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state
            .current_track_id
            .as_deref()
            .and_then(|id| self.catalog.get(id))
    }

    /// Receive every state change. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.publisher.subscribe()
    }

    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
    }

    /// Restore persisted state. Never starts playback.
    pub fn rehydrate(&mut self, snapshot: SessionSnapshot) {
        if let Some(v) = snapshot.volume {
            self.state.volume = v.clamp(0.0, 1.0);
        }
        if let Some(mode) = snapshot.repeat_mode {
            self.state.repeat_mode = mode;
        }
        self.catalog = Catalog::new(snapshot.catalog);

        let current = snapshot
            .current_track_id
            .as_deref()
            .and_then(|id| self.catalog.get(id))
            .cloned();
        match current {
            Some(track) => {
                self.load_track(&track);
            }
            None => self.publish(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            volume: Some(self.state.volume),
            repeat_mode: Some(self.state.repeat_mode),
            catalog: self.catalog.tracks().to_vec(),
            current_track_id: self.state.current_track_id.clone(),
        }
    }

    /// Assign `track` as the source. Returns false if it was already loaded.
    ///
    /// Playback resumes on the new source once it is ready if the controller
    /// was playing (or about to) when this was called.
    pub fn load_track(&mut self, track: &Track) -> bool {
        if track.audio_url.is_empty() {
            tracing::warn!(id = %track.id, "track has no audio url");
            return false;
        }
        if self.is_loaded(track) {
            tracing::debug!(id = %track.id, "source already loaded");
            return false;
        }

        self.load_id = self.load_id.next();
        self.resume_on_ready = self.state.is_playing;
        self.state.current_track_id = Some(track.id.clone());
        self.state.current_time = 0.0;
        self.state.duration = 0.0;

        match self.media.load(self.load_id, &track.audio_url) {
            Ok(()) => {
                tracing::info!(id = %track.id, title = %track.title, load = ?self.load_id, "loading track");
                self.loaded_src = Some(track.audio_url.clone());
                self.transport = Transport::Loading;
            }
            Err(e) => {
                tracing::error!(id = %track.id, error = %format!("{e:#}"), "load failed");
                self.loaded_src = None;
                self.transport = Transport::Idle;
                self.resume_on_ready = false;
                self.state.is_playing = false;
            }
        }
        self.publish();
        true
    }

    pub fn play(&mut self) {
        match self.transport {
            Transport::Idle => {
                tracing::debug!("play ignored: nothing loaded");
            }
            Transport::Playing => {}
            Transport::Loading => {
                self.resume_on_ready = true;
                self.state.is_playing = true;
                self.publish();
            }
            Transport::Ready | Transport::Ended => self.start_media(),
        }
    }

    pub fn pause(&mut self) {
        match self.transport {
            Transport::Playing => {
                if let Err(e) = self.media.pause() {
                    tracing::warn!(error = %format!("{e:#}"), "pause failed");
                }
                self.transport = Transport::Ready;
            }
            Transport::Loading => self.resume_on_ready = false,
            _ => {}
        }
        self.state.is_playing = false;
        self.publish();
    }

    pub fn toggle_play(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Move to `seconds`, clamped to the track. Play/pause state and volume
    /// are kept.
    pub fn seek(&mut self, seconds: f64) {
        if self.transport == Transport::Idle || seconds.is_nan() {
            return;
        }
        let target = seconds.clamp(0.0, self.state.duration.max(0.0));
        if let Err(e) = self.media.seek(target) {
            tracing::warn!(error = %format!("{e:#}"), "seek failed");
        }
        self.apply_volume();
        self.state.current_time = target;
        if self.transport == Transport::Ended && target < self.state.duration {
            self.transport = Transport::Ready;
        }
        self.publish();
    }

    /// Set the stored volume. Unmutes.
    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_nan() {
            return;
        }
        self.state.volume = volume.clamp(0.0, 1.0);
        self.state.muted = false;
        self.apply_volume();
        self.publish();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.state.muted = muted;
        self.apply_volume();
        self.publish();
    }

    pub fn toggle_mute(&mut self) {
        self.set_muted(!self.state.muted);
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.state.repeat_mode = mode;
        self.publish();
    }

    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        self.set_repeat_mode(self.state.repeat_mode.next());
        self.state.repeat_mode
    }

    pub fn toggle_playlist(&mut self) {
        self.state.playlist_visible = !self.state.playlist_visible;
        self.publish();
    }

    pub fn set_playlist_visible(&mut self, visible: bool) {
        self.state.playlist_visible = visible;
        self.publish();
    }

    /// Skip according to the repeat mode, then play. Tracks without audio
    /// are passed over.
    pub fn advance(&mut self, direction: Direction) {
        let Some(next) = self.next_playable(direction) else {
            tracing::debug!("advance ignored: no playable track");
            return;
        };

        if self.is_loaded(&next) {
            self.replay();
        } else {
            self.load_track(&next);
            self.play();
        }
    }

    /// Play `track` as picked from the playlist. Returns false, leaving the
    /// current track untouched, if it has no audio.
    pub fn select_track(&mut self, track: &Track) -> bool {
        if track.audio_url.is_empty() {
            tracing::warn!(id = %track.id, "selected track has no audio url");
            return false;
        }
        if !self.is_loaded(track) {
            self.load_track(track);
        }
        self.play();
        true
    }

    pub fn on_track_ended(&mut self) {
        self.state.is_playing = false;
        self.transport = Transport::Ended;
        self.publish();
        if !self.catalog.is_empty() {
            self.advance(Direction::Next);
        }
    }

    /// Apply an event from the media resource. Returns false if it belonged
    /// to a superseded load and was dropped.
    pub fn handle_media_event(&mut self, event: MediaEvent) -> bool {
        if event.load != self.load_id {
            tracing::trace!(stale = ?event.load, current = ?self.load_id, "dropping stale media event");
            return false;
        }

        match event.kind {
            MediaEventKind::MetadataReady { duration } => {
                self.state.duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
                self.publish();
            }
            MediaEventKind::TimeProgress { position } => {
                self.state.current_time = position.max(0.0);
                self.publish();
            }
            MediaEventKind::CanPlay => {
                if self.transport != Transport::Loading {
                    return true;
                }
                self.transport = Transport::Ready;
                self.apply_volume();
                if std::mem::take(&mut self.resume_on_ready) {
                    self.start_media();
                } else {
                    self.publish();
                }
            }
            MediaEventKind::Ended => self.on_track_ended(),
            MediaEventKind::Error(msg) => {
                tracing::warn!(error = %msg, "media error");
                self.resume_on_ready = false;
                self.state.is_playing = false;
                if matches!(self.transport, Transport::Playing | Transport::Loading) {
                    self.transport = Transport::Ready;
                }
                self.publish();
            }
        }
        true
    }

    fn next_playable(&self, direction: Direction) -> Option<Track> {
        let mut from = self.state.current_track_id.clone();
        for _ in 0..self.catalog.len() {
            let next = select_next(
                self.catalog.tracks(),
                from.as_deref(),
                self.state.repeat_mode,
                direction,
            )?;
            if !next.audio_url.is_empty() {
                return Some(next.clone());
            }
            tracing::warn!(id = %next.id, "skipping track without audio url");
            from = Some(next.id.clone());
        }
        None
    }

    fn is_loaded(&self, track: &Track) -> bool {
        self.loaded_src
            .as_deref()
            .is_some_and(|src| normalize_url(src) == normalize_url(&track.audio_url))
    }

    /// Restart the loaded source from the top.
    fn replay(&mut self) {
        match self.transport {
            Transport::Idle => {}
            Transport::Loading => self.play(),
            _ => {
                if let Err(e) = self.media.seek(0.0) {
                    tracing::warn!(error = %format!("{e:#}"), "rewind failed");
                }
                self.state.current_time = 0.0;
                self.start_media();
            }
        }
    }

    fn start_media(&mut self) {
        match self.media.play() {
            Ok(()) => {
                self.transport = Transport::Playing;
                self.state.is_playing = true;
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "playback rejected");
                self.state.is_playing = false;
                if self.transport == Transport::Playing {
                    self.transport = Transport::Ready;
                }
            }
        }
        self.publish();
    }

    fn apply_volume(&mut self) {
        if let Err(e) = self.media.set_volume(self.state.effective_volume()) {
            tracing::debug!(error = %format!("{e:#}"), "set volume failed");
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }
}

/// Compare sources ignoring the scheme and one trailing slash.
pub fn normalize_url(url: &str) -> &str {
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    url.strip_suffix('/').unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::make_track;

    #[derive(Debug, Clone, PartialEq)]
    enum Cmd {
        Load(LoadId, String),
        Play,
        Pause,
        Seek(f64),
        Volume(f64),
    }

    #[derive(Default)]
    struct FakeMedia {
        log: Vec<Cmd>,
        reject_play: bool,
    }

    impl MediaResource for FakeMedia {
        fn load(&mut self, load: LoadId, url: &str) -> anyhow::Result<()> {
            self.log.push(Cmd::Load(load, url.to_string()));
            Ok(())
        }

        fn play(&mut self) -> anyhow::Result<()> {
            if self.reject_play {
                anyhow::bail!("autoplay blocked");
            }
            self.log.push(Cmd::Play);
            Ok(())
        }

        fn pause(&mut self) -> anyhow::Result<()> {
            self.log.push(Cmd::Pause);
            Ok(())
        }

        fn seek(&mut self, seconds: f64) -> anyhow::Result<()> {
            self.log.push(Cmd::Seek(seconds));
            Ok(())
        }

        fn set_volume(&mut self, volume: f64) -> anyhow::Result<()> {
            self.log.push(Cmd::Volume(volume));
            Ok(())
        }
    }

    fn controller() -> PlaybackController<FakeMedia> {
        let mut c = PlaybackController::new(FakeMedia::default());
        c.set_catalog(Catalog::new(vec![
            make_track("A"),
            make_track("B"),
            make_track("C"),
        ]));
        c
    }

    fn event(c: &PlaybackController<FakeMedia>, kind: MediaEventKind) -> MediaEvent {
        MediaEvent {
            load: c.load_id,
            kind,
        }
    }

    /// Load a track and let the fake backend report it ready.
    fn ready(c: &mut PlaybackController<FakeMedia>, id: &str, duration: f64) {
        let track = c.catalog().get(id).cloned().unwrap();
        c.load_track(&track);
        let metadata = event(c, MediaEventKind::MetadataReady { duration });
        c.handle_media_event(metadata);
        let can_play = event(c, MediaEventKind::CanPlay);
        c.handle_media_event(can_play);
    }

    fn loads(c: &PlaybackController<FakeMedia>) -> usize {
        c.media.log.iter().filter(|m| matches!(m, Cmd::Load(..))).count()
    }

    #[test]
    fn test_play_without_track_is_noop() {
        let mut c = controller();
        c.play();
        assert!(!c.state().is_playing);
        assert_eq!(c.transport(), Transport::Idle);
        assert!(c.media.log.is_empty());
    }

    #[test]
    fn test_load_then_play_then_pause() {
        let mut c = controller();
        ready(&mut c, "A", 100.0);
        assert_eq!(c.transport(), Transport::Ready);
        assert!(!c.state().is_playing);
        assert_eq!(c.state().duration, 100.0);

        c.play();
        assert_eq!(c.transport(), Transport::Playing);
        assert!(c.state().is_playing);

        c.pause();
        assert_eq!(c.transport(), Transport::Ready);
        assert!(!c.state().is_playing);
        assert_eq!(c.media.log.last(), Some(&Cmd::Pause));
    }

    #[test]
    fn test_redundant_load_is_noop() {
        let mut c = controller();
        let a = c.catalog().get("A").cloned().unwrap();
        assert!(c.load_track(&a));
        let mut same = a.clone();
        same.audio_url = same.audio_url.replace("http://", "https://") + "/";
        assert!(!c.load_track(&same));
        assert_eq!(loads(&c), 1);
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("http://h/a.mp3"), "h/a.mp3");
        assert_eq!(normalize_url("https://h/a.mp3/"), "h/a.mp3");
        assert_eq!(normalize_url("h/a.mp3"), "h/a.mp3");
    }

    #[test]
    fn test_switch_while_playing_resumes_on_ready() {
        let mut c = controller();
        ready(&mut c, "A", 100.0);
        c.play();

        let b = c.catalog().get("B").cloned().unwrap();
        c.load_track(&b);
        assert_eq!(c.transport(), Transport::Loading);
        c.media.log.clear();

        c.handle_media_event(event(&c, MediaEventKind::CanPlay));
        assert_eq!(c.transport(), Transport::Playing);
        assert!(c.media.log.contains(&Cmd::Play));
    }

    #[test]
    fn test_switch_while_paused_stays_paused() {
        let mut c = controller();
        ready(&mut c, "A", 100.0);
        ready(&mut c, "B", 50.0);
        assert_eq!(c.transport(), Transport::Ready);
        assert!(!c.media.log.contains(&Cmd::Play));
    }

    #[test]
    fn test_stale_events_ignored() {
        let mut c = controller();
        ready(&mut c, "A", 100.0);
        c.play();
        let old = c.load_id;

        let b = c.catalog().get("B").cloned().unwrap();
        c.load_track(&b);
        c.media.log.clear();

        assert!(!c.handle_media_event(MediaEvent {
            load: old,
            kind: MediaEventKind::TimeProgress { position: 42.0 },
        }));
        c.handle_media_event(MediaEvent {
            load: old,
            kind: MediaEventKind::CanPlay,
        });
        c.handle_media_event(MediaEvent {
            load: old,
            kind: MediaEventKind::Ended,
        });
        assert_eq!(c.state().current_time, 0.0);
        assert_eq!(c.transport(), Transport::Loading);
        assert_eq!(c.state().current_track_id.as_deref(), Some("B"));
        assert!(c.media.log.is_empty());
    }

    #[test]
    fn test_seek_clamps_and_keeps_volume() {
        let mut c = controller();
        ready(&mut c, "A", 100.0);
        c.set_volume(0.6);
        c.play();
        c.media.log.clear();

        c.seek(500.0);
        assert_eq!(c.state().current_time, 100.0);
        assert_eq!(c.media.log, vec![Cmd::Seek(100.0), Cmd::Volume(0.6)]);

        c.seek(-3.0);
        assert_eq!(c.state().current_time, 0.0);
        assert!(c.state().is_playing);
        assert_eq!(c.transport(), Transport::Playing);
    }

    #[test]
    fn test_mute_round_trip() {
        let mut c = controller();
        c.set_volume(0.7);
        c.toggle_mute();
        assert!(c.state().muted);
        assert_eq!(c.state().effective_volume(), 0.0);
        assert_eq!(c.media.log.last(), Some(&Cmd::Volume(0.0)));

        c.toggle_mute();
        assert!(!c.state().muted);
        assert_eq!(c.state().volume, 0.7);
        assert_eq!(c.media.log.last(), Some(&Cmd::Volume(0.7)));
    }

    #[test]
    fn test_set_volume_while_muted_unmutes() {
        let mut c = controller();
        c.set_muted(true);
        c.set_volume(0.4);
        assert!(!c.state().muted);
        assert_eq!(c.media.log.last(), Some(&Cmd::Volume(0.4)));
        c.set_volume(3.0);
        assert_eq!(c.state().volume, 1.0);
    }

    #[test]
    fn test_ended_advances_sequentially_and_plays() {
        let mut c = controller();
        ready(&mut c, "C", 100.0);
        c.play();
        c.handle_media_event(event(&c, MediaEventKind::Ended));
        assert_eq!(c.state().current_track_id.as_deref(), Some("A"));
        assert_eq!(c.transport(), Transport::Loading);
        assert!(c.state().is_playing);

        c.handle_media_event(event(&c, MediaEventKind::CanPlay));
        assert_eq!(c.transport(), Transport::Playing);
    }

    #[test]
    fn test_single_repeat_replays_same_source() {
        let mut c = controller();
        c.set_repeat_mode(RepeatMode::SingleRepeat);
        ready(&mut c, "B", 100.0);
        c.play();
        c.media.log.clear();

        c.handle_media_event(event(&c, MediaEventKind::Ended));
        assert_eq!(c.state().current_track_id.as_deref(), Some("B"));
        assert_eq!(c.media.log, vec![Cmd::Seek(0.0), Cmd::Play]);
        assert_eq!(c.transport(), Transport::Playing);
    }

    #[test]
    fn test_advance_on_empty_catalog_does_nothing() {
        let mut c = PlaybackController::new(FakeMedia::default());
        c.advance(Direction::Next);
        c.on_track_ended();
        assert!(c.media.log.is_empty());
        assert_eq!(c.state().current_track_id, None);
    }

    #[test]
    fn test_manual_prev_autoplays() {
        let mut c = controller();
        ready(&mut c, "A", 100.0);
        c.advance(Direction::Prev);
        assert_eq!(c.state().current_track_id.as_deref(), Some("C"));
        assert!(c.state().is_playing);
        c.handle_media_event(event(&c, MediaEventKind::CanPlay));
        assert_eq!(c.transport(), Transport::Playing);
    }

    #[test]
    fn test_rejected_play_forces_paused() {
        let mut c = controller();
        ready(&mut c, "A", 100.0);
        c.media.reject_play = true;
        c.play();
        assert!(!c.state().is_playing);
        assert_eq!(c.transport(), Transport::Ready);
        assert_eq!(c.state().current_track_id.as_deref(), Some("A"));
    }

    #[test]
    fn test_media_error_keeps_track_loaded() {
        let mut c = controller();
        ready(&mut c, "A", 100.0);
        c.play();
        c.handle_media_event(event(&c, MediaEventKind::Error("decode".into())));
        assert!(!c.state().is_playing);
        assert_eq!(c.transport(), Transport::Ready);
        assert_eq!(c.current_track().map(|t| t.id.as_str()), Some("A"));
    }

    #[test]
    fn test_time_updates_are_published() {
        let mut c = controller();
        let mut rx = c.subscribe();
        ready(&mut c, "A", 100.0);
        c.handle_media_event(event(&c, MediaEventKind::TimeProgress { position: 12.5 }));
        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.current_time, 12.5);
        assert_eq!(seen.duration, 100.0);
    }

    #[test]
    fn test_rehydrate_restores_without_playing() {
        let mut c = PlaybackController::new(FakeMedia::default());
        c.rehydrate(SessionSnapshot {
            volume: Some(0.8),
            repeat_mode: Some(RepeatMode::Shuffle),
            catalog: vec![make_track("A"), make_track("B")],
            current_track_id: Some("B".into()),
        });
        assert_eq!(c.state().volume, 0.8);
        assert_eq!(c.state().repeat_mode, RepeatMode::Shuffle);
        assert_eq!(c.state().current_track_id.as_deref(), Some("B"));
        assert_eq!(c.transport(), Transport::Loading);
        assert!(!c.state().is_playing);

        let snap = c.snapshot();
        assert_eq!(snap.catalog.len(), 2);
        assert_eq!(snap.current_track_id.as_deref(), Some("B"));
    }

    fn with_silent_b() -> PlaybackController<FakeMedia> {
        let mut silent = make_track("B");
        silent.audio_url.clear();
        let mut c = PlaybackController::new(FakeMedia::default());
        c.set_catalog(Catalog::new(vec![make_track("A"), silent, make_track("C")]));
        c
    }

    #[test]
    fn test_advance_skips_track_without_audio() {
        let mut c = with_silent_b();
        ready(&mut c, "A", 100.0);
        c.play();

        c.advance(Direction::Next);
        assert_eq!(c.state().current_track_id.as_deref(), Some("C"));
        assert_eq!(c.transport(), Transport::Loading);
        assert_eq!(loads(&c), 2);

        c.advance(Direction::Prev);
        assert_eq!(c.state().current_track_id.as_deref(), Some("A"));
    }

    #[test]
    fn test_ended_before_silent_track_moves_past_it() {
        let mut c = with_silent_b();
        ready(&mut c, "A", 100.0);
        c.play();
        c.handle_media_event(event(&c, MediaEventKind::Ended));
        assert_eq!(c.state().current_track_id.as_deref(), Some("C"));
        assert!(!c.media.log.contains(&Cmd::Seek(0.0)));
    }

    #[test]
    fn test_select_silent_track_keeps_current() {
        let mut c = with_silent_b();
        ready(&mut c, "A", 100.0);
        c.media.log.clear();

        let b = c.catalog().get("B").cloned().unwrap();
        assert!(!c.select_track(&b));
        assert_eq!(c.state().current_track_id.as_deref(), Some("A"));
        assert!(!c.state().is_playing);
        assert!(c.media.log.is_empty());
    }

    #[test]
    fn test_advance_with_no_playable_track_does_nothing() {
        let mut only = make_track("A");
        only.audio_url.clear();
        let mut c = PlaybackController::new(FakeMedia::default());
        c.set_catalog(Catalog::new(vec![only]));
        c.advance(Direction::Next);
        assert_eq!(c.state().current_track_id, None);
        assert!(!c.state().is_playing);
        assert!(c.media.log.is_empty());
    }

    #[test]
    fn test_select_current_track_just_plays() {
        let mut c = controller();
        ready(&mut c, "A", 100.0);
        let a = c.catalog().get("A").cloned().unwrap();
        assert!(c.select_track(&a));
        assert_eq!(loads(&c), 1);
        assert_eq!(c.transport(), Transport::Playing);
    }
}
