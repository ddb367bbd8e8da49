pub mod actions;
pub mod events;
pub mod state;

use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::input;
use crate::player::mpv::MpvHandle;
use crate::player::{
    DisabledMedia, Direction, MediaEventKind, MediaResource, PlaybackController, PlaybackState,
    Transport,
};
use crate::storage::{self, Storage, StorageHandle};
use crate::tui::{self, PlayerView, TuiTerminal};
use actions::Action;
use events::{Event, NetworkEvent, UiEvent};
use state::{AppState, Toast};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};

type Controller = PlaybackController<Box<dyn MediaResource + Send>>;

const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const SEEK_STEP: f64 = 10.0;
const VOLUME_STEP: f64 = 0.05;

pub struct App {
    cfg: Config,
    state: AppState,
    controller: Controller,
    client: CatalogClient,
    storage: StorageHandle,
    last_tick: Instant,
}

impl App {
    pub fn new(cfg: Config) -> anyhow::Result<Self> {
        let client = CatalogClient::new(&cfg.server.base_url)?;
        let db = cfg.paths.session_db();
        let _ = Storage::open(&db)?;

        Ok(Self {
            cfg,
            state: AppState::new(),
            controller: PlaybackController::new(Box::new(DisabledMedia::new("not started"))),
            client,
            storage: StorageHandle::new(db),
            last_tick: Instant::now(),
        })
    }

    pub async fn run(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        input::spawn_input_task(tx.clone(), self.cfg.ui.mouse);
        spawn_ticker(tx.clone());

        // mpv is best-effort: without it the UI still browses and shows lyrics.
        let mpv_log = self.cfg.paths.mpv_log();
        let media: Box<dyn MediaResource + Send> = match MpvHandle::spawn(
            tx.clone(),
            self.cfg.player.audio_device.as_deref(),
            Some(&mpv_log),
        )
        .await
        {
            Ok(h) => Box::new(h),
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "mpv unavailable");
                self.state.toast(Toast::error(format!("mpv disabled: {e:#}")));
                Box::new(DisabledMedia::new(format!("{e:#}")))
            }
        };
        self.controller = PlaybackController::new(media);

        self.restore_session().await;
        spawn_session_writer(self.controller.subscribe(), self.storage.clone());

        if self.controller.catalog().is_empty() || self.controller.current_track().is_none() {
            self.spawn_fetch_catalog(&tx);
        }

        self.sync_lyrics(&tx);
        self.draw(terminal)?;

        while let Some(ev) = rx.recv().await {
            match ev {
                Event::Input(input_ev) => {
                    if let Some(action) = input::map_input_to_action(&self.state, input_ev) {
                        self.handle_action(action, &tx);
                    }
                }
                Event::Media(me) => self.handle_media(me),
                Event::Network(ne) => self.handle_network(ne),
                Event::Ui(ue) => self.handle_ui(ue),
            }

            if self.state.should_quit {
                break;
            }

            self.sync_lyrics(&tx);
            if self.state.dirty {
                self.draw(terminal)?;
            }
        }

        self.save_state_on_quit().await;
        Ok(())
    }

    fn draw(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        let view = PlayerView {
            playback: self.controller.state(),
            catalog: self.controller.catalog(),
            transport: self.controller.transport(),
        };
        tui::draw(terminal, &view, &mut self.state)?;
        self.state.dirty = false;
        Ok(())
    }

    async fn restore_session(&mut self) {
        let storage = self.storage.clone();
        let mut snapshot = match tokio::task::spawn_blocking(move || storage.load_session()).await {
            Ok(Ok(s)) => s,
            Ok(Err(e)) => {
                tracing::warn!(error = %format!("{e:#}"), "session cache unreadable");
                Default::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "session load task failed");
                Default::default()
            }
        };
        snapshot.volume.get_or_insert(self.cfg.player.default_volume);

        tracing::info!(
            tracks = snapshot.catalog.len(),
            current = ?snapshot.current_track_id,
            "restoring session"
        );
        self.controller.rehydrate(snapshot);
        self.controller.set_playlist_visible(self.cfg.ui.show_playlist);
        if let Some(pos) = self.current_position() {
            self.state.playlist.selected = pos;
        }
    }

    async fn save_state_on_quit(&mut self) {
        let storage = self.storage.clone();
        let snapshot = self.controller.snapshot();
        let res = tokio::task::spawn_blocking(move || {
            storage.save_session(&snapshot, storage::now_unix())
        })
        .await;
        match res {
            Ok(Ok(())) => tracing::info!("session saved"),
            Ok(Err(e)) => tracing::warn!(error = %format!("{e:#}"), "save session"),
            Err(e) => tracing::warn!(error = %e, "save session task failed"),
        }
    }

    fn handle_action(&mut self, action: Action, tx: &mpsc::Sender<Event>) {
        self.state.dirty = true;
        match action {
            Action::Quit => self.state.should_quit = true,
            Action::Dismiss => {
                if self.state.help_visible {
                    self.state.help_visible = false;
                } else if self.controller.state().playlist_visible {
                    self.controller.set_playlist_visible(false);
                }
            }
            Action::ToggleHelp => self.state.help_visible = !self.state.help_visible,
            Action::Resize => {}

            Action::TogglePlay => {
                if self.controller.transport() == Transport::Idle {
                    self.state.status = "Nothing loaded".into();
                }
                self.controller.toggle_play();
            }
            Action::PlayNext => self.controller.advance(Direction::Next),
            Action::PlayPrev => self.controller.advance(Direction::Prev),
            Action::SeekForward => {
                let t = self.controller.state().current_time + SEEK_STEP;
                self.controller.seek(t);
            }
            Action::SeekBack => {
                let t = self.controller.state().current_time - SEEK_STEP;
                self.controller.seek(t);
            }
            Action::SeekRatio(ratio) => {
                let duration = self.controller.state().duration;
                if duration > 0.0 {
                    self.controller.seek(ratio.clamp(0.0, 1.0) * duration);
                }
            }
            Action::SeekToLine(index) => {
                if let Some(line) = self.state.lyrics.lines().get(index) {
                    tracing::debug!(index, time = line.time, "seek to lyric line");
                    self.controller.seek(line.time);
                    self.controller.play();
                }
            }
            Action::VolumeUp => {
                let v = self.controller.state().volume + VOLUME_STEP;
                self.controller.set_volume(v);
            }
            Action::VolumeDown => {
                let v = self.controller.state().volume - VOLUME_STEP;
                self.controller.set_volume(v);
            }
            Action::ToggleMute => self.controller.toggle_mute(),
            Action::CycleRepeatMode => {
                let mode = self.controller.cycle_repeat_mode();
                self.state.status = mode.label().into();
            }

            Action::TogglePlaylist => {
                self.controller.toggle_playlist();
                if self.controller.state().playlist_visible
                    && let Some(pos) = self.current_position()
                {
                    self.state.playlist.selected = pos;
                    self.state.playlist.update_scroll(self.playlist_height());
                }
            }
            Action::ListUp => {
                self.state.playlist.select_prev();
                self.state.playlist.update_scroll(self.playlist_height());
            }
            Action::ListDown => {
                let len = self.controller.catalog().len();
                self.state.playlist.select_next(len);
                self.state.playlist.update_scroll(self.playlist_height());
            }
            Action::GoTop => {
                self.state.playlist.selected = 0;
                self.state.playlist.scroll_offset = 0;
            }
            Action::GoBottom => {
                let len = self.controller.catalog().len();
                self.state.playlist.select_last(len);
                self.state.playlist.update_scroll(self.playlist_height());
            }
            Action::Activate => {
                let index = self.state.playlist.selected;
                self.play_index(index);
            }
            Action::PlayIndex(index) => self.play_index(index),

            Action::Refresh => self.spawn_fetch_catalog(tx),
        }
    }

    fn play_index(&mut self, index: usize) {
        let Some(track) = self.controller.catalog().tracks().get(index).cloned() else {
            return;
        };
        self.state.playlist.selected = index;
        if self.controller.select_track(&track) {
            self.state.status = format!("Playing: {}", track.title);
        } else {
            self.state.toast(Toast::error(format!("No audio for {}", track.title)));
        }
    }

    fn handle_media(&mut self, event: crate::player::MediaEvent) {
        let error = match &event.kind {
            MediaEventKind::Error(msg) => Some(msg.clone()),
            _ => None,
        };
        if !self.controller.handle_media_event(event) {
            return;
        }
        self.state.dirty = true;
        if let Some(msg) = error {
            self.state.toast(Toast::error(format!("Playback error: {msg}")));
        }
    }

    fn handle_network(&mut self, ne: NetworkEvent) {
        self.state.dirty = true;
        self.state.catalog_loading = false;
        match ne {
            NetworkEvent::CatalogLoaded(catalog) => {
                let count = catalog.len();
                self.spawn_save_catalog(catalog.tracks().to_vec());
                self.controller.set_catalog(catalog);

                // The current id survives a refresh only if the track still exists.
                if self.controller.current_track().is_none()
                    && let Some(first) = self.controller.catalog().first().cloned()
                {
                    self.controller.load_track(&first);
                }

                self.state.playlist.clamp(count);
                self.state.status = format!("{count} tracks");
                self.state.toast(Toast::success(format!("Loaded {count} tracks")));
            }
            NetworkEvent::CatalogFailed(e) => {
                self.state.status = format!("Error: {e} (Ctrl+r to retry)");
                self.state.toast(Toast::error(e));
            }
        }
    }

    fn handle_ui(&mut self, ue: UiEvent) {
        match ue {
            UiEvent::Tick => {
                let now = Instant::now();
                let dt = now - self.last_tick;
                self.last_tick = now;
                self.state.tick = self.state.tick.wrapping_add(1);

                if self.state.lyrics.tick(dt) {
                    self.state.dirty = true;
                }
                if self.state.toast.as_ref().is_some_and(|t| t.is_expired()) {
                    self.state.dirty = true;
                }
            }
            UiEvent::LyricsSettled { generation } => {
                if self.state.lyrics.settle(generation) {
                    self.state.dirty = true;
                }
            }
        }
    }

    /// Keep the lyric view on the controller's current track and time.
    fn sync_lyrics(&mut self, tx: &mpsc::Sender<Event>) {
        let playback = self.controller.state();
        let current = playback.current_track_id.as_deref();
        if current != self.state.lyrics.track_id() {
            let raw = self
                .controller
                .current_track()
                .map(|t| t.lyric_text.as_str())
                .unwrap_or("");
            let generation = self.state.lyrics.load(current, raw);
            spawn_settle_timer(
                tx.clone(),
                generation,
                Duration::from_millis(self.cfg.ui.lyrics_settle_ms),
            );
            self.state.dirty = true;
        }
        if self.state.lyrics.update_time(playback.current_time) {
            self.state.dirty = true;
        }
    }

    fn spawn_fetch_catalog(&mut self, tx: &mpsc::Sender<Event>) {
        if self.state.catalog_loading {
            return;
        }
        self.state.catalog_loading = true;
        self.state.status = format!("Fetching {}", self.client.endpoint());

        let client = self.client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let ev = match client.fetch().await {
                Ok(catalog) => NetworkEvent::CatalogLoaded(catalog),
                Err(e) => {
                    tracing::warn!(error = %format!("{e:#}"), "catalog fetch failed");
                    NetworkEvent::CatalogFailed(format!("{e:#}"))
                }
            };
            let _ = tx.send(Event::Network(ev)).await;
        });
    }

    fn spawn_save_catalog(&self, tracks: Vec<crate::catalog::Track>) {
        let storage = self.storage.clone();
        tokio::spawn(async move {
            let res = tokio::task::spawn_blocking(move || {
                storage.save_catalog(&tracks, storage::now_unix())
            })
            .await;
            if let Ok(Err(e)) = res {
                tracing::warn!(error = %format!("{e:#}"), "cache catalog");
            }
        });
    }

    fn current_position(&self) -> Option<usize> {
        let id = self.controller.state().current_track_id.as_deref()?;
        self.controller.catalog().position(id)
    }

    fn playlist_height(&self) -> usize {
        usize::from(self.state.hit.playlist.height)
    }
}

fn spawn_ticker(tx: mpsc::Sender<Event>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(FRAME_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(Event::Ui(UiEvent::Tick)).await.is_err() {
                break;
            }
        }
    });
}

fn spawn_settle_timer(tx: mpsc::Sender<Event>, generation: u64, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(Event::Ui(UiEvent::LyricsSettled { generation })).await;
    });
}

/// Persist volume, repeat mode and the current track whenever they change.
/// Ends when the controller is dropped.
fn spawn_session_writer(mut rx: watch::Receiver<PlaybackState>, storage: StorageHandle) {
    let mut last = rx.borrow_and_update().clone();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let next = rx.borrow_and_update().clone();
            let playback_changed =
                next.volume != last.volume || next.repeat_mode != last.repeat_mode;
            let track_changed = next.current_track_id != last.current_track_id;

            if playback_changed || track_changed {
                let storage = storage.clone();
                let state = next.clone();
                let res = tokio::task::spawn_blocking(move || {
                    let now = storage::now_unix();
                    if playback_changed {
                        storage.save_playback(state.volume, state.repeat_mode, now)?;
                    }
                    if track_changed {
                        storage.save_current_track(state.current_track_id.as_deref(), now)?;
                    }
                    anyhow::Ok(())
                })
                .await;
                if let Ok(Err(e)) = res {
                    tracing::warn!(error = %format!("{e:#}"), "persist session");
                }
            }
            last = next;
        }
        tracing::debug!("session writer stopped");
    });
}
