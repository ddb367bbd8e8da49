//! Catalog server (`lyra serve`).
//!
//! Serves a music library directory laid out as
//!
//! ```text
//! <library>/musicList.json
//! <library>/songs/…
//! <library>/poster/…
//! <library>/Lyric/…
//! ```
//!
//! | Path | Description |
//! |------|-------------|
//! | `/getMusicList` | The catalog as a JSON array of tracks |
//! | `/assets/**` | Static files from the library directory |
//!
//! The manifest is read once at startup; lyric files are inlined into each
//! track so a client needs a single request to get everything.

use crate::catalog::{Catalog, Track};
use crate::config::ServerConfig;
use anyhow::Context;
use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use uuid::Uuid;

const MANIFEST: &str = "musicList.json";

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "musicList")]
    music_list: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    name: String,
    #[serde(default)]
    singer: String,
    /// File name under `poster/`.
    #[serde(default)]
    poster: String,
    /// File name under `songs/`.
    #[serde(rename = "songUrl", default)]
    song_url: String,
    /// File name under `Lyric/`.
    #[serde(default)]
    lyric: String,
}

/// Read the manifest under `library_dir` and resolve it into tracks whose
/// asset URLs point at `public_url`.
pub fn build_catalog(library_dir: &Path, public_url: &str) -> anyhow::Result<Catalog> {
    let manifest_path = library_dir.join(MANIFEST);
    let raw = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("read {}", manifest_path.display()))?;
    let manifest: Manifest = serde_json::from_str(&raw)
        .with_context(|| format!("parse {}", manifest_path.display()))?;

    let public_url = public_url.trim_end_matches('/');
    let tracks = manifest
        .music_list
        .into_iter()
        .map(|entry| {
            let lyric_text = read_lyric(library_dir, &entry.lyric);
            Track {
                id: track_id(&entry),
                title: entry.name,
                artist: entry.singer,
                poster_url: asset_url(public_url, "poster", &entry.poster),
                audio_url: asset_url(public_url, "songs", &entry.song_url),
                lyric_text,
            }
        })
        .collect();

    Ok(Catalog::new(tracks))
}

/// Stable across restarts: derived from the song file, or the title when a
/// track has no audio.
fn track_id(entry: &ManifestEntry) -> String {
    let key = if entry.song_url.is_empty() {
        &entry.name
    } else {
        &entry.song_url
    };
    Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()).to_string()
}

fn asset_url(public_url: &str, dir: &str, file: &str) -> String {
    if file.is_empty() {
        return String::new();
    }
    format!("{public_url}/assets/{dir}/{}", urlencoding::encode(file))
}

fn read_lyric(library_dir: &Path, file: &str) -> String {
    if file.is_empty() {
        return String::new();
    }
    let path = library_dir.join("Lyric").join(file);
    match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "lyric file unreadable");
            String::new()
        }
    }
}

pub fn router(library_dir: PathBuf, catalog: Catalog) -> Router {
    let tracks: Arc<Vec<Track>> = Arc::new(catalog.into_tracks());
    Router::new()
        .route("/getMusicList", get(get_music_list))
        .nest_service("/assets", ServeDir::new(library_dir))
        .layer(CorsLayer::permissive())
        .with_state(tracks)
}

async fn get_music_list(State(tracks): State<Arc<Vec<Track>>>) -> Json<Vec<Track>> {
    tracing::debug!(count = tracks.len(), "serving catalog");
    Json(tracks.as_ref().clone())
}

pub async fn serve(cfg: &ServerConfig) -> anyhow::Result<()> {
    let public_url = cfg.public_url();
    let catalog = build_catalog(&cfg.library_dir, &public_url)?;
    let count = catalog.len();
    let app = router(cfg.library_dir.clone(), catalog);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    tracing::info!(
        %addr,
        tracks = count,
        library = %cfg.library_dir.display(),
        "catalog server listening on {public_url}"
    );
    tracing::info!("songs under {public_url}/assets/songs/");

    axum::serve(listener, app).await.context("catalog server")?;
    Ok(())
}
