use crate::catalog::Track;
use crate::player::{RepeatMode, SessionSnapshot};
use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

const KEY_VOLUME: &str = "volume";
const KEY_REPEAT_MODE: &str = "repeat_mode";
const KEY_CATALOG: &str = "catalog";
const KEY_CURRENT_TRACK: &str = "current_track";

/// Key/value session cache. Values are stored as JSON text.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let conn = Connection::open(path).with_context(|| format!("open {}", path.display()))?;
        let s = Self { conn };
        s.init_schema()?;
        Ok(s)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn
            .execute_batch(
                r#"
CREATE TABLE IF NOT EXISTS session (
  key TEXT PRIMARY KEY,
  value_json TEXT NOT NULL,
  updated_at INTEGER NOT NULL
);
"#,
            )
            .context("init schema")?;
        Ok(())
    }

    pub fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T, now_unix: i64) -> anyhow::Result<()> {
        let json = serde_json::to_string(value).with_context(|| format!("encode {key}"))?;
        self.conn
            .execute(
                r#"
INSERT INTO session(key, value_json, updated_at)
VALUES(?1, ?2, ?3)
ON CONFLICT(key) DO UPDATE SET
  value_json=excluded.value_json,
  updated_at=excluded.updated_at
"#,
                params![key, json, now_unix],
            )
            .with_context(|| format!("write session key {key}"))?;
        Ok(())
    }

    /// Read a key. A value that no longer decodes is treated as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value_json FROM session WHERE key=?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("read session key {key}"))?;

        Ok(raw.and_then(|json| match serde_json::from_str(&json) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable session value");
                None
            }
        }))
    }

    pub fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM session WHERE key=?1", params![key])
            .with_context(|| format!("delete session key {key}"))?;
        Ok(())
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM session", [])
            .context("clear session")?;
        Ok(())
    }

    pub fn load_session(&self) -> anyhow::Result<SessionSnapshot> {
        Ok(SessionSnapshot {
            volume: self.get::<f64>(KEY_VOLUME)?,
            repeat_mode: self.get::<RepeatMode>(KEY_REPEAT_MODE)?,
            catalog: self.get::<Vec<Track>>(KEY_CATALOG)?.unwrap_or_default(),
            current_track_id: self.get::<String>(KEY_CURRENT_TRACK)?,
        })
    }

    /// Write every present field of `snapshot`. A missing current track
    /// clears the stored one.
    pub fn save_session(&self, snapshot: &SessionSnapshot, now_unix: i64) -> anyhow::Result<()> {
        if let Some(v) = snapshot.volume {
            self.put(KEY_VOLUME, &v, now_unix)?;
        }
        if let Some(mode) = snapshot.repeat_mode {
            self.put(KEY_REPEAT_MODE, &mode, now_unix)?;
        }
        self.save_catalog(&snapshot.catalog, now_unix)?;
        self.save_current_track(snapshot.current_track_id.as_deref(), now_unix)
    }

    pub fn save_catalog(&self, tracks: &[Track], now_unix: i64) -> anyhow::Result<()> {
        self.put(KEY_CATALOG, tracks, now_unix)
    }

    pub fn save_playback(&self, volume: f64, mode: RepeatMode, now_unix: i64) -> anyhow::Result<()> {
        self.put(KEY_VOLUME, &volume, now_unix)?;
        self.put(KEY_REPEAT_MODE, &mode, now_unix)
    }

    pub fn save_current_track(&self, id: Option<&str>, now_unix: i64) -> anyhow::Result<()> {
        match id {
            Some(id) => self.put(KEY_CURRENT_TRACK, id, now_unix),
            None => self.remove(KEY_CURRENT_TRACK),
        }
    }
}

// rusqlite connections are not Send-friendly across awaits; open one per
// operation inside spawn_blocking.
#[derive(Debug, Clone)]
pub struct StorageHandle {
    path: PathBuf,
}

impl StorageHandle {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> anyhow::Result<Storage> {
        Storage::open(&self.path)
    }

    pub fn load_session(&self) -> anyhow::Result<SessionSnapshot> {
        self.open()?.load_session()
    }

    pub fn save_session(&self, snapshot: &SessionSnapshot, now_unix: i64) -> anyhow::Result<()> {
        self.open()?.save_session(snapshot, now_unix)
    }

    pub fn save_catalog(&self, tracks: &[Track], now_unix: i64) -> anyhow::Result<()> {
        self.open()?.save_catalog(tracks, now_unix)
    }

    pub fn save_playback(&self, volume: f64, mode: RepeatMode, now_unix: i64) -> anyhow::Result<()> {
        self.open()?.save_playback(volume, mode, now_unix)
    }

    pub fn save_current_track(&self, id: Option<&str>, now_unix: i64) -> anyhow::Result<()> {
        self.open()?.save_current_track(id, now_unix)
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.open()?.clear()
    }
}

pub fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
