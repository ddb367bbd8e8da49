use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod defaults;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub player: PlayerConfig,
    pub ui: UiConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Catalog server the player fetches `/getMusicList` from.
    pub base_url: String,
    /// Port `lyra serve` listens on.
    pub port: u16,
    /// Directory holding `musicList.json`, `songs/`, `poster/` and `Lyric/`.
    pub library_dir: PathBuf,
    /// Origin written into asset URLs. Defaults to `http://localhost:{port}`.
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// mpv audio device name (see `mpv --audio-device=help`)
    pub audio_device: Option<String>,
    /// Volume for a fresh session (0.0-1.0). A saved session overrides it.
    pub default_volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub mouse: bool,
    /// Delay before the lyric view settles on the first line after a track change.
    pub lyrics_settle_ms: u64,
    pub show_playlist: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
}

impl ServerConfig {
    pub fn public_url(&self) -> String {
        match self.public_url.as_deref() {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }
}

impl PathsConfig {
    pub fn session_db(&self) -> PathBuf {
        self.data_dir.join("session.sqlite3")
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("lyra.log")
    }

    pub fn mpv_log(&self) -> PathBuf {
        self.data_dir.join("mpv.log")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: format!("http://localhost:{}", defaults::PORT),
            port: defaults::PORT,
            library_dir: defaults::library_dir(),
            public_url: None,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            audio_device: None,
            default_volume: defaults::VOLUME,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            mouse: true,
            lyrics_settle_ms: defaults::LYRICS_SETTLE_MS,
            show_playlist: false,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
        }
    }
}

pub fn save(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    write_config(cfg, &path)
}

fn write_config(cfg: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from(defaults::QUALIFIER, defaults::ORG, defaults::APP)
        .context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = Config::default();
        write_config(&cfg, &path).context("write default config")?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[server]
port = 8080

[ui]
mouse = false
"#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.public_url(), "http://localhost:8080");
        assert!(!cfg.ui.mouse);
        assert_eq!(cfg.ui.lyrics_settle_ms, 100);
        assert_eq!(cfg.player.default_volume, 0.3);
    }

    #[test]
    fn test_public_url_override() {
        let server = ServerConfig {
            public_url: Some("https://music.example.org/".into()),
            ..ServerConfig::default()
        };
        assert_eq!(server.public_url(), "https://music.example.org");
    }

    #[test]
    fn test_load_creates_default_file() {
        let path = std::env::temp_dir()
            .join(format!("lyra-config-{}", std::process::id()))
            .join("config.toml");
        let _ = fs::remove_file(&path);

        let cfg = load(Some(&path)).unwrap();
        assert!(path.exists());
        let again = load(Some(&path)).unwrap();
        assert_eq!(again.server.port, cfg.server.port);
        assert_eq!(again.paths.data_dir, cfg.paths.data_dir);
        let _ = fs::remove_file(&path);
    }
}
