use directories::ProjectDirs;
use std::path::PathBuf;

pub const QUALIFIER: &str = "dev";
pub const ORG: &str = "lyra";
pub const APP: &str = "lyra";

pub const PORT: u16 = 3000;
pub const VOLUME: f64 = 0.3;
pub const LYRICS_SETTLE_MS: u64 = 100;

pub fn data_dir() -> PathBuf {
    ProjectDirs::from(QUALIFIER, ORG, APP)
        .map(|p| p.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join(APP))
}

/// Where `lyra serve` looks for its library when none is configured.
pub fn library_dir() -> PathBuf {
    data_dir().join("library")
}
