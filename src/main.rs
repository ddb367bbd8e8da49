mod app;
mod catalog;
mod config;
mod input;
mod lyrics;
mod player;
mod server;
mod storage;
mod tui;
mod visualizer;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Parser)]
#[command(name = "lyra", version, about = "Terminal music player with synced lyrics")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the interactive player (default).
    Play,
    /// Serve the local music library as a catalog.
    Serve {
        /// Listen port (overrides config).
        #[arg(long)]
        port: Option<u16>,
        /// Library directory containing musicList.json (overrides config).
        #[arg(long)]
        library: Option<PathBuf>,
    },
    /// Fetch the catalog and print it to stdout (headless).
    Catalog,
    /// Parse an LRC file and print the timed lines.
    Lyrics { file: PathBuf },
    /// Forget the cached catalog, volume, repeat mode and last track.
    Reset,

    /// Audio output device management (mpv).
    Audio {
        #[command(subcommand)]
        cmd: AudioCommand,
    },
}

#[derive(Debug, Subcommand)]
enum AudioCommand {
    /// List mpv audio devices.
    List,
    /// Set mpv audio device (name as shown in list).
    Set { device: String },
    /// Clear mpv audio device override.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    let command = cli.command.unwrap_or(Command::Play);

    match &command {
        Command::Play => init_file_logging(&cfg.paths.log_file())?,
        _ => init_stderr_logging(),
    }

    match command {
        Command::Play => {
            let mut terminal = tui::TerminalGuard::enter(cfg.ui.mouse).context("init terminal")?;
            let mut app = app::App::new(cfg)?;
            app.run(terminal.terminal_mut()).await?;
        }
        Command::Serve { port, library } => {
            let mut server_cfg = cfg.server;
            if let Some(port) = port {
                server_cfg.port = port;
            }
            if let Some(library) = library {
                server_cfg.library_dir = library;
            }
            server::serve(&server_cfg).await?;
        }
        Command::Catalog => {
            let client = catalog::CatalogClient::new(&cfg.server.base_url)?;
            let catalog = client
                .fetch()
                .await
                .with_context(|| format!("fetch {}", client.endpoint()))?;
            print_tracks(catalog.tracks());
        }
        Command::Lyrics { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("read {}", file.display()))?;
            let lines = lyrics::parse(&raw);
            if lines.is_empty() {
                println!("No timed lines in {}", file.display());
            }
            for line in &lines {
                println!("[{}] {}", format_timestamp(line.time), line.text);
            }
        }
        Command::Reset => {
            let storage = storage::StorageHandle::new(cfg.paths.session_db());
            storage.clear()?;
            println!("Cleared session cache at {}.", storage.path().display());
        }
        Command::Audio { cmd } => match cmd {
            AudioCommand::List => {
                let out = tokio::process::Command::new("mpv")
                    .args(["--audio-device=help", "--no-video", "--idle=no"])
                    .output()
                    .await
                    .context("run mpv --audio-device=help")?;
                // mpv prints help to stdout.
                print!("{}", String::from_utf8_lossy(&out.stdout));
                eprint!("{}", String::from_utf8_lossy(&out.stderr));
            }
            AudioCommand::Set { device } => {
                let mut cfg = cfg;
                cfg.player.audio_device = Some(device);
                config::save(&cfg, cli.config.as_deref()).context("save config")?;
                println!("Updated audio device in config.");
            }
            AudioCommand::Clear => {
                let mut cfg = cfg;
                cfg.player.audio_device = None;
                config::save(&cfg, cli.config.as_deref()).context("save config")?;
                println!("Cleared audio device override.");
            }
        },
    }

    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

/// The TUI owns the terminal, so logs go to a file instead.
fn init_file_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn print_tracks(tracks: &[catalog::Track]) {
    for (i, t) in tracks.iter().enumerate() {
        let artist = if t.artist.is_empty() {
            String::new()
        } else {
            format!(" - {}", t.artist)
        };
        let lyric_lines = lyrics::parse(&t.lyric_text).len();
        println!(
            "{:02}. {}{}  (id={}, {} lyric lines)",
            i + 1,
            t.title,
            artist,
            t.id,
            lyric_lines
        );
    }
}

fn format_timestamp(seconds: f64) -> String {
    let centis = (seconds * 100.0).round() as u64;
    format!("{:02}:{:02}.{:02}", centis / 6000, (centis / 100) % 60, centis % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00.00");
        assert_eq!(format_timestamp(83.5), "01:23.50");
        assert_eq!(format_timestamp(61.25), "01:01.25");
    }
}
