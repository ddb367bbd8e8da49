use super::{LoadId, MediaEvent, MediaEventKind, MediaResource};
use crate::app::events::Event;
use anyhow::Context;
use serde_json::json;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::UnixStream,
    process::{Child, Command},
    sync::mpsc,
};

/// mpv driven over its JSON IPC socket.
///
/// Commands are queued to a writer task so the [`MediaResource`] methods never
/// block. Every event read back is stamped with the [`LoadId`] of the file mpv
/// was playing when it was emitted.
#[derive(Debug)]
pub struct MpvHandle {
    child: Child,
    socket_path: PathBuf,
    commands: mpsc::UnboundedSender<serde_json::Value>,
    pending_loads: Arc<Mutex<VecDeque<LoadId>>>,
}

impl MpvHandle {
    pub async fn spawn(
        event_tx: mpsc::Sender<Event>,
        audio_device: Option<&str>,
        log_file: Option<&std::path::Path>,
    ) -> anyhow::Result<Self> {
        let socket_path =
            std::env::temp_dir().join(format!("lyra-mpv-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket_path);

        let mut cmd = Command::new("mpv");
        cmd.args([
            "--no-video",
            "--idle=yes",
            // stay paused on the last frame so "ended" is observable and a
            // rewind still works
            "--keep-open=yes",
            "--input-terminal=no",
            "--really-quiet",
        ]);
        if let Some(dev) = audio_device {
            cmd.arg(format!("--audio-device={dev}"));
        }
        if let Some(p) = log_file {
            cmd.arg(format!("--log-file={}", p.display()));
        }
        let child = cmd
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("spawn mpv")?;

        // Connect (mpv creates the socket shortly after starting).
        let stream = connect_with_retry(&socket_path).await?;
        let (reader, writer) = tokio::io::split(stream);

        let pending_loads = Arc::new(Mutex::new(VecDeque::new()));
        let (commands, command_rx) = mpsc::unbounded_channel();

        tokio::spawn(write_commands_loop(writer, command_rx));
        tokio::spawn(read_events_loop(reader, event_tx, pending_loads.clone()));

        let this = Self {
            child,
            socket_path,
            commands,
            pending_loads,
        };

        this.send(json!({"command":["request_log_messages", "warn"]}))?;
        this.send(json!({"command":["observe_property", 1, "time-pos"]}))?;
        this.send(json!({"command":["observe_property", 2, "duration"]}))?;
        this.send(json!({"command":["observe_property", 3, "eof-reached"]}))?;

        tracing::info!(socket = %this.socket_path.display(), "mpv started");
        Ok(this)
    }

    fn send(&self, v: serde_json::Value) -> anyhow::Result<()> {
        self.commands
            .send(v)
            .map_err(|_| anyhow::anyhow!("mpv ipc writer closed"))
    }

    fn set_paused(&self, paused: bool) -> anyhow::Result<()> {
        self.send(json!({"command":["set_property", "pause", paused]}))
    }
}

impl MediaResource for MpvHandle {
    fn load(&mut self, load: LoadId, url: &str) -> anyhow::Result<()> {
        self.set_paused(true)?;
        if let Ok(mut pending) = self.pending_loads.lock() {
            pending.push_back(load);
        }
        self.send(json!({"command":["loadfile", url, "replace"]}))
    }

    fn play(&mut self) -> anyhow::Result<()> {
        self.set_paused(false)
    }

    fn pause(&mut self) -> anyhow::Result<()> {
        self.set_paused(true)
    }

    fn seek(&mut self, seconds: f64) -> anyhow::Result<()> {
        self.send(json!({"command":["seek", seconds, "absolute"]}))
    }

    fn set_volume(&mut self, volume: f64) -> anyhow::Result<()> {
        let percent = (volume.clamp(0.0, 1.0) * 100.0).round();
        self.send(json!({"command":["set_property", "volume", percent]}))
    }
}

impl Drop for MpvHandle {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

async fn connect_with_retry(path: &PathBuf) -> anyhow::Result<UnixStream> {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        match UnixStream::connect(path).await {
            Ok(s) => return Ok(s),
            Err(e) => {
                if tokio::time::Instant::now() > deadline {
                    return Err(e).with_context(|| format!("connect to mpv ipc {}", path.display()));
                }
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
        }
    }
}

async fn write_commands_loop(
    mut writer: tokio::io::WriteHalf<UnixStream>,
    mut commands: mpsc::UnboundedReceiver<serde_json::Value>,
) {
    let mut request_id: u64 = 1;
    while let Some(mut v) = commands.recv().await {
        // Tag requests so we can get structured errors back on the IPC stream.
        if let serde_json::Value::Object(ref mut o) = v {
            o.insert("request_id".to_string(), serde_json::Value::from(request_id));
            request_id += 1;
        }
        let mut line = match serde_json::to_vec(&v) {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "encode mpv json");
                continue;
            }
        };
        line.push(b'\n');
        if let Err(e) = writer.write_all(&line).await {
            tracing::error!(error = %e, "write mpv ipc");
            break;
        }
        let _ = writer.flush().await;
    }
}

async fn read_events_loop(
    reader: tokio::io::ReadHalf<UnixStream>,
    event_tx: mpsc::Sender<Event>,
    pending_loads: Arc<Mutex<VecDeque<LoadId>>>,
) {
    let mut active = LoadId::NONE;
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(v) = serde_json::from_str::<serde_json::Value>(&line) else {
            continue;
        };

        // mpv command replies: {"request_id":..., "error":"..."}
        if let (Some(rid), Some(err)) = (v.get("request_id"), v.get("error").and_then(|e| e.as_str()))
            && err != "success"
        {
            tracing::warn!(request_id = %rid, error = err, "mpv command failed");
        }

        if let Some(event) = stamp_event(&mut active, &pending_loads, &v)
            && event_tx.send(Event::Media(event)).await.is_err()
        {
            break;
        }
    }
    tracing::debug!("mpv event stream closed");
}

/// Tag an mpv event with the load it belongs to.
///
/// Each `loadfile` produces exactly one `start-file`, in order, so popping
/// `pending` on `start-file` advances `active`. Events that arrive after a
/// `loadfile` was sent but before its `start-file` still belong to the
/// previous file.
fn stamp_event(
    active: &mut LoadId,
    pending: &Mutex<VecDeque<LoadId>>,
    v: &serde_json::Value,
) -> Option<MediaEvent> {
    if v.get("event").and_then(|e| e.as_str()) == Some("start-file") {
        if let Some(next) = pending.lock().ok().and_then(|mut p| p.pop_front()) {
            *active = next;
        }
        return None;
    }
    map_mpv_event(v).map(|kind| MediaEvent {
        load: *active,
        kind,
    })
}

fn map_mpv_event(v: &serde_json::Value) -> Option<MediaEventKind> {
    match v.get("event")?.as_str()? {
        "property-change" => {
            let name = v.get("name")?.as_str()?;
            // Properties are null while nothing is loaded.
            let data = v.get("data")?;
            match name {
                "time-pos" => Some(MediaEventKind::TimeProgress {
                    position: data.as_f64()?,
                }),
                "duration" => Some(MediaEventKind::MetadataReady {
                    duration: data.as_f64()?,
                }),
                "eof-reached" => data.as_bool()?.then_some(MediaEventKind::Ended),
                _ => None,
            }
        }
        "file-loaded" => Some(MediaEventKind::CanPlay),
        "end-file" => {
            // reason=stop when a new loadfile replaces the file; only errors matter.
            let reason = v.get("reason").and_then(|x| x.as_str()).unwrap_or("");
            if reason == "error" {
                let err = v.get("file_error").or_else(|| v.get("error"));
                let err = err.and_then(|x| x.as_str()).unwrap_or("unknown");
                Some(MediaEventKind::Error(format!("mpv end-file error: {err}")))
            } else {
                None
            }
        }
        "log-message" => {
            let level = v.get("level")?.as_str().unwrap_or("info");
            let text = v.get("text")?.as_str().unwrap_or("").trim();
            if !text.is_empty() {
                tracing::warn!(target: "mpv", level, "{text}");
            }
            None
        }
        _ => None,
    }
}
