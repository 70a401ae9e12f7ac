//! mpv driven over its JSON IPC socket.
//!
//! Each player is one mpv process with its own Unix socket. Commands are
//! queued on a channel and written by a background task, so the
//! [`MediaElement`] methods never block. A second task reads property-change
//! events, caches `time-pos`, and forwards throttled
//! [`AppEvent::MediaTime`] reports to the event loop.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use abreview_core::sync::{MediaElement, MediaError};
use abreview_core::types::Side;

use super::PlayerError;
use crate::event::AppEvent;

/// Minimum spacing of time reports, close to a browser's `timeupdate` rate.
const TIME_REPORT_INTERVAL: Duration = Duration::from_millis(250);

const CONNECT_ATTEMPTS: u32 = 50;
const CONNECT_BACKOFF: Duration = Duration::from_millis(100);

/// Observer id used for the `time-pos` subscription.
const TIME_POS_OBSERVER: u64 = 1;

#[derive(Debug, Deserialize)]
struct IpcEvent {
    event: Option<String>,
    name: Option<String>,
    data: Option<Value>,
}

/// One running mpv window. Dropping it kills the process.
#[derive(Debug)]
pub struct MpvPlayer {
    _child: Child,
    commands: mpsc::UnboundedSender<Value>,
    /// `time-pos` in seconds, stored as `f64` bits.
    position: Arc<AtomicU64>,
    socket: PathBuf,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl MpvPlayer {
    /// Starts mpv paused on `url` and connects to its IPC socket.
    pub async fn spawn(
        mpv_path: &str,
        url: &str,
        side: Side,
        generation: u64,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<Self, PlayerError> {
        let socket = std::env::temp_dir().join(format!(
            "abreview-{}-{generation}-{}.sock",
            std::process::id(),
            side.to_string().to_lowercase()
        ));
        let _ = std::fs::remove_file(&socket);

        let position = match side {
            Side::Left => "0%:50%",
            Side::Right => "100%:50%",
        };
        let mut child = Command::new(mpv_path)
            .arg("--pause")
            .arg("--mute=yes")
            .arg("--keep-open=yes")
            .arg("--force-window=yes")
            .arg("--no-terminal")
            .arg("--autofit=50%")
            .arg(format!("--geometry={position}"))
            .arg(format!("--title=abreview: {side}"))
            .arg(format!("--input-ipc-server={}", socket.display()))
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PlayerError::Spawn { program: mpv_path.to_owned(), source })?;

        let stream = connect(&socket, &mut child).await?;
        let (read_half, mut write_half) = stream.into_split();

        let (commands, mut queued) = mpsc::unbounded_channel::<Value>();
        let writer = tokio::spawn(async move {
            while let Some(command) = queued.recv().await {
                let mut line = command.to_string();
                line.push('\n');
                if write_half.write_all(line.as_bytes()).await.is_err() {
                    break;
                }
            }
        });

        let position_bits = Arc::new(AtomicU64::new(0f64.to_bits()));
        let reader = tokio::spawn(read_events(
            BufReader::new(read_half),
            Arc::clone(&position_bits),
            side,
            generation,
            events,
        ));

        let _ = commands.send(json!({
            "command": ["observe_property", TIME_POS_OBSERVER, "time-pos"]
        }));
        debug!(?side, generation, %url, "mpv started");

        Ok(Self { _child: child, commands, position: position_bits, socket, reader, writer })
    }

    fn set_property(&self, name: &str, value: Value) -> Result<(), MediaError> {
        self.commands
            .send(json!({ "command": ["set_property", name, value] }))
            .map_err(|_| MediaError("mpv connection closed".to_owned()))
    }
}

impl MediaElement for MpvPlayer {
    fn current_time(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::Relaxed))
    }

    fn set_current_time(&mut self, secs: f64) {
        // Cache the target now so the next drift check does not re-seek
        // before mpv reports the new position.
        self.position.store(secs.to_bits(), Ordering::Relaxed);
        let _ = self.set_property("time-pos", json!(secs));
    }

    fn set_looping(&mut self, looping: bool) {
        let value = if looping { "inf" } else { "no" };
        let _ = self.set_property("loop-file", json!(value));
    }

    fn play(&mut self) -> Result<(), MediaError> {
        self.set_property("pause", json!(false))
    }
}

impl Drop for MpvPlayer {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
        let _ = std::fs::remove_file(&self.socket);
    }
}

/// Polls for the IPC socket until mpv creates it or exits.
async fn connect(socket: &Path, child: &mut Child) -> Result<UnixStream, PlayerError> {
    let mut last_error = None;
    for _ in 0..CONNECT_ATTEMPTS {
        match UnixStream::connect(socket).await {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
        if let Ok(Some(_)) = child.try_wait() {
            return Err(PlayerError::Exited);
        }
        tokio::time::sleep(CONNECT_BACKOFF).await;
    }
    Err(PlayerError::Connect(last_error.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::TimedOut, "no connection attempt made")
    })))
}

/// Extracts the position from a `time-pos` property-change line.
///
/// Replies to our own commands, other events, and `null` positions (nothing
/// loaded yet) all yield `None`.
fn time_pos(line: &str) -> Option<f64> {
    let event: IpcEvent = serde_json::from_str(line).ok()?;
    if event.event.as_deref() != Some("property-change") || event.name.as_deref() != Some("time-pos")
    {
        return None;
    }
    event.data.as_ref().and_then(Value::as_f64)
}

async fn read_events(
    mut reader: BufReader<tokio::net::unix::OwnedReadHalf>,
    position: Arc<AtomicU64>,
    side: Side,
    generation: u64,
    events: mpsc::UnboundedSender<AppEvent>,
) {
    let mut line = String::new();
    let mut last_report: Option<Instant> = None;
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let Some(secs) = time_pos(&line) else {
            trace!(?side, line = line.trim_end(), "ignoring IPC line");
            continue;
        };
        position.store(secs.to_bits(), Ordering::Relaxed);

        if last_report.is_some_and(|at| at.elapsed() < TIME_REPORT_INTERVAL) {
            continue;
        }
        last_report = Some(Instant::now());
        if events.send(AppEvent::MediaTime { side, generation }).is_err() {
            break;
        }
    }
    debug!(?side, generation, "mpv event stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_time_pos_changes_only() {
        let change = r#"{"event":"property-change","id":1,"name":"time-pos","data":12.5}"#;
        assert_eq!(time_pos(change), Some(12.5));

        let unloaded = r#"{"event":"property-change","id":1,"name":"time-pos","data":null}"#;
        assert_eq!(time_pos(unloaded), None);

        let reply = r#"{"request_id":0,"error":"success"}"#;
        assert_eq!(time_pos(reply), None);

        let other = r#"{"event":"property-change","id":2,"name":"pause","data":true}"#;
        assert_eq!(time_pos(other), None);

        assert_eq!(time_pos("not json"), None);
    }
}
