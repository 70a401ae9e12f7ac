//! Event bus for abreview.
//!
//! All user input, timer ticks, and background-task results are normalised into
//! a single `AppEvent` enum and sent over a tokio unbounded MPSC channel. The
//! main loop receives from this channel and dispatches accordingly.
//!
//! Two independent intervals drive the render and logic cycles:
//! - **Render interval** (33 ms ≈ 30 FPS) triggers a `terminal.draw()` call.
//! - **Tick interval** (250 ms) expires transient status messages.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

use abreview_core::load::RequestToken;
use abreview_core::types::{Evaluation, Side, TaskResults};
use abreview_core::LoadError;

use crate::player::MpvPlayer;

/// A task as delivered by the loader, ready to hand to the engine.
#[derive(Debug)]
pub struct LoadedTask {
    pub results: TaskResults,
    /// Whether submissions from this session count as blind evaluations.
    pub is_blind: bool,
}

/// All events the application can receive from any source.
#[derive(Debug)]
#[non_exhaustive]
pub enum AppEvent {
    /// A key press from the terminal (`KeyEventKind::Press` only).
    Key(KeyEvent),
    /// A mouse event from the terminal (click, scroll, move).
    Mouse(MouseEvent),
    /// Terminal was resized; the next draw picks up the new size.
    Resize,
    /// Logic tick (250 ms).
    Tick,
    /// Render tick: triggers a `terminal.draw()` call (≈30 FPS / 33 ms).
    Render,
    /// A task load finished. Discarded unless `token` is still current.
    Loaded {
        token: RequestToken,
        result: Result<Box<LoadedTask>, LoadError>,
    },
    /// An evaluation submission finished.
    Submitted {
        token: RequestToken,
        index: usize,
        result: Result<Evaluation, LoadError>,
    },
    /// Players for a pair finished opening. Either side may have failed.
    MediaReady {
        generation: u64,
        left: Option<MpvPlayer>,
        right: Option<MpvPlayer>,
        errors: Vec<String>,
    },
    /// A player reported its playback position.
    MediaTime { side: Side, generation: u64 },
    /// The post-attach delay elapsed; start looping playback.
    Autoplay { generation: u64 },
    /// SIGTERM arrived.
    Quit,
}

/// Holds the sender and receiver ends of the unified event channel.
///
/// The sender (`tx`) is cloned and distributed to background tasks;
/// the receiver (`rx`) is owned by the main event loop.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the background tokio task that drives the unified event channel.
///
/// `reader.next().fuse()` keeps `select!` from polling a finished stream, and
/// only `KeyEventKind::Press` is forwarded so Windows does not double-fire.
/// Send errors are ignored: the receiver is only dropped at shutdown.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut tick_interval = interval(Duration::from_millis(250));
        let mut render_interval = interval(Duration::from_millis(33));
        let mut reader = EventStream::new();

        loop {
            let tick_tick = tick_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            tokio::select! {
                _ = tick_tick => {
                    let _ = tx.send(AppEvent::Tick);
                }
                _ = render_tick => {
                    let _ = tx.send(AppEvent::Render);
                }
                maybe_event = crossterm_event => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => {
                            if key.kind == KeyEventKind::Press {
                                let _ = tx.send(AppEvent::Key(key));
                            }
                        }
                        Some(Ok(Event::Resize(_, _))) => {
                            let _ = tx.send(AppEvent::Resize);
                        }
                        Some(Ok(Event::Mouse(mouse))) => {
                            let _ = tx.send(AppEvent::Mouse(mouse));
                        }
                        _ => {}
                    }
                }
            }
            if tx.is_closed() {
                break;
            }
        }
    });
}

/// How often the SIGTERM flag is checked. The signal handler can only
/// store to the flag, so someone has to poll it.
const SIGTERM_POLL: Duration = Duration::from_millis(50);

/// Sends `Quit` once `flag` is set, then stops.
///
/// The flag comes from [`crate::tui::register_sigterm`]. The task also
/// stops when the receiver is dropped.
pub fn spawn_sigterm_watch(flag: Arc<AtomicBool>, tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut poll = interval(SIGTERM_POLL);
        loop {
            poll.tick().await;
            if flag.load(Ordering::Relaxed) {
                let _ = tx.send(AppEvent::Quit);
                break;
            }
            if tx.is_closed() {
                break;
            }
        }
    });
}

/// Sends `Autoplay` for `generation` after [`AUTOPLAY_DELAY`].
///
/// [`AUTOPLAY_DELAY`]: abreview_core::sync::AUTOPLAY_DELAY
pub fn schedule_autoplay(tx: mpsc::UnboundedSender<AppEvent>, generation: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(abreview_core::sync::AUTOPLAY_DELAY).await;
        let _ = tx.send(AppEvent::Autoplay { generation });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sigterm_flag_becomes_quit_event() {
        let flag = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_sigterm_watch(Arc::clone(&flag), tx);

        let quiet = tokio::time::timeout(Duration::from_millis(150), rx.recv()).await;
        assert!(quiet.is_err(), "no event before the signal");

        flag.store(true, Ordering::Relaxed);
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert!(matches!(event, Some(AppEvent::Quit)));
    }

    #[tokio::test]
    async fn autoplay_carries_its_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        schedule_autoplay(tx, 7);
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert!(matches!(event, Some(AppEvent::Autoplay { generation: 7 })));
    }
}
