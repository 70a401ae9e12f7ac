//! External media players for the two sides of a pair.
//!
//! Players are opened off the event loop and handed back as
//! [`AppEvent::MediaReady`]; the engine decides whether they are still wanted.

mod mpv;

pub use mpv::MpvPlayer;

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use abreview_core::engine::MediaRequest;
use abreview_core::types::Side;

use crate::event::AppEvent;

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("player exited before its IPC socket came up")]
    Exited,
    #[error("IPC socket did not come up: {0}")]
    Connect(std::io::Error),
}

/// Opens both sides of `request` concurrently and reports the result.
///
/// A side without a URL stays empty. A side that fails to open is logged and
/// reported in `errors`; the other side is still delivered.
pub fn open_pair(request: MediaRequest, mpv_path: String, tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let MediaRequest { generation, left_url, right_url } = request;
        let open = |side: Side, url: Option<String>| {
            let (mpv_path, tx) = (mpv_path.clone(), tx.clone());
            async move {
                let url = url?;
                match MpvPlayer::spawn(&mpv_path, &url, side, generation, tx).await {
                    Ok(player) => Some(Ok(player)),
                    Err(e) => {
                        warn!(?side, %url, error = %e, "could not open player");
                        Some(Err(format!("{side} player: {e}")))
                    }
                }
            }
        };
        let (left, right) =
            tokio::join!(open(Side::Left, left_url), open(Side::Right, right_url));

        let mut errors = Vec::new();
        let mut keep = |opened: Option<Result<MpvPlayer, String>>| match opened {
            Some(Ok(player)) => Some(player),
            Some(Err(message)) => {
                errors.push(message);
                None
            }
            None => None,
        };
        let (left, right) = (keep(left), keep(right));
        let _ = tx.send(AppEvent::MediaReady { generation, left, right, errors });
    });
}
