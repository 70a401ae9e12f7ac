//! Background task that owns the API client.
//!
//! Requests arrive on a channel and each one runs as its own tokio task, so a
//! slow load never holds up a retry. Results go back to the event loop as
//! `AppEvent::Loaded` / `AppEvent::Submitted`, stamped with the request token.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use abreview_core::api::ApiClient;
use abreview_core::load::RequestToken;
use abreview_core::types::Choice;

use crate::event::{AppEvent, LoadedTask};

#[derive(Debug)]
pub enum LoadRequest {
    /// Detailed results for the review view.
    Results { token: RequestToken, task_id: String },
    /// Task record for a blind-test run.
    Task { token: RequestToken, task_id: String },
    /// Record a choice for the pair at `index`.
    Submit {
        token: RequestToken,
        index: usize,
        pair_id: String,
        choice: Choice,
        is_blind: bool,
    },
}

/// Starts the loader and returns the request sender.
///
/// The loader stops when the sender is dropped.
pub fn spawn_loader(client: ApiClient, events: UnboundedSender<AppEvent>) -> UnboundedSender<LoadRequest> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(loader_loop(client, rx, events));
    tx
}

async fn loader_loop(
    client: ApiClient,
    mut rx: UnboundedReceiver<LoadRequest>,
    events: UnboundedSender<AppEvent>,
) {
    while let Some(request) = rx.recv().await {
        let (client, events) = (client.clone(), events.clone());
        tokio::spawn(async move {
            let event = handle_request(&client, request).await;
            let _ = events.send(event);
        });
    }
}

async fn handle_request(client: &ApiClient, request: LoadRequest) -> AppEvent {
    match request {
        LoadRequest::Results { token, task_id } => {
            let result = client.detailed_results(&task_id).await.map(|results| {
                info!(%task_id, pairs = results.entries.len(), "results loaded");
                Box::new(LoadedTask { results, is_blind: false })
            });
            if let Err(e) = &result {
                warn!(%task_id, error = %e, "results load failed");
            }
            AppEvent::Loaded { token, result }
        }
        LoadRequest::Task { token, task_id } => {
            let result = client.task(&task_id).await.map(|task| {
                info!(%task_id, pairs = task.pairs.len(), blind = task.is_blind, "task loaded");
                let is_blind = task.is_blind;
                Box::new(LoadedTask { results: task.into_results(), is_blind })
            });
            if let Err(e) = &result {
                warn!(%task_id, error = %e, "task load failed");
            }
            AppEvent::Loaded { token, result }
        }
        LoadRequest::Submit { token, index, pair_id, choice, is_blind } => {
            let result = client.submit_evaluation(&pair_id, &choice, is_blind).await;
            match &result {
                Ok(_) => info!(%pair_id, choice = choice.as_wire(), "evaluation recorded"),
                Err(e) => warn!(%pair_id, error = %e, "evaluation submit failed"),
            }
            AppEvent::Submitted { token, index, result }
        }
    }
}
