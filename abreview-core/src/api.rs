//! Client for the comparison-study HTTP API.
//!
//! Every response is deserialized into private wire structs and validated into
//! the domain types of [`crate::types`] before it leaves this module.
//!
//! # Endpoints
//! - `GET  /api/tasks/{id}/detailed-results` — pairs plus evaluation state
//! - `GET  /api/tasks/{id}` — task with its video pairs (blind-test mode)
//! - `POST /api/evaluations/` — record a choice for one pair

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LoadError, Result};
use crate::types::{
    BlindTask, Choice, Evaluation, FolderNames, PairEntry, TaskHeader, TaskResults, VideoPair,
};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent header sent with every request.
const USER_AGENT: &str = concat!("abreview/", env!("CARGO_PKG_VERSION"));

/// Builds the playable URL for a relative media path.
///
/// Absolute `http(s)` URLs pass through. Otherwise one leading `/` is dropped
/// and the path is placed under `uploads/` unless it already starts there.
pub fn media_url(media_base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_owned();
    }
    let base = media_base.trim_end_matches('/');
    let clean = path.strip_prefix('/').unwrap_or(path);
    if clean.starts_with("uploads/") {
        format!("{base}/{clean}")
    } else {
        format!("{base}/uploads/{clean}")
    }
}

/// Rejects ids that cannot be used verbatim as a URL path segment.
fn check_task_id(task_id: &str) -> Result<()> {
    let valid = !task_id.is_empty()
        && task_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(LoadError::InvalidTaskId(task_id.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    message: Option<String>,
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T> {
        if !self.success {
            let reason = self
                .error
                .or(self.message)
                .unwrap_or_else(|| "server reported failure".to_owned());
            return Err(LoadError::Rejected(reason));
        }
        self.data.ok_or_else(|| LoadError::Malformed("envelope has no data".to_owned()))
    }
}

#[derive(Debug, Deserialize)]
struct DetailedResultsWire {
    task_id: String,
    #[serde(default)]
    task_name: String,
    #[serde(default)]
    folder_a: String,
    #[serde(default)]
    folder_b: String,
    total_pairs: usize,
    evaluated_pairs: usize,
    #[serde(default)]
    completion_rate: f64,
    results: Vec<PairResultWire>,
}

#[derive(Debug, Deserialize)]
struct PairResultWire {
    pair_index: usize,
    pair_id: String,
    video_a_path: String,
    video_b_path: String,
    #[serde(default)]
    video_a_name: String,
    #[serde(default)]
    video_b_name: String,
    #[serde(default)]
    left_folder: String,
    #[serde(default)]
    right_folder: String,
    #[serde(default)]
    is_swapped: bool,
    user_choice: Option<String>,
    actual_chosen_folder: Option<String>,
    evaluation_id: Option<String>,
    evaluation_timestamp: Option<serde_json::Value>,
    #[serde(default)]
    is_evaluated: bool,
}

#[derive(Debug, Deserialize)]
struct TaskWire {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    folder_a: String,
    #[serde(default)]
    folder_b: String,
    #[serde(default)]
    is_blind: bool,
    #[serde(default)]
    video_pairs: Vec<TaskPairWire>,
}

#[derive(Debug, Deserialize)]
struct TaskPairWire {
    id: String,
    video_a_path: String,
    video_b_path: String,
    #[serde(default)]
    video_a_name: String,
    #[serde(default)]
    video_b_name: String,
}

#[derive(Debug, Serialize)]
struct EvaluationCreate<'a> {
    video_pair_id: &'a str,
    choice: &'a str,
    is_blind: bool,
}

#[derive(Debug, Deserialize)]
struct EvaluationWire {
    #[serde(default)]
    id: Option<String>,
    choice: Option<String>,
    #[serde(default)]
    created_at: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Normalises a timestamp that may arrive as Unix seconds or as text.
fn normalise_timestamp(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(n) => {
            let secs = n.as_f64()?;
            let whole = secs.trunc() as i64;
            let nanos = ((secs - secs.trunc()) * 1e9).round() as u32;
            DateTime::<Utc>::from_timestamp(whole, nanos.min(999_999_999)).map(|t| t.to_rfc3339())
        }
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(
            DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc).to_rfc3339())
                .unwrap_or(s),
        ),
        _ => None,
    }
}

fn parse_choice(raw: Option<String>) -> Option<Choice> {
    raw.filter(|s| !s.trim().is_empty()).map(|s| Choice::parse(&s))
}

fn validate_results(wire: DetailedResultsWire) -> Result<TaskResults> {
    let mut seen = HashSet::with_capacity(wire.results.len());
    let mut entries = Vec::with_capacity(wire.results.len());

    for r in wire.results {
        if r.pair_id.trim().is_empty() {
            return Err(LoadError::Malformed(format!("pair {} has an empty id", r.pair_index)));
        }
        if !seen.insert(r.pair_id.clone()) {
            return Err(LoadError::Malformed(format!("duplicate pair id {}", r.pair_id)));
        }

        // A pair counts as evaluated only when the flag and a choice agree.
        let evaluation = match (r.is_evaluated, parse_choice(r.user_choice)) {
            (true, Some(choice)) => Some(Evaluation {
                id: r.evaluation_id,
                choice,
                chosen_folder: r.actual_chosen_folder.filter(|f| !f.trim().is_empty()),
                timestamp: r.evaluation_timestamp.and_then(normalise_timestamp),
            }),
            (true, None) => {
                warn!(pair_id = %r.pair_id, "pair flagged evaluated without a choice");
                None
            }
            (false, _) => None,
        };

        entries.push(PairEntry {
            pair: VideoPair {
                id: r.pair_id,
                index_in_task: r.pair_index,
                video_a_path: r.video_a_path,
                video_b_path: r.video_b_path,
                video_a_name: r.video_a_name,
                video_b_name: r.video_b_name,
                left_folder: r.left_folder,
                right_folder: r.right_folder,
                is_swapped: r.is_swapped,
            },
            evaluation,
        });
    }

    if wire.total_pairs != entries.len() {
        warn!(
            reported = wire.total_pairs,
            received = entries.len(),
            "total_pairs disagrees with result count"
        );
    }

    Ok(TaskResults {
        header: TaskHeader {
            task_id: wire.task_id,
            task_name: wire.task_name,
            folders: FolderNames { folder_a: wire.folder_a, folder_b: wire.folder_b },
            total_pairs: wire.total_pairs,
            evaluated_pairs: wire.evaluated_pairs,
            completion_rate: wire.completion_rate,
        },
        entries,
    })
}

fn validate_task(wire: TaskWire) -> Result<BlindTask> {
    let mut seen = HashSet::with_capacity(wire.video_pairs.len());
    let mut pairs = Vec::with_capacity(wire.video_pairs.len());
    for (index, p) in wire.video_pairs.into_iter().enumerate() {
        if !seen.insert(p.id.clone()) {
            return Err(LoadError::Malformed(format!("duplicate pair id {}", p.id)));
        }
        pairs.push(VideoPair {
            id: p.id,
            index_in_task: index,
            video_a_path: p.video_a_path,
            video_b_path: p.video_b_path,
            video_a_name: p.video_a_name,
            video_b_name: p.video_b_name,
            left_folder: wire.folder_a.clone(),
            right_folder: wire.folder_b.clone(),
            is_swapped: false,
        });
    }
    Ok(BlindTask {
        id: wire.id,
        name: wire.name,
        folders: FolderNames { folder_a: wire.folder_a, folder_b: wire.folder_b },
        is_blind: wire.is_blind,
        pairs,
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the results API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    api_base: String,
    media_base: String,
}

impl ApiClient {
    /// Creates a client for `api_base` (e.g. `http://localhost:8000`) that
    /// resolves media against `media_base`.
    pub fn new(api_base: &str, media_base: &str, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));
        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| LoadError::Client(e.to_string()))?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_owned(),
            media_base: media_base.trim_end_matches('/').to_owned(),
        })
    }

    pub fn media_base(&self) -> &str {
        &self.media_base
    }

    /// Playable URL for a pair's relative media path.
    pub fn media_url(&self, path: &str) -> String {
        media_url(&self.media_base, path)
    }

    /// Fetches pairs and evaluation state for `task_id`.
    pub async fn detailed_results(&self, task_id: &str) -> Result<TaskResults> {
        check_task_id(task_id)?;
        let url = format!("{}/api/tasks/{task_id}/detailed-results", self.api_base);
        let body = self.get_text(&url).await?;
        let envelope: Envelope<DetailedResultsWire> = serde_json::from_str(&body)?;
        validate_results(envelope.into_data()?)
    }

    /// Fetches the task record used by blind-test mode.
    ///
    /// Accepts both a bare task object and a `{success, data}` envelope.
    pub async fn task(&self, task_id: &str) -> Result<BlindTask> {
        check_task_id(task_id)?;
        let url = format!("{}/api/tasks/{task_id}", self.api_base);
        let body = self.get_text(&url).await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        let task: TaskWire = if value.get("success").is_some() {
            serde_json::from_value::<Envelope<TaskWire>>(value)?.into_data()?
        } else {
            decode(value)?
        };
        validate_task(task)
    }

    /// Records `choice` for `pair_id` and returns the stored evaluation.
    pub async fn submit_evaluation(
        &self,
        pair_id: &str,
        choice: &Choice,
        is_blind: bool,
    ) -> Result<Evaluation> {
        let url = format!("{}/api/evaluations/", self.api_base);
        let request = EvaluationCreate { video_pair_id: pair_id, choice: choice.as_wire(), is_blind };
        debug!(%url, pair_id, choice = choice.as_wire(), "POST evaluation");

        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LoadError::status(status.as_u16(), &body));
        }
        let envelope: Envelope<EvaluationWire> = serde_json::from_str(&body)?;
        let wire = envelope.into_data()?;
        Ok(Evaluation {
            id: wire.id,
            choice: parse_choice(wire.choice).unwrap_or_else(|| choice.clone()),
            chosen_folder: None,
            timestamp: wire.created_at.and_then(normalise_timestamp),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "request failed");
            return Err(LoadError::status(status.as_u16(), &body));
        }
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}
