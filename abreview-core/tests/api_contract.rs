//! HTTP contract tests for ApiClient against an in-process server.
//!
//! Exercises: detailed_results, task, submit_evaluation, and the mapping of
//! transport and payload failures onto LoadError.

use std::time::Duration;

use abreview_core::api::{ApiClient, DEFAULT_TIMEOUT};
use abreview_core::types::Choice;
use abreview_core::LoadError;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str) -> ApiClient {
    ApiClient::new(base, "https://media.test", DEFAULT_TIMEOUT).unwrap()
}

fn detailed_payload() -> Value {
    json!({
        "success": true,
        "data": {
            "task_id": "t1",
            "task_name": "Sharpening study",
            "folder_a": "Sharp",
            "folder_b": "Soft",
            "total_pairs": 2,
            "evaluated_pairs": 1,
            "completion_rate": 50.0,
            "results": [
                {
                    "pair_index": 0,
                    "pair_id": "p0",
                    "video_a_path": "uploads/t1/sharp/a.mp4",
                    "video_b_path": "uploads/t1/soft/a.mp4",
                    "video_a_name": "a.mp4",
                    "video_b_name": "a.mp4",
                    "left_folder": "Soft",
                    "right_folder": "Sharp",
                    "is_swapped": true,
                    "user_choice": "A",
                    "actual_chosen_folder": "Sharp",
                    "evaluation_id": "e0",
                    "evaluation_timestamp": "2024-05-01T10:00:00Z",
                    "is_evaluated": true
                },
                {
                    "pair_index": 1,
                    "pair_id": "p1",
                    "video_a_path": "uploads/t1/sharp/b.mp4",
                    "video_b_path": "uploads/t1/soft/b.mp4",
                    "video_a_name": "b.mp4",
                    "video_b_name": "b.mp4",
                    "left_folder": "Sharp",
                    "right_folder": "Soft",
                    "is_swapped": false,
                    "user_choice": null,
                    "actual_chosen_folder": null,
                    "evaluation_id": null,
                    "evaluation_timestamp": null,
                    "is_evaluated": false
                }
            ]
        }
    })
}

#[tokio::test]
async fn loads_detailed_results() {
    let router = Router::new().route(
        "/api/tasks/t1/detailed-results",
        get(|| async { Json(detailed_payload()) }),
    );
    let base = serve(router).await;

    let results = client(&base).detailed_results("t1").await.unwrap();

    assert_eq!(results.header.task_name, "Sharpening study");
    assert_eq!(results.header.folders.folder_a, "Sharp");
    assert_eq!(results.entries.len(), 2);
    let first = &results.entries[0];
    assert!(first.pair.is_swapped);
    let evaluation = first.evaluation.as_ref().unwrap();
    assert_eq!(evaluation.choice, Choice::A);
    assert_eq!(evaluation.chosen_folder.as_deref(), Some("Sharp"));
    assert_eq!(evaluation.timestamp.as_deref(), Some("2024-05-01T10:00:00+00:00"));
    assert!(results.entries[1].evaluation.is_none());
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let router = Router::new().route(
        "/api/tasks/t1/detailed-results",
        get(|| async { (StatusCode::NOT_FOUND, "task not found") }),
    );
    let base = serve(router).await;

    match client(&base).detailed_results("t1").await {
        Err(LoadError::Status { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "task not found");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_is_reported() {
    let router = Router::new().route(
        "/api/tasks/t1/detailed-results",
        get(|| async { "{not json" }),
    );
    let base = serve(router).await;

    let err = client(&base).detailed_results("t1").await.unwrap_err();
    assert!(matches!(err, LoadError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn failed_envelope_is_rejected() {
    let router = Router::new().route(
        "/api/tasks/t1/detailed-results",
        get(|| async { Json(json!({"success": false, "message": "task archived"})) }),
    );
    let base = serve(router).await;

    match client(&base).detailed_results("t1").await {
        Err(LoadError::Rejected(reason)) => assert_eq!(reason, "task archived"),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_server_times_out() {
    let router = Router::new().route(
        "/api/tasks/t1/detailed-results",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(detailed_payload())
        }),
    );
    let base = serve(router).await;
    let client = ApiClient::new(&base, &base, Duration::from_millis(200)).unwrap();

    let err = client.detailed_results("t1").await.unwrap_err();
    assert!(matches!(err, LoadError::Timeout), "got {err:?}");
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}")).detailed_results("t1").await.unwrap_err();
    assert!(matches!(err, LoadError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn invalid_task_id_is_refused_before_sending() {
    let err = client("http://127.0.0.1:9").detailed_results("../admin").await.unwrap_err();
    assert!(matches!(err, LoadError::InvalidTaskId(_)));
}

#[tokio::test]
async fn task_accepts_bare_and_enveloped_bodies() {
    let task = json!({
        "id": "t2",
        "name": "Blind run",
        "folder_a": "Sharp",
        "folder_b": "Soft",
        "is_blind": true,
        "video_pairs": [
            {"id": "q0", "video_a_path": "a.mp4", "video_b_path": "b.mp4"}
        ]
    });
    let bare = task.clone();
    let wrapped = json!({"success": true, "data": task});
    let router = Router::new()
        .route("/api/tasks/t2", get(move || async move { Json(bare) }))
        .route("/api/tasks/t3", get(move || async move { Json(wrapped) }));
    let base = serve(router).await;
    let client = client(&base);

    for id in ["t2", "t3"] {
        let task = client.task(id).await.unwrap();
        assert_eq!(task.name, "Blind run");
        assert!(task.is_blind);
        assert_eq!(task.pairs.len(), 1);
        assert_eq!(task.pairs[0].left_folder, "Sharp");
        assert!(!task.pairs[0].is_swapped);
    }
}

#[tokio::test]
async fn submit_posts_choice() {
    let router = Router::new().route(
        "/api/evaluations/",
        post(|Json(body): Json<Value>| async move {
            let ok = body["video_pair_id"] == "q0" && body["is_blind"] == true;
            if !ok {
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"detail": "bad body"})));
            }
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "data": {"id": "e9", "choice": body["choice"], "created_at": 1714557600}
                })),
            )
        }),
    );
    let base = serve(router).await;

    let evaluation = client(&base).submit_evaluation("q0", &Choice::Tie, true).await.unwrap();

    assert_eq!(evaluation.id.as_deref(), Some("e9"));
    assert_eq!(evaluation.choice, Choice::Tie);
    assert_eq!(evaluation.timestamp.as_deref(), Some("2024-05-01T10:00:00+00:00"));
}

#[test]
fn media_urls_resolve_against_media_base() {
    let client = client("http://api.test");
    assert_eq!(
        client.media_url("uploads/t1/sharp/a.mp4"),
        "https://media.test/uploads/t1/sharp/a.mp4"
    );
    assert_eq!(client.media_url("t1/sharp/a.mp4"), "https://media.test/uploads/t1/sharp/a.mp4");
}
