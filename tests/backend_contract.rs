//! End-to-end tests against a stub contest backend on an ephemeral port

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};

use contest_client::api::{ContestApi, CreateSubmissionRequest, HttpContestApi};
use contest_client::config::ApiConfig;
use contest_client::error::AppError;
use contest_client::models::{SubmissionStatus, Verdict};
use contest_client::services::{LeaderboardRefresher, PollPolicy, SubmissionTracker, TrackerPhase};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Clone, Default)]
struct Stub {
    polls: Arc<AtomicUsize>,
    leaderboard_calls: Arc<AtomicUsize>,
    created: Arc<Mutex<Vec<Value>>>,
}

async fn contest(Path(contest_id): Path<String>) -> Response {
    if contest_id == "BARE001" {
        return Json(json!({
            "id": 2,
            "contestId": "BARE001",
            "name": "Bare Contest",
            "description": null,
            "startTime": "2024-01-15T10:00:00",
            "endTime": "2024-01-15T12:00:00",
            "problems": [{
                "id": 1,
                "title": "Echo",
                "description": null,
                "sampleInput": null,
                "sampleOutput": null,
                "timeLimit": 1,
                "memoryLimit": 64
            }]
        }))
        .into_response();
    }
    if contest_id != "CONTEST001" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Contest not found" })),
        )
            .into_response();
    }

    Json(json!({
        "id": 1,
        "contestId": "CONTEST001",
        "name": "Sample Programming Contest",
        "description": "A sample contest",
        "startTime": "2024-01-15T10:00:00",
        "endTime": "2024-01-15T12:00:00.500",
        "problems": [{
            "id": 1,
            "title": "Sum of Two Numbers",
            "description": "Print a + b",
            "sampleInput": "3 5",
            "sampleOutput": "8",
            "timeLimit": 2,
            "memoryLimit": 256
        }]
    }))
    .into_response()
}

async fn leaderboard(State(stub): State<Stub>, Path(_contest_id): Path<String>) -> Response {
    match stub.leaderboard_calls.fetch_add(1, Ordering::SeqCst) {
        0 => Json(json!([
            { "username": "alice", "problemsSolved": 1, "totalSubmissions": 2,
              "lastSubmissionTime": "2024-01-15T10:30:00", "rank": 1 },
            { "username": "bob", "problemsSolved": 0, "totalSubmissions": 1,
              "lastSubmissionTime": null, "rank": 2 }
        ]))
        .into_response(),
        1 => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        _ => Json(json!([
            { "username": "bob", "problemsSolved": 2, "totalSubmissions": 3,
              "lastSubmissionTime": "2024-01-15T11:00:00", "rank": 1 }
        ]))
        .into_response(),
    }
}

async fn create_submission(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    let problem_id = body["problemId"].as_i64();
    if let Ok(mut created) = stub.created.lock() {
        created.push(body);
    }

    if problem_id != Some(1) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Problem not found with ID: 99" })),
        )
            .into_response();
    }

    Json(json!({ "submissionId": "S1", "status": "PENDING" })).into_response()
}

async fn submission(State(stub): State<Stub>, Path(submission_id): Path<String>) -> Response {
    match submission_id.as_str() {
        "S1" => {
            let completed = stub.polls.fetch_add(1, Ordering::SeqCst) > 0;
            Json(json!({
                "submissionId": "S1",
                "code": "public class Main {}",
                "status": if completed { "COMPLETED" } else { "PENDING" },
                "result": if completed { json!("ACCEPTED") } else { Value::Null },
                "errorMessage": null,
                "executionTime": if completed { json!(120) } else { Value::Null },
                "memoryUsed": if completed { json!(32) } else { Value::Null },
                "submittedAt": "2024-01-15T10:45:00.123456",
                "username": "alice",
                "problemTitle": "Sum of Two Numbers"
            }))
            .into_response()
        }
        "BROKEN" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "GARBLED" => (StatusCode::OK, "not json").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_backend(stub: Stub) -> HttpContestApi {
    let app = Router::new()
        .route("/api/contests/{contest_id}", get(contest))
        .route("/api/contests/{contest_id}/leaderboard", get(leaderboard))
        .route("/api/submissions", post(create_submission))
        .route("/api/submissions/{submission_id}", get(submission))
        .with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    HttpContestApi::new(&ApiConfig {
        base_url: format!("http://{addr}"),
        timeout: Duration::from_secs(2),
    })
    .unwrap()
}

#[tokio::test]
async fn test_contest_lookup() {
    let api = spawn_backend(Stub::default()).await;

    let contest = assert_ok!(api.get_contest("CONTEST001").await);
    assert_eq!(contest.name, "Sample Programming Contest");
    assert_eq!(contest.problem(1).map(|p| p.memory_limit), Some(256));

    let missing = assert_err!(api.get_contest("weekly 1").await);
    assert!(matches!(missing, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_contest_with_null_text_fields() {
    let api = spawn_backend(Stub::default()).await;

    let contest = assert_ok!(api.get_contest("BARE001").await);
    assert_eq!(contest.description, "");

    let problem = contest.problem(1).unwrap();
    assert_eq!(problem.title, "Echo");
    assert_eq!(problem.sample_input, "");
    assert_eq!(problem.sample_output, "");
}

#[tokio::test]
async fn test_create_submission_wire_shape_and_errors() {
    let stub = Stub::default();
    let api = spawn_backend(stub.clone()).await;

    let created = assert_ok!(
        api.create_submission(&CreateSubmissionRequest::new(1, "alice", "public class Main {}"))
            .await
    );
    assert_eq!(created.submission_id, "S1");
    assert_eq!(created.status, Some(SubmissionStatus::Pending));

    let rejected = assert_err!(
        api.create_submission(&CreateSubmissionRequest::new(99, "alice", "x"))
            .await
    );
    match rejected {
        AppError::TransientFetch(message) => {
            assert_eq!(message, "Problem not found with ID: 99")
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let bodies = stub.created.lock().unwrap().clone();
    assert_eq!(
        bodies[0],
        json!({ "username": "alice", "problemId": 1, "code": "public class Main {}" })
    );
}

#[tokio::test]
async fn test_submission_error_mapping() {
    let api = spawn_backend(Stub::default()).await;

    assert!(matches!(
        api.get_submission("S404").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        api.get_submission("BROKEN").await,
        Err(AppError::TransientFetch(_))
    ));
    assert!(matches!(
        api.get_submission("GARBLED").await,
        Err(AppError::Decode(_))
    ));
}

#[tokio::test]
async fn test_tracker_follows_submission_to_verdict() {
    let stub = Stub::default();
    let api = spawn_backend(stub.clone()).await;
    let tracker = SubmissionTracker::new(
        Arc::new(api),
        PollPolicy::fixed(Duration::from_millis(50)),
    );

    let handle = assert_ok!(tracker.submit(1, "alice", "public class Main {}").await);
    let snapshot = tokio::time::timeout(WAIT, tracker.wait()).await.unwrap();

    match snapshot.phase {
        TrackerPhase::Done {
            handle: done,
            submission,
        } => {
            assert_eq!(done, handle);
            assert_eq!(submission.result, Some(Verdict::Accepted));
            assert_eq!(submission.execution_time, Some(120));
            assert_eq!(submission.memory_used, Some(32));
        }
        other => panic!("unexpected phase: {other:?}"),
    }
    assert_eq!(stub.polls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_refresher_keeps_stale_standings_until_retry() {
    let api = spawn_backend(Stub::default()).await;
    let refresher = LeaderboardRefresher::new(Arc::new(api), Duration::from_millis(200));
    let mut updates = refresher.subscribe();

    let handle = refresher.start("CONTEST001");

    let first = tokio::time::timeout(WAIT, updates.wait_for(|s| !s.entries.is_empty()))
        .await
        .unwrap()
        .unwrap()
        .clone();
    assert_eq!(first.entries[0].username, "alice");

    let stale = tokio::time::timeout(WAIT, updates.wait_for(|s| s.error.is_some()))
        .await
        .unwrap()
        .unwrap()
        .clone();
    assert_eq!(stale.entries, first.entries);

    // Retry may race a scheduled tick; either way the next fetch succeeds
    let _ = refresher.retry(&handle);
    let fresh = tokio::time::timeout(
        WAIT,
        updates.wait_for(|s| s.error.is_none() && !s.loading && s.entries[0].username == "bob"),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert_eq!(fresh.entries.len(), 1);

    assert!(refresher.stop(&handle));
}
