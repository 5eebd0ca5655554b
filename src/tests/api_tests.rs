use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch},
    Json, Router,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Recorded {
    Create(serde_json::Value),
    Delete(u64),
    UpdateStatus(u64, String),
}

#[derive(Clone)]
struct ServerState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    reject_with: Option<StatusCode>,
}

async fn handle_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Kanban API is running!" }))
}

async fn handle_list(State(state): State<ServerState>) -> Result<String, StatusCode> {
    if let Some(code) = state.reject_with {
        return Err(code);
    }
    Ok(r#"[
        {"id": 1, "title": "Write report", "status": "To Do", "assignee": "Unassigned"},
        {"id": 5, "title": "Review", "description": "second pass", "status": "In Progress"},
        {"id": 7, "title": "Ship", "status": "Done"}
    ]"#
    .to_string())
}

async fn handle_create(
    State(state): State<ServerState>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    state.requests.lock().await.push(Recorded::Create(body));
    state.reject_with.unwrap_or(StatusCode::OK)
}

async fn handle_delete(State(state): State<ServerState>, Path(id): Path<u64>) -> StatusCode {
    state.requests.lock().await.push(Recorded::Delete(id));
    state.reject_with.unwrap_or(StatusCode::OK)
}

async fn handle_patch_status(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Query(query): Query<HashMap<String, String>>,
) -> StatusCode {
    let status = query.get("status").cloned().unwrap_or_default();
    state
        .requests
        .lock()
        .await
        .push(Recorded::UpdateStatus(id, status));
    state.reject_with.unwrap_or(StatusCode::OK)
}

async fn spawn_task_server(reject_with: Option<StatusCode>) -> (String, ServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState {
        requests: Arc::new(Mutex::new(Vec::new())),
        reject_with,
    };
    let app = Router::new()
        .route("/", get(handle_root))
        .route("/tasks", get(handle_list).post(handle_create))
        .route("/tasks/:id", delete(handle_delete))
        .route("/tasks/:id/status", patch(handle_patch_status))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

async fn handle_malformed_list() -> &'static str {
    "<html>not a task list</html>"
}

async fn spawn_malformed_server() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route("/tasks", get(handle_malformed_list));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn client(base_url: &str) -> HttpTaskApi {
    HttpTaskApi::new(base_url, Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn lists_tasks_with_normalized_statuses() {
    let (url, _state) = spawn_task_server(None).await;
    let tasks = client(&url).list_tasks().await.expect("list");

    let statuses: Vec<_> = tasks.iter().map(|t| (t.id, t.status)).collect();
    assert_eq!(
        statuses,
        vec![
            (1, Status::Todo),
            (5, Status::InProgress),
            (7, Status::Done)
        ]
    );
    assert_eq!(tasks[1].description.as_deref(), Some("second pass"));
}

#[tokio::test]
async fn create_posts_title_only_body() {
    let (url, state) = spawn_task_server(None).await;
    client(&url)
        .create_task(&NewTask::titled("Write report"))
        .await
        .expect("create");

    let requests = state.requests.lock().await;
    assert_eq!(
        *requests,
        vec![Recorded::Create(
            serde_json::json!({ "title": "Write report" })
        )]
    );
}

#[tokio::test]
async fn update_status_sends_backend_label_in_query() {
    let (url, state) = spawn_task_server(None).await;
    client(&url)
        .update_status(5, Status::InProgress)
        .await
        .expect("patch");

    let requests = state.requests.lock().await;
    assert_eq!(
        *requests,
        vec![Recorded::UpdateStatus(5, "In Progress".to_string())]
    );
}

#[tokio::test]
async fn delete_targets_task_path() {
    let (url, state) = spawn_task_server(None).await;
    client(&format!("{url}/")).delete_task(7).await.expect("delete");

    assert_eq!(*state.requests.lock().await, vec![Recorded::Delete(7)]);
}

#[tokio::test]
async fn non_success_status_is_a_rejection() {
    let (url, _state) = spawn_task_server(Some(StatusCode::NOT_FOUND)).await;
    let api = client(&url);

    let err = api.delete_task(99).await.expect_err("rejected");
    assert!(matches!(err, ApiError::Rejected { status: 404, .. }));

    let err = api.list_tasks().await.expect_err("rejected");
    assert!(err.is_rejection());
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .list_tasks()
        .await
        .expect_err("no server");
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn health_reads_root_message() {
    let (url, _state) = spawn_task_server(None).await;
    let message = client(&url).health().await.expect("health");
    assert_eq!(message, "Kanban API is running!");
}

#[tokio::test]
async fn success_with_non_json_body_is_a_decode_error() {
    let url = spawn_malformed_server().await;
    let err = client(&url).list_tasks().await.expect_err("not json");
    assert!(matches!(err, ApiError::Decode(_)));
    assert!(!err.is_rejection());
}
