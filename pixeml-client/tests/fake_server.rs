//! Client tests against an in-process task server.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pixeml_client::{ClientError, TaskClient};
use pixeml_core::{
    DeleteTaskRequest, ModifyTaskRequest, NewTaskRequest, RenameTaskRequest, TaskType,
    UnresolvedTask,
};
use serde_json::{json, Value};

#[derive(Default)]
struct Backend {
    types: Vec<TaskType>,
    tasks: Vec<UnresolvedTask>,
    next_id: i64,
    /// Every accepted POST as (endpoint, body).
    received: Vec<(String, Value)>,
    tasks_broken: bool,
}

type Shared = Arc<Mutex<Backend>>;

fn seeded() -> Backend {
    Backend {
        // Sparse on purpose: index 0 holds id 1.
        types: vec![
            TaskType::new(1, "Timer").with_setting("seconds", "int"),
            TaskType::new(0, "Alarm")
                .with_setting("hour", "time")
                .with_setting("label", "string"),
        ],
        tasks: vec![
            UnresolvedTask::new(1, "Wake", 0)
                .with_setting("label", "get up")
                .with_setting("hour", "07:30"),
            UnresolvedTask::new(2, "Tea", 1).with_setting("seconds", "180"),
            UnresolvedTask::new(3, "Ghost", 9),
        ],
        next_id: 4,
        ..Backend::default()
    }
}

async fn task_types(State(s): State<Shared>) -> Json<Vec<TaskType>> {
    Json(s.lock().unwrap().types.clone())
}

async fn tasks(State(s): State<Shared>) -> Response {
    let b = s.lock().unwrap();
    if b.tasks_broken {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }
    Json(b.tasks.clone()).into_response()
}

async fn new_task(State(s): State<Shared>, Json(req): Json<NewTaskRequest>) -> Json<Value> {
    let mut b = s.lock().unwrap();
    b.received.push(("new_task".to_string(), json!(req)));
    let id = b.next_id;
    b.next_id += 1;
    b.tasks.push(UnresolvedTask {
        id,
        name: req.task_name,
        type_id: req.task_type_id,
        settings: req.settings,
    });
    Json(json!({}))
}

async fn modify_task(State(s): State<Shared>, Json(req): Json<ModifyTaskRequest>) -> Json<Value> {
    let mut b = s.lock().unwrap();
    b.received.push(("modify_task".to_string(), json!(req)));
    match b.tasks.iter_mut().find(|t| t.id == req.task_id) {
        Some(t) => {
            t.settings = req.settings;
            Json(json!({}))
        }
        None => Json(json!({"error": "no such task"})),
    }
}

async fn rename_task(State(s): State<Shared>, Json(req): Json<RenameTaskRequest>) -> Json<Value> {
    let mut b = s.lock().unwrap();
    b.received.push(("rename_task".to_string(), json!(req)));
    match b.tasks.iter_mut().find(|t| t.id == req.task_id) {
        Some(t) => {
            t.name = req.name;
            Json(json!({}))
        }
        None => Json(json!({"error": "no such task"})),
    }
}

async fn delete_task(State(s): State<Shared>, Json(req): Json<DeleteTaskRequest>) -> Json<Value> {
    let mut b = s.lock().unwrap();
    b.received.push(("delete_task".to_string(), json!(req)));
    let before = b.tasks.len();
    b.tasks.retain(|t| t.id != req.task_id);
    if b.tasks.len() == before {
        return Json(json!({"error": "no such task"}));
    }
    Json(json!({}))
}

struct TestServer {
    base_url: String,
    state: Shared,
}

async fn start_test_server(backend: Backend) -> TestServer {
    let state: Shared = Arc::new(Mutex::new(backend));
    let app = Router::new()
        .route("/api/task_types", get(task_types))
        .route("/api/tasks", get(tasks))
        .route("/api/new_task", post(new_task))
        .route("/api/modify_task", post(modify_task))
        .route("/api/rename_task", post(rename_task))
        .route("/api/delete_task", post(delete_task))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}/"),
        state,
    }
}

#[tokio::test]
async fn reload_resolves_and_reports_failures() {
    let server = start_test_server(seeded()).await;
    let client = TaskClient::new(&server.base_url);
    assert!(!client.base_url().ends_with('/'));

    let snap = client.reload().await.unwrap();
    let board = snap.board;

    assert_eq!(board.task_types.len(), 2);
    let ids: Vec<_> = board.tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2]);

    let wake = board.task(1).unwrap();
    assert_eq!(wake.type_name, "Alarm");
    assert_eq!(wake.setting("hour").unwrap().setting_type, "time");
    assert_eq!(wake.setting("label").unwrap().setting_type, "string");

    assert_eq!(board.failures.len(), 1);
    assert_eq!(board.failures[0].task_name, "Ghost");
}

#[tokio::test]
async fn create_then_reload_shows_new_task() {
    let server = start_test_server(seeded()).await;
    let client = TaskClient::new(&server.base_url);

    let timer = server.state.lock().unwrap().types[0].clone();
    let req = NewTaskRequest::from_template(
        &timer,
        "Eggs",
        &[("seconds".to_string(), "420".to_string())],
    )
    .unwrap();

    let snap = client.create_task(req).await.unwrap();
    let eggs = snap.board.task(4).unwrap();
    assert_eq!(eggs.name, "Eggs");
    assert_eq!(eggs.value_of("seconds"), Some("420"));

    let received = server.state.lock().unwrap().received.clone();
    assert_eq!(
        received,
        vec![(
            "new_task".to_string(),
            json!({"task_type_id": 1, "task_name": "Eggs", "settings": [["seconds", "420"]]})
        )]
    );
}

#[tokio::test]
async fn modify_rename_delete_round_trip() {
    let server = start_test_server(seeded()).await;
    let client = TaskClient::new(&server.base_url);

    let board = client.reload().await.unwrap().board;
    let wake = board.task(1).unwrap();

    let req = ModifyTaskRequest::from_resolved(wake, &[("hour".to_string(), "06:45".to_string())])
        .unwrap();
    let board = client.modify_task(req).await.unwrap().board;
    assert_eq!(board.task(1).unwrap().value_of("hour"), Some("06:45"));
    assert_eq!(board.task(1).unwrap().value_of("label"), Some("get up"));

    let board = client
        .rename_task(RenameTaskRequest::new(1, "Rise").unwrap())
        .await
        .unwrap()
        .board;
    assert_eq!(board.task(1).unwrap().name, "Rise");

    let board = client.delete_task(2).await.unwrap().board;
    assert!(board.task(2).is_none());
    assert_eq!(board.tasks.len(), 1);
}

#[tokio::test]
async fn non_empty_ack_is_a_rejection() {
    let server = start_test_server(seeded()).await;
    let client = TaskClient::new(&server.base_url);

    let err = client.delete_task(77).await.unwrap_err();
    match err {
        ClientError::Rejected { endpoint, body } => {
            assert_eq!(endpoint, "delete_task");
            assert_eq!(body, json!({"error": "no such task"}));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn http_errors_surface_status_and_body() {
    let mut backend = seeded();
    backend.tasks_broken = true;
    let server = start_test_server(backend).await;
    let client = TaskClient::new(&server.base_url);

    // Types still load; the task fetch fails the reload.
    assert_eq!(client.task_types().await.unwrap().len(), 2);
    match client.reload().await.unwrap_err() {
        ClientError::Server {
            endpoint,
            status,
            body,
        } => {
            assert_eq!(endpoint, "tasks");
            assert_eq!(status, 500);
            assert_eq!(body, "database unavailable");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        TaskClient::with_timeout(format!("http://{addr}"), std::time::Duration::from_secs(2))
            .unwrap();
    assert!(matches!(
        client.task_types().await,
        Err(ClientError::Network(_))
    ));
}
