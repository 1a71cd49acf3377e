use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// One scripted reply from the status endpoint.
#[derive(Debug, Clone)]
pub enum StatusStep {
    /// (state, success, message)
    Status(&'static str, bool, &'static str),
    /// Simulated outage: respond 500.
    Error,
}

pub fn pending() -> StatusStep {
    StatusStep::Status("PENDING", false, "")
}

pub fn running() -> StatusStep {
    StatusStep::Status("RUNNING", false, "")
}

pub fn completed(success: bool, message: &'static str) -> StatusStep {
    StatusStep::Status("COMPLETED", success, message)
}

struct EngineState {
    user_roles: HashMap<String, String>,
    roles: Vec<String>,
    users: Vec<String>,
    /// Scripts handed out to submissions in order. The last step of a script
    /// repeats once the sequence is exhausted.
    pending_scripts: Mutex<VecDeque<Vec<StatusStep>>>,
    scripts: Mutex<HashMap<String, VecDeque<StatusStep>>>,
    workflow_counter: AtomicUsize,
    total_requests: AtomicUsize,
    status_calls: Mutex<HashMap<String, usize>>,
    submissions: Mutex<Vec<Value>>,
}

/// In-process workflow engine double. Each test spins up its own instance on
/// a free port and talks to it over real HTTP.
pub struct MockEngine {
    pub base_url: String,
    state: Arc<EngineState>,
}

pub struct MockEngineBuilder {
    scripts: VecDeque<Vec<StatusStep>>,
}

impl MockEngineBuilder {
    /// Queue the status sequence the next submission's workflow will play.
    pub fn script(mut self, steps: Vec<StatusStep>) -> Self {
        self.scripts.push_back(steps);
        self
    }

    pub async fn start(self) -> Result<MockEngine> {
        let state = Arc::new(EngineState {
            user_roles: HashMap::from([
                ("alice".to_string(), "readWrite".to_string()),
                ("bob".to_string(), "readAnyDatabase".to_string()),
            ]),
            roles: vec![
                "atlasAdmin".to_string(),
                "readWriteAnyDatabase".to_string(),
                "readAnyDatabase".to_string(),
            ],
            users: vec!["alice".to_string(), "bob".to_string()],
            pending_scripts: Mutex::new(self.scripts),
            scripts: Mutex::new(HashMap::new()),
            workflow_counter: AtomicUsize::new(0),
            total_requests: AtomicUsize::new(0),
            status_calls: Mutex::new(HashMap::new()),
            submissions: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/user-role", get(user_role))
            .route("/built-in-roles", get(built_in_roles))
            .route("/database-users", get(database_users))
            .route("/jit-request", post(jit_request))
            .route("/breakglass", post(breakglass))
            .route("/breakglass/status", get(breakglass_status))
            .with_state(state.clone());

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock engine")?;
        let base_url = format!("http://127.0.0.1:{port}");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(MockEngine { base_url, state })
    }
}

impl MockEngine {
    pub fn builder() -> MockEngineBuilder {
        MockEngineBuilder {
            scripts: VecDeque::new(),
        }
    }

    /// Engine with no scripted workflows, for directory-only tests.
    pub async fn start() -> Result<Self> {
        Self::builder().start().await
    }

    pub fn total_requests(&self) -> usize {
        self.state.total_requests.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self, workflow_id: &str) -> usize {
        self.state
            .status_calls
            .lock()
            .unwrap()
            .get(workflow_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn submissions(&self) -> Vec<Value> {
        self.state.submissions.lock().unwrap().clone()
    }
}

async fn user_role(
    State(state): State<Arc<EngineState>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.total_requests.fetch_add(1, Ordering::SeqCst);
    let username = params.get("username").cloned().unwrap_or_default();
    match state.user_roles.get(&username) {
        Some(role) => (StatusCode::OK, Json(json!({ "current_role": role }))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("user {username} not found") })),
        ),
    }
}

async fn built_in_roles(State(state): State<Arc<EngineState>>) -> Json<Value> {
    state.total_requests.fetch_add(1, Ordering::SeqCst);
    Json(json!(state.roles))
}

async fn database_users(State(state): State<Arc<EngineState>>) -> Json<Value> {
    state.total_requests.fetch_add(1, Ordering::SeqCst);
    Json(json!(state.users))
}

fn assign_workflow(state: &EngineState) -> String {
    let n = state.workflow_counter.fetch_add(1, Ordering::SeqCst) + 1;
    let workflow_id = format!("wf-{n}");
    let script = state
        .pending_scripts
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| vec![completed(true, "done")]);
    state
        .scripts
        .lock()
        .unwrap()
        .insert(workflow_id.clone(), script.into());
    workflow_id
}

async fn jit_request(
    State(state): State<Arc<EngineState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.total_requests.fetch_add(1, Ordering::SeqCst);
    state.submissions.lock().unwrap().push(body.clone());

    // Backend-side validation the client cannot anticipate.
    if body["new_role"] == "clusterMonitor" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!("role clusterMonitor is not grantable")),
        );
    }

    let workflow_id = assign_workflow(&state);
    (
        StatusCode::OK,
        Json(json!({
            "workflowID": workflow_id,
            "runID": uuid::Uuid::new_v4().to_string(),
        })),
    )
}

async fn breakglass(
    State(state): State<Arc<EngineState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.total_requests.fetch_add(1, Ordering::SeqCst);
    state.submissions.lock().unwrap().push(body.clone());

    let workflow_id = assign_workflow(&state);
    (
        StatusCode::OK,
        Json(json!({
            "workflow_id": workflow_id,
            "requested_at": chrono::Utc::now(),
        })),
    )
}

async fn breakglass_status(
    State(state): State<Arc<EngineState>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.total_requests.fetch_add(1, Ordering::SeqCst);
    let workflow_id = params.get("workflow_id").cloned().unwrap_or_default();

    *state
        .status_calls
        .lock()
        .unwrap()
        .entry(workflow_id.clone())
        .or_insert(0) += 1;

    let mut scripts = state.scripts.lock().unwrap();
    let Some(script) = scripts.get_mut(&workflow_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "unknown workflow" })),
        );
    };

    let step = if script.len() > 1 {
        script.pop_front().unwrap()
    } else {
        script.front().cloned().unwrap_or(completed(true, "done"))
    };

    match step {
        StatusStep::Status(status, success, message) => (
            StatusCode::OK,
            Json(json!({
                "status": status,
                "success": success,
                "message": message,
            })),
        ),
        StatusStep::Error => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "engine unavailable" })),
        ),
    }
}
