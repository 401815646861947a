// tests/test_helpers.rs
// Fake Telescope backend for integration tests
#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use telescope_client::config::ClientConfig;
use telescope_client::http::HttpClient;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "secret";
pub const SESSION_ID: &str = "test-session";
pub const CSRF_TOKEN: &str = "test-csrf";

#[derive(Default)]
pub struct BackendState {
    pub session_active: bool,
    pub users: Vec<Value>,
    pub next_id: i64,
    /// CSRF header values seen on unsafe requests
    pub csrf_seen: Vec<Option<String>>,
}

pub type SharedBackend = Arc<Mutex<BackendState>>;

pub struct FakeBackend {
    pub url: String,
    pub state: SharedBackend,
    handle: JoinHandle<()>,
}

impl FakeBackend {
    pub fn client(&self) -> HttpClient {
        HttpClient::new(&ClientConfig {
            base_url: self.url.clone(),
            ..Default::default()
        })
        .expect("client for fake backend")
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start the fake backend on an ephemeral port
pub async fn spawn_backend() -> FakeBackend {
    let state: SharedBackend = Arc::new(Mutex::new(BackendState {
        users: vec![
            json!({"id": 1, "username": "admin", "first_name": "Ada", "last_name": "Min",
                   "last_login": "2024-05-01T10:00:00Z", "groups": [{"name": "admins"}]}),
            json!({"id": 2, "username": "viewer", "first_name": "", "last_name": "",
                   "last_login": null, "groups": []}),
        ],
        next_id: 3,
        ..Default::default()
    }));

    let app = Router::new()
        .route("/ui/v1/auth/login", post(login))
        .route("/ui/v1/auth/whoami", get(whoami))
        .route("/logout", post(logout))
        .route("/ui/v1/rbac/users", get(list_users).post(create_user))
        .route("/ui/v1/rbac/simpleusers", get(list_simple_users))
        .route("/ui/v1/rbac/users/{id}", patch(reset_password).delete(delete_user).get(get_user))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    FakeBackend {
        url: format!("http://{}", addr),
        state,
        handle,
    }
}

fn envelope(data: Value) -> Json<Value> {
    Json(json!({
        "result": true,
        "data": data,
        "errors": [],
        "messages": [],
        "validation": {"result": true, "columns": {}}
    }))
}

fn failure(errors: &[&str], columns: Value) -> Json<Value> {
    Json(json!({
        "result": false,
        "data": null,
        "errors": errors,
        "messages": [],
        "validation": {"result": columns.as_object().is_none_or(|c| c.is_empty()), "columns": columns}
    }))
}

fn has_session(state: &SharedBackend, headers: &HeaderMap) -> bool {
    let cookie_ok = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains(&format!("sessionid={}", SESSION_ID)));
    cookie_ok && state.lock().unwrap().session_active
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({"detail": "Authentication credentials were not provided."})),
    )
        .into_response()
}

fn record_csrf(state: &SharedBackend, headers: &HeaderMap) -> bool {
    let token = headers
        .get("X-CSRFToken")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let ok = token.as_deref() == Some(CSRF_TOKEN);
    state.lock().unwrap().csrf_seen.push(token);
    ok
}

async fn login(State(state): State<SharedBackend>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if username != ADMIN_USERNAME || password != ADMIN_PASSWORD {
        return failure(&["Invalid username or password"], json!({})).into_response();
    }

    state.lock().unwrap().session_active = true;
    (
        AppendHeaders([
            (SET_COOKIE, format!("sessionid={}; Path=/; HttpOnly", SESSION_ID)),
            (SET_COOKIE, format!("csrftoken={}; Path=/", CSRF_TOKEN)),
        ]),
        envelope(Value::Null),
    )
        .into_response()
}

async fn logout(State(state): State<SharedBackend>) -> Response {
    state.lock().unwrap().session_active = false;
    (
        StatusCode::FOUND,
        AppendHeaders([
            (LOCATION, "/login".to_string()),
            (SET_COOKIE, "sessionid=; Path=/; Max-Age=0".to_string()),
        ]),
    )
        .into_response()
}

async fn whoami(State(state): State<SharedBackend>, headers: HeaderMap) -> Response {
    if !has_session(&state, &headers) {
        return forbidden();
    }
    envelope(json!({
        "id": 1,
        "username": ADMIN_USERNAME,
        "first_name": "Ada",
        "last_name": "Min",
        "permissions": ["manage_rbac"],
        "type": "local",
        "avatar_url": ""
    }))
    .into_response()
}

async fn list_users(State(state): State<SharedBackend>, headers: HeaderMap) -> Response {
    if !has_session(&state, &headers) {
        return forbidden();
    }
    let users = state.lock().unwrap().users.clone();
    envelope(Value::Array(users)).into_response()
}

async fn list_simple_users(State(state): State<SharedBackend>, headers: HeaderMap) -> Response {
    if !has_session(&state, &headers) {
        return forbidden();
    }
    let users: Vec<Value> = state
        .lock()
        .unwrap()
        .users
        .iter()
        .map(|u| json!({"username": u["username"], "first_name": u["first_name"], "last_name": u["last_name"]}))
        .collect();
    envelope(Value::Array(users)).into_response()
}

async fn get_user(State(state): State<SharedBackend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !has_session(&state, &headers) {
        return forbidden();
    }
    let found = state
        .lock()
        .unwrap()
        .users
        .iter()
        .find(|u| u["id"] == id)
        .cloned();
    match found {
        Some(user) => envelope(user).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}

async fn create_user(State(state): State<SharedBackend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !has_session(&state, &headers) {
        return forbidden();
    }
    if !record_csrf(&state, &headers) {
        return (StatusCode::FORBIDDEN, Json(json!({"detail": "CSRF Failed: CSRF token missing."}))).into_response();
    }

    let username = body["username"].as_str().unwrap_or_default().to_string();
    if username.is_empty() {
        return failure(&[], json!({"username": ["This field is required."]})).into_response();
    }

    let mut backend = state.lock().unwrap();
    if backend.users.iter().any(|u| u["username"] == username.as_str()) {
        return failure(&[], json!({"username": ["A user with that username already exists."]})).into_response();
    }
    let id = backend.next_id;
    backend.next_id += 1;
    backend.users.push(json!({
        "id": id,
        "username": username,
        "first_name": body["first_name"],
        "last_name": body["last_name"],
        "last_login": null,
        "groups": []
    }));

    Json(json!({
        "result": true,
        "data": {"id": id},
        "errors": [],
        "messages": [format!("User {} has been created", username)],
        "validation": {"result": true, "columns": {}}
    }))
    .into_response()
}

async fn delete_user(State(state): State<SharedBackend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !has_session(&state, &headers) {
        return forbidden();
    }
    record_csrf(&state, &headers);

    let mut backend = state.lock().unwrap();
    let before = backend.users.len();
    backend.users.retain(|u| u["id"] != id);
    if backend.users.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    }
    envelope(Value::Null).into_response()
}

async fn reset_password(
    State(state): State<SharedBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if !has_session(&state, &headers) {
        return forbidden();
    }
    record_csrf(&state, &headers);

    if body["password"].as_str().unwrap_or_default().len() < 4 {
        return failure(&[], json!({"password": ["Ensure this field has at least 4 characters."]})).into_response();
    }
    let exists = state.lock().unwrap().users.iter().any(|u| u["id"] == id);
    if !exists {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    }
    envelope(Value::Null).into_response()
}
