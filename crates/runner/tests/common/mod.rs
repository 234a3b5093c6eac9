// Copyright 2025 Portfolio E2E Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-process mock of the portfolio contact API.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use portfolio_e2e_runner::RunnerConfig;
use regex::Regex;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

/// Deviations from the compliant contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    /// Health check answers 503.
    pub health_down: bool,
    /// Created messages omit `timestamp`.
    pub drop_timestamp: bool,
    /// Listing returns an object instead of an array.
    pub list_as_object: bool,
    /// Preflight carries no CORS headers.
    pub no_cors: bool,
    /// Invalid payloads are stored instead of rejected.
    pub accept_invalid: bool,
    /// Preflight carries only the first N of origin, methods, headers.
    pub cors_header_limit: Option<usize>,
    /// Valid submissions answer 500 with an empty body.
    pub submit_error: bool,
    /// Valid submissions are answered after this delay.
    pub submit_delay: Option<Duration>,
    /// Created messages carry a `null` id.
    pub null_id: bool,
}

struct MockState {
    faults: Faults,
    messages: Mutex<Vec<Value>>,
}

/// A running mock service.
pub struct MockService {
    /// Bound listener address.
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockService {
    /// Root URL, without the `/api` prefix.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Runner config targeting this service with short timeouts.
    pub fn config(&self) -> RunnerConfig {
        let mut config = RunnerConfig::new(self.base_url());
        config.read_timeout_secs = 5;
        config.submit_timeout_secs = 5;
        config.email_timeout_secs = 5;
        config
    }

    /// Number of stored contact messages.
    pub fn stored(&self) -> usize {
        self.state.messages.lock().unwrap().len()
    }
}

/// Start a mock service with the given faults.
pub async fn spawn(faults: Faults) -> MockService {
    let state = Arc::new(MockState {
        faults,
        messages: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/api/", get(health))
        .route(
            "/api/contact",
            get(list_contacts).post(create_contact).options(preflight),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockService { addr, state }
}

/// Address with nothing listening on it.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

async fn health(State(state): State<Arc<MockState>>) -> Response {
    if state.faults.health_down {
        return (StatusCode::SERVICE_UNAVAILABLE, "service unavailable").into_response();
    }
    Json(json!({"message": "Portfolio API is running"})).into_response()
}

fn validation_errors(payload: &Value) -> Vec<Value> {
    let mut errors = Vec::new();
    for field in ["name", "email", "subject", "message"] {
        if payload.get(field).and_then(Value::as_str).is_none() {
            errors.push(json!({"loc": ["body", field], "msg": "Field required"}));
        }
    }
    if let Some(email) = payload.get("email").and_then(Value::as_str) {
        if !EMAIL_RE.is_match(email) {
            errors.push(json!({"loc": ["body", "email"], "msg": "value is not a valid email address"}));
        }
    }
    errors
}

async fn create_contact(State(state): State<Arc<MockState>>, Json(payload): Json<Value>) -> Response {
    if !state.faults.accept_invalid {
        let errors = validation_errors(&payload);
        if !errors.is_empty() {
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"detail": errors}))).into_response();
        }
    }

    if state.faults.submit_error {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if let Some(delay) = state.faults.submit_delay {
        tokio::time::sleep(delay).await;
    }

    let mut message = json!({
        "id": Uuid::new_v4().to_string(),
        "name": payload.get("name").cloned().unwrap_or(Value::Null),
        "email": payload.get("email").cloned().unwrap_or(Value::Null),
        "subject": payload.get("subject").cloned().unwrap_or(Value::Null),
        "message": payload.get("message").cloned().unwrap_or(Value::Null),
        "timestamp": Utc::now().to_rfc3339(),
    });
    if let Some(object) = message.as_object_mut() {
        if state.faults.drop_timestamp {
            object.remove("timestamp");
        }
        if state.faults.null_id {
            object.insert("id".to_string(), Value::Null);
        }
    }

    state.messages.lock().unwrap().push(message.clone());
    Json(message).into_response()
}

async fn list_contacts(State(state): State<Arc<MockState>>) -> Response {
    let messages = state.messages.lock().unwrap().clone();
    if state.faults.list_as_object {
        return Json(json!({"messages": messages})).into_response();
    }
    Json(Value::Array(messages)).into_response()
}

async fn preflight(State(state): State<Arc<MockState>>) -> Response {
    if state.faults.no_cors {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    let headers = [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, "*"),
    ];
    let limit = state.faults.cors_header_limit.unwrap_or(headers.len());

    let mut response = StatusCode::OK.into_response();
    for (name, value) in headers.into_iter().take(limit) {
        response
            .headers_mut()
            .insert(name, HeaderValue::from_static(value));
    }
    response
}
