//! Stub servers for the homework API and the Telegram Bot API.
//!
//! Both bind to an ephemeral port on localhost and record every request.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Bot token the Telegram stub answers to.
pub const BOT_TOKEN: &str = "test-bot-token";

/// OAuth token the homework client sends.
pub const PRACTICUM_TOKEN: &str = "test-practicum-token";

/// Spawns `router` on an ephemeral port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    format!("http://{addr}")
}

// ============================================================================
// Homework API stub
// ============================================================================

/// A request received by the homework API stub.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub authorization: Option<String>,
    pub from_date: Option<String>,
}

#[derive(Debug, Default)]
struct ApiInner {
    responses: VecDeque<(StatusCode, String)>,
    requests: Vec<ApiRequest>,
}

/// Replays queued responses; once exhausted answers with no updates.
#[derive(Debug, Clone, Default)]
pub struct HomeworkApi {
    inner: Arc<Mutex<ApiInner>>,
}

impl HomeworkApi {
    pub fn respond_json(&self, status: StatusCode, body: &Value) -> &Self {
        self.respond_raw(status, body.to_string())
    }

    pub fn respond_raw(&self, status: StatusCode, body: impl Into<String>) -> &Self {
        self.inner
            .lock()
            .expect("stub lock")
            .responses
            .push_back((status, body.into()));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner.lock().expect("stub lock").requests.clone()
    }

    pub fn from_dates(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|request| request.from_date)
            .collect()
    }

    /// Starts the stub and returns the endpoint URL.
    pub async fn start(&self) -> String {
        let router = Router::new()
            .route("/api/user_api/homework_statuses/", get(homework_statuses))
            .with_state(self.clone());
        format!("{}/api/user_api/homework_statuses/", serve(router).await)
    }
}

async fn homework_statuses(
    State(api): State<HomeworkApi>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let mut inner = api.inner.lock().expect("stub lock");
    let from_date = query.get("from_date").cloned();
    inner.requests.push(ApiRequest {
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        from_date: from_date.clone(),
    });

    let (status, body) = inner.responses.pop_front().unwrap_or_else(|| {
        let current_date = from_date
            .and_then(|d| d.parse::<i64>().ok())
            .unwrap_or(1);
        (
            StatusCode::OK,
            json!({"homeworks": [], "current_date": current_date}).to_string(),
        )
    });
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

// ============================================================================
// Telegram Bot API stub
// ============================================================================

#[derive(Debug, Default)]
struct TelegramInner {
    messages: Vec<Value>,
    reject: bool,
}

/// Records every `sendMessage` call; optionally rejects them.
#[derive(Debug, Clone, Default)]
pub struct TelegramApi {
    inner: Arc<Mutex<TelegramInner>>,
}

impl TelegramApi {
    pub fn rejecting() -> Self {
        let api = Self::default();
        api.inner.lock().expect("stub lock").reject = true;
        api
    }

    /// Bodies of every `sendMessage` call, in order.
    pub fn messages(&self) -> Vec<Value> {
        self.inner.lock().expect("stub lock").messages.clone()
    }

    /// Texts of every `sendMessage` call, in order.
    pub fn texts(&self) -> Vec<String> {
        self.messages()
            .iter()
            .filter_map(|m| m["text"].as_str().map(str::to_string))
            .collect()
    }

    /// Starts the stub and returns the Bot API base URL.
    pub async fn start(&self) -> String {
        let router = Router::new()
            .route(&format!("/bot{BOT_TOKEN}/sendMessage"), post(send_message))
            .with_state(self.clone());
        serve(router).await
    }
}

async fn send_message(
    State(api): State<TelegramApi>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut inner = api.inner.lock().expect("stub lock");
    inner.messages.push(body.clone());

    if inner.reject {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "ok": true,
            "result": {"message_id": inner.messages.len(), "text": body["text"]}
        })),
    )
}
