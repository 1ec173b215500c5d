//! In-process fake of the partner API for integration tests.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::post;
use axum::{Json, Router};
use emeritus_mcp::auth::sign;
use emeritus_mcp::types::DEFAULT_AUTH_PATH;
use emeritus_mcp::{Config, PartnerConfig};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const APP_ID: &str = "app-1";
pub const SECRET: &str = "secret-1";

/// One partner API call as the fake saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Value,
    pub authorization: Option<String>,
    pub app_id: Option<String>,
}

#[derive(Debug)]
pub struct FakeState {
    pub token_hits: AtomicUsize,
    pub api_hits: AtomicUsize,
    /// Seconds from now the issued token expires.
    pub token_ttl_secs: AtomicI64,
    pub token_delay_ms: AtomicU64,
    pub api_delay_ms: AtomicU64,
    /// Replaces the next token response.
    pub token_override: Mutex<Option<(u16, Value)>>,
    /// Replaces the next API response.
    pub api_override: Mutex<Option<(u16, Value)>>,
    pub calls: Mutex<Vec<Recorded>>,
}

impl FakeState {
    pub fn token_hits(&self) -> usize {
        self.token_hits.load(Ordering::SeqCst)
    }

    pub fn api_hits(&self) -> usize {
        self.api_hits.load(Ordering::SeqCst)
    }

    pub fn next_token_reply(&self, status: u16, body: Value) {
        *self.token_override.lock().unwrap() = Some((status, body));
    }

    pub fn next_api_reply(&self, status: u16, body: Value) {
        *self.api_override.lock().unwrap() = Some((status, body));
    }

    pub fn last_call(&self) -> Recorded {
        self.calls.lock().unwrap().last().cloned().expect("no partner call recorded")
    }
}

#[derive(Debug)]
pub struct FakePartner {
    pub addr: SocketAddr,
    pub state: Arc<FakeState>,
}

impl FakePartner {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState {
            token_hits: AtomicUsize::new(0),
            api_hits: AtomicUsize::new(0),
            token_ttl_secs: AtomicI64::new(3600),
            token_delay_ms: AtomicU64::new(0),
            api_delay_ms: AtomicU64::new(0),
            token_override: Mutex::new(None),
            api_override: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route(DEFAULT_AUTH_PATH, post(issue_token))
            .fallback(partner_api)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn partner_config(&self) -> PartnerConfig {
        PartnerConfig::new(self.base_url(), APP_ID, SECRET)
    }

    pub fn config(&self) -> Config {
        Config::new(self.partner_config())
    }
}

async fn issue_token(
    State(state): State<Arc<FakeState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let n = state.token_hits.fetch_add(1, Ordering::SeqCst) + 1;
    let delay = state.token_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let overridden = state.token_override.lock().unwrap().take();
    if let Some((status, reply)) = overridden {
        return (StatusCode::from_u16(status).unwrap(), Json(reply));
    }

    let app_id = body["app_id"].as_str().unwrap_or_default();
    let time_stamp = body["time_stamp"].as_i64().unwrap_or_default();
    let signature = body["signature"].as_str().unwrap_or_default();
    if app_id != APP_ID || signature != sign(app_id, time_stamp, SECRET) {
        return (
            StatusCode::OK,
            Json(json!({"code": 1001, "msg": "invalid signature"})),
        );
    }

    let ttl = state.token_ttl_secs.load(Ordering::SeqCst);
    let expire_time = chrono::Utc::now().timestamp() + ttl;
    (
        StatusCode::OK,
        Json(json!({
            "code": 0,
            "msg": "ok",
            "data": {"token": format!("tok-{}", n), "expire_time": expire_time},
        })),
    )
}

async fn partner_api(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    state.api_hits.fetch_add(1, Ordering::SeqCst);
    let delay = state.api_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let recorded = Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        query: query.clone(),
        body: body.clone(),
        authorization: header("authorization"),
        app_id: header("x-app-id"),
    };
    state.calls.lock().unwrap().push(recorded);

    let overridden = state.api_override.lock().unwrap().take();
    if let Some((status, reply)) = overridden {
        return (StatusCode::from_u16(status).unwrap(), Json(reply));
    }

    (
        StatusCode::OK,
        Json(json!({
            "code": 0,
            "msg": "ok",
            "data": {"path": uri.path(), "query": query, "body": body},
        })),
    )
}
