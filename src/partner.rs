//! Partner API client.
//!
//! Every call carries the credential manager's headers and goes through the
//! shared `reqwest::Client`, whose timeout is the single per-call bound.
//! Partner responses use a `{code, msg, data}` envelope where `code == 0`
//! means success. Failed calls are reported, never retried.

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::auth::CredentialManager;
use crate::types::{Error, PartnerConfig, Result};

/// Longest HTTP error body carried into an error message.
const MAX_ERROR_BODY: usize = 512;

/// One shaped call against the partner API.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerRequest {
    pub method: Method,
    pub path: &'static str,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl PartnerRequest {
    pub fn get(path: &'static str) -> Self {
        Self {
            method: Method::GET,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: &'static str) -> Self {
        Self {
            method: Method::POST,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Deserialize)]
struct PartnerEnvelope {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Authenticated partner API client.
#[derive(Debug)]
pub struct PartnerClient {
    http: reqwest::Client,
    partner: PartnerConfig,
    credentials: Arc<CredentialManager>,
}

impl PartnerClient {
    pub fn new(
        http: reqwest::Client,
        partner: PartnerConfig,
        credentials: Arc<CredentialManager>,
    ) -> Self {
        Self {
            http,
            partner,
            credentials,
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialManager> {
        &self.credentials
    }

    /// Send a request and unwrap the partner envelope into its `data`.
    pub async fn execute(&self, request: PartnerRequest) -> Result<Value> {
        let token = self.credentials.get_token().await?;
        let headers = self.credentials.headers_for(&token);
        let url = self.partner.url(request.path);
        tracing::debug!(method = %request.method, url = %url, "Calling partner API");

        let mut builder = self.http.request(request.method.clone(), &url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.credentials.invalidate_token(&token).await;
            tracing::warn!(path = request.path, "Partner API rejected the access token");
            return Err(Error::auth_failure("partner API rejected the access token"));
        }

        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(path = request.path, status = status.as_u16(), "Partner API call failed");
            return Err(Error::remote_api(
                i64::from(status.as_u16()),
                truncate(&body, MAX_ERROR_BODY),
            ));
        }

        let envelope: PartnerEnvelope = serde_json::from_str(&body)
            .map_err(|e| Error::internal(format!("malformed partner response: {}", e)))?;
        if envelope.code != 0 {
            let message = envelope
                .msg
                .unwrap_or_else(|| format!("code {}", envelope.code));
            tracing::warn!(path = request.path, code = envelope.code, "Partner API refused call");
            return Err(Error::remote_api(envelope.code, message));
        }

        Ok(envelope
            .data
            .filter(|data| !data.is_null())
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())))
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}
