//! Partner credential manager.
//!
//! Obtains a bearer token from the partner token endpoint, caches it, and
//! builds the authenticated header set for every partner call.
//!
//! The cache sits behind an async mutex that is held across the token
//! fetch: concurrent callers queue on the lock and at most one token request
//! is in flight. Every waiter reuses the outcome of that request, including a
//! failure; only a caller arriving after a failed fetch triggers a new one.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::auth::signature::sign;
use crate::types::{Error, PartnerConfig, Result};

/// Header carrying the application identity.
pub const APP_ID_HEADER: &str = "X-APP-ID";

// =============================================================================
// Token
// =============================================================================

/// Cached partner access token.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn new(value: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the token may still be used at `now`.
    ///
    /// Tokens without a known expiry stay usable until invalidated.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        match self.expires_at {
            None => true,
            Some(expires_at) => {
                let skew = chrono::Duration::from_std(skew).unwrap_or_else(|_| chrono::Duration::zero());
                now + skew < expires_at
            }
        }
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Parse the partner's `expire_time` field.
///
/// Accepts unix seconds (number or numeric string; values above 10^12 are
/// milliseconds), RFC 3339, or `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn parse_expire_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(from_unix),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                return from_unix(n);
            }
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                        .ok()
                        .map(|naive| naive.and_utc())
                })
        }
        _ => None,
    }
}

fn from_unix(n: i64) -> Option<DateTime<Utc>> {
    if n > 1_000_000_000_000 {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}

// =============================================================================
// Token endpoint wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenEnvelope {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<TokenData>,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    expire_time: Value,
}

// =============================================================================
// Credential manager
// =============================================================================

/// Produces and caches the partner access token.
pub struct CredentialManager {
    http: reqwest::Client,
    token_url: String,
    app_id: String,
    secret: String,
    refresh_skew: Duration,
    cache: Mutex<TokenCache>,
    fetches: AtomicU64,
    /// Completed fetches, successful or not. Mirrors `TokenCache::generation`
    /// so callers can note it before queueing on the lock.
    completed: AtomicU64,
}

#[derive(Default)]
struct TokenCache {
    token: Option<Token>,
    generation: u64,
    /// Outcome of the last fetch when it failed.
    failure: Option<Error>,
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("token_url", &self.token_url)
            .field("app_id", &self.app_id)
            .field("refresh_skew", &self.refresh_skew)
            .field("fetches", &self.fetch_count())
            .finish_non_exhaustive()
    }
}

impl CredentialManager {
    pub fn new(http: reqwest::Client, partner: &PartnerConfig) -> Self {
        Self {
            http,
            token_url: partner.url(&partner.auth_path),
            app_id: partner.app_id.clone(),
            secret: partner.api_secret.clone(),
            refresh_skew: partner.token_refresh_skew,
            cache: Mutex::new(TokenCache::default()),
            fetches: AtomicU64::new(0),
            completed: AtomicU64::new(0),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Number of token requests sent to the partner so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Return the cached token, fetching a new one when absent or stale.
    ///
    /// A caller that queued behind a fetch which then failed gets that same
    /// failure instead of starting another request.
    pub async fn get_token(&self) -> Result<String> {
        let observed = self.completed.load(Ordering::Acquire);
        let mut cache = self.cache.lock().await;
        if cache.generation != observed {
            if let Some(failure) = cache.failure.as_ref() {
                tracing::debug!("Sharing failed partner token fetch");
                return Err(replay(failure));
            }
        }
        if let Some(token) = cache.token.as_ref() {
            if token.is_fresh_at(Utc::now(), self.refresh_skew) {
                return Ok(token.value.clone());
            }
            tracing::debug!(expires_at = ?token.expires_at, "Cached partner token is stale");
        }

        let outcome = self.fetch_token().await;
        cache.generation += 1;
        self.completed.store(cache.generation, Ordering::Release);
        match outcome {
            Ok(token) => {
                let value = token.value.clone();
                cache.token = Some(token);
                cache.failure = None;
                Ok(value)
            }
            Err(err) => {
                cache.failure = Some(replay(&err));
                Err(err)
            }
        }
    }

    /// Headers for an authenticated partner request.
    pub async fn get_headers(&self) -> Result<BTreeMap<String, String>> {
        let token = self.get_token().await?;
        Ok(self.headers_for(&token))
    }

    /// Header set carrying an already obtained `token`.
    pub fn headers_for(&self, token: &str) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        headers.insert(APP_ID_HEADER.to_string(), self.app_id.clone());
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    /// Drop the cached token so the next call fetches a fresh one.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.lock().await;
        if cache.token.take().is_some() {
            tracing::info!("Partner token invalidated");
        }
    }

    /// Drop the cached token only if it is still `rejected`.
    ///
    /// A token refreshed by another caller since `rejected` was handed out
    /// stays cached.
    pub async fn invalidate_token(&self, rejected: &str) {
        let mut cache = self.cache.lock().await;
        if cache.token.as_ref().is_some_and(|t| t.value == rejected) {
            cache.token = None;
            tracing::info!("Rejected partner token invalidated");
        } else {
            tracing::debug!("Rejected partner token already replaced");
        }
    }

    async fn fetch_token(&self) -> Result<Token> {
        let time_stamp = Utc::now().timestamp();
        let signature = sign(&self.app_id, time_stamp, &self.secret);
        self.fetches.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(url = %self.token_url, "Requesting partner token");

        let response = self
            .http
            .post(&self.token_url)
            .json(&serde_json::json!({
                "app_id": self.app_id,
                "time_stamp": time_stamp,
                "signature": signature,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let envelope = serde_json::from_str::<TokenEnvelope>(&body);

        if !status.is_success() {
            let detail = envelope
                .ok()
                .and_then(|e| e.msg)
                .map(|msg| format!(": {}", msg))
                .unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Partner token request rejected");
            return Err(Error::auth_failure(format!(
                "failed to authenticate with partner API (HTTP {}){}",
                status.as_u16(),
                detail
            )));
        }

        let envelope = envelope
            .map_err(|e| Error::auth_failure(format!("malformed token response: {}", e)))?;
        if envelope.code != 0 {
            let msg = envelope
                .msg
                .unwrap_or_else(|| format!("code {}", envelope.code));
            tracing::warn!(code = envelope.code, "Partner token request refused");
            return Err(Error::auth_failure(format!("partner API error: {}", msg)));
        }

        let data = envelope
            .data
            .ok_or_else(|| Error::auth_failure("token response missing data"))?;
        let value = data
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::auth_failure("token response missing data.token"))?;
        let expires_at = parse_expire_time(&data.expire_time);
        if expires_at.is_none() {
            tracing::warn!(
                expire_time = %data.expire_time,
                "Partner token expiry not understood; reusing until invalidated"
            );
        }

        tracing::info!(expires_at = ?expires_at, "Obtained partner access token");
        Ok(Token::new(value, expires_at))
    }
}

/// Copy of a fetch failure for callers that shared the request.
fn replay(err: &Error) -> Error {
    match err {
        Error::AuthFailure(msg) => Error::auth_failure(msg.clone()),
        Error::Transport(msg) => Error::transport(msg.clone()),
        Error::RemoteApi { code, message } => Error::remote_api(*code, message.clone()),
        other => Error::internal(other.to_string()),
    }
}

// =============================================================================
// Tests
// =============================================================================
