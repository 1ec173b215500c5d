//! Inbound caller authorization.
//!
//! Callers of the request/response surface present `Bearer <key>`; the key
//! is compared with the configured value. This credential is unrelated to
//! the outbound partner token.

use crate::types::{Error, Result};

/// Checks the caller-facing API key.
#[derive(Clone, Default)]
pub struct ApiKeyGuard {
    expected: Option<String>,
}

impl std::fmt::Debug for ApiKeyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyGuard")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl ApiKeyGuard {
    pub fn new(expected: Option<String>) -> Self {
        Self { expected }
    }

    /// Whether an API key is configured.
    pub fn is_enabled(&self) -> bool {
        self.expected.is_some()
    }

    /// Validate an `Authorization` value.
    pub fn check(&self, authorization: Option<&str>) -> Result<()> {
        let Some(expected) = &self.expected else {
            return Ok(());
        };

        let presented =
            authorization.ok_or_else(|| Error::unauthorized("invalid API key"))?;
        let (scheme, credentials) = presented
            .trim()
            .split_once(' ')
            .ok_or_else(|| Error::unauthorized("invalid authentication scheme"))?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(Error::unauthorized("invalid authentication scheme"));
        }
        if credentials.trim() != expected {
            return Err(Error::unauthorized("invalid API key"));
        }
        Ok(())
    }
}
