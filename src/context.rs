//! Application context, built once at startup and shared by `Arc`.

use std::sync::Arc;

use crate::auth::{ApiKeyGuard, CredentialManager};
use crate::operations::{HandlerMap, PartnerOperations};
use crate::partner::PartnerClient;
use crate::tools::{builtin_catalog, ToolDispatcher};
use crate::types::{Config, Error, Result};

/// Everything a request needs: config, credentials, dispatcher and guard.
///
/// Read-only after construction apart from the token cache inside the
/// credential manager.
#[derive(Debug)]
pub struct AppContext {
    config: Config,
    credentials: Arc<CredentialManager>,
    dispatcher: ToolDispatcher,
    guard: ApiKeyGuard,
}

impl AppContext {
    /// Wire the partner-backed handlers for every category.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.partner.request_timeout)
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {}", e)))?;

        let credentials = Arc::new(CredentialManager::new(http.clone(), &config.partner));
        let client = Arc::new(PartnerClient::new(
            http,
            config.partner.clone(),
            credentials.clone(),
        ));
        let handlers = PartnerOperations::bind_all(client);
        Self::with_handlers(config, credentials, handlers)
    }

    /// Build a context around caller-supplied handlers.
    pub fn with_handlers(
        config: Config,
        credentials: Arc<CredentialManager>,
        handlers: HandlerMap,
    ) -> Result<Self> {
        let dispatcher = ToolDispatcher::new(builtin_catalog()?, handlers)?;
        let guard = ApiKeyGuard::new(config.server.api_key.clone());
        if !guard.is_enabled() {
            tracing::warn!("No API key configured; inbound requests are not authenticated");
        }
        tracing::info!(
            tools = dispatcher.catalog().len(),
            partner = %config.partner.api_host,
            "Application context ready"
        );
        Ok(Self {
            config,
            credentials,
            dispatcher,
            guard,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<CredentialManager> {
        &self.credentials
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    pub fn guard(&self) -> &ApiKeyGuard {
        &self.guard
    }
}
