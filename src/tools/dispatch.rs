//! Tool dispatcher: name resolution, argument validation and execution.
//!
//! Resolution goes through an explicit name → [`Operation`] table built when
//! the dispatcher is constructed. Construction fails if a catalog entry has
//! no handler for its category, or if a name resolves to more than one
//! operation.

use serde_json::Value;
use std::collections::HashMap;
use tracing::Instrument;

use crate::operations::{Arguments, HandlerMap, Operation};
use crate::tools::catalog::{ToolCatalog, ToolDescriptor};
use crate::types::{Error, InvocationId, Result};

/// Routes tool invocations to category handlers.
pub struct ToolDispatcher {
    catalog: ToolCatalog,
    routes: HashMap<String, Operation>,
    handlers: HandlerMap,
}

impl std::fmt::Debug for ToolDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut categories: Vec<_> = self.handlers.keys().collect();
        categories.sort();
        f.debug_struct("ToolDispatcher")
            .field("tools", &self.catalog.len())
            .field("categories", &categories)
            .finish()
    }
}

impl ToolDispatcher {
    /// Build the routing table and check it against the bound handlers.
    pub fn new(catalog: ToolCatalog, handlers: HandlerMap) -> Result<Self> {
        let mut routes = HashMap::with_capacity(catalog.len());
        for entry in catalog.list_entries() {
            let name = entry.name();
            let matches: Vec<Operation> = Operation::ALL
                .into_iter()
                .filter(|op| op.name() == name)
                .collect();
            if matches.len() != 1 {
                return Err(Error::internal(format!(
                    "tool {} resolves to {} operations",
                    name,
                    matches.len()
                )));
            }
            let operation = matches[0];
            if !handlers.contains_key(&operation.category()) {
                return Err(Error::internal(format!(
                    "no {} handler bound for tool {}",
                    operation.category(),
                    name
                )));
            }
            if routes.insert(name.to_string(), operation).is_some() {
                return Err(Error::internal(format!("tool {} registered twice", name)));
            }
        }

        tracing::debug!(tools = routes.len(), "Tool dispatcher ready");
        Ok(Self {
            catalog,
            routes,
            handlers,
        })
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Operation a tool name routes to, if any.
    pub fn resolve(&self, name: &str) -> Option<Operation> {
        self.routes.get(name).copied()
    }

    /// Static tool listing in registration order.
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.catalog.descriptors()
    }

    /// Invoke a tool by name.
    ///
    /// Arguments are validated before the handler runs; invalid calls never
    /// reach the partner. The handler runs on its own task so a panic is
    /// reported as an internal error instead of tearing down the caller.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        let invocation = InvocationId::new();
        let span = tracing::info_span!("call_tool", tool = name, invocation = %invocation);
        self.call_resolved(name, arguments).instrument(span).await
    }

    async fn call_resolved(&self, name: &str, arguments: Value) -> Result<Value> {
        let Some(operation) = self.resolve(name) else {
            tracing::warn!("Unknown tool requested");
            return Err(Error::unknown_tool(name));
        };

        let arguments = match arguments {
            Value::Null => Value::Object(Arguments::new()),
            other => other,
        };
        let errors = self.catalog.validate_params(name, &arguments)?;
        if !errors.is_empty() {
            tracing::info!(errors = errors.len(), "Rejected tool arguments");
            return Err(Error::validation(errors.join("; ")));
        }
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => return Err(Error::validation("Parameters must be a JSON object")),
        };

        let handler = self
            .handlers
            .get(&operation.category())
            .cloned()
            .ok_or_else(|| Error::internal(format!("no handler for {}", operation.category())))?;

        tracing::info!(category = %operation.category(), "Dispatching tool");
        let task = tokio::spawn(
            async move { handler.invoke(operation, arguments).await }.in_current_span(),
        );
        match task.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                tracing::warn!(kind = err.kind().as_code(), error = %err, "Tool failed");
                Err(err)
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "Tool handler aborted");
                Err(Error::internal(format!("tool handler aborted: {}", join_err)))
            }
        }
    }
}
