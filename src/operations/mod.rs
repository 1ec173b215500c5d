//! Partner operations: the closed set of calls the bridge can make.
//!
//! Every [`Operation`] belongs to exactly one [`ToolCategory`]; the mapping is
//! an exhaustive `match`, so a new operation cannot be added without choosing
//! its category. Handlers are bound per category and turn validated
//! arguments into a [`PartnerRequest`].

pub mod leads;
pub mod order;
pub mod tag;
pub mod user;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::partner::{PartnerClient, PartnerRequest};
use crate::types::{Error, Result};

/// Validated argument map handed to a handler.
pub type Arguments = Map<String, Value>;

// =============================================================================
// Categories
// =============================================================================

/// Handler category an operation is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    User,
    Tag,
    Order,
    Leads,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 4] = [
        ToolCategory::User,
        ToolCategory::Tag,
        ToolCategory::Order,
        ToolCategory::Leads,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCategory::User => "user",
            ToolCategory::Tag => "tag",
            ToolCategory::Order => "order",
            ToolCategory::Leads => "leads",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Every partner operation exposed as a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    CreateUser,
    FetchUserProfile,
    UpdateUserOwner,
    UpdateUserPool,
    UpdateUserEmail,
    FetchUserContact,
    CreateTagGroup,
    ListTagGroups,
    UpdateTagGroup,
    DeactivateTagGroup,
    ActivateTagGroup,
    AssignUserTag,
    ListUserTags,
    FetchOrder,
    ListOrders,
    ListOrderFinancials,
    ImportLeads,
}

impl Operation {
    pub const ALL: [Operation; 17] = [
        Operation::CreateUser,
        Operation::FetchUserProfile,
        Operation::UpdateUserOwner,
        Operation::UpdateUserPool,
        Operation::UpdateUserEmail,
        Operation::FetchUserContact,
        Operation::CreateTagGroup,
        Operation::ListTagGroups,
        Operation::UpdateTagGroup,
        Operation::DeactivateTagGroup,
        Operation::ActivateTagGroup,
        Operation::AssignUserTag,
        Operation::ListUserTags,
        Operation::FetchOrder,
        Operation::ListOrders,
        Operation::ListOrderFinancials,
        Operation::ImportLeads,
    ];

    /// Tool name this operation is invoked by.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateUser => "create_user",
            Operation::FetchUserProfile => "fetch_user_profile",
            Operation::UpdateUserOwner => "update_user_owner",
            Operation::UpdateUserPool => "update_user_pool",
            Operation::UpdateUserEmail => "update_user_email",
            Operation::FetchUserContact => "fetch_user_contact",
            Operation::CreateTagGroup => "create_tag_group",
            Operation::ListTagGroups => "list_tag_groups",
            Operation::UpdateTagGroup => "update_tag_group",
            Operation::DeactivateTagGroup => "deactivate_tag_group",
            Operation::ActivateTagGroup => "activate_tag_group",
            Operation::AssignUserTag => "assign_user_tag",
            Operation::ListUserTags => "list_user_tags",
            Operation::FetchOrder => "fetch_order",
            Operation::ListOrders => "list_orders",
            Operation::ListOrderFinancials => "list_order_financials",
            Operation::ImportLeads => "import_leads",
        }
    }

    pub fn category(&self) -> ToolCategory {
        match self {
            Operation::CreateUser
            | Operation::FetchUserProfile
            | Operation::UpdateUserOwner
            | Operation::UpdateUserPool
            | Operation::UpdateUserEmail
            | Operation::FetchUserContact => ToolCategory::User,
            Operation::CreateTagGroup
            | Operation::ListTagGroups
            | Operation::UpdateTagGroup
            | Operation::DeactivateTagGroup
            | Operation::ActivateTagGroup
            | Operation::AssignUserTag
            | Operation::ListUserTags => ToolCategory::Tag,
            Operation::FetchOrder | Operation::ListOrders | Operation::ListOrderFinancials => {
                ToolCategory::Order
            }
            Operation::ImportLeads => ToolCategory::Leads,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Executes operations of one category.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    async fn invoke(&self, operation: Operation, arguments: Arguments) -> Result<Value>;
}

/// Category-to-handler bindings used by the dispatcher.
pub type HandlerMap = HashMap<ToolCategory, Arc<dyn OperationHandler>>;

/// Handler that shapes operations into partner HTTP calls.
#[derive(Debug)]
pub struct PartnerOperations {
    category: ToolCategory,
    client: Arc<PartnerClient>,
}

impl PartnerOperations {
    pub fn new(category: ToolCategory, client: Arc<PartnerClient>) -> Self {
        Self { category, client }
    }

    /// One partner-backed handler per category.
    pub fn bind_all(client: Arc<PartnerClient>) -> HandlerMap {
        ToolCategory::ALL
            .into_iter()
            .map(|category| {
                let handler: Arc<dyn OperationHandler> =
                    Arc::new(PartnerOperations::new(category, client.clone()));
                (category, handler)
            })
            .collect()
    }

    /// Shape an operation into the partner request it performs.
    pub fn prepare(&self, operation: Operation, arguments: &Arguments) -> Result<PartnerRequest> {
        if operation.category() != self.category {
            return Err(Error::internal(format!(
                "{} handler cannot run {}",
                self.category, operation
            )));
        }
        match self.category {
            ToolCategory::User => user::prepare(operation, arguments),
            ToolCategory::Tag => tag::prepare(operation, arguments),
            ToolCategory::Order => order::prepare(operation, arguments),
            ToolCategory::Leads => leads::prepare(operation, arguments),
        }
    }
}

#[async_trait]
impl OperationHandler for PartnerOperations {
    async fn invoke(&self, operation: Operation, arguments: Arguments) -> Result<Value> {
        let request = self.prepare(operation, &arguments)?;
        self.client.execute(request).await
    }
}

// =============================================================================
// Field shaping helpers
// =============================================================================

/// Whether an argument should be left out of the partner call.
///
/// Null and empty strings are absent; a zero `limit`/`offset` means "unset".
fn is_unset(key: &str, value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => matches!(key, "limit" | "offset") && n.as_i64() == Some(0),
        _ => false,
    }
}

fn query_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Collect the listed arguments as query parameters.
pub(crate) fn query_from(arguments: &Arguments, keys: &[&str]) -> Vec<(String, String)> {
    keys.iter()
        .filter_map(|key| {
            arguments
                .get(*key)
                .filter(|value| !is_unset(key, value))
                .map(|value| (key.to_string(), query_text(value)))
        })
        .collect()
}

/// Collect the listed arguments into a JSON body.
pub(crate) fn body_from(arguments: &Arguments, keys: &[&str]) -> Value {
    let body: Map<String, Value> = keys
        .iter()
        .filter_map(|key| {
            arguments
                .get(*key)
                .filter(|value| !is_unset(key, value))
                .map(|value| (key.to_string(), value.clone()))
        })
        .collect();
    Value::Object(body)
}

pub(crate) fn unsupported(category: ToolCategory, operation: Operation) -> Error {
    Error::internal(format!("{} is not a {} operation", operation, category))
}
