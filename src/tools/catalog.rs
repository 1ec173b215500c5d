//! Tool catalog: typed metadata, parameter validation, input schemas.
//!
//! Owns tool *metadata*; execution lives with the category handlers.
//! Entries keep registration order so listings are deterministic.

use crate::operations::{Operation, ToolCategory};
use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Int,
    Bool,
    StringList,
    Optional(Box<ParamType>),
}

impl ParamType {
    /// Validate a JSON value against this parameter type.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), String> {
        match self {
            ParamType::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("expected string, got {}", value_type_name(value)))
                }
            }
            ParamType::Int => {
                if value.is_i64() || value.is_u64() {
                    Ok(())
                } else {
                    Err(format!("expected integer, got {}", value_type_name(value)))
                }
            }
            ParamType::Bool => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(format!("expected boolean, got {}", value_type_name(value)))
                }
            }
            ParamType::StringList => {
                if let Some(arr) = value.as_array() {
                    for (i, item) in arr.iter().enumerate() {
                        if !item.is_string() {
                            return Err(format!(
                                "expected string at index {}, got {}",
                                i,
                                value_type_name(item)
                            ));
                        }
                    }
                    Ok(())
                } else {
                    Err(format!("expected array, got {}", value_type_name(value)))
                }
            }
            ParamType::Optional(inner) => {
                if value.is_null() {
                    Ok(())
                } else {
                    inner.validate(value)
                }
            }
        }
    }

    /// JSON Schema fragment for this type.
    pub fn json_schema(&self) -> Value {
        match self {
            ParamType::String => json!({"type": "string"}),
            ParamType::Int => json!({"type": "integer"}),
            ParamType::Bool => json!({"type": "boolean"}),
            ParamType::StringList => json!({"type": "array", "items": {"type": "string"}}),
            ParamType::Optional(inner) => inner.json_schema(),
        }
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether an argument counts as supplied for required/one-of checks.
fn is_supplied(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single parameter definition for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
}

impl ParamDef {
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
        }
    }

    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self::required(name, ParamType::Optional(Box::new(param_type)), description)
    }

    pub fn is_required(&self) -> bool {
        !matches!(self.param_type, ParamType::Optional(_))
    }
}

// =============================================================================
// Tool entry and descriptor
// =============================================================================

/// Complete tool metadata entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEntry {
    pub operation: Operation,
    pub description: String,
    pub parameters: Vec<ParamDef>,
    /// Alternative parameter groups; at least one group must be fully supplied.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Vec<String>>,
}

impl ToolEntry {
    pub fn new(operation: Operation, description: &str, parameters: Vec<ParamDef>) -> Self {
        Self {
            operation,
            description: description.to_string(),
            parameters,
            one_of: Vec::new(),
        }
    }

    /// Require at least one of the given parameter groups.
    pub fn with_one_of(mut self, groups: &[&[&str]]) -> Self {
        self.one_of = groups
            .iter()
            .map(|group| group.iter().map(|name| name.to_string()).collect())
            .collect();
        self
    }

    pub fn name(&self) -> &'static str {
        self.operation.name()
    }

    pub fn category(&self) -> ToolCategory {
        self.operation.category()
    }

    /// JSON Schema describing the accepted arguments.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                let mut schema = p.param_type.json_schema();
                if let Some(obj) = schema.as_object_mut() {
                    obj.insert("description".to_string(), json!(p.description));
                }
                (p.name.clone(), schema)
            })
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name.as_str())
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": false,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        if !self.one_of.is_empty() {
            let alternatives: Vec<Value> = self
                .one_of
                .iter()
                .map(|group| json!({ "required": group }))
                .collect();
            schema["anyOf"] = json!(alternatives);
        }
        schema
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description.clone(),
            input_schema: self.input_schema(),
        }
    }
}

/// Public description of a tool, as listed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

// =============================================================================
// Tool catalog
// =============================================================================

/// In-memory tool catalog. Owns metadata, not implementations.
#[derive(Debug, Default)]
pub struct ToolCatalog {
    entries: Vec<ToolEntry>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool entry. Names must be unique.
    pub fn register(&mut self, entry: ToolEntry) -> Result<()> {
        let name = entry.name();
        if self.index.contains_key(name) {
            return Err(Error::validation(format!("Tool already registered: {}", name)));
        }
        for group in &entry.one_of {
            for param in group {
                if !entry.parameters.iter().any(|p| &p.name == param) {
                    return Err(Error::validation(format!(
                        "Tool {} alternative references unknown parameter: {}",
                        name, param
                    )));
                }
            }
        }
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Get a tool entry by name.
    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Check if a tool exists.
    pub fn has_tool(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All entries in registration order.
    pub fn list_entries(&self) -> &[ToolEntry] {
        &self.entries
    }

    /// Descriptors for every tool in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.entries.iter().map(ToolEntry::descriptor).collect()
    }

    /// Validate parameters against a tool's parameter definitions.
    ///
    /// Returns a list of validation errors (empty = valid).
    pub fn validate_params(&self, name: &str, params: &Value) -> Result<Vec<String>> {
        let entry = self
            .get(name)
            .ok_or_else(|| Error::unknown_tool(name))?;

        let param_map = params
            .as_object()
            .ok_or_else(|| Error::validation("Parameters must be a JSON object"))?;

        let mut errors = Vec::new();

        // Check required parameters are present
        for param_def in &entry.parameters {
            if param_def.is_required() && !is_supplied(param_map.get(&param_def.name)) {
                errors.push(format!("Missing required parameter: {}", param_def.name));
            }
        }

        // Validate types of provided parameters
        for (key, value) in param_map {
            match entry.parameters.iter().find(|p| &p.name == key) {
                Some(param_def) => {
                    if let Err(e) = param_def.param_type.validate(value) {
                        errors.push(format!("Parameter '{}': {}", key, e));
                    }
                }
                None => errors.push(format!("Unknown parameter: {}", key)),
            }
        }

        if !entry.one_of.is_empty() {
            let satisfied = entry
                .one_of
                .iter()
                .any(|group| group.iter().all(|p| is_supplied(param_map.get(p))));
            if !satisfied {
                let alternatives: Vec<String> =
                    entry.one_of.iter().map(|group| group.join(" + ")).collect();
                errors.push(format!(
                    "One of the following must be provided: {}",
                    alternatives.join(" | ")
                ));
            }
        }

        Ok(errors)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
