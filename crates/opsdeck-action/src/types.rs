//! Core types and value objects for the action invocation subsystem.
//!
//! Defines action identifiers, definitions, invocation contexts, and run
//! results.

use opsdeck_core::types::Module;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

// =============================================================================
// Identifiers
// =============================================================================

/// Opaque action identifier, namespaced as `<module>.<verb>`.
///
/// Canonical ids are the only ones the runner executes; legacy alias ids
/// resolve to a canonical id through the registry.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Borrow<str> for ActionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Lifecycle state of a single action run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Done,
    Failed,
}

impl RunStatus {
    /// Terminal states carry the final result; `running` is provisional.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Done => write!(f, "done"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(RunStatus::Running),
            "done" => Ok(RunStatus::Done),
            "failed" => Ok(RunStatus::Failed),
            _ => Err(format!("Unknown run status: {}", s)),
        }
    }
}

// =============================================================================
// Domain Structs
// =============================================================================

/// Immutable display and governance metadata for one canonical action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub id: ActionId,
    pub module: Module,
    pub label: String,
    pub description: String,
    /// Stable sort key within a module; ties broken by id.
    pub ui_order: i32,
    /// When set, the result must be explicitly confirmed before taking effect.
    pub requires_approval: bool,
    /// Symbolic icon name resolved by the UI layer.
    pub icon: String,
}

/// The item an invocation is aimed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionTarget {
    pub module: Module,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Transient description of where an action was invoked.
///
/// Constructed fresh per invocation by the caller and never persisted here.
/// `module_context` carries a free-form per-module payload keyed by module
/// name, e.g. `{"inbox": {"itemId": "...", "threadId": "..."}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ActionTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_context: Option<serde_json::Value>,
}

impl ActionContext {
    /// Context aimed at a specific item within a module.
    pub fn for_target(module: Module, id: impl Into<String>) -> Self {
        Self {
            target: Some(ActionTarget {
                module,
                id: Some(id.into()),
                title: None,
            }),
            module_context: None,
        }
    }

    /// The module this context targets, if any.
    pub fn module(&self) -> Option<Module> {
        self.target.as_ref().map(|t| t.module)
    }
}

/// Outcome of one action execution.
///
/// Created by the runner and consumed by the invoking surface; `reason_code`
/// carries the backend outcome code verbatim and `raw` the opaque backend
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRunResult {
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl ActionRunResult {
    /// A provisional in-progress snapshot.
    pub fn running() -> Self {
        Self {
            status: RunStatus::Running,
            preview_text: None,
            reason_code: None,
            raw: serde_json::Value::Null,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
