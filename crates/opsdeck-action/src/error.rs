//! Error types for the action invocation subsystem.

use crate::types::ActionId;
use opsdeck_core::error::OpsdeckError;
use opsdeck_core::types::Module;

/// Errors from registry table validation.
///
/// Raised only at startup while the static tables are built; a registry that
/// constructs successfully upholds the alias invariants for its lifetime.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate canonical action id: {0}")]
    DuplicateDefinition(ActionId),
    #[error("Alias {0} shadows a canonical action id")]
    AliasShadowsCanonical(String),
    #[error("Alias {alias} is bound to both {existing} and {duplicate}")]
    AliasRebound {
        alias: String,
        existing: ActionId,
        duplicate: ActionId,
    },
    #[error("Alias {alias} targets unknown action id: {target}")]
    AliasTargetUnknown { alias: String, target: ActionId },
}

/// Errors from the execution transport.
///
/// All variants are expected failure classes; the runner converts every one
/// of them into a failed run result rather than surfacing them to callers.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Upstream returned status {code} without a structured body")]
    Status { code: u16 },
    #[error("Malformed execution payload: {0}")]
    Decode(String),
}

/// Programmer errors rejected by the runner before any I/O starts.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Action id is not executable: {0}")]
    NotExecutable(String),
    #[error("Context targets module {context} but the action belongs to {action}")]
    ModuleMismatch { action: Module, context: Module },
}

impl From<RegistryError> for OpsdeckError {
    fn from(err: RegistryError) -> Self {
        OpsdeckError::Action(err.to_string())
    }
}

impl From<RunnerError> for OpsdeckError {
    fn from(err: RunnerError) -> Self {
        OpsdeckError::Action(err.to_string())
    }
}
