//! Action invocation core for the opsdeck dashboard.
//!
//! Governs which named actions can run, routes every invocation through a
//! single fail-closed dispatch gate, executes runs over buffered or
//! streaming transports, and translates backend outcome codes into
//! user-safe messages.

pub mod approval;
pub mod bus;
pub mod dispatch;
pub mod error;
pub mod reason;
pub mod registry;
pub mod runner;
pub mod selectors;
pub mod transport;
pub mod types;

pub use approval::{PendingApproval, PendingApprovals};
pub use bus::{action_channel, ActionEvents, ActionPublisher, ActionStartEvent, ACTION_START_CHANNEL};
pub use dispatch::{DispatchGate, DEFAULT_DISPATCH_SOURCE};
pub use error::{RegistryError, RunnerError, TransportError};
pub use reason::{reason_message, ReasonCode, ReasonMessage, Severity};
pub use registry::{ActionRegistry, PRIMARY_ACTION_LIMIT};
pub use runner::{ActionRunner, RunSession};
pub use selectors::{
    context_is_usable, context_menu, module_menu, primary_menu, ActionMenuItem,
};
pub use transport::{
    decode_ndjson, BufferedReply, ChunkStream, ExecutionRequest, ExecutionResponse,
    ExecutionTransport, HttpTransport, ReplyStatus, StreamChunk, NDJSON_CONTENT_TYPE,
};
pub use types::{
    ActionContext, ActionDefinition, ActionId, ActionRunResult, ActionTarget, RunStatus,
};
