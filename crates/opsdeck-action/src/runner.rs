//! Action runner: drives one execution to a normalized run result.
//!
//! The runner never surfaces expected failures as errors. Transport
//! problems, policy rejections, quota limits, and validation failures all
//! resolve to a `failed` [`ActionRunResult`]; an `Err` is returned only for
//! programmer errors caught before any I/O (an id outside the canonical set,
//! a context aimed at the wrong module). Backend reason codes pass through
//! verbatim and are translated to user-facing text only at the presentation
//! boundary.
//!
//! Two invocation modes share the same execution path: direct calls
//! ([`ActionRunner::run_action`]) for surfaces that await the result, and
//! the event-driven loop ([`ActionRunner::serve`]) for fire-and-forget
//! dispatches on the action-start channel.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::approval::PendingApprovals;
use crate::bus::ActionStartEvent;
use crate::error::{RunnerError, TransportError};
use crate::reason::ReasonCode;
use crate::transport::{
    BufferedReply, ChunkStream, ExecutionRequest, ExecutionResponse, ExecutionTransport,
    ReplyStatus, StreamChunk,
};
use crate::types::{ActionContext, ActionId, ActionRunResult, RunStatus};
use opsdeck_core::types::{SessionId, TenantId};

/// Caller identity resolved by the auth layer and attached to every
/// execution request.
#[derive(Debug, Clone)]
pub struct RunSession {
    pub tenant_id: TenantId,
    pub session_id: SessionId,
}

/// Executes actions against the configured transport.
pub struct ActionRunner {
    registry: Arc<crate::registry::ActionRegistry>,
    transport: Arc<dyn ExecutionTransport>,
    session: RunSession,
    accept_stream: bool,
    approvals: Option<Arc<PendingApprovals>>,
}

impl ActionRunner {
    pub fn new(
        registry: Arc<crate::registry::ActionRegistry>,
        transport: Arc<dyn ExecutionTransport>,
        session: RunSession,
        accept_stream: bool,
    ) -> Self {
        Self {
            registry,
            transport,
            session,
            accept_stream,
            approvals: None,
        }
    }

    /// Queue `done` results of approval-gated actions here when running in
    /// event-driven mode.
    pub fn with_approvals(mut self, approvals: Arc<PendingApprovals>) -> Self {
        self.approvals = Some(approvals);
        self
    }

    /// Execute one action and resolve its final result.
    pub async fn run_action(
        &self,
        id: &ActionId,
        context: &ActionContext,
    ) -> Result<ActionRunResult, RunnerError> {
        self.execute(id, context, empty_config(), None).await
    }

    /// Like [`run_action`](Self::run_action), forwarding each provisional
    /// `running` snapshot of a streamed execution to `updates`.
    ///
    /// Snapshots are advisory: a full or dropped receiver loses snapshots
    /// without affecting the run, so abandoning the receiver is always safe.
    /// The returned value is the authoritative result.
    pub async fn run_action_observed(
        &self,
        id: &ActionId,
        context: &ActionContext,
        updates: &mpsc::Sender<ActionRunResult>,
    ) -> Result<ActionRunResult, RunnerError> {
        self.execute(id, context, empty_config(), Some(updates)).await
    }

    /// Execution path for events delivered on the action-start channel.
    pub async fn run_event(
        &self,
        event: &ActionStartEvent,
    ) -> Result<ActionRunResult, RunnerError> {
        self.execute(&event.action_id, &event.context, event.config.clone(), None)
            .await
    }

    async fn execute(
        &self,
        id: &ActionId,
        context: &ActionContext,
        config: serde_json::Value,
        updates: Option<&mpsc::Sender<ActionRunResult>>,
    ) -> Result<ActionRunResult, RunnerError> {
        let definition = self
            .registry
            .definition(id)
            .ok_or_else(|| RunnerError::NotExecutable(id.to_string()))?;
        if let Some(target) = &context.target {
            if target.module != definition.module {
                return Err(RunnerError::ModuleMismatch {
                    action: definition.module,
                    context: target.module,
                });
            }
        }

        let request = ExecutionRequest {
            action_id: definition.id.clone(),
            module: definition.module,
            context: context.clone(),
            config,
            tenant_id: self.session.tenant_id.clone(),
            session_id: self.session.session_id,
            accept_stream: self.accept_stream,
        };

        match self.transport.execute(&request).await {
            Err(e) => Ok(transport_failure(&e)),
            Ok(ExecutionResponse::Buffered(reply)) => Ok(buffered_result(reply)),
            Ok(ExecutionResponse::Stream(chunks)) => Ok(drain_stream(chunks, updates).await),
        }
    }

    /// Event-driven mode: run every event published on the action-start
    /// channel until it closes. Each event is executed on its own task, so
    /// concurrent invocations proceed independently.
    pub async fn serve(self: Arc<Self>, mut events: broadcast::Receiver<ActionStartEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let runner = Arc::clone(&self);
                    tokio::spawn(async move { runner.handle_event(event).await });
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "action event subscriber lagged; events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    async fn handle_event(&self, event: ActionStartEvent) {
        match self.run_event(&event).await {
            Ok(result) => {
                info!(
                    action_id = %event.action_id,
                    source = %event.source,
                    status = %result.status,
                    reason_code = result.reason_code.as_deref().unwrap_or(""),
                    "action run finished"
                );
                self.maybe_queue_for_approval(&event.action_id, result);
            }
            Err(e) => {
                warn!(
                    action_id = %event.action_id,
                    source = %event.source,
                    error = %e,
                    "action run rejected"
                );
            }
        }
    }

    fn maybe_queue_for_approval(&self, id: &ActionId, result: ActionRunResult) {
        let Some(approvals) = &self.approvals else {
            return;
        };
        let gated = self
            .registry
            .definition(id)
            .map(|definition| definition.requires_approval)
            .unwrap_or(false);
        if gated && result.status == RunStatus::Done {
            let approval_id = approvals.enqueue(id.clone(), result);
            info!(action_id = %id, approval_id = %approval_id, "result awaiting approval");
        }
    }
}

fn empty_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn transport_failure(error: &TransportError) -> ActionRunResult {
    warn!(error = %error, "action execution transport failed");
    ActionRunResult {
        status: RunStatus::Failed,
        preview_text: None,
        reason_code: Some(ReasonCode::UpstreamTimeout.to_string()),
        raw: serde_json::Value::Null,
    }
}

fn buffered_result(reply: BufferedReply) -> ActionRunResult {
    let raw = serde_json::to_value(&reply).unwrap_or_default();
    let status = match reply.status {
        ReplyStatus::Success => RunStatus::Done,
        ReplyStatus::Error => RunStatus::Failed,
    };
    ActionRunResult {
        status,
        preview_text: reply.text,
        reason_code: reply.reason_code,
        raw,
    }
}

/// Fold a chunk sequence into the final result, forwarding provisional
/// snapshots. Increments are applied strictly in arrival order; the result
/// finalizes only on a terminal chunk.
async fn drain_stream(
    mut chunks: ChunkStream,
    updates: Option<&mpsc::Sender<ActionRunResult>>,
) -> ActionRunResult {
    let mut preview = String::new();
    while let Some(item) = chunks.next().await {
        let chunk = match item {
            Ok(chunk) => chunk,
            Err(e) => return transport_failure(&e),
        };
        let raw = serde_json::to_value(&chunk).unwrap_or_default();
        match chunk {
            StreamChunk::Delta { text } => {
                if let Some(text) = text {
                    preview.push_str(&text);
                }
                notify(
                    updates,
                    ActionRunResult {
                        status: RunStatus::Running,
                        preview_text: non_empty(&preview),
                        reason_code: None,
                        raw,
                    },
                );
            }
            StreamChunk::Done { text, reason_code } => {
                let result = ActionRunResult {
                    status: RunStatus::Done,
                    preview_text: text.or_else(|| non_empty(&preview)),
                    reason_code,
                    raw,
                };
                notify(updates, result.clone());
                return result;
            }
            StreamChunk::Failed {
                reason_code,
                message,
            } => {
                let result = ActionRunResult {
                    status: RunStatus::Failed,
                    preview_text: message,
                    reason_code,
                    raw,
                };
                notify(updates, result.clone());
                return result;
            }
        }
    }
    transport_failure(&TransportError::Decode(
        "stream ended without a terminal chunk".to_string(),
    ))
}

fn notify(updates: Option<&mpsc::Sender<ActionRunResult>>, result: ActionRunResult) {
    if let Some(tx) = updates {
        let _ = tx.try_send(result);
    }
}

fn non_empty(preview: &str) -> Option<String> {
    if preview.is_empty() {
        None
    } else {
        Some(preview.to_string())
    }
}
