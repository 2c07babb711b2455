//! End-to-end tests for the dispatch → bus → runner flow.
//!
//! Covers the fail-closed gate, alias normalization on the wire, both
//! transport modes, and the approval hand-off, using a scripted in-memory
//! transport so each test is independent and deterministic.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use opsdeck_action::{
    action_channel, reason_message, ActionContext, ActionId, ActionRegistry, ActionRunner,
    ActionRunResult, BufferedReply, DispatchGate, ExecutionRequest, ExecutionResponse,
    ExecutionTransport, ReplyStatus, RunSession, RunStatus, Severity, StreamChunk, TransportError,
};
use opsdeck_core::types::{Module, SessionId, TenantId};

// =============================================================================
// Helpers
// =============================================================================

/// Transport that replays one scripted response per request.
struct ScriptedTransport {
    script: Mutex<Vec<Script>>,
    requests: Mutex<Vec<ExecutionRequest>>,
}

enum Script {
    Buffered(BufferedReply),
    Chunks(Vec<StreamChunk>),
    Fail(TransportError),
}

impl ScriptedTransport {
    fn new(script: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request(&self) -> Option<ExecutionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ExecutionTransport for ScriptedTransport {
    async fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().remove(0) {
            Script::Buffered(reply) => Ok(ExecutionResponse::Buffered(reply)),
            Script::Chunks(chunks) => Ok(ExecutionResponse::Stream(Box::pin(
                futures::stream::iter(chunks.into_iter().map(Ok)),
            ))),
            Script::Fail(err) => Err(err),
        }
    }
}

fn session() -> RunSession {
    RunSession {
        tenant_id: TenantId("acme".to_string()),
        session_id: SessionId::new(),
    }
}

fn runner(transport: &Arc<ScriptedTransport>) -> ActionRunner {
    ActionRunner::new(
        Arc::new(ActionRegistry::builtin()),
        Arc::clone(transport) as Arc<dyn ExecutionTransport>,
        session(),
        true,
    )
}

fn done_reply(text: &str) -> BufferedReply {
    BufferedReply {
        status: ReplyStatus::Success,
        text: Some(text.to_string()),
        reason_code: None,
        details: None,
    }
}

// =============================================================================
// Dispatch → run flow
// =============================================================================

#[tokio::test]
async fn test_dispatched_alias_executes_canonical_action() {
    let registry = Arc::new(ActionRegistry::builtin());
    let (publisher, events) = action_channel(16);
    let mut rx = events.subscribe();
    let gate = DispatchGate::new(Arc::clone(&registry), publisher);

    gate.dispatch_action_start(
        "inbox.draftReply",
        Some(ActionContext::for_target(Module::Inbox, "msg-1")),
        Some(serde_json::json!({"tone": "formal"})),
        Some("legacy_toolbar"),
    );

    let event = rx.try_recv().unwrap();
    assert_eq!(event.action_id.as_str(), "inbox.draft_reply");
    assert_eq!(event.source, "legacy_toolbar");

    let transport = ScriptedTransport::new(vec![Script::Buffered(done_reply("Draft ready"))]);
    let runner = runner(&transport);
    let result = runner.run_event(&event).await.unwrap();

    assert_eq!(result.status, RunStatus::Done);
    assert_eq!(result.preview_text.as_deref(), Some("Draft ready"));

    let request = transport.last_request().unwrap();
    assert_eq!(request.action_id.as_str(), "inbox.draft_reply");
    assert_eq!(request.module, Module::Inbox);
    assert_eq!(request.config["tone"], "formal");
    assert_eq!(request.tenant_id.as_str(), "acme");
}

#[tokio::test]
async fn test_rejected_dispatch_never_reaches_transport() {
    let registry = Arc::new(ActionRegistry::builtin());
    let (publisher, events) = action_channel(16);
    let mut rx = events.subscribe();
    let gate = DispatchGate::new(registry, publisher);

    gate.dispatch_action_start("inbox.retired_action", None, None, Some("old_ui"));
    gate.dispatch_action_start("totally.bogus", None, None, None);

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_concurrent_invocations_run_independently() {
    let transport = ScriptedTransport::new(vec![
        Script::Buffered(done_reply("first")),
        Script::Buffered(BufferedReply {
            status: ReplyStatus::Error,
            text: None,
            reason_code: Some("quota_exceeded".to_string()),
            details: None,
        }),
    ]);
    let runner = runner(&transport);

    let id = ActionId::new("inbox.summarize");
    let context = ActionContext::default();
    let first = runner.run_action(&id, &context).await.unwrap();
    let second = runner.run_action(&id, &context).await.unwrap();

    assert_eq!(first.status, RunStatus::Done);
    assert_eq!(second.status, RunStatus::Failed);
    assert_eq!(second.reason_code.as_deref(), Some("quota_exceeded"));
    assert_eq!(transport.request_count(), 2);
}

// =============================================================================
// Streaming flow
// =============================================================================

#[tokio::test]
async fn test_streamed_run_reports_monotonic_progress() {
    let transport = ScriptedTransport::new(vec![Script::Chunks(vec![
        StreamChunk::Delta {
            text: Some("Sum".to_string()),
        },
        StreamChunk::Delta {
            text: Some("mary".to_string()),
        },
        StreamChunk::Done {
            text: None,
            reason_code: Some("ok_automate".to_string()),
        },
    ])]);
    let runner = runner(&transport);

    let (tx, mut rx) = mpsc::channel::<ActionRunResult>(16);
    let result = runner
        .run_action_observed(
            &ActionId::new("inbox.summarize"),
            &ActionContext::for_target(Module::Inbox, "msg-1"),
            &tx,
        )
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::Done);
    assert_eq!(result.preview_text.as_deref(), Some("Summary"));
    assert_eq!(result.reason_code.as_deref(), Some("ok_automate"));

    let mut statuses = Vec::new();
    while let Ok(snapshot) = rx.try_recv() {
        statuses.push(snapshot.status);
    }
    assert_eq!(
        statuses,
        vec![RunStatus::Running, RunStatus::Running, RunStatus::Done]
    );
}

#[tokio::test]
async fn test_transport_failure_surfaces_as_reason_code_not_error() {
    let transport = ScriptedTransport::new(vec![Script::Fail(TransportError::Connect(
        "connection refused".to_string(),
    ))]);
    let runner = runner(&transport);

    let result = runner
        .run_action(&ActionId::new("documents.summarize"), &ActionContext::default())
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.reason_code.as_deref(), Some("upstream_timeout"));

    // The presentation layer renders the code through the translator.
    let message = reason_message(result.reason_code.as_deref()).unwrap();
    assert_eq!(message.severity, Severity::Error);
    assert_eq!(message.title, "Service unavailable");
}

#[tokio::test]
async fn test_unknown_backend_code_renders_generic_message() {
    let transport = ScriptedTransport::new(vec![Script::Buffered(BufferedReply {
        status: ReplyStatus::Error,
        text: None,
        reason_code: Some("flux_capacitor_drained".to_string()),
        details: None,
    })]);
    let runner = runner(&transport);

    let result = runner
        .run_action(&ActionId::new("inbox.summarize"), &ActionContext::default())
        .await
        .unwrap();

    // Verbatim on the result, generic at the presentation boundary.
    assert_eq!(result.reason_code.as_deref(), Some("flux_capacitor_drained"));
    let message = reason_message(result.reason_code.as_deref()).unwrap();
    assert_eq!(message.title, "Unknown status");
    assert_eq!(message.severity, Severity::Error);
}
