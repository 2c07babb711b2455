//! Outbound execution wire for action runs.
//!
//! The backend exposes one execution resource per module. A response is
//! either a single buffered JSON reply or an incrementally-delivered NDJSON
//! chunk sequence; which one is decided once from the response content type
//! and modeled as the [`ExecutionResponse`] tagged union so callers match
//! exhaustively. [`HttpTransport`] is the production implementation;
//! [`ExecutionTransport`] is the seam tests and alternative backends plug
//! into.

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::types::{ActionContext, ActionId};
use opsdeck_core::config::ExecutionConfig;
use opsdeck_core::types::{Module, SessionId, TenantId};

/// Content type that selects the streaming response mode.
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

// =============================================================================
// Wire types
// =============================================================================

/// Body of an execution request.
///
/// Tenant and session identifiers are resolved by the auth layer and
/// attached verbatim; `accept_stream` tells the backend whether the caller
/// can consume an incrementally-streamed response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub action_id: ActionId,
    pub module: Module,
    pub context: ActionContext,
    pub config: serde_json::Value,
    pub tenant_id: TenantId,
    pub session_id: SessionId,
    pub accept_stream: bool,
}

/// Terminal status of a buffered reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    Success,
    Error,
}

/// Single-shot JSON reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferedReply {
    pub status: ReplyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// One NDJSON increment of a streamed execution.
///
/// `delta` chunks are provisional; a `done` or `failed` chunk terminates the
/// sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StreamChunk {
    Delta {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Done {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason_code: Option<String>,
    },
    Failed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason_code: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl StreamChunk {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamChunk::Delta { .. })
    }
}

/// Chunk sequence of a streaming execution, in transport order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, TransportError>> + Send>>;

/// A backend response, decided once from the response content type.
pub enum ExecutionResponse {
    Buffered(BufferedReply),
    Stream(ChunkStream),
}

impl fmt::Debug for ExecutionResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionResponse::Buffered(reply) => f.debug_tuple("Buffered").field(reply).finish(),
            ExecutionResponse::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

// =============================================================================
// Transport trait
// =============================================================================

/// Seam between the runner and the execution backend.
#[async_trait]
pub trait ExecutionTransport: Send + Sync {
    async fn execute(&self, request: &ExecutionRequest)
        -> Result<ExecutionResponse, TransportError>;
}

impl TransportError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

// =============================================================================
// HTTP transport
// =============================================================================

/// Production transport over the module-scoped execution endpoints.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ExecutionConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn execute_url(&self, module: Module) -> String {
        format!("{}/api/modules/{}/actions/execute", self.base_url, module)
    }
}

#[async_trait]
impl ExecutionTransport for HttpTransport {
    async fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionResponse, TransportError> {
        let accept = if request.accept_stream {
            format!("{}, application/json", NDJSON_CONTENT_TYPE)
        } else {
            "application/json".to_string()
        };

        let response = self
            .client
            .post(self.execute_url(request.module))
            .header(reqwest::header::ACCEPT, accept)
            .header("x-tenant-id", request.tenant_id.as_str())
            .header("x-session-id", request.session_id.to_string())
            .json(request)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !status.is_success() {
            // A structured body on a non-2xx is a backend rejection and
            // passes through; anything else is a transport failure.
            let body = response
                .bytes()
                .await
                .map_err(TransportError::from_reqwest)?;
            return match serde_json::from_slice::<BufferedReply>(&body) {
                Ok(reply) => Ok(ExecutionResponse::Buffered(reply)),
                Err(_) => Err(TransportError::Status {
                    code: status.as_u16(),
                }),
            };
        }

        if content_type.starts_with(NDJSON_CONTENT_TYPE) {
            let bytes = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(TransportError::from_reqwest));
            Ok(ExecutionResponse::Stream(decode_ndjson(bytes)))
        } else {
            let reply = response
                .json::<BufferedReply>()
                .await
                .map_err(|e| TransportError::Decode(e.to_string()))?;
            Ok(ExecutionResponse::Buffered(reply))
        }
    }
}

// =============================================================================
// NDJSON decoding
// =============================================================================

/// Decode a byte stream into chunks, buffering lines split across reads.
///
/// Decoding stops at the first malformed line or byte-level error; chunks
/// are yielded strictly in arrival order.
pub fn decode_ndjson<S>(source: S) -> ChunkStream
where
    S: Stream<Item = Result<Bytes, TransportError>> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        futures::pin_mut!(source);
        let mut buf = BytesMut::new();
        while let Some(next) = source.next().await {
            let chunk = match next {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            buf.extend_from_slice(&chunk);
            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let line = buf.split_to(pos + 1);
                match parse_chunk_line(&line[..line.len() - 1]) {
                    Ok(Some(chunk)) => yield Ok(chunk),
                    Ok(None) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        }
        match parse_chunk_line(&buf) {
            Ok(Some(chunk)) => yield Ok(chunk),
            Ok(None) => {}
            Err(e) => yield Err(e),
        }
    })
}

fn parse_chunk_line(line: &[u8]) -> Result<Option<StreamChunk>, TransportError> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(line)
        .map(Some)
        .map_err(|e| TransportError::Decode(e.to_string()))
}
