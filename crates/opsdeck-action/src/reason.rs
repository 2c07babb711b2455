//! Translation of backend outcome codes into user-safe messages.
//!
//! The backend reports why an action did or did not complete as requested
//! through a closed set of reason codes. This module maps each code to a
//! title, message, and severity for the presentation layer. The lookup is
//! total: it never panics and never echoes internal detail.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome codes reported by the execution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    OkAutomate,
    MissingContext,
    ConfidenceLow,
    IntegrationDisconnected,
    PolicyBlocked,
    QuotaExceeded,
    ValidationFailed,
    UpstreamTimeout,
    MultipleToolsSelected,
    NoToolSelected,
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasonCode::OkAutomate => write!(f, "ok_automate"),
            ReasonCode::MissingContext => write!(f, "missing_context"),
            ReasonCode::ConfidenceLow => write!(f, "confidence_low"),
            ReasonCode::IntegrationDisconnected => write!(f, "integration_disconnected"),
            ReasonCode::PolicyBlocked => write!(f, "policy_blocked"),
            ReasonCode::QuotaExceeded => write!(f, "quota_exceeded"),
            ReasonCode::ValidationFailed => write!(f, "validation_failed"),
            ReasonCode::UpstreamTimeout => write!(f, "upstream_timeout"),
            ReasonCode::MultipleToolsSelected => write!(f, "multiple_tools_selected"),
            ReasonCode::NoToolSelected => write!(f, "no_tool_selected"),
        }
    }
}

impl std::str::FromStr for ReasonCode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok_automate" => Ok(ReasonCode::OkAutomate),
            "missing_context" => Ok(ReasonCode::MissingContext),
            "confidence_low" => Ok(ReasonCode::ConfidenceLow),
            "integration_disconnected" => Ok(ReasonCode::IntegrationDisconnected),
            "policy_blocked" => Ok(ReasonCode::PolicyBlocked),
            "quota_exceeded" => Ok(ReasonCode::QuotaExceeded),
            "validation_failed" => Ok(ReasonCode::ValidationFailed),
            "upstream_timeout" => Ok(ReasonCode::UpstreamTimeout),
            "multiple_tools_selected" => Ok(ReasonCode::MultipleToolsSelected),
            "no_tool_selected" => Ok(ReasonCode::NoToolSelected),
            _ => Err(format!("Unknown reason code: {}", s)),
        }
    }
}

/// How prominently the UI should surface a reason message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// User-facing rendering of a reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReasonMessage {
    pub title: &'static str,
    pub message: &'static str,
    pub severity: Severity,
}

impl ReasonCode {
    /// The user-facing message for this code.
    pub fn message(&self) -> ReasonMessage {
        match self {
            ReasonCode::OkAutomate => ReasonMessage {
                title: "Automated",
                message: "The action completed automatically.",
                severity: Severity::Info,
            },
            ReasonCode::MissingContext => ReasonMessage {
                title: "Missing context",
                message: "The action needs more context before it can run. Open the item and try again.",
                severity: Severity::Warning,
            },
            ReasonCode::ConfidenceLow => ReasonMessage {
                title: "Low confidence",
                message: "The result did not meet the confidence threshold. Review it before applying.",
                severity: Severity::Warning,
            },
            ReasonCode::IntegrationDisconnected => ReasonMessage {
                title: "Integration disconnected",
                message: "A required integration is disconnected. Reconnect it in Settings.",
                severity: Severity::Error,
            },
            ReasonCode::PolicyBlocked => ReasonMessage {
                title: "Blocked by policy",
                message: "Your workspace policy does not allow this action.",
                severity: Severity::Error,
            },
            ReasonCode::QuotaExceeded => ReasonMessage {
                title: "Quota exceeded",
                message: "Your workspace has used its quota for this action. Try again later.",
                severity: Severity::Warning,
            },
            ReasonCode::ValidationFailed => ReasonMessage {
                title: "Validation failed",
                message: "The request was rejected before execution. Check the item and try again.",
                severity: Severity::Error,
            },
            ReasonCode::UpstreamTimeout => ReasonMessage {
                title: "Service unavailable",
                message: "The action service did not respond. Try again in a moment.",
                severity: Severity::Error,
            },
            ReasonCode::MultipleToolsSelected => ReasonMessage {
                title: "Multiple tools selected",
                message: "More than one tool matched this request. Narrow the selection and retry.",
                severity: Severity::Warning,
            },
            ReasonCode::NoToolSelected => ReasonMessage {
                title: "No tool selected",
                message: "No tool was selected for this request. Pick a tool and retry.",
                severity: Severity::Warning,
            },
        }
    }
}

/// Shown when the backend reports a code outside the known set.
const UNKNOWN_REASON: ReasonMessage = ReasonMessage {
    title: "Unknown status",
    message: "Something went wrong while running the action.",
    severity: Severity::Error,
};

/// Look up the user-facing message for an optional raw reason code.
///
/// Absent code means a trivial outcome and maps to `None`. A code outside
/// the known set degrades to a generic error message rather than failing.
pub fn reason_message(code: Option<&str>) -> Option<ReasonMessage> {
    let code = code?;
    Some(match code.parse::<ReasonCode>() {
        Ok(known) => known.message(),
        Err(_) => UNKNOWN_REASON,
    })
}
