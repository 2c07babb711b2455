use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Dashboard modules that own screens and actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Inbox,
    Customers,
    Documents,
    Marketing,
    Settings,
}

impl Module {
    /// Returns the wire/name form used in endpoint paths and context keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Inbox => "inbox",
            Module::Customers => "customers",
            Module::Documents => "documents",
            Module::Marketing => "marketing",
            Module::Settings => "settings",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Module {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(Module::Inbox),
            "customers" => Ok(Module::Customers),
            "documents" => Ok(Module::Documents),
            "marketing" => Ok(Module::Marketing),
            "settings" => Ok(Module::Settings),
            _ => Err(format!("Unknown module: {}", s)),
        }
    }
}

// =============================================================================
// Identity newtypes
// =============================================================================

/// Tenant (workspace) identifier resolved by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-login session identifier forwarded to the execution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Timestamp
// =============================================================================

/// Unix timestamp in seconds.
///
/// Compared by value. Two Timestamps with the same inner value are equal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }

    pub fn age_seconds(&self) -> i64 {
        Timestamp::now().0 - self.0
    }
}

// =============================================================================
// Tests
// =============================================================================
