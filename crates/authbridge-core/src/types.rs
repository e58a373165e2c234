// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the AuthBridge sign-in bridge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AuthBridgeError;

/// Opaque identifier for a sign-in session.
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

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states of a sign-in session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Waiting on the vendor SDK or a redirect.
    Pending,
    /// The vendor SDK reported an account.
    Completed,
    /// The vendor SDK reported an error.
    Failed,
    /// Cancelled by the caller.
    Cancelled,
}

impl SessionStatus {
    /// Whether no further transition is allowed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Which vendor flow a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignInKind {
    /// User-facing flow; may complete through a redirect URL.
    Interactive,
    /// Restores a cached credential; never involves a redirect.
    Silent,
}

/// A sign-in session as seen from outside the coordinator.
///
/// The reply handle is owned by the coordinator and is not part of this view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInSession {
    pub id: SessionId,
    pub kind: SignInKind,
    pub started_at: DateTime<Utc>,
    pub status: SessionStatus,
}

impl SignInSession {
    pub fn new(kind: SignInKind) -> Self {
        Self {
            id: SessionId::new(),
            kind,
            started_at: Utc::now(),
            status: SessionStatus::Pending,
        }
    }
}

/// Signed-in account returned by the vendor SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl Account {
    /// An account carrying only the provider's user id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
            id_token: None,
        }
    }
}

/// Error reported by the vendor identity SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    /// Vendor error code, kept verbatim.
    pub code: String,
    pub message: String,
}

impl ProviderFailure {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// A URL delivered by the OS, consumed immediately by the redirect handler.
#[derive(Debug, Clone)]
pub struct RedirectEvent {
    pub url: String,
    pub received_at: DateTime<Utc>,
}

impl RedirectEvent {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            received_at: Utc::now(),
        }
    }
}

/// An incoming cross-runtime call: method name plus its argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// A call with no arguments (`null` on the wire).
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }
}

/// Error half of a bridge reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&AuthBridgeError> for ErrorDescriptor {
    fn from(err: &AuthBridgeError) -> Self {
        let details = match err {
            AuthBridgeError::ProviderError { code, .. } => {
                Some(serde_json::json!({ "providerCode": code }))
            }
            _ => None,
        };
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            details,
        }
    }
}

/// Outcome sent back over the method channel for exactly one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BridgeReply {
    Success(Value),
    Error(ErrorDescriptor),
}

impl BridgeReply {
    pub fn error(err: &AuthBridgeError) -> Self {
        Self::Error(ErrorDescriptor::from(err))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The error code, if this is an error reply.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Error(desc) => Some(desc.code.as_str()),
            Self::Success(_) => None,
        }
    }
}
