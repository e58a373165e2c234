// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for AuthBridge.

use thiserror::Error;

use crate::types::ProviderFailure;

/// Top-level error type for all AuthBridge operations.
///
/// Every variant maps to a stable reply code (see [`AuthBridgeError::code`])
/// so the method channel can hand a structured error back to the caller.
#[derive(Debug, Error)]
pub enum AuthBridgeError {
    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("sign-in is not configured; call configure first")]
    NotConfigured,

    // -- Session --
    #[error("a sign-in attempt is already in progress")]
    SignInAlreadyInProgress,

    #[error("identity provider error {code}: {message}")]
    ProviderError { code: String, message: String },

    #[error("sign-in was cancelled")]
    Cancelled,

    // -- Method channel --
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("method not implemented: {0}")]
    MethodNotImplemented(String),

    // -- Host configuration file --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuthBridgeError {
    /// Stable code carried in the error descriptor of a bridge reply.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "InvalidConfiguration",
            Self::NotConfigured => "NotConfigured",
            Self::SignInAlreadyInProgress => "SignInAlreadyInProgress",
            Self::ProviderError { .. } => "ProviderError",
            Self::Cancelled => "Cancelled",
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::MethodNotImplemented(_) => "MethodNotImplemented",
            Self::Io(_) | Self::Serialization(_) => "InternalError",
        }
    }
}

impl From<ProviderFailure> for AuthBridgeError {
    fn from(failure: ProviderFailure) -> Self {
        Self::ProviderError {
            code: failure.code,
            message: failure.message,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AuthBridgeError>;
