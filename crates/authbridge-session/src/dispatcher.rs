// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge dispatcher: decodes method-channel calls into typed requests, runs
// them, and encodes exactly one reply per call.
//
// Argument errors are caught here and never reach the coordinator.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use authbridge_core::error::{AuthBridgeError, Result};
use authbridge_core::types::{BridgeReply, MethodCall};

use crate::config_store::{ConfigStore, check_client_id};
use crate::coordinator::SignInCoordinator;

/// A decoded method-channel call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeRequest {
    Configure { client_id: String },
    SignIn,
    SignInSilently,
    SignOut,
    Cancel,
    IsSignedIn,
}

impl BridgeRequest {
    /// Decode a call, validating its arguments.
    pub fn decode(call: &MethodCall) -> Result<Self> {
        let request = match call.method.as_str() {
            // `configureWithClientID` is the older name for the same call.
            "configure" | "configureWithClientID" => Self::Configure {
                client_id: client_id_argument(&call.arguments)?,
            },
            "signIn" => Self::SignIn,
            "signInSilently" => Self::SignInSilently,
            "signOut" => Self::SignOut,
            "cancel" => Self::Cancel,
            "isSignedIn" => Self::IsSignedIn,
            other => return Err(AuthBridgeError::MethodNotImplemented(other.to_string())),
        };
        if !matches!(request, Self::Configure { .. }) {
            expect_no_arguments(call)?;
        }
        Ok(request)
    }

    /// Canonical channel name of the method.
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::Configure { .. } => "configure",
            Self::SignIn => "signIn",
            Self::SignInSilently => "signInSilently",
            Self::SignOut => "signOut",
            Self::Cancel => "cancel",
            Self::IsSignedIn => "isSignedIn",
        }
    }
}

/// Accepts a bare string or `{"clientId": ...}` (`clientID` also accepted).
fn client_id_argument(arguments: &Value) -> Result<String> {
    let raw = match arguments {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get("clientId")
            .or_else(|| map.get("clientID"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AuthBridgeError::InvalidArgument("configure requires a string `clientId`".into())
            })?,
        _ => {
            return Err(AuthBridgeError::InvalidArgument(
                "configure requires a client identifier".into(),
            ));
        }
    };
    check_client_id(raw)
        .map(str::to_string)
        .map_err(|reason| AuthBridgeError::InvalidArgument(reason.into()))
}

fn expect_no_arguments(call: &MethodCall) -> Result<()> {
    match &call.arguments {
        Value::Null => Ok(()),
        Value::Object(map) if map.is_empty() => Ok(()),
        _ => Err(AuthBridgeError::InvalidArgument(format!(
            "{} takes no arguments",
            call.method
        ))),
    }
}

/// Entry point for the cross-runtime method channel.
#[derive(Clone)]
pub struct BridgeDispatcher {
    config: Arc<ConfigStore>,
    coordinator: SignInCoordinator,
}

impl BridgeDispatcher {
    pub fn new(config: Arc<ConfigStore>, coordinator: SignInCoordinator) -> Self {
        Self {
            config,
            coordinator,
        }
    }

    /// Run one call to completion and encode its reply. Never fails: every
    /// error becomes an error descriptor.
    #[instrument(skip_all, fields(method = %call.method))]
    pub async fn dispatch(&self, call: &MethodCall) -> BridgeReply {
        match self.execute(call).await {
            Ok(payload) => BridgeReply::Success(payload),
            Err(err) => {
                match &err {
                    AuthBridgeError::Io(_) | AuthBridgeError::Serialization(_) => {
                        warn!(error = %err, "bridge call failed")
                    }
                    _ => debug!(code = err.code(), error = %err, "bridge call returned an error"),
                }
                BridgeReply::error(&err)
            }
        }
    }

    /// Dispatch `call` and hand the reply to `result`, which is invoked
    /// exactly once.
    pub async fn handle_method_call<F>(&self, call: MethodCall, result: F)
    where
        F: FnOnce(BridgeReply),
    {
        let reply = self.dispatch(&call).await;
        result(reply);
    }

    async fn execute(&self, call: &MethodCall) -> Result<Value> {
        let request = BridgeRequest::decode(call)?;
        debug!(method = request.method_name(), "dispatching bridge request");

        match request {
            BridgeRequest::Configure { client_id } => {
                self.config.configure(&client_id)?;
                Ok(Value::Null)
            }
            BridgeRequest::SignIn => Ok(serde_json::to_value(self.coordinator.sign_in().await?)?),
            BridgeRequest::SignInSilently => Ok(serde_json::to_value(
                self.coordinator.sign_in_silently().await?,
            )?),
            BridgeRequest::SignOut => {
                self.coordinator.sign_out().await?;
                Ok(Value::Null)
            }
            BridgeRequest::Cancel => Ok(Value::Bool(self.coordinator.cancel())),
            BridgeRequest::IsSignedIn => Ok(Value::Bool(self.coordinator.is_signed_in())),
        }
    }
}
