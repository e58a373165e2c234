// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop method channel over stdin/stdout.
//
// One JSON object per line in each direction. Inbound frames are either a
// method call or an opened URL:
//
//   {"id": 1, "method": "signIn", "arguments": null}
//   {"id": 2, "openUrl": "com.googleusercontent.apps.123-abc:/oauth2redirect?code=..."}
//
// Calls run concurrently so that `cancel` can reach a pending `signIn`.
// Outbound frames echo the `id`:
//
//   {"id": 1, "reply": {"success": {...}}}
//   {"id": 2, "consumed": true}

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use authbridge_core::types::{BridgeReply, ErrorDescriptor, MethodCall};

use crate::services::auth_services::AuthServices;

/// How long shutdown waits on in-flight calls before cancelling again.
const DRAIN_RETRY: Duration = Duration::from_millis(20);

/// One inbound line.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Frame {
    OpenUrl {
        #[serde(default)]
        id: Option<u64>,
        #[serde(rename = "openUrl")]
        open_url: String,
    },
    Call {
        #[serde(default)]
        id: Option<u64>,
        #[serde(flatten)]
        call: MethodCall,
    },
}

/// Parse a line, or build the error frame to send back for it.
pub fn parse_frame(line: &str) -> Result<Frame, Value> {
    serde_json::from_str(line).map_err(|e| {
        let reply = BridgeReply::Error(ErrorDescriptor {
            code: "InvalidArgument".into(),
            message: format!("malformed frame: {e}"),
            details: None,
        });
        json!({ "id": Value::Null, "reply": reply })
    })
}

/// Run one call on its own task and queue its reply frame.
fn spawn_call(
    calls: &mut JoinSet<()>,
    services: &AuthServices,
    id: Option<u64>,
    call: MethodCall,
    tx: &mpsc::UnboundedSender<Value>,
) {
    let services = services.clone();
    let tx = tx.clone();
    calls.spawn(async move {
        let reply = services.handle_method_call(call).await;
        let _ = tx.send(json!({ "id": id, "reply": reply }));
    });
}

/// Cancel pending sign-ins until every in-flight call has replied. A call
/// spawned before shutdown may register its session after a cancel, so the
/// cancel is repeated while calls remain.
async fn drain_calls(services: &AuthServices, calls: &mut JoinSet<()>) {
    while !calls.is_empty() {
        services.shutdown();
        if let Ok(Some(Err(e))) = tokio::time::timeout(DRAIN_RETRY, calls.join_next()).await {
            warn!(error = %e, "method call task failed");
        }
    }
}

/// Serve the channel until stdin closes. Any pending sign-in is cancelled
/// then, so every call still gets its reply.
pub async fn serve(services: AuthServices) -> std::io::Result<()> {
    info!(channel = services.channel_name(), "method channel ready");

    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    let writer = tokio::spawn(async move {
        let mut out = tokio::io::stdout();
        while let Some(frame) = rx.recv().await {
            let mut line = frame.to_string();
            line.push('\n');
            out.write_all(line.as_bytes()).await?;
            out.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut calls = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        // Reap finished calls.
        while calls.try_join_next().is_some() {}

        if line.trim().is_empty() {
            continue;
        }
        match parse_frame(&line) {
            Ok(Frame::OpenUrl { id, open_url }) => {
                let consumed = services.open_url(&open_url);
                let _ = tx.send(json!({ "id": id, "consumed": consumed }));
            }
            Ok(Frame::Call { id, call }) => {
                debug!(method = %call.method, ?id, "method call received");
                spawn_call(&mut calls, &services, id, call, &tx);
            }
            Err(error_frame) => {
                warn!("dropping malformed frame");
                let _ = tx.send(error_frame);
            }
        }
    }

    info!(in_flight = calls.len(), "method channel closed by host");
    drain_calls(&services, &mut calls).await;
    drop(tx);
    writer.await.map_err(std::io::Error::other)?
}
