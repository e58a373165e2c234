// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service root: builds the configuration store, coordinator,
// redirect handler, and dispatcher once at launch and hands out the two
// entry points the host wires to the OS and the method channel.
//
// No global instance exists: the binary owns one `AuthServices`
// and passes clones where they are needed.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use authbridge_core::HostConfig;
use authbridge_core::types::{BridgeReply, MethodCall};
use authbridge_provider::IdentityProvider;
use authbridge_session::{BridgeDispatcher, ConfigStore, RedirectHandler, SignInCoordinator};

use super::verification::verify_host_config;

/// Host-level method answered here rather than by the bridge dispatcher.
pub const VERIFY_METHOD: &str = "verifyConfiguration";

/// Shared sign-in services. Cheap to clone.
#[derive(Clone)]
pub struct AuthServices {
    host: Arc<HostConfig>,
    config: Arc<ConfigStore>,
    coordinator: SignInCoordinator,
    redirect: RedirectHandler,
    dispatcher: BridgeDispatcher,
}

impl AuthServices {
    /// Build every service and apply the launch-time client id, if any.
    ///
    /// A bad client id is logged and left for a later `configure` call; it
    /// never prevents launch.
    pub fn launch(host: HostConfig, provider: Arc<dyn IdentityProvider>) -> Self {
        info!(
            channel = %host.channel_name,
            provider = provider.provider_name(),
            "initialising auth services"
        );

        let config = Arc::new(ConfigStore::with_extra_schemes(
            Arc::clone(&provider),
            &host.url_schemes,
        ));
        if let Some(client_id) = host.client_id.as_deref() {
            if let Err(e) = config.configure(client_id) {
                warn!(error = %e, "launch-time configuration failed, waiting for configure over the channel");
            }
        }

        let coordinator = SignInCoordinator::new(Arc::clone(&config), provider);
        let redirect = RedirectHandler::new(Arc::clone(&config), coordinator.clone());
        let dispatcher = BridgeDispatcher::new(Arc::clone(&config), coordinator.clone());

        info!(configured = config.is_configured(), "auth services initialised");
        Self {
            host: Arc::new(host),
            config,
            coordinator,
            redirect,
            dispatcher,
        }
    }

    pub fn channel_name(&self) -> &str {
        &self.host.channel_name
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    // -- Host entry points ---------------------------------------------------

    /// OS URL-open callback. Returns whether sign-in consumed the URL.
    pub fn open_url(&self, url: &str) -> bool {
        // Query strings carry authorization codes; keep them out of the log.
        let shown = url.split('?').next().unwrap_or(url);
        info!(url = %shown, "received URL callback");

        let consumed = self.redirect.handle(url);
        if !consumed {
            debug!("URL left for other handlers");
        }
        consumed
    }

    /// Method-channel entry point. Always produces exactly one reply.
    pub async fn handle_method_call(&self, call: MethodCall) -> BridgeReply {
        if call.method == VERIFY_METHOD {
            return match verify_host_config(&self.host) {
                Ok(status) => BridgeReply::Success(json!({ "status": status })),
                Err(e) => BridgeReply::error(&e),
            };
        }
        self.dispatcher.dispatch(&call).await
    }

    /// Release a pending sign-in when the channel goes away.
    pub fn shutdown(&self) -> bool {
        let cancelled = self.coordinator.cancel();
        if cancelled {
            info!("pending sign-in cancelled at shutdown");
        }
        cancelled
    }
}
