// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Redirect URL handler.
//
// The OS hands every opened URL to the app; only URLs on the configured
// redirect scheme that arrive while an interactive sign-in is pending belong
// to us. Anything else returns `false` untouched so the host can offer it to
// other handlers.

use std::sync::Arc;

use tracing::{debug, instrument};
use url::Url;

use authbridge_core::types::RedirectEvent;

use crate::config_store::ConfigStore;
use crate::coordinator::SignInCoordinator;

/// Routes OS URL-open callbacks to the sign-in coordinator.
#[derive(Clone)]
pub struct RedirectHandler {
    config: Arc<ConfigStore>,
    coordinator: SignInCoordinator,
}

impl RedirectHandler {
    pub fn new(config: Arc<ConfigStore>, coordinator: SignInCoordinator) -> Self {
        Self {
            config,
            coordinator,
        }
    }

    /// Returns true if the URL was consumed by the pending sign-in.
    #[instrument(skip_all)]
    pub fn handle(&self, url: &str) -> bool {
        let event = RedirectEvent::new(url);

        let parsed = match Url::parse(&event.url) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "ignoring unparseable URL");
                return false;
            }
        };
        if !self.config.accepts_redirect_scheme(parsed.scheme()) {
            debug!(scheme = parsed.scheme(), "URL is not on a sign-in redirect scheme");
            return false;
        }

        self.coordinator.resume_from_redirect(&event)
    }
}
