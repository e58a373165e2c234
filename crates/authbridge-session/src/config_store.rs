// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuration store: the identity-provider client id and whether the
// vendor SDK has been primed with it.
//
// Every sign-in attempt reads this store; nothing may start while it is
// unconfigured. A failed `configure` never disturbs an earlier success.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use authbridge_core::config::redirect_scheme_for;
use authbridge_core::error::{AuthBridgeError, Result};
use authbridge_provider::IdentityProvider;
use authbridge_provider::traits::ProviderSetup;

/// A successfully applied configuration.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub client_id: String,
    /// Scheme derived from the client id (lowercase).
    pub redirect_scheme: String,
    pub configured_at: DateTime<Utc>,
}

/// Process-wide configuration for the identity provider.
pub struct ConfigStore {
    provider: Arc<dyn IdentityProvider>,
    /// Additional accepted redirect schemes registered by the host (lowercase).
    extra_schemes: Vec<String>,
    current: RwLock<Option<Configuration>>,
}

impl ConfigStore {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self::with_extra_schemes(provider, Vec::<String>::new())
    }

    /// Create a store that also accepts the host's registered URL schemes as
    /// redirect schemes.
    pub fn with_extra_schemes<I, S>(provider: Arc<dyn IdentityProvider>, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            provider,
            extra_schemes: schemes
                .into_iter()
                .map(|s| s.as_ref().trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            current: RwLock::new(None),
        }
    }

    /// Validate `client_id`, prime the vendor SDK with it, and store it.
    ///
    /// Calling again with a different id overwrites the previous one.
    #[instrument(skip(self))]
    pub fn configure(&self, client_id: &str) -> Result<()> {
        let client_id = validate_client_id(client_id)?;

        // The write lock is held across priming so concurrent reconfigurations
        // apply in a single order.
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        self.provider.configure(client_id).map_err(|failure| {
            warn!(code = %failure.code, "identity provider rejected the client id");
            AuthBridgeError::from(failure)
        })?;

        match current.as_ref() {
            Some(previous) if previous.client_id != client_id => {
                info!(
                    previous = %previous.client_id,
                    previous_configured_at = %previous.configured_at,
                    "reconfiguring identity provider"
                );
            }
            Some(_) => debug!("identity provider configured again with the same client id"),
            None => info!(provider = self.provider.provider_name(), "identity provider configured"),
        }

        *current = Some(Configuration {
            client_id: client_id.to_string(),
            redirect_scheme: redirect_scheme_for(client_id),
            configured_at: Utc::now(),
        });
        Ok(())
    }

    /// Backward-compatible name for [`ConfigStore::configure`].
    pub fn configure_with_client_id(&self, client_id: &str) -> Result<()> {
        self.configure(client_id)
    }

    pub fn is_configured(&self) -> bool {
        self.read().is_some()
    }

    pub fn client_id(&self) -> Option<String> {
        self.read().map(|c| c.client_id)
    }

    /// Whether `scheme` is a redirect scheme for the active configuration.
    /// Always false while unconfigured.
    pub fn accepts_redirect_scheme(&self, scheme: &str) -> bool {
        let Some(config) = self.read() else {
            return false;
        };
        scheme.eq_ignore_ascii_case(&config.redirect_scheme)
            || self
                .extra_schemes
                .iter()
                .any(|extra| scheme.eq_ignore_ascii_case(extra))
    }

    fn read(&self) -> Option<Configuration> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Trim a client identifier and check that it is well formed. The error is
/// the reason it was rejected.
pub fn check_client_id(raw: &str) -> std::result::Result<&str, &'static str> {
    let client_id = raw.trim();
    if client_id.is_empty() {
        return Err("client identifier is empty");
    }
    if client_id
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err("client identifier contains whitespace or control characters");
    }
    Ok(client_id)
}

fn validate_client_id(raw: &str) -> Result<&str> {
    check_client_id(raw).map_err(|reason| AuthBridgeError::InvalidConfiguration(reason.into()))
}
