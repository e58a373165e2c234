// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host configuration check.
//
// A sign-in can only complete if the app is registered for the redirect
// scheme the provider will call back on. This catches the two common setup
// mistakes before a user ever taps "Sign in".

use tracing::{error, info};

use authbridge_core::HostConfig;
use authbridge_core::config::redirect_scheme_for;
use authbridge_core::error::{AuthBridgeError, Result};

/// Status reported when the host config is usable.
pub const CONFIGURED_STATUS: &str = "sign-in properly configured";

/// Check that a client id is present and its redirect scheme is registered.
pub fn verify_host_config(host: &HostConfig) -> Result<&'static str> {
    let Some(client_id) = host
        .client_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
    else {
        error!("missing client id in host config");
        return Err(AuthBridgeError::InvalidConfiguration(
            "missing client_id in host config".into(),
        ));
    };

    let expected = redirect_scheme_for(client_id);
    match host
        .url_schemes
        .iter()
        .find(|scheme| scheme.trim().eq_ignore_ascii_case(&expected))
    {
        Some(scheme) => {
            info!(%scheme, "found provider URL scheme");
            Ok(CONFIGURED_STATUS)
        }
        None => {
            error!(%expected, "provider URL scheme is not registered");
            Err(AuthBridgeError::InvalidConfiguration(format!(
                "no URL scheme registered for redirect scheme {expected}"
            )))
        }
    }
}
