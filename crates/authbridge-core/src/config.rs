// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host configuration.
//
// Mirrors the bundle keys a native host reads at launch: the provider client
// id (GIDClientID) and the registered URL schemes (CFBundleURLSchemes).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

/// Method channel name used when the host does not override it.
pub const DEFAULT_CHANNEL_NAME: &str = "com.cardwizz.app/auth";

/// Settings supplied by the embedding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Identity-provider client identifier. When present the bridge is
    /// configured at launch.
    pub client_id: Option<String>,
    /// URL schemes the app is registered for. Any of them is accepted as a
    /// redirect scheme in addition to the one derived from the client id.
    pub url_schemes: Vec<String>,
    /// Name of the cross-runtime method channel.
    pub channel_name: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            url_schemes: Vec::new(),
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
        }
    }
}

impl HostConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no host config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        info!(path = %path.display(), "host config loaded");
        Ok(config)
    }
}

/// Redirect scheme an OAuth provider uses for a client id: the dotted
/// components in reverse order.
///
/// `123-abc.apps.googleusercontent.com` becomes
/// `com.googleusercontent.apps.123-abc`.
pub fn redirect_scheme_for(client_id: &str) -> String {
    client_id
        .trim()
        .split('.')
        .rev()
        .collect::<Vec<_>>()
        .join(".")
        .to_ascii_lowercase()
}
