// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// AuthBridge: native OAuth sign-in bridge
//
// Entry point. Initialises logging, loads the host config, launches the auth
// services, and serves the method channel on stdin/stdout. Logs go to stderr
// so they never interleave with channel frames.

mod channel;
mod services;

use authbridge_core::HostConfig;

use services::auth_services::AuthServices;
use services::config_path::config_path;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("AuthBridge starting");

    let path = config_path();
    let host = match HostConfig::load(&path) {
        Ok(host) => host,
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "host config unreadable, using defaults");
            HostConfig::default()
        }
    };

    let services = AuthServices::launch(host, authbridge_provider::default_provider());

    if let Err(e) = channel::serve(services).await {
        tracing::error!(error = %e, "method channel failed");
        std::process::exit(1);
    }
}
