// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub provider for desktop/CI builds where no vendor identity SDK exists.
//
// Configuration is accepted so the rest of the bridge can be exercised; every
// flow completes immediately with a `platform-unavailable` failure.

use authbridge_core::types::ProviderFailure;

use crate::traits::*;

/// Vendor code reported by every stub flow.
pub const PLATFORM_UNAVAILABLE: &str = "platform-unavailable";

fn unavailable() -> ProviderFailure {
    ProviderFailure::new(
        PLATFORM_UNAVAILABLE,
        "no identity SDK is available on this platform",
    )
}

/// No-op provider returned on non-mobile platforms.
pub struct StubProvider;

impl IdentityProvider for StubProvider {
    fn provider_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl ProviderSetup for StubProvider {
    fn configure(&self, client_id: &str) -> Result<(), ProviderFailure> {
        tracing::debug!(%client_id, "ProviderSetup::configure on stub provider, nothing to prime");
        Ok(())
    }
}

impl InteractiveSignIn for StubProvider {
    fn sign_in(&self, completion: SignInCompletion) {
        tracing::warn!("InteractiveSignIn::sign_in called on stub provider");
        completion(Err(unavailable()));
    }
}

impl SilentSignIn for StubProvider {
    fn sign_in_silently(&self, completion: SignInCompletion) {
        tracing::warn!("SilentSignIn::sign_in_silently called on stub provider");
        completion(Err(unavailable()));
    }
}

impl CredentialCache for StubProvider {
    fn has_previous_sign_in(&self) -> bool {
        false
    }

    fn sign_out(&self, completion: SignOutCompletion) {
        // Nothing cached, so there is nothing to clear.
        completion(Ok(()));
    }
}

impl RedirectConsumer for StubProvider {
    fn handle_redirect(&self, _url: &str) -> RedirectOutcome {
        RedirectOutcome::Ignored
    }
}
