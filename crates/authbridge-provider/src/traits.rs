// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the vendor identity SDK.
//
// Vendor SDKs are callback driven: every flow takes a completion that the SDK
// invokes later, possibly on a thread of its own choosing. Completions are
// therefore `Send` and must tolerate being called after the caller has moved
// on.

use authbridge_core::types::{Account, ProviderFailure};

/// Completion for interactive and silent sign-in.
pub type SignInCompletion = Box<dyn FnOnce(Result<Account, ProviderFailure>) + Send + 'static>;

/// Completion for sign-out.
pub type SignOutCompletion = Box<dyn FnOnce(Result<(), ProviderFailure>) + Send + 'static>;

/// Unified provider that groups every SDK capability the bridge relies on.
pub trait IdentityProvider:
    ProviderSetup + InteractiveSignIn + SilentSignIn + CredentialCache + RedirectConsumer + Send + Sync
{
    /// Human-readable provider name (e.g. "Google Sign-In 7").
    fn provider_name(&self) -> &str;
}

/// One-time SDK configuration.
pub trait ProviderSetup {
    /// Prime the SDK with a client identifier. Called again on reconfiguration.
    fn configure(&self, client_id: &str) -> Result<(), ProviderFailure>;
}

/// User-facing sign-in flow.
pub trait InteractiveSignIn {
    /// Present the provider's sign-in UI. The completion fires once the SDK
    /// finishes on its own; some SDK versions instead finish through
    /// [`RedirectConsumer::handle_redirect`].
    fn sign_in(&self, completion: SignInCompletion);
}

/// Restore a previous sign-in without user interaction.
pub trait SilentSignIn {
    fn sign_in_silently(&self, completion: SignInCompletion);
}

/// Credentials cached by the SDK.
pub trait CredentialCache {
    /// Whether the SDK holds a previous sign-in.
    fn has_previous_sign_in(&self) -> bool;

    /// Clear cached credentials.
    fn sign_out(&self, completion: SignOutCompletion);
}

/// What the SDK did with a redirect URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// Not a URL for this SDK.
    Ignored,
    /// Consumed; the SDK will finish through the pending sign-in completion.
    Accepted,
    /// Consumed and the flow finished right here.
    Completed(Result<Account, ProviderFailure>),
}

/// OAuth redirect URLs routed in from the OS.
pub trait RedirectConsumer {
    fn handle_redirect(&self, url: &str) -> RedirectOutcome;
}
