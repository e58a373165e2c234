// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! AuthBridge: vendor identity SDK abstractions.
//!
//! The session layer talks to the identity provider only through
//! [`traits::IdentityProvider`]. Mobile hosts supply an implementation that
//! wraps the native SDK; desktop and CI builds get [`stub::StubProvider`].

pub mod stub;
pub mod traits;

use std::sync::Arc;

pub use traits::{IdentityProvider, RedirectOutcome, SignInCompletion, SignOutCompletion};

/// Provider used when the host does not inject one.
///
/// Native SDK adapters are registered by the embedding application; this
/// crate only ships the stub.
pub fn default_provider() -> Arc<dyn IdentityProvider> {
    Arc::new(stub::StubProvider)
}
