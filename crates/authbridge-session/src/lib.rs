// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// AuthBridge Session: the native sign-in bridge proper.  Holds the client
// configuration, owns the single-flight sign-in slot, correlates redirect
// URLs and vendor SDK callbacks with the pending session, and turns
// method-channel calls into replies.

pub mod config_store;
pub mod coordinator;
pub mod dispatcher;
pub mod redirect;

#[cfg(test)]
mod testing;

pub use config_store::ConfigStore;
pub use coordinator::SignInCoordinator;
pub use dispatcher::{BridgeDispatcher, BridgeRequest};
pub use redirect::RedirectHandler;
