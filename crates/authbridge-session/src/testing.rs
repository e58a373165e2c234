// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted identity provider for unit tests.
//
// Sign-in completions are parked until a test releases them, which lets a
// test hold a session in `Pending` and race the redirect, provider, and
// cancel paths against each other.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use authbridge_core::types::{Account, ProviderFailure};
use authbridge_provider::traits::*;

#[derive(Default)]
pub(crate) struct FakeProvider {
    sign_in_calls: AtomicUsize,
    parked: Mutex<VecDeque<SignInCompletion>>,
    configured: Mutex<Vec<String>>,
    configure_failure: Mutex<Option<ProviderFailure>>,
    sign_out_failure: Mutex<Option<ProviderFailure>>,
    redirect_outcome: Mutex<Option<RedirectOutcome>>,
    signed_in: AtomicBool,
}

impl FakeProvider {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of interactive and silent flows started.
    pub(crate) fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn configured_ids(&self) -> Vec<String> {
        self.configured.lock().unwrap().clone()
    }

    pub(crate) fn fail_configure(&self, failure: ProviderFailure) {
        *self.configure_failure.lock().unwrap() = Some(failure);
    }

    pub(crate) fn fail_sign_out(&self, failure: ProviderFailure) {
        *self.sign_out_failure.lock().unwrap() = Some(failure);
    }

    /// What `handle_redirect` returns from now on. Unset means `Ignored`.
    pub(crate) fn on_redirect(&self, outcome: RedirectOutcome) {
        *self.redirect_outcome.lock().unwrap() = Some(outcome);
    }

    pub(crate) fn set_signed_in(&self, signed_in: bool) {
        self.signed_in.store(signed_in, Ordering::SeqCst);
    }

    /// Release the oldest parked completion with `outcome`.
    pub(crate) fn complete_next(&self, outcome: Result<Account, ProviderFailure>) -> bool {
        let completion = self.parked.lock().unwrap().pop_front();
        match completion {
            Some(completion) => {
                completion(outcome);
                true
            }
            None => false,
        }
    }

    fn park(&self, completion: SignInCompletion) {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        self.parked.lock().unwrap().push_back(completion);
    }
}

impl IdentityProvider for FakeProvider {
    fn provider_name(&self) -> &str {
        "fake"
    }
}

impl ProviderSetup for FakeProvider {
    fn configure(&self, client_id: &str) -> Result<(), ProviderFailure> {
        if let Some(failure) = self.configure_failure.lock().unwrap().clone() {
            return Err(failure);
        }
        self.configured.lock().unwrap().push(client_id.to_string());
        Ok(())
    }
}

impl InteractiveSignIn for FakeProvider {
    fn sign_in(&self, completion: SignInCompletion) {
        self.park(completion);
    }
}

impl SilentSignIn for FakeProvider {
    fn sign_in_silently(&self, completion: SignInCompletion) {
        self.park(completion);
    }
}

impl CredentialCache for FakeProvider {
    fn has_previous_sign_in(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }

    fn sign_out(&self, completion: SignOutCompletion) {
        match self.sign_out_failure.lock().unwrap().clone() {
            Some(failure) => completion(Err(failure)),
            None => {
                self.signed_in.store(false, Ordering::SeqCst);
                completion(Ok(()));
            }
        }
    }
}

impl RedirectConsumer for FakeProvider {
    fn handle_redirect(&self, _url: &str) -> RedirectOutcome {
        self.redirect_outcome
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(RedirectOutcome::Ignored)
    }
}

/// Yield until the provider has been asked for `calls` sign-in flows. The
/// coordinator registers a session before invoking the provider, so the
/// latest one is `Pending` once this returns.
pub(crate) async fn wait_for_sign_in_calls(fake: &FakeProvider, calls: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while fake.sign_in_calls() < calls {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("provider flow was never started");
}
