// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sign-in session coordinator.
//
// Owns the single sign-in slot. A session enters the slot as `Pending` and
// leaves it exactly once, through whichever of these arrives first:
//
//   * the vendor SDK's completion callback,
//   * a redirect URL the SDK resolves directly,
//   * an explicit `cancel()`.
//
// All three go through `Inner::resolve_pending`, which checks and flips the
// session status under the slot mutex and only then delivers the reply. Later
// arrivals find the slot empty (or holding a different session) and are
// dropped with a log line.
//
// The mutex is never held while calling into the provider: SDKs may invoke a
// completion synchronously from inside `sign_in` or `handle_redirect`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use authbridge_core::error::{AuthBridgeError, Result};
use authbridge_core::types::{
    Account, RedirectEvent, SessionId, SessionStatus, SignInKind, SignInSession,
};
use authbridge_provider::traits::{CredentialCache, InteractiveSignIn, RedirectConsumer, SilentSignIn};
use authbridge_provider::{IdentityProvider, RedirectOutcome, SignInCompletion};

use crate::config_store::ConfigStore;

/// Which path resolved a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolutionSource {
    Provider,
    Redirect,
    Cancel,
}

/// The occupant of the sign-in slot: session state plus the caller's reply.
struct ActiveSession {
    session: SignInSession,
    reply: oneshot::Sender<Result<Account>>,
}

struct Inner {
    config: Arc<ConfigStore>,
    provider: Arc<dyn IdentityProvider>,
    slot: Mutex<Option<ActiveSession>>,
}

impl Inner {
    fn lock_slot(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve the pending session if `matches` accepts it. Returns whether a
    /// reply was sent.
    fn resolve_pending(
        &self,
        matches: impl Fn(&SignInSession) -> bool,
        outcome: Result<Account>,
        source: ResolutionSource,
    ) -> bool {
        let resolved = {
            let mut slot = self.lock_slot();
            let claimable = slot.as_ref().is_some_and(|active| {
                !active.session.status.is_terminal() && matches(&active.session)
            });
            if claimable {
                slot.take().map(|mut active| {
                    active.session.status = terminal_status(&outcome);
                    active
                })
            } else {
                None
            }
        };

        let Some(active) = resolved else {
            return false;
        };

        let elapsed_ms = (Utc::now() - active.session.started_at).num_milliseconds();
        info!(
            session_id = %active.session.id,
            status = ?active.session.status,
            ?source,
            elapsed_ms,
            "sign-in session resolved"
        );
        if active.reply.send(outcome).is_err() {
            debug!(session_id = %active.session.id, "caller stopped waiting before the reply arrived");
        }
        true
    }

    fn resolve(&self, id: SessionId, outcome: Result<Account>, source: ResolutionSource) -> bool {
        let delivered = self.resolve_pending(|session| session.id == id, outcome, source);
        if !delivered {
            warn!(session_id = %id, ?source, "dropping callback for a session that is no longer pending");
        }
        delivered
    }
}

fn terminal_status(outcome: &Result<Account>) -> SessionStatus {
    match outcome {
        Ok(_) => SessionStatus::Completed,
        Err(AuthBridgeError::Cancelled) => SessionStatus::Cancelled,
        Err(_) => SessionStatus::Failed,
    }
}

/// Single-flight sign-in coordinator.
///
/// Cheap to clone; clones share the same slot. Constructed once by the
/// application root and handed to the redirect handler and dispatcher.
#[derive(Clone)]
pub struct SignInCoordinator {
    inner: Arc<Inner>,
}

impl SignInCoordinator {
    pub fn new(config: Arc<ConfigStore>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                provider,
                slot: Mutex::new(None),
            }),
        }
    }

    /// Run the interactive flow and wait for its outcome.
    ///
    /// Fails fast with `NotConfigured` or `SignInAlreadyInProgress`. Otherwise
    /// resolves when the SDK completes, a redirect completes it, or
    /// [`SignInCoordinator::cancel`] is called.
    #[instrument(skip(self))]
    pub async fn sign_in(&self) -> Result<Account> {
        self.run(SignInKind::Interactive).await
    }

    /// Restore a cached credential. Same single-flight rule as `sign_in`.
    #[instrument(skip(self))]
    pub async fn sign_in_silently(&self) -> Result<Account> {
        self.run(SignInKind::Silent).await
    }

    async fn run(&self, kind: SignInKind) -> Result<Account> {
        let (id, reply) = self.begin(kind)?;
        let completion = self.completion_for(id);
        match kind {
            SignInKind::Interactive => self.inner.provider.sign_in(completion),
            SignInKind::Silent => self.inner.provider.sign_in_silently(completion),
        }
        // The sender lives in the slot until a resolution path takes it, and
        // every path sends before dropping it.
        reply.await.unwrap_or(Err(AuthBridgeError::Cancelled))
    }

    fn begin(&self, kind: SignInKind) -> Result<(SessionId, oneshot::Receiver<Result<Account>>)> {
        if !self.inner.config.is_configured() {
            debug!(?kind, "sign-in requested before configuration");
            return Err(AuthBridgeError::NotConfigured);
        }

        let mut slot = self.inner.lock_slot();
        if let Some(active) = slot.as_ref() {
            debug!(pending = %active.session.id, ?kind, "rejecting overlapping sign-in");
            return Err(AuthBridgeError::SignInAlreadyInProgress);
        }

        let session = SignInSession::new(kind);
        let id = session.id;
        let (reply, receiver) = oneshot::channel();
        info!(session_id = %id, ?kind, "sign-in session started");
        *slot = Some(ActiveSession { session, reply });
        Ok((id, receiver))
    }

    fn completion_for(&self, id: SessionId) -> SignInCompletion {
        let inner = Arc::clone(&self.inner);
        Box::new(move |outcome| {
            inner.resolve(id, outcome.map_err(AuthBridgeError::from), ResolutionSource::Provider);
        })
    }

    /// Cancel the pending session, if any. Its caller receives `Cancelled`
    /// and the slot is free when this returns.
    #[instrument(skip(self))]
    pub fn cancel(&self) -> bool {
        let cancelled = self.inner.resolve_pending(
            |_| true,
            Err(AuthBridgeError::Cancelled),
            ResolutionSource::Cancel,
        );
        if !cancelled {
            debug!("no pending sign-in to cancel");
        }
        cancelled
    }

    /// Offer a redirect to the pending interactive session.
    ///
    /// Returns false without touching the provider when no interactive
    /// session is pending. Otherwise the provider decides whether the URL is
    /// its own; a URL it completes on the spot resolves the session here.
    pub(crate) fn resume_from_redirect(&self, event: &RedirectEvent) -> bool {
        let pending = {
            let slot = self.inner.lock_slot();
            slot.as_ref()
                .filter(|active| {
                    !active.session.status.is_terminal()
                        && active.session.kind == SignInKind::Interactive
                })
                .map(|active| (active.session.id, active.session.started_at))
        };
        let Some((id, started_at)) = pending else {
            debug!("redirect received with no interactive sign-in pending");
            return false;
        };

        let since_start_ms = (event.received_at - started_at).num_milliseconds();
        match self.inner.provider.handle_redirect(&event.url) {
            RedirectOutcome::Ignored => {
                debug!(session_id = %id, "identity provider did not recognise the redirect");
                false
            }
            RedirectOutcome::Accepted => {
                debug!(session_id = %id, since_start_ms, "redirect accepted, awaiting provider completion");
                true
            }
            RedirectOutcome::Completed(outcome) => {
                debug!(session_id = %id, since_start_ms, "redirect completed the sign-in");
                self.inner.resolve(
                    id,
                    outcome.map_err(AuthBridgeError::from),
                    ResolutionSource::Redirect,
                );
                true
            }
        }
    }

    /// Clear the SDK's cached credential.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.inner.provider.sign_out(Box::new(move |outcome| {
            let _ = tx.send(outcome);
        }));
        match rx.await {
            Ok(Ok(())) => {
                info!("signed out");
                Ok(())
            }
            Ok(Err(failure)) => {
                warn!(code = %failure.code, "identity provider failed to sign out");
                Err(failure.into())
            }
            Err(_) => Err(AuthBridgeError::ProviderError {
                code: "completion-dropped".into(),
                message: "identity provider dropped the sign-out completion".into(),
            }),
        }
    }

    /// Whether the SDK holds a previous sign-in.
    pub fn is_signed_in(&self) -> bool {
        self.inner.provider.has_previous_sign_in()
    }

    /// Snapshot of the pending session, if any.
    pub fn pending_session(&self) -> Option<SignInSession> {
        self.inner
            .lock_slot()
            .as_ref()
            .map(|active| active.session.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use authbridge_core::types::ProviderFailure;
    use authbridge_provider::stub::{PLATFORM_UNAVAILABLE, StubProvider};

    use super::*;
    use crate::testing::{FakeProvider, wait_for_sign_in_calls};

    fn coordinator(configured: bool) -> (Arc<FakeProvider>, SignInCoordinator) {
        let fake = FakeProvider::new();
        let config = Arc::new(ConfigStore::new(fake.clone()));
        if configured {
            config.configure("abc123").unwrap();
        }
        (fake.clone(), SignInCoordinator::new(config, fake))
    }

    #[tokio::test]
    async fn sign_in_before_configure_is_rejected() {
        let (fake, coord) = coordinator(false);
        let err = coord.sign_in().await.unwrap_err();
        assert!(matches!(err, AuthBridgeError::NotConfigured));
        let err = coord.sign_in_silently().await.unwrap_err();
        assert!(matches!(err, AuthBridgeError::NotConfigured));
        assert_eq!(fake.sign_in_calls(), 0);
        assert!(coord.pending_session().is_none());
    }

    #[tokio::test]
    async fn provider_success_replies_and_frees_slot() {
        let (fake, coord) = coordinator(true);
        let task = tokio::spawn({
            let coord = coord.clone();
            async move { coord.sign_in().await }
        });
        wait_for_sign_in_calls(&fake, 1).await;
        let pending = coord.pending_session().unwrap();
        assert_eq!(pending.status, SessionStatus::Pending);
        assert_eq!(pending.kind, SignInKind::Interactive);

        assert!(fake.complete_next(Ok(Account::with_id("u1"))));
        let account = task.await.unwrap().unwrap();
        assert_eq!(account.id, "u1");
        assert!(coord.pending_session().is_none());
    }

    #[tokio::test]
    async fn overlapping_sign_in_is_rejected() {
        let (fake, coord) = coordinator(true);
        let first = tokio::spawn({
            let coord = coord.clone();
            async move { coord.sign_in().await }
        });
        wait_for_sign_in_calls(&fake, 1).await;

        let err = coord.sign_in().await.unwrap_err();
        assert!(matches!(err, AuthBridgeError::SignInAlreadyInProgress));
        let err = coord.sign_in_silently().await.unwrap_err();
        assert!(matches!(err, AuthBridgeError::SignInAlreadyInProgress));
        assert_eq!(fake.sign_in_calls(), 1);

        fake.complete_next(Ok(Account::with_id("u1")));
        assert!(first.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn cancel_replies_cancelled_and_allows_new_sign_in() {
        let (fake, coord) = coordinator(true);
        let first = tokio::spawn({
            let coord = coord.clone();
            async move { coord.sign_in().await }
        });
        wait_for_sign_in_calls(&fake, 1).await;

        assert!(coord.cancel());
        assert!(coord.pending_session().is_none());
        let err = first.await.unwrap().unwrap_err();
        assert!(matches!(err, AuthBridgeError::Cancelled));

        let second = tokio::spawn({
            let coord = coord.clone();
            async move { coord.sign_in().await }
        });
        wait_for_sign_in_calls(&fake, 2).await;
        let pending = coord.pending_session().unwrap();
        assert_eq!(pending.status, SessionStatus::Pending);

        // The abandoned flow's completion fires late and must not touch the
        // new session.
        assert!(fake.complete_next(Ok(Account::with_id("stale"))));
        assert_eq!(coord.pending_session().map(|s| s.id), Some(pending.id));

        fake.complete_next(Ok(Account::with_id("fresh")));
        assert_eq!(second.await.unwrap().unwrap().id, "fresh");
    }

    #[tokio::test]
    async fn cancel_without_pending_session_is_a_no_op() {
        let (_fake, coord) = coordinator(true);
        assert!(!coord.cancel());
    }

    #[tokio::test]
    async fn provider_failure_keeps_vendor_code() {
        let (fake, coord) = coordinator(true);
        let task = tokio::spawn({
            let coord = coord.clone();
            async move { coord.sign_in().await }
        });
        wait_for_sign_in_calls(&fake, 1).await;
        fake.complete_next(Err(ProviderFailure::new("-5", "user canceled")));

        match task.await.unwrap().unwrap_err() {
            AuthBridgeError::ProviderError { code, message } => {
                assert_eq!(code, "-5");
                assert_eq!(message, "user canceled");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(coord.pending_session().is_none());
    }

    #[tokio::test]
    async fn duplicate_provider_callback_is_dropped() {
        let fake = FakeProvider::new();
        let config = Arc::new(ConfigStore::new(fake.clone()));
        config.configure("abc123").unwrap();
        let coord = SignInCoordinator::new(config, fake.clone());

        let task = tokio::spawn({
            let coord = coord.clone();
            async move { coord.sign_in().await }
        });
        wait_for_sign_in_calls(&fake, 1).await;
        let id = coord.pending_session().unwrap().id;

        assert!(coord.inner.resolve(id, Ok(Account::with_id("u1")), ResolutionSource::Provider));
        assert!(!coord.inner.resolve(id, Ok(Account::with_id("u2")), ResolutionSource::Provider));
        assert!(!coord.inner.resolve(id, Err(AuthBridgeError::Cancelled), ResolutionSource::Cancel));
        assert_eq!(task.await.unwrap().unwrap().id, "u1");
    }

    #[tokio::test]
    async fn silent_sign_in_resolves_from_provider() {
        let (fake, coord) = coordinator(true);
        let task = tokio::spawn({
            let coord = coord.clone();
            async move { coord.sign_in_silently().await }
        });
        wait_for_sign_in_calls(&fake, 1).await;
        assert_eq!(coord.pending_session().unwrap().kind, SignInKind::Silent);
        fake.complete_next(Ok(Account::with_id("cached")));
        assert_eq!(task.await.unwrap().unwrap().id, "cached");
    }

    #[tokio::test]
    async fn synchronous_provider_completion_resolves() {
        let stub: Arc<dyn IdentityProvider> = Arc::new(StubProvider);
        let config = Arc::new(ConfigStore::new(stub.clone()));
        config.configure("abc123").unwrap();
        let coord = SignInCoordinator::new(config, stub);

        match coord.sign_in().await.unwrap_err() {
            AuthBridgeError::ProviderError { code, .. } => assert_eq!(code, PLATFORM_UNAVAILABLE),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(coord.pending_session().is_none());
    }

    #[tokio::test]
    async fn sign_out_reports_provider_errors() {
        let (fake, coord) = coordinator(false);
        fake.set_signed_in(true);
        assert!(coord.is_signed_in());
        coord.sign_out().await.unwrap();
        assert!(!coord.is_signed_in());

        fake.fail_sign_out(ProviderFailure::new("keychain", "keychain locked"));
        let err = coord.sign_out().await.unwrap_err();
        assert_eq!(err.code(), "ProviderError");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sign_ins_admit_exactly_one() {
        const CALLERS: usize = 32;
        let (fake, coord) = coordinator(true);
        let finished = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..CALLERS)
            .map(|_| {
                let coord = coord.clone();
                let finished = Arc::clone(&finished);
                tokio::spawn(async move {
                    let outcome = coord.sign_in().await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    outcome
                })
            })
            .collect();

        // Everyone except the admitted caller returns on their own.
        tokio::time::timeout(Duration::from_secs(5), async {
            while finished.load(Ordering::SeqCst) < CALLERS - 1 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("more than one sign-in reached Pending");
        wait_for_sign_in_calls(&fake, 1).await;
        assert_eq!(fake.sign_in_calls(), 1);

        fake.complete_next(Ok(Account::with_id("u1")));
        let mut admitted = 0;
        let mut rejected = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(AuthBridgeError::SignInAlreadyInProgress) => rejected += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(rejected, CALLERS - 1);
    }
}
