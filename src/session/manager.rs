use super::{
    state::{ModalState, Revalidation, SessionIdentity, SessionSnapshot, SessionState},
    store::{SessionToken, StoreError, TokenStore},
};
use crate::{
    backend::{BackendError, ExchangeRequest, LogoutEvent, SessionBackend, TickRequest},
    network::NetworkContext,
    provider::{CredentialReceiver, CredentialResponse, ProviderEvent},
    AuthError,
};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{debug, error, info, instrument, warn};

/// Cadence of the background revalidation tick.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(600);

pub struct SessionManager {
    backend: Arc<dyn SessionBackend>,
    store: Arc<dyn TokenStore>,
    network: NetworkContext,
    snapshot: watch::Sender<SessionSnapshot>,
    // token the store failed to erase on logout; treated as absent
    revoked: Mutex<Option<SessionToken>>,
    pub(super) tick_interval: Duration,
}

impl SessionManager {
    /// Creates a manager in the `LoggedOut` state. A persisted token is only
    /// trusted after the first revalidation succeeds, so the snapshot is not
    /// authoritative until [`SessionManager::start`] or
    /// [`SessionManager::revalidate`] has run once.
    #[must_use]
    pub fn new(
        backend: Arc<dyn SessionBackend>,
        store: Arc<dyn TokenStore>,
        network: NetworkContext,
    ) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::default());
        Self {
            backend,
            store,
            network,
            snapshot,
            revoked: Mutex::new(None),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval.max(Duration::from_millis(1));
        self
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified on every state or prompt change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    #[must_use]
    pub const fn network(&self) -> &NetworkContext {
        &self.network
    }

    /// Exchanges a provider credential for a session.
    ///
    /// On failure nothing is persisted and the `login_failed` flag is raised.
    ///
    /// # Errors
    /// Returns [`AuthError::Credential`] when the provider gave no credential,
    /// [`AuthError::Exchange`] when the backend rejected it or was unreachable,
    /// and [`AuthError::Store`] when the token could not be persisted.
    #[instrument(skip(self, response))]
    pub async fn login(
        &self,
        response: CredentialResponse,
    ) -> Result<SessionIdentity, AuthError> {
        let Some(credential) = response.into_credential() else {
            return Err(self.fail_login(AuthError::Credential));
        };

        let request = ExchangeRequest {
            credential,
            ip: self.network.ip(),
        };

        let session = match self.backend.exchange(&request).await {
            Ok(session) if !session.token.trim().is_empty() => session,
            Ok(_) => {
                let err =
                    BackendError::Parse("session response carried an empty token".to_string());
                return Err(self.fail_login(AuthError::Exchange(err)));
            }
            Err(err) => return Err(self.fail_login(AuthError::Exchange(err))),
        };

        let token = SessionToken::new(&session.token);
        let identity = SessionIdentity::from_response(&session);
        let mut persisted = Ok(());

        self.snapshot.send_if_modified(|snapshot| {
            if let Err(err) = self.store.save(&token) {
                persisted = Err(err);
                return false;
            }
            *self.revoked() = None;
            snapshot.state = SessionState::LoggedIn(identity.clone());
            snapshot.modal = ModalState::default();
            true
        });

        if let Err(err) = persisted {
            return Err(self.fail_login(AuthError::Store(err)));
        }

        info!("login succeeded");
        Ok(identity)
    }

    /// One revalidation tick. Never fails: rejection is reported as
    /// [`Revalidation::Rejected`] after the session has been invalidated.
    #[instrument(skip(self))]
    pub async fn revalidate(&self) -> Revalidation {
        let token = match self.current_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.retry_erase();
                self.commit_logged_out(None);
                return Revalidation::NoToken;
            }
            Err(err) => {
                warn!("unable to read session store: {}", err);
                self.commit_logged_out(None);
                return Revalidation::NoToken;
            }
        };

        let request = TickRequest {
            token: token.expose().to_string(),
        };
        let result = self.backend.tick(&request).await;

        let mut outcome = Revalidation::Superseded;
        self.snapshot.send_if_modified(|snapshot| {
            if !self.holds(Some(&token)) {
                debug!("token changed during revalidation, discarding result");
                return false;
            }

            match &result {
                Ok(session) if !session.token.trim().is_empty() => {
                    if let Err(err) = self.store.save(&SessionToken::new(&session.token)) {
                        error!("unable to persist refreshed token: {}", err);
                    }
                    let identity = SessionIdentity::from_response(session);
                    outcome = Revalidation::Refreshed(identity.clone());

                    let next = SessionState::LoggedIn(identity);
                    if snapshot.state == next {
                        return false;
                    }
                    snapshot.state = next;
                    true
                }
                rejected => {
                    if let Err(err) = rejected {
                        info!("{}", AuthError::Revalidation(err.clone()));
                    } else {
                        info!("session revalidation returned an empty token");
                    }
                    if let Err(err) = self.erase(Some(&token)) {
                        error!("unable to erase session token: {}", err);
                    }
                    outcome = Revalidation::Rejected;

                    let changed = snapshot.state.is_logged_in();
                    snapshot.state = SessionState::LoggedOut;
                    changed
                }
            }
        });

        outcome
    }

    /// Ends the session locally and reports it to the backend in the
    /// background. Returns the audit task when a runtime was available to run
    /// it; awaiting it is optional.
    ///
    /// # Errors
    /// Returns [`AuthError::Store`] if the persisted token could not be erased.
    /// The session is still ended: the manager remembers the token as revoked
    /// and later ticks ignore it.
    pub fn logout(&self) -> Result<Option<JoinHandle<()>>, AuthError> {
        let mut identity = None;
        let mut erased = Ok(());

        self.snapshot.send_if_modified(|snapshot| {
            identity = snapshot.state.identity().cloned();
            let current = self.store.load().ok().flatten();
            erased = self.erase(current.as_ref());
            let changed = snapshot.state.is_logged_in() || snapshot.modal != ModalState::default();
            snapshot.state = SessionState::LoggedOut;
            snapshot.modal = ModalState::default();
            changed
        });

        match &erased {
            Ok(()) => info!("logged out"),
            Err(err) => error!("logged out, but unable to erase session token: {}", err),
        }

        let event = LogoutEvent {
            email: identity.as_ref().and_then(|identity| identity.email.clone()),
            username: identity.and_then(|identity| identity.display_name),
            ip: self.network.ip(),
            timestamp: unix_now(),
        };

        let audit = if let Ok(runtime) = Handle::try_current() {
            let backend = Arc::clone(&self.backend);
            Some(runtime.spawn(async move {
                match backend.log_out(&event).await {
                    Ok(()) => debug!("logout event delivered"),
                    Err(err) => warn!("{}", AuthError::AuditDelivery(err)),
                }
            }))
        } else {
            warn!("no async runtime available, logout event not sent");
            None
        };

        erased.map_err(AuthError::Store)?;
        Ok(audit)
    }

    /// Surfaces a provider-side failure to the presentation layer. Persisted
    /// state is left untouched.
    pub fn handle_provider_error(&self, error: &AuthError) {
        warn!("login failed: {}", error);
        self.snapshot.send_if_modified(|snapshot| {
            let changed = !snapshot.modal.login_failed;
            snapshot.modal.login_failed = true;
            changed
        });
    }

    /// Drains provider events until the provider drops its callback.
    pub async fn consume_credentials(&self, mut events: CredentialReceiver) {
        while let Some(event) = events.recv().await {
            match event {
                ProviderEvent::Credential(response) => {
                    if let Err(err) = self.login(response).await {
                        debug!("credential exchange did not complete: {}", err);
                    }
                }
                ProviderEvent::Failed(err) => self.handle_provider_error(&err),
            }
        }
    }

    /// Shows the prompt; the authenticated view is selected when logged in.
    pub fn open_prompt(&self) {
        self.snapshot.send_modify(|snapshot| {
            snapshot.modal.visible = true;
            snapshot.modal.authenticated_view = snapshot.state.is_logged_in();
        });
    }

    pub fn close_prompt(&self) {
        self.snapshot.send_if_modified(|snapshot| {
            let changed = snapshot.modal != ModalState::default();
            snapshot.modal = ModalState::default();
            changed
        });
    }

    fn fail_login(&self, error: AuthError) -> AuthError {
        self.handle_provider_error(&error);
        error
    }

    fn commit_logged_out(&self, expected: Option<&SessionToken>) {
        self.snapshot.send_if_modified(|snapshot| {
            if !self.holds(expected) || !snapshot.state.is_logged_in() {
                return false;
            }
            snapshot.state = SessionState::LoggedOut;
            true
        });
    }

    /// Whether the store still holds `expected`. An unreadable store counts as
    /// empty.
    fn holds(&self, expected: Option<&SessionToken>) -> bool {
        let current = self.current_token().unwrap_or_default();
        current.as_ref() == expected
    }

    /// The persisted token, unless it is empty or was revoked by a logout that
    /// could not erase it.
    fn current_token(&self) -> Result<Option<SessionToken>, StoreError> {
        let token = self.store.load()?.filter(|token| !token.is_empty());
        let revoked = self.revoked();
        Ok(token.filter(|token| revoked.as_ref() != Some(token)))
    }

    /// Clears the store. On failure `current` is remembered as revoked.
    fn erase(&self, current: Option<&SessionToken>) -> Result<(), StoreError> {
        match self.store.clear() {
            Ok(()) => {
                *self.revoked() = None;
                Ok(())
            }
            Err(err) => {
                if let Some(token) = current {
                    *self.revoked() = Some(token.clone());
                }
                Err(err)
            }
        }
    }

    /// Tries again to erase a revoked token left behind by a failed logout.
    fn retry_erase(&self) {
        if self.revoked().is_none() {
            return;
        }
        match self.store.clear() {
            Ok(()) => {
                debug!("revoked session token erased");
                *self.revoked() = None;
            }
            Err(err) => debug!("revoked session token still present: {}", err),
        }
    }

    fn revoked(&self) -> MutexGuard<'_, Option<SessionToken>> {
        self.revoked.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
