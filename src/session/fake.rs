use crate::backend::{
    BackendError, ExchangeRequest, LogoutEvent, SessionBackend, SessionResponse, TickRequest,
};
use async_trait::async_trait;
use crate::session::store::{MemoryStore, SessionToken, StoreError, TokenStore};
use std::{
    io,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};
use tokio::sync::oneshot;

pub(crate) fn session(token: &str, email: Option<&str>, name: Option<&str>) -> SessionResponse {
    SessionResponse {
        token: token.to_string(),
        email: email.map(str::to_string),
        name: name.map(str::to_string),
    }
}

pub(crate) fn unauthorized() -> BackendError {
    BackendError::Http {
        status: 401,
        message: "Request failed.".to_string(),
    }
}

/// Scripted backend that records every call it receives.
pub(crate) struct FakeBackend {
    exchange_result: Mutex<Result<SessionResponse, BackendError>>,
    tick_result: Mutex<Result<SessionResponse, BackendError>>,
    logout_result: Mutex<Result<(), BackendError>>,
    tick_gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub exchanges: Mutex<Vec<ExchangeRequest>>,
    pub ticks: AtomicUsize,
    pub logouts: Mutex<Vec<LogoutEvent>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            exchange_result: Mutex::new(Err(BackendError::Network("unscripted".to_string()))),
            tick_result: Mutex::new(Err(unauthorized())),
            logout_result: Mutex::new(Ok(())),
            tick_gate: Mutex::new(None),
            exchanges: Mutex::new(Vec::new()),
            ticks: AtomicUsize::new(0),
            logouts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn on_exchange(&self, result: Result<SessionResponse, BackendError>) {
        *self.exchange_result.lock().unwrap() = result;
    }

    pub(crate) fn on_tick(&self, result: Result<SessionResponse, BackendError>) {
        *self.tick_result.lock().unwrap() = result;
    }

    pub(crate) fn on_logout(&self, result: Result<(), BackendError>) {
        *self.logout_result.lock().unwrap() = result;
    }

    /// Holds the next tick until the returned sender fires.
    pub(crate) fn hold_next_tick(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.tick_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub(crate) fn tick_count(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionBackend for FakeBackend {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<SessionResponse, BackendError> {
        self.exchanges.lock().unwrap().push(request.clone());
        self.exchange_result.lock().unwrap().clone()
    }

    async fn tick(&self, _request: &TickRequest) -> Result<SessionResponse, BackendError> {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        let gate = self.tick_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.tick_result.lock().unwrap().clone()
    }

    async fn log_out(&self, event: &LogoutEvent) -> Result<(), BackendError> {
        self.logouts.lock().unwrap().push(event.clone());
        self.logout_result.lock().unwrap().clone()
    }
}

/// Memory store whose `clear` fails until `unlock` is called.
pub(crate) struct StickyStore {
    inner: MemoryStore,
    locked: AtomicBool,
}

impl StickyStore {
    pub(crate) fn with_token(token: &str) -> Self {
        Self {
            inner: MemoryStore::with_token(token),
            locked: AtomicBool::new(true),
        }
    }

    pub(crate) fn unlock(&self) {
        self.locked.store(false, Ordering::SeqCst);
    }
}

impl TokenStore for StickyStore {
    fn load(&self) -> Result<Option<SessionToken>, StoreError> {
        self.inner.load()
    }

    fn save(&self, token: &SessionToken) -> Result<(), StoreError> {
        self.inner.save(token)
    }

    fn clear(&self) -> Result<(), StoreError> {
        if self.locked.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: PathBuf::from("sticky"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        self.inner.clear()
    }
}
