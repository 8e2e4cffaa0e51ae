//! Client side of the session backend contract. Three JSON endpoints under a
//! fixed base URL: credential exchange, periodic tick and logout audit. The
//! request and response types carry provider credentials and session tokens, so
//! their `Debug` output is redacted and they must never be logged verbatim.

mod http;
mod types;

pub use self::http::{HttpBackend, DEFAULT_TIMEOUT};
pub use self::types::{ExchangeRequest, LogoutEvent, SessionResponse, TickRequest};

use async_trait::async_trait;
use thiserror::Error;

pub const EXCHANGE_PATH: &str = "/api/auth/google";
pub const TICK_PATH: &str = "/api/auth/tick";
pub const LOGOUT_PATH: &str = "/api/auth/logout";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("invalid backend URL: {0}")]
    Url(String),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("unable to reach the server: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Parse(String),
}

impl BackendError {
    /// HTTP status of a rejected request, if the server answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The backend operations the session manager depends on.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Exchange a provider credential for a session.
    async fn exchange(&self, request: &ExchangeRequest) -> Result<SessionResponse, BackendError>;

    /// Revalidate a session token; the response may carry a rotated token.
    async fn tick(&self, request: &TickRequest) -> Result<SessionResponse, BackendError>;

    /// Record a logout for auditing. The response body is ignored.
    async fn log_out(&self, event: &LogoutEvent) -> Result<(), BackendError>;
}
