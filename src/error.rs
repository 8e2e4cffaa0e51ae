use crate::{backend::BackendError, loader::LoadError, session::store::StoreError};
use thiserror::Error;

/// Failures surfaced by the sign-in flow and the session manager.
///
/// None of these are fatal: login-side variants end up as the `login_failed`
/// flag, revalidation failures end up as a forced logout, and audit delivery
/// failures are only logged.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("identity provider is not configured: {0}")]
    Configuration(String),
    #[error("identity provider SDK failed to load: {0}")]
    ResourceLoad(#[from] LoadError),
    #[error("identity provider returned no credential")]
    Credential,
    #[error("credential exchange failed: {0}")]
    Exchange(#[source] BackendError),
    #[error("session revalidation failed: {0}")]
    Revalidation(#[source] BackendError),
    #[error("logout event was not delivered: {0}")]
    AuditDelivery(#[source] BackendError),
    #[error("session store failure: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Whether retrying the same operation later can succeed.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_not_retriable() {
        let err = AuthError::Configuration("missing client id".to_string());
        assert!(!err.is_retriable());
        assert_eq!(
            err.to_string(),
            "identity provider is not configured: missing client id"
        );
    }

    #[test]
    fn load_errors_convert_and_stay_retriable() {
        let err: AuthError = LoadError::Failed {
            resource: "google-gsi".to_string(),
            reason: "connection refused".to_string(),
        }
        .into();
        assert!(err.is_retriable());
        assert!(err.to_string().contains("google-gsi"));
    }
}
