//! Identity provider integration. The provider SDK is loaded through the
//! [`ResourceLoader`], initialized with the configured client id and handed a
//! [`CredentialSender`]. Whatever the SDK reports through that sender arrives
//! as [`ProviderEvent`]s on the paired [`CredentialReceiver`], which the
//! session manager drains.
//!
//! Provider failures (missing client id, SDK load errors, empty credentials)
//! are reported through the login failure path, never as panics.

mod channel;
mod manual;

pub use self::channel::{credential_channel, CredentialReceiver, CredentialSender, ProviderEvent};
pub use self::manual::ManualSdk;

use crate::{loader::ResourceLoader, session::SessionManager, AuthError};
use std::{fmt, sync::Arc};
use tracing::{debug, instrument};

/// Resource id the provider SDK is registered under in the loader.
pub const SDK_RESOURCE_ID: &str = "google-gsi";
pub const DEFAULT_SDK_URL: &str = "https://accounts.google.com/gsi/client";

/// Payload the provider hands to its callback after user consent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialResponse {
    pub credential: Option<String>,
}

impl CredentialResponse {
    #[must_use]
    pub fn new(credential: &str) -> Self {
        Self {
            credential: Some(credential.to_string()),
        }
    }

    /// The credential, if the provider returned a non-blank one.
    #[must_use]
    pub fn into_credential(self) -> Option<String> {
        self.credential
            .map(|credential| credential.trim().to_string())
            .filter(|credential| !credential.is_empty())
    }
}

impl fmt::Debug for CredentialResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResponse")
            .field("credential", &self.credential.as_ref().map(|_| "***"))
            .finish()
    }
}

/// The provider SDK surface this crate needs: initialization with a client id
/// and a callback for issued credentials.
pub trait ProviderSdk: Send + Sync {
    /// # Errors
    /// Returns a description of the failure if the SDK rejects the configuration.
    fn initialize(&self, client_id: &str, callback: CredentialSender) -> Result<(), String>;
}

#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub client_id: Option<String>,
    pub resource_id: String,
}

impl ProviderConfig {
    #[must_use]
    pub fn new(client_id: Option<&str>) -> Self {
        Self {
            client_id: client_id.map(str::to_string),
            resource_id: SDK_RESOURCE_ID.to_string(),
        }
    }

    /// # Errors
    /// Returns [`AuthError::Configuration`] when no client id is configured.
    pub fn client_id(&self) -> Result<&str, AuthError> {
        self.client_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AuthError::Configuration("provider client id is not set".to_string()))
    }
}

pub struct IdentityProvider {
    config: ProviderConfig,
    loader: Arc<ResourceLoader>,
    sdk: Arc<dyn ProviderSdk>,
}

impl IdentityProvider {
    #[must_use]
    pub fn new(
        config: ProviderConfig,
        loader: Arc<ResourceLoader>,
        sdk: Arc<dyn ProviderSdk>,
    ) -> Self {
        Self {
            config,
            loader,
            sdk,
        }
    }

    /// Loads the SDK (once), initializes it and returns the credential stream.
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] if the client id is missing or the
    /// SDK rejects it, and [`AuthError::ResourceLoad`] if the SDK fails to load.
    #[instrument(skip(self))]
    pub async fn connect(&self) -> Result<CredentialReceiver, AuthError> {
        let client_id = self.config.client_id()?;

        self.loader
            .ensure_loaded(&self.config.resource_id)
            .await?;

        let (sender, receiver) = credential_channel();
        self.sdk
            .initialize(client_id, sender)
            .map_err(AuthError::Configuration)?;

        debug!("identity provider initialized");
        Ok(receiver)
    }

    /// Connects the provider and feeds every credential it issues into
    /// `manager` until the provider drops its callback.
    pub async fn sign_in(&self, manager: &SessionManager) {
        match self.connect().await {
            Ok(receiver) => manager.consume_credentials(receiver).await,
            Err(err) => manager.handle_provider_error(&err),
        }
    }
}
