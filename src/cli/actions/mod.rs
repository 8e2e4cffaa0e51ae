pub mod login;
pub mod logout;
pub mod status;
pub mod watch;

// Internal "interpreter" for `Action`.
mod run;

use crate::{
    backend::HttpBackend,
    cli::globals::GlobalArgs,
    network::NetworkContext,
    session::{FileStore, SessionManager},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tracing::debug;

/// How long one-shot commands wait for the public IP before talking to the
/// backend without it.
const IP_LOOKUP_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub enum Action {
    Login {
        globals: GlobalArgs,
        credential: Option<SecretString>,
    },
    Logout {
        globals: GlobalArgs,
    },
    Status {
        globals: GlobalArgs,
    },
    Watch {
        globals: GlobalArgs,
    },
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

/// A session manager wired to the HTTP backend and the file store, plus the
/// background public IP lookup (if enabled).
struct Session {
    manager: Arc<SessionManager>,
    lookup: Option<JoinHandle<()>>,
}

impl Session {
    fn new(globals: &GlobalArgs) -> Result<Self> {
        let backend = HttpBackend::new(&globals.api_url)
            .with_context(|| format!("invalid API URL: {}", globals.api_url))?;
        let store = FileStore::new(globals.store_path.clone());
        debug!("session store: {}", store.path().display());

        let network = NetworkContext::new();
        let lookup = globals
            .ip_lookup_url
            .as_deref()
            .map(|url| network.spawn_lookup(url));

        let manager = SessionManager::new(Arc::new(backend), Arc::new(store), network)
            .with_tick_interval(globals.tick_interval);

        Ok(Self {
            manager: Arc::new(manager),
            lookup,
        })
    }

    /// Gives the IP lookup a short head start; a slow or failed lookup just
    /// leaves the address unknown.
    async fn settle_network(&mut self) {
        if let Some(lookup) = self.lookup.take() {
            if tokio::time::timeout(IP_LOOKUP_GRACE, lookup).await.is_err() {
                debug!("public IP lookup still pending, continuing without it");
            }
        }
    }
}
