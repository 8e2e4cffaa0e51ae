use super::Session;
use crate::{
    cli::globals::GlobalArgs,
    loader::{HttpFetcher, Preloaded, ResourceInjector, ResourceLoader},
    provider::{IdentityProvider, ManualSdk, ProviderConfig, SDK_RESOURCE_ID},
    session::SessionState,
};
use anyhow::{bail, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, info};

/// Loads the provider SDK, hands it the credential and exchanges the result
/// for a session.
/// # Errors
/// Returns an error if the provider cannot be set up or the login fails.
pub async fn execute(globals: GlobalArgs, credential: Option<SecretString>) -> Result<()> {
    let mut session = Session::new(&globals)?;

    let loader = Arc::new(ResourceLoader::new(sdk_injector(&globals)?));

    let sdk = ManualSdk::new(credential.as_ref().map(|c| c.expose_secret()));
    let provider = IdentityProvider::new(
        ProviderConfig::new(globals.client_id.as_deref()),
        loader,
        Arc::new(sdk),
    );

    session.settle_network().await;
    provider.sign_in(&session.manager).await;

    match session.manager.snapshot().state {
        SessionState::LoggedIn(identity) => {
            info!("session stored in {}", globals.store_path.display());
            println!("Logged in as {}", identity.label());
            Ok(())
        }
        SessionState::LoggedOut => bail!("login failed, run with -vv for details"),
    }
}

/// Downloads the SDK from `--sdk-url`, or treats it as present when no URL is
/// configured.
fn sdk_injector(globals: &GlobalArgs) -> Result<Arc<dyn ResourceInjector>> {
    let Some(sdk_url) = globals.sdk_url.as_deref() else {
        debug!("no SDK URL configured, skipping the download");
        return Ok(Arc::new(Preloaded));
    };

    let fetcher = HttpFetcher::new()
        .context("failed to build HTTP client")?
        .with_source(SDK_RESOURCE_ID, sdk_url);
    Ok(Arc::new(fetcher))
}
