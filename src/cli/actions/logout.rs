use super::Session;
use crate::{cli::globals::GlobalArgs, session::Revalidation};
use anyhow::{Context, Result};
use tracing::debug;

/// Ends the session and waits for the audit event to be delivered (or to
/// fail) before exiting.
/// # Errors
/// Returns an error if the backend client cannot be built or the stored token
/// cannot be erased.
pub async fn execute(globals: GlobalArgs) -> Result<()> {
    let mut session = Session::new(&globals)?;
    session.settle_network().await;

    // a fresh process starts logged out; load the identity so the audit event
    // carries it
    match session.manager.revalidate().await {
        Revalidation::Refreshed(identity) => debug!("ending session of {}", identity.label()),
        outcome => debug!(?outcome, "no live session to end"),
    }

    let audit = session
        .manager
        .logout()
        .context("session ended, but the stored token could not be erased")?;

    if let Some(audit) = audit {
        if let Err(err) = audit.await {
            debug!("logout audit task failed: {}", err);
        }
    }

    println!("Logged out");
    Ok(())
}
