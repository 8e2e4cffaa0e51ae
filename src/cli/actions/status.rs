use super::Session;
use crate::{cli::globals::GlobalArgs, session::Revalidation};
use anyhow::Result;

/// Revalidates the stored session once and prints the outcome.
/// # Errors
/// Returns an error if the backend client cannot be built.
pub async fn execute(globals: GlobalArgs) -> Result<()> {
    let session = Session::new(&globals)?;

    match session.manager.revalidate().await {
        Revalidation::Refreshed(identity) => println!("Logged in as {}", identity.label()),
        Revalidation::NoToken => println!("Logged out"),
        Revalidation::Rejected => println!("Session expired, logged out"),
        Revalidation::Superseded => println!("Session changed during check, try again"),
    }

    Ok(())
}
