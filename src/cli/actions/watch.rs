use super::Session;
use crate::{cli::globals::GlobalArgs, session::SessionState};
use anyhow::{Context, Result};
use tracing::info;

/// Keeps the session alive until interrupted, printing every state change.
/// # Errors
/// Returns an error if the backend client cannot be built or the signal
/// handler cannot be installed.
pub async fn execute(globals: GlobalArgs) -> Result<()> {
    let session = Session::new(&globals)?;
    let mut updates = session.manager.subscribe();
    let task = session.manager.start();

    let mut last = updates.borrow_and_update().state.clone();

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for ctrl-c")?;
                info!("interrupted, stopping");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().state.clone();
                if state != last {
                    match &state {
                        SessionState::LoggedIn(identity) => {
                            println!("Logged in as {}", identity.label());
                        }
                        SessionState::LoggedOut => println!("Logged out"),
                    }
                    last = state;
                }
            }
        }
    }

    task.shutdown().await;
    Ok(())
}
