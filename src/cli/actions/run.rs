use crate::cli::actions::{login, logout, status, watch, Action};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login {
            globals,
            credential,
        } => login::execute(globals, credential).await,
        Action::Logout { globals } => logout::execute(globals).await,
        Action::Status { globals } => status::execute(globals).await,
        Action::Watch { globals } => watch::execute(globals).await,
    }
}
