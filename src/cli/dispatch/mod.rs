use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let globals = globals(matches)?;

    match matches.subcommand() {
        Some(("login", sub)) => Ok(Action::Login {
            globals,
            credential: sub
                .get_one::<String>("credential")
                .map(|credential| SecretString::from(credential.clone())),
        }),
        Some(("logout", _)) => Ok(Action::Logout { globals }),
        Some(("status", _)) => Ok(Action::Status { globals }),
        Some(("watch", _)) => Ok(Action::Watch { globals }),
        _ => bail!("missing subcommand"),
    }
}

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let api_url = matches
        .get_one::<String>("api-url")
        .cloned()
        .context("missing required argument: --api-url")?;

    let mut globals = GlobalArgs::new(api_url);

    globals.client_id = matches
        .get_one::<String>("client-id")
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    // an empty SDK URL means the provider SDK is already available
    globals.sdk_url = matches
        .get_one::<String>("sdk-url")
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());

    if let Some(store) = matches.get_one::<String>("store") {
        globals.store_path = PathBuf::from(store);
    }

    // an empty lookup URL disables the public IP lookup
    globals.ip_lookup_url = matches
        .get_one::<String>("ip-lookup-url")
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());

    if let Some(seconds) = matches.get_one::<u64>("tick-interval") {
        globals.tick_interval = Duration::from_secs(*seconds);
    }

    Ok(globals)
}
