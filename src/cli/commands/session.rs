use crate::{network::DEFAULT_IP_LOOKUP_URL, provider::DEFAULT_SDK_URL};
use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("api-url")
                .short('u')
                .long("api-url")
                .help("Auth backend base URL, example: https://auth.tld")
                .env("SIGNON_API_URL")
                .required(true),
        )
        .arg(
            Arg::new("client-id")
                .long("client-id")
                .help("Identity provider client id")
                .env("SIGNON_GOOGLE_CLIENT_ID"),
        )
        .arg(
            Arg::new("sdk-url")
                .long("sdk-url")
                .help("Identity provider SDK location, empty to skip the download")
                .env("SIGNON_SDK_URL")
                .default_value(DEFAULT_SDK_URL),
        )
        .arg(
            Arg::new("store")
                .short('s')
                .long("store")
                .help("Session file (default: <data dir>/signon/session.json)")
                .env("SIGNON_STORE"),
        )
        .arg(
            Arg::new("ip-lookup-url")
                .long("ip-lookup-url")
                .help("Public IP lookup service, empty to disable")
                .env("SIGNON_IP_LOOKUP_URL")
                .default_value(DEFAULT_IP_LOOKUP_URL),
        )
        .arg(
            Arg::new("tick-interval")
                .long("tick-interval")
                .help("Seconds between session revalidations")
                .env("SIGNON_TICK_INTERVAL")
                .default_value("600")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
