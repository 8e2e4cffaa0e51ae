pub mod logging;
mod session;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("signon")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("login")
                .about("Exchange an identity provider credential for a session")
                .arg(
                    Arg::new("credential")
                        .short('c')
                        .long("credential")
                        .help("Signed credential issued by the identity provider")
                        .env("SIGNON_CREDENTIAL")
                        .hide_env_values(true),
                ),
        )
        .subcommand(Command::new("logout").about("End the current session"))
        .subcommand(Command::new("status").about("Revalidate the stored session once"))
        .subcommand(
            Command::new("watch").about("Keep the session alive, revalidating periodically"),
        );

    let command = session::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "signon");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
        new().debug_assert();
    }

    #[test]
    fn test_check_args() {
        let matches = new()
            .try_get_matches_from(vec![
                "signon",
                "--api-url",
                "https://auth.tld",
                "--client-id",
                "client-123",
                "--store",
                "/tmp/signon.json",
                "--tick-interval",
                "30",
                "status",
            ])
            .unwrap();

        assert_eq!(
            matches.get_one::<String>("api-url").map(String::as_str),
            Some("https://auth.tld")
        );
        assert_eq!(
            matches.get_one::<String>("client-id").map(String::as_str),
            Some("client-123")
        );
        assert_eq!(
            matches.get_one::<String>("store").map(String::as_str),
            Some("/tmp/signon.json")
        );
        assert_eq!(matches.get_one::<u64>("tick-interval").copied(), Some(30));
        assert_eq!(matches.subcommand_name(), Some("status"));
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(
            [
                "SIGNON_SDK_URL",
                "SIGNON_IP_LOOKUP_URL",
                "SIGNON_TICK_INTERVAL",
                "SIGNON_STORE",
                "SIGNON_GOOGLE_CLIENT_ID",
                "SIGNON_LOG_LEVEL",
                "SIGNON_LOG_JSON",
            ],
            || {
                let matches = new()
                    .try_get_matches_from(vec!["signon", "--api-url", "https://auth.tld", "watch"])
                    .unwrap();

                assert_eq!(
                    matches.get_one::<String>("sdk-url").map(String::as_str),
                    Some(crate::provider::DEFAULT_SDK_URL)
                );
                assert_eq!(
                    matches.get_one::<String>("ip-lookup-url").map(String::as_str),
                    Some(crate::network::DEFAULT_IP_LOOKUP_URL)
                );
                assert_eq!(matches.get_one::<u64>("tick-interval").copied(), Some(600));
                assert_eq!(matches.get_one::<String>("store"), None);
                assert_eq!(matches.get_one::<String>("client-id"), None);
                assert!(!matches.get_flag("log-json"));
            },
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("SIGNON_API_URL", Some("https://auth.tld")),
                ("SIGNON_GOOGLE_CLIENT_ID", Some("client-123")),
                ("SIGNON_TICK_INTERVAL", Some("60")),
                ("SIGNON_CREDENTIAL", Some("cred1")),
                ("SIGNON_LOG_LEVEL", Some("info")),
                ("SIGNON_LOG_JSON", Some("true")),
            ],
            || {
                let matches = new().try_get_matches_from(vec!["signon", "login"]).unwrap();

                assert_eq!(
                    matches.get_one::<String>("api-url").map(String::as_str),
                    Some("https://auth.tld")
                );
                assert_eq!(
                    matches.get_one::<String>("client-id").map(String::as_str),
                    Some("client-123")
                );
                assert_eq!(matches.get_one::<u64>("tick-interval").copied(), Some(60));
                assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(2));
                assert!(matches.get_flag("log-json"));

                let (name, login) = matches.subcommand().unwrap();
                assert_eq!(name, "login");
                assert_eq!(
                    login.get_one::<String>("credential").map(String::as_str),
                    Some("cred1")
                );
            },
        );
    }

    #[test]
    fn test_missing_api_url() {
        temp_env::with_vars_unset(["SIGNON_API_URL"], || {
            let result = new().try_get_matches_from(vec!["signon", "status"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_subcommand_required() {
        let result = new().try_get_matches_from(vec!["signon", "--api-url", "https://auth.tld"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tick_interval_rejects_zero() {
        let result = new().try_get_matches_from(vec![
            "signon",
            "--api-url",
            "https://auth.tld",
            "--tick-interval",
            "0",
            "watch",
        ]);
        assert!(result.is_err());
    }
}
