//! # Signon (client-side session keeper)
//!
//! `signon` keeps a single sign-on session alive on the client. A third-party
//! identity provider issues a credential, the backend exchanges it for an opaque
//! session token, and the token is persisted and periodically revalidated.
//!
//! ## Components
//!
//! - [`loader`]: loads the identity provider SDK at most once and shares the
//!   in-flight load with every caller.
//! - [`provider`]: validates provider configuration and turns the SDK callback
//!   into messages on a channel.
//! - [`session`]: the session state machine, the token store and the periodic
//!   revalidation task.
//! - [`backend`]: the HTTP contract with the session backend.
//! - [`network`]: best-effort public IP lookup attached to audit calls.
//!
//! Session tokens and provider credentials must never be logged.

pub mod backend;
pub mod cli;
pub mod error;
pub mod loader;
pub mod network;
pub mod provider;
pub mod session;

pub use error::AuthError;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with("signon/"));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
