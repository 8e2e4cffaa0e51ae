//! Session lifecycle: login, logout, periodic revalidation and the state
//! published to presentation logic.
//!
//! The manager is the only writer of the token store. Every check-then-write
//! against the store happens inside the same critical section that publishes
//! the new [`SessionSnapshot`], so subscribers never observe a logged-in state
//! without a persisted token (or the reverse) once the first tick has run.

mod manager;
mod state;
pub mod store;
mod ticker;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod fake;

pub use self::manager::{SessionManager, DEFAULT_TICK_INTERVAL};
pub use self::state::{
    ModalState, Revalidation, SessionIdentity, SessionSnapshot, SessionState,
    DEFAULT_DISPLAY_LABEL,
};
pub use self::store::{FileStore, MemoryStore, SessionToken, TokenStore};
pub use self::ticker::RevalidationTask;
