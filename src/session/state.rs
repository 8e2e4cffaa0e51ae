use crate::backend::SessionResponse;

/// Placeholder shown when the server returned neither a name nor an email.
pub const DEFAULT_DISPLAY_LABEL: &str = "Logged in";

/// Who is signed in, derived from the latest server session response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl SessionIdentity {
    #[must_use]
    pub fn from_response(response: &SessionResponse) -> Self {
        Self {
            display_name: non_blank(response.name.as_deref()),
            email: non_blank(response.email.as_deref()),
        }
    }

    /// Display name, then email, then [`DEFAULT_DISPLAY_LABEL`].
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(DEFAULT_DISPLAY_LABEL)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn(SessionIdentity),
}

impl SessionState {
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn(_))
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&SessionIdentity> {
        match self {
            Self::LoggedIn(identity) => Some(identity),
            Self::LoggedOut => None,
        }
    }
}

/// Transient prompt flags for the presentation layer. Never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModalState {
    pub visible: bool,
    pub authenticated_view: bool,
    pub login_failed: bool,
}

/// Everything presentation logic needs to render the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub modal: ModalState,
}

/// Result of one revalidation tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Revalidation {
    /// No token was persisted; no request was made.
    NoToken,
    /// The backend accepted the token.
    Refreshed(SessionIdentity),
    /// The backend rejected the token, or could not be reached; the session was
    /// invalidated.
    Rejected,
    /// The token changed while the request was in flight; the result was
    /// discarded.
    Superseded,
}
