//! Session state machine for the authentication flow. The record is encoded
//! so the token-pair invariant is structural: no variant can hold a final
//! token and a pre-auth token at the same time, so clearing one on the way
//! into the other state cannot be forgotten.

/// The states an authentication attempt moves through.
///
/// `Unauthenticated → PendingTwoFactor → Authenticated`, with re-entrant
/// edges back to `Unauthenticated` on logout, cancellation, or
/// guard-detected expiry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    PendingTwoFactor,
    Authenticated,
}

/// The whole session record. Mutated only by the session client and always
/// by whole-record replacement; a partially authenticated user can never
/// hold proof of full authentication.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    /// No credentials held.
    #[default]
    Empty,
    /// Primary credentials were valid; a second factor is outstanding. The
    /// pre-auth token carries no access rights on its own.
    PendingTwoFactor { pre_auth_token: String },
    /// Fully authenticated. Role and username are denormalized identity the
    /// backend may omit.
    Authenticated {
        token: String,
        role: Option<String>,
        username: Option<String>,
    },
}

impl Session {
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self {
            Self::Empty => SessionState::Unauthenticated,
            Self::PendingTwoFactor { .. } => SessionState::PendingTwoFactor,
            Self::Authenticated { .. } => SessionState::Authenticated,
        }
    }

    /// The final token, present only when fully authenticated.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    /// The pre-auth token, present only while a second factor is
    /// outstanding.
    #[must_use]
    pub fn pre_auth_token(&self) -> Option<&str> {
        match self {
            Self::PendingTwoFactor { pre_auth_token } => Some(pre_auth_token),
            _ => None,
        }
    }

    #[must_use]
    pub fn role(&self) -> Option<&str> {
        match self {
            Self::Authenticated { role, .. } => role.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Authenticated { username, .. } => username.as_deref(),
            _ => None,
        }
    }
}

/// Result of a login attempt that the backend accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A final token was issued directly. `two_factor_enabled` is `None`
    /// when the reply did not state the flag; the caller resolves it via
    /// the profile endpoint before routing.
    Authenticated { two_factor_enabled: Option<bool> },
    /// Primary credentials were valid; an OTP challenge is outstanding.
    TwoFactorRequired,
}

/// Where to send the user once fully authenticated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostLoginRoute {
    Home,
    EnrollTwoFactor,
}
