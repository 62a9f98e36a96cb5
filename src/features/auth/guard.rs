//! Pre-navigation access guard: a local, synchronous presence-and-expiry
//! check executed before every protected operation. The guard never calls
//! the network — it is a UX gate, and real access control must live on the
//! API, which rejects a revoked token on the next authenticated request.

use crate::features::auth::{state::Session, store::CredentialStore, token};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Where a denied check should send the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectTarget {
    Login,
}

/// Outcome of a guard check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardVerdict {
    Allow,
    Deny { redirect: RedirectTarget },
}

impl GuardVerdict {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    fn deny() -> Self {
        Self::Deny {
            redirect: RedirectTarget::Login,
        }
    }
}

/// Evaluates whether the current credential is present and unexpired.
pub struct AccessGuard {
    store: Arc<dyn CredentialStore>,
}

impl AccessGuard {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Checks against the system clock.
    #[must_use]
    pub fn check(&self) -> GuardVerdict {
        self.check_at(unix_now())
    }

    /// Checks at an explicit time.
    ///
    /// The allow path is side-effect-free. A malformed or expired token
    /// forces a full logout — the pre-auth token included — so no partial
    /// state survives a failed check. Claims are decoded fresh on every
    /// call; nothing is cached across checks.
    #[must_use]
    pub fn check_at(&self, now_unix_seconds: i64) -> GuardVerdict {
        let session = self.store.load();
        let Some(token) = session.token() else {
            debug!("guard denied: no final token held");
            return GuardVerdict::deny();
        };

        match token::decode_claims(token) {
            Ok(claims) if claims.expired_at(now_unix_seconds) => {
                self.force_logout("token expired");
                GuardVerdict::deny()
            }
            Ok(_) => GuardVerdict::Allow,
            Err(err) => {
                warn!(%err, "guard denied: token failed to decode");
                self.force_logout("malformed token");
                GuardVerdict::deny()
            }
        }
    }

    fn force_logout(&self, reason: &str) {
        debug!(reason, "clearing session record");
        if let Err(err) = self.store.replace(Session::Empty) {
            warn!(%err, "failed to clear credential store");
        }
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}
