//! Durable credential store: the four named session slots in one JSON
//! document, replaced atomically as a whole. The store is an explicitly
//! owned value injected into the session client and the access guard, so
//! tests run against the in-memory implementation instead of the
//! filesystem.

use crate::errors::Error;
use crate::features::auth::state::Session;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Storage for the current session record.
///
/// `replace` swaps the entire record. Partial updates do not exist, which
/// keeps the token-pair invariant intact even under rapid consecutive
/// calls, and makes "write token, clear pre-auth" a single durable step.
pub trait CredentialStore: Send + Sync {
    /// Returns the current record.
    fn load(&self) -> Session;

    /// Replaces the whole record.
    fn replace(&self, session: Session) -> Result<(), Error>;
}

/// On-disk form of the record: the four named slots.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jwt_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preauth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    admin_name: Option<String>,
}

impl From<&Session> for SessionSlots {
    fn from(session: &Session) -> Self {
        match session {
            Session::Empty => Self::default(),
            Session::PendingTwoFactor { pre_auth_token } => Self {
                preauth_token: Some(pre_auth_token.clone()),
                ..Self::default()
            },
            Session::Authenticated {
                token,
                role,
                username,
            } => Self {
                jwt_token: Some(token.clone()),
                role: role.clone(),
                admin_name: username.clone(),
                ..Self::default()
            },
        }
    }
}

impl SessionSlots {
    /// Rebuilds the record from the persisted slots. A document carrying
    /// both tokens cannot come from this crate; treat it as corrupt and
    /// fail closed.
    fn into_session(self) -> Session {
        match (self.jwt_token, self.preauth_token) {
            (Some(_), Some(_)) => {
                warn!("persisted session holds both tokens; discarding it");
                Session::Empty
            }
            (Some(token), None) => Session::Authenticated {
                token,
                role: self.role,
                username: self.admin_name,
            },
            (None, Some(pre_auth_token)) => Session::PendingTwoFactor { pre_auth_token },
            (None, None) => Session::Empty,
        }
    }
}

/// File-backed store surviving process restarts. Reads go through an
/// in-memory copy; writes go to a temp file renamed over the target so the
/// record on disk is always one complete document.
pub struct FileCredentialStore {
    path: PathBuf,
    cached: RwLock<Session>,
}

impl FileCredentialStore {
    /// Opens the store, loading any record persisted by a previous process.
    ///
    /// # Errors
    /// Returns an error if an existing session file cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let session = read_session(&path)?;
        Ok(Self {
            path,
            cached: RwLock::new(session),
        })
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Session {
        match self.cached.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, session: Session) -> Result<(), Error> {
        let slots = SessionSlots::from(&session);
        let data = serde_json::to_vec_pretty(&slots)
            .map_err(|err| Error::Storage(format!("failed to encode session: {err}")))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &data)
            .map_err(|err| Error::Storage(format!("failed to write {}: {err}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|err| {
            Error::Storage(format!("failed to replace {}: {err}", self.path.display()))
        })?;

        let mut guard = match self.cached.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = session;
        debug!(path = %self.path.display(), "session record replaced");
        Ok(())
    }
}

fn read_session(path: &Path) -> Result<Session, Error> {
    if !path.exists() {
        return Ok(Session::Empty);
    }

    let data = fs::read_to_string(path)
        .map_err(|err| Error::Storage(format!("failed to read {}: {err}", path.display())))?;

    match serde_json::from_str::<SessionSlots>(&data) {
        Ok(slots) => Ok(slots.into_session()),
        Err(err) => {
            warn!(path = %path.display(), %err, "session file is corrupt; starting empty");
            Ok(Session::Empty)
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Session>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Session {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, session: Session) -> Result<(), Error> {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = session;
        Ok(())
    }
}
