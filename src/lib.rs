//! empdesk — client-side session authentication core for an employee
//! records admin console.
//!
//! The crate centers on a small state machine (unauthenticated →
//! pending-two-factor → authenticated) backed by a durable credential
//! store, a session client that is the store's only writer, an access
//! guard that gates protected operations on token presence and expiry, and
//! a TOTP enrollment flow with local QR rendering. Employee CRUD wrappers
//! ride on the same credential store as thin glue.

mod api;
pub mod config;
pub mod errors;
pub mod features;

pub use config::AppConfig;
pub use errors::Error;
pub use features::auth::{
    client::SessionClient,
    enroll::{EnrollmentFlow, EnrollmentScreen},
    guard::{AccessGuard, GuardVerdict, RedirectTarget},
    state::{LoginOutcome, PostLoginRoute, Session, SessionState},
    store::{CredentialStore, FileCredentialStore, MemoryCredentialStore},
    types::TwoFactorEnrollment,
};
pub use features::employees::{client::EmployeesClient, types::Employee};
