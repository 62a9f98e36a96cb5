use thiserror::Error;

/// Error taxonomy for the session core.
///
/// `Validation` failures are detected locally and never reach the network;
/// `Rejected` carries the backend's own message. Token decode failures are
/// deliberately absent: the access guard turns them into a deny verdict and
/// a redirect, never into an error value.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// Malformed local input or state; blocks the network call.
    #[error("{0}")]
    Validation(String),
    /// The backend refused the request and said why.
    #[error("{0}")]
    Rejected(String),
    /// The backend was unreachable, timed out, or replied with bytes that
    /// could not be decoded.
    #[error("transport error: {0}")]
    Transport(String),
    /// A success reply carrying none of the fields the contract promises.
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),
    /// Credential store I/O failure.
    #[error("credential store error: {0}")]
    Storage(String),
    /// Missing or unusable configuration.
    #[error("config error: {0}")]
    Config(String),
}
