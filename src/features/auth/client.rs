//! Session client: the network operations that drive authentication, and
//! the only writer of the credential store. Bearer attachment for
//! authenticated endpoints happens here, so the token never leaks into
//! calling code. No operation mutates the store before its response has
//! been observed; an abandoned request leaves the session untouched.

use crate::{
    api,
    config::AppConfig,
    errors::Error,
    features::auth::{
        guard::AccessGuard,
        state::{LoginOutcome, PostLoginRoute, Session, SessionState},
        store::CredentialStore,
        types::{
            ConfirmTwoFactorRequest, ForgotPasswordRequest, LoginReply, LoginRequest, MeReply,
            RegisterRequest, TwoFactorEnrollment, TwoFactorGenerateReply, VerifyOtpReply,
            VerifyOtpRequest,
        },
    },
};
use regex::Regex;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, OnceLock};
use tracing::{Instrument, debug, info_span, warn};

const USER_AGENT: &str = concat!("empdesk/", env!("CARGO_PKG_VERSION"));

/// One-time codes are exactly six digits; anything else is rejected before
/// the network is touched.
fn otp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{6}$").expect("valid literal pattern"))
}

pub struct SessionClient {
    http: Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
}

impl SessionClient {
    /// Builds a client against the configured API. The credential store is
    /// injected so tests can run on the in-memory implementation.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &AppConfig, store: Arc<dyn CredentialStore>) -> Result<Self, Error> {
        Ok(Self {
            http: api::client(config.request_timeout, USER_AGENT)?,
            base_url: config.api_base_url.clone(),
            store,
        })
    }

    /// Snapshot of the current session record.
    #[must_use]
    pub fn session(&self) -> Session {
        self.store.load()
    }

    /// Current position in the authentication state machine.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.store.load().state()
    }

    /// An access guard sharing this client's credential store.
    #[must_use]
    pub fn guard(&self) -> AccessGuard {
        AccessGuard::new(Arc::clone(&self.store))
    }

    fn url(&self, path: &str) -> String {
        api::build_url(&self.base_url, path)
    }

    /// The final token for authenticated endpoints; refuses locally when
    /// the session is not fully authenticated.
    fn bearer_token(&self) -> Result<String, Error> {
        self.store
            .load()
            .token()
            .map(str::to_string)
            .ok_or_else(|| Error::Validation("You must log in first.".to_string()))
    }

    /// Submits primary credentials.
    ///
    /// Empty (after trimming) credentials fail locally without a network
    /// call. A final-token reply replaces the whole record with the
    /// authenticated session, dropping any stale pre-auth token in the same
    /// step; a two-factor reply keeps only the pre-auth token.
    ///
    /// # Errors
    /// `Validation` on empty input, `Rejected` when the backend refuses the
    /// credentials, `UnexpectedReply` when the reply matches no known shape.
    pub async fn login(
        &self,
        name: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, Error> {
        let name = name.trim();
        if name.is_empty() || password.expose_secret().trim().is_empty() {
            return Err(Error::Validation(
                "Username and password are required.".to_string(),
            ));
        }

        let url = self.url("/admin/login");
        let span = info_span!("auth.login", http.method = "POST", url = %url);
        let reply: LoginReply = api::send_json(self.http.post(&url).json(&LoginRequest {
            admin_name: name,
            admin_password: password.expose_secret(),
        }))
        .instrument(span)
        .await?;

        if let Some(token) = reply.token {
            self.store.replace(Session::Authenticated {
                token,
                role: reply.role,
                username: reply.username,
            })?;
            debug!("login issued a final token");
            return Ok(LoginOutcome::Authenticated {
                two_factor_enabled: reply.two_factor_enabled,
            });
        }

        if reply.two_factor_required.unwrap_or(false) {
            let pre_auth_token = reply.pre_auth_token.ok_or_else(|| {
                Error::UnexpectedReply(
                    "two-factor required but no pre-auth token was issued".to_string(),
                )
            })?;
            self.store
                .replace(Session::PendingTwoFactor { pre_auth_token })?;
            debug!("login requires a second factor");
            return Ok(LoginOutcome::TwoFactorRequired);
        }

        match reply.message {
            Some(message) => Err(Error::Rejected(message)),
            None => Err(Error::UnexpectedReply(
                "login reply carried neither a token nor a two-factor challenge".to_string(),
            )),
        }
    }

    /// Verifies the one-time code against the held pre-auth token.
    ///
    /// The code must match the six-digit pattern and a challenge must be in
    /// progress; both are checked before any network I/O. On success the
    /// final token is written and the pre-auth token cleared in one record
    /// replacement, so no window exists in which neither credential is
    /// held.
    ///
    /// # Errors
    /// `Validation` on a malformed code or absent challenge, `Rejected`
    /// when the backend refuses the code.
    pub async fn verify_otp(&self, code: &str) -> Result<(), Error> {
        let code = code.trim();
        if !otp_pattern().is_match(code) {
            return Err(Error::Validation(
                "Enter the 6-digit code from your authenticator app.".to_string(),
            ));
        }
        let Some(pre_auth_token) = self.store.load().pre_auth_token().map(str::to_string) else {
            return Err(Error::Validation(
                "No two-factor challenge is in progress.".to_string(),
            ));
        };

        let url = self.url("/2fa/verify");
        let span = info_span!("auth.verify_otp", http.method = "POST", url = %url);
        let reply: VerifyOtpReply = api::send_json(self.http.post(&url).json(&VerifyOtpRequest {
            pre_auth_token: &pre_auth_token,
            code,
        }))
        .instrument(span)
        .await?;

        let Some(token) = reply.token else {
            return Err(match reply.message {
                Some(message) => Error::Rejected(message),
                None => Error::UnexpectedReply(
                    "verification reply carried no token".to_string(),
                ),
            });
        };

        self.store.replace(Session::Authenticated {
            token,
            role: reply.role,
            username: reply.username,
        })?;
        debug!("second factor verified");
        Ok(())
    }

    /// Abandons an in-progress two-factor challenge, discarding the
    /// pre-auth token. Local only; a fully authenticated session is left
    /// alone.
    pub fn cancel_two_factor(&self) {
        if self.store.load().state() == SessionState::PendingTwoFactor {
            self.clear_store("two-factor challenge cancelled");
        }
    }

    /// Asks the backend whether the current user has a confirmed second
    /// factor. A missing flag in the reply means "not enabled".
    ///
    /// # Errors
    /// `Validation` when no authenticated session exists; transport and
    /// rejection errors pass through for the caller to apply policy.
    pub async fn resolve_two_factor_enabled(&self) -> Result<bool, Error> {
        let token = self.bearer_token()?;
        let url = self.url("/admin/me");
        let span = info_span!("auth.me", http.method = "GET", url = %url);
        let reply: MeReply = api::send_json(self.http.get(&url).bearer_auth(token))
            .instrument(span)
            .await?;
        Ok(reply.two_factor_enabled.unwrap_or(false))
    }

    /// Picks the post-login destination once a final token is held.
    ///
    /// When the login reply did not state the two-factor flag, the profile
    /// endpoint resolves it. A failure there routes to enrollment instead
    /// of surfacing an error: an unknown second-factor state fails closed,
    /// and the user already holds a valid token.
    pub async fn post_login_route(&self, two_factor_enabled: Option<bool>) -> PostLoginRoute {
        match two_factor_enabled {
            Some(true) => PostLoginRoute::Home,
            Some(false) => PostLoginRoute::EnrollTwoFactor,
            None => match self.resolve_two_factor_enabled().await {
                Ok(true) => PostLoginRoute::Home,
                Ok(false) => PostLoginRoute::EnrollTwoFactor,
                Err(err) => {
                    warn!(%err, "could not resolve two-factor status; routing to enrollment");
                    PostLoginRoute::EnrollTwoFactor
                }
            },
        }
    }

    /// Starts enrollment: asks the backend for a fresh secret and
    /// provisioning URI, normalized into the canonical shape.
    ///
    /// # Errors
    /// `Validation` when not authenticated, `UnexpectedReply` when the
    /// reply carries neither a secret nor a URI.
    pub async fn generate_two_factor_secret(&self) -> Result<TwoFactorEnrollment, Error> {
        let token = self.bearer_token()?;
        let url = self.url("/2fa/generate");
        let span = info_span!("auth.generate_2fa", http.method = "POST", url = %url);
        let reply: TwoFactorGenerateReply = api::send_json(
            self.http
                .post(&url)
                .bearer_auth(token)
                .json(&serde_json::json!({})),
        )
        .instrument(span)
        .await?;

        let secret = reply.secret.unwrap_or_default();
        let provisioning_uri = reply.otp_auth_url.unwrap_or_default();
        if secret.is_empty() && provisioning_uri.is_empty() {
            return Err(Error::UnexpectedReply(
                "enrollment reply carried neither a secret nor a provisioning URI".to_string(),
            ));
        }

        Ok(TwoFactorEnrollment {
            secret,
            provisioning_uri,
            confirmed: false,
        })
    }

    /// Activates the previously generated factor with its first one-time
    /// code. Does not touch the credential store; activation status lives
    /// server-side and is re-read through [`Self::resolve_two_factor_enabled`].
    ///
    /// # Errors
    /// `Validation` on a malformed code or missing session, `Rejected` when
    /// the backend refuses the code.
    pub async fn confirm_two_factor_secret(&self, code: &str) -> Result<(), Error> {
        let code = code.trim();
        if !otp_pattern().is_match(code) {
            return Err(Error::Validation(
                "Enter the 6-digit code from your authenticator app.".to_string(),
            ));
        }
        let token = self.bearer_token()?;

        let url = self.url("/2fa/confirm");
        let span = info_span!("auth.confirm_2fa", http.method = "POST", url = %url);
        api::send_empty(
            self.http
                .post(&url)
                .bearer_auth(token)
                .json(&ConfirmTwoFactorRequest { code }),
        )
        .instrument(span)
        .await
    }

    /// Registers a new admin account.
    ///
    /// # Errors
    /// `Validation` on empty fields, `Rejected` when the backend refuses
    /// (for example, a taken username).
    pub async fn register(
        &self,
        name: &str,
        password: &SecretString,
        role: &str,
    ) -> Result<(), Error> {
        let name = name.trim();
        let role = role.trim();
        if name.is_empty() || password.expose_secret().trim().is_empty() || role.is_empty() {
            return Err(Error::Validation(
                "Username, password, and role are required.".to_string(),
            ));
        }

        let url = self.url("/admin/register");
        let span = info_span!("auth.register", http.method = "POST", url = %url);
        api::send_empty(self.http.post(&url).json(&RegisterRequest {
            admin_name: name,
            admin_password: password.expose_secret(),
            role,
        }))
        .instrument(span)
        .await
    }

    /// Resets an account password.
    ///
    /// # Errors
    /// `Validation` on empty fields, `Rejected` when the account is
    /// unknown.
    pub async fn forgot_password(
        &self,
        name: &str,
        new_password: &SecretString,
    ) -> Result<(), Error> {
        let name = name.trim();
        if name.is_empty() || new_password.expose_secret().trim().is_empty() {
            return Err(Error::Validation(
                "Username and new password are required.".to_string(),
            ));
        }

        let url = self.url("/admin/forgot-password");
        let span = info_span!("auth.forgot_password", http.method = "POST", url = %url);
        api::send_empty(self.http.post(&url).json(&ForgotPasswordRequest {
            admin_name: name,
            new_password: new_password.expose_secret(),
        }))
        .instrument(span)
        .await
    }

    /// Clears every credential field. Pure local operation; never fails.
    pub fn logout(&self) {
        self.clear_store("logout");
    }

    fn clear_store(&self, reason: &str) {
        debug!(reason, "clearing session record");
        if let Err(err) = self.store.replace(Session::Empty) {
            warn!(%err, "failed to clear credential store");
        }
    }
}
