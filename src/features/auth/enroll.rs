//! Two-factor enrollment flow: generate a factor, show it as a scannable
//! QR code with the raw secret as a manual-entry fallback, then confirm
//! activation with the first one-time code. QR rendering is pure local
//! encoding; its failure never blocks the fallback, so the secret is
//! always part of the screen model.

use crate::errors::Error;
use crate::features::auth::{
    client::SessionClient, state::SessionState, types::TwoFactorEnrollment,
};
use totp_rs::TOTP;
use tracing::warn;
use url::Url;

/// Everything the enrollment screen needs to render.
#[derive(Clone, Debug)]
pub struct EnrollmentScreen {
    pub enrollment: TwoFactorEnrollment,
    /// `data:image/png;base64,...` when rendering succeeded; `None` leaves
    /// the user with manual secret entry.
    pub qr_data_url: Option<String>,
}

/// Drives enrollment of a new second factor for the authenticated user.
pub struct EnrollmentFlow<'a> {
    client: &'a SessionClient,
}

impl<'a> EnrollmentFlow<'a> {
    #[must_use]
    pub fn new(client: &'a SessionClient) -> Self {
        Self { client }
    }

    /// Generates a fresh factor and prepares the screen model.
    ///
    /// Refuses locally, without contacting the backend, when no
    /// authenticated session exists.
    ///
    /// # Errors
    /// `Validation` when not logged in; otherwise the errors of
    /// [`SessionClient::generate_two_factor_secret`].
    pub async fn begin(&self) -> Result<EnrollmentScreen, Error> {
        if self.client.state() != SessionState::Authenticated {
            return Err(Error::Validation(
                "Log in before enabling two-factor authentication.".to_string(),
            ));
        }

        let enrollment = self.client.generate_two_factor_secret().await?;
        let qr_data_url = match render_qr(&enrollment.provisioning_uri) {
            Ok(data_url) => Some(data_url),
            Err(err) => {
                warn!(%err, "QR rendering failed; manual secret entry remains available");
                None
            }
        };

        Ok(EnrollmentScreen {
            enrollment,
            qr_data_url,
        })
    }

    /// Confirms activation with the first one-time code and marks the
    /// screen's factor as confirmed.
    ///
    /// # Errors
    /// The errors of [`SessionClient::confirm_two_factor_secret`].
    pub async fn confirm(&self, screen: &mut EnrollmentScreen, code: &str) -> Result<(), Error> {
        self.client.confirm_two_factor_secret(code).await?;
        screen.enrollment.confirmed = true;
        Ok(())
    }
}

/// Renders an otpauth provisioning URI as a PNG data URL. Pure encoding,
/// no network.
///
/// # Errors
/// Returns an error if the URI is empty, not a valid otpauth URI, or the
/// QR image cannot be encoded.
pub fn render_qr(provisioning_uri: &str) -> Result<String, Error> {
    if provisioning_uri.trim().is_empty() {
        return Err(Error::Validation(
            "no provisioning URI to render".to_string(),
        ));
    }

    let totp = TOTP::from_url(provisioning_uri)
        .map_err(|err| Error::Validation(format!("invalid provisioning URI: {err:?}")))?;
    let png = totp
        .get_qr_base64()
        .map_err(|err| Error::Validation(format!("QR encoding failed: {err}")))?;
    Ok(format!("data:image/png;base64,{png}"))
}

/// Extracts the shared secret from a provisioning URI, for checking that
/// the URI and the displayed secret agree.
///
/// # Errors
/// Returns an error if the URI cannot be parsed or carries no `secret`
/// query parameter.
pub fn secret_from_uri(provisioning_uri: &str) -> Result<String, Error> {
    let url = Url::parse(provisioning_uri)
        .map_err(|err| Error::Validation(format!("invalid provisioning URI: {err}")))?;
    url.query_pairs()
        .find(|(key, _)| key == "secret")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| Error::Validation("provisioning URI carries no secret".to_string()))
}
