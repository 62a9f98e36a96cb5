//! Wire types for the auth endpoints. Backend field-name variance is
//! absorbed here as serde alias tables so the rest of the crate sees one
//! canonical shape. These payloads carry credentials and token material and
//! must never be logged.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub admin_name: &'a str,
    pub admin_password: &'a str,
}

/// Reply to `/admin/login`: one of the final-token, two-factor-required, or
/// failure shapes, flattened into optional fields.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginReply {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub two_factor_required: Option<bool>,
    /// Pre-auth token under any of its observed spellings.
    #[serde(default, alias = "preauthToken", alias = "preAuth")]
    pub pre_auth_token: Option<String>,
    #[serde(default)]
    pub two_factor_enabled: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest<'a> {
    pub pre_auth_token: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpReply {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply to `/2fa/generate`, normalizing the secret/URI spellings seen
/// across backend versions.
#[derive(Debug, Default, Deserialize)]
pub struct TwoFactorGenerateReply {
    #[serde(default, alias = "secretKey", alias = "secret_key")]
    pub secret: Option<String>,
    #[serde(
        default,
        rename = "otpAuthUrl",
        alias = "otpAuthURL",
        alias = "otpauth_url",
        alias = "otp_url"
    )]
    pub otp_auth_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfirmTwoFactorRequest<'a> {
    pub code: &'a str,
}

/// Reply to the authenticated `/admin/me` profile endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeReply {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub two_factor_enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub admin_name: &'a str,
    pub admin_password: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest<'a> {
    pub admin_name: &'a str,
    pub new_password: &'a str,
}

/// A freshly generated, not-yet-confirmed second factor. Transient: it is
/// discarded with the enrollment screen and carries no authority on its
/// own — activation lives server-side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TwoFactorEnrollment {
    /// Raw shared secret, shown to the user as a manual-entry fallback.
    pub secret: String,
    /// Standard otpauth provisioning URI encoding issuer, account, and
    /// secret.
    pub provisioning_uri: String,
    /// True only once the backend has accepted a valid one-time code.
    pub confirmed: bool,
}

#[cfg(test)]
mod tests {
    use super::{LoginReply, LoginRequest, MeReply, TwoFactorGenerateReply};

    #[test]
    fn login_request_serializes_to_camel_case() {
        let json = serde_json::to_value(LoginRequest {
            admin_name: "asha",
            admin_password: "pw",
        })
        .expect("serialize");
        assert_eq!(json["adminName"], "asha");
        assert_eq!(json["adminPassword"], "pw");
    }

    #[test]
    fn login_reply_accepts_pre_auth_aliases() {
        for key in ["preAuthToken", "preauthToken", "preAuth"] {
            let raw = format!(r#"{{"twoFactorRequired":true,"{key}":"p1"}}"#);
            let reply: LoginReply = serde_json::from_str(&raw).expect("deserialize");
            assert_eq!(reply.two_factor_required, Some(true), "{key}");
            assert_eq!(reply.pre_auth_token.as_deref(), Some("p1"), "{key}");
        }
    }

    #[test]
    fn generate_reply_accepts_secret_aliases() {
        for key in ["secret", "secretKey", "secret_key"] {
            let raw = format!(r#"{{"{key}":"JBSWY3DP"}}"#);
            let reply: TwoFactorGenerateReply = serde_json::from_str(&raw).expect("deserialize");
            assert_eq!(reply.secret.as_deref(), Some("JBSWY3DP"), "{key}");
        }
    }

    #[test]
    fn generate_reply_accepts_uri_aliases() {
        for key in ["otpAuthUrl", "otpAuthURL", "otpauth_url", "otp_url"] {
            let raw = format!(r#"{{"{key}":"otpauth://totp/x?secret=A"}}"#);
            let reply: TwoFactorGenerateReply = serde_json::from_str(&raw).expect("deserialize");
            assert_eq!(
                reply.otp_auth_url.as_deref(),
                Some("otpauth://totp/x?secret=A"),
                "{key}"
            );
        }
    }

    #[test]
    fn me_reply_tolerates_missing_flag() {
        let reply: MeReply = serde_json::from_str(r#"{"username":"asha"}"#).expect("deserialize");
        assert_eq!(reply.two_factor_enabled, None);
    }
}
