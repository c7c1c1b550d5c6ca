//! CAPTCHA token verification.

use std::time::Duration;

use serde::Deserialize;

use crate::ContactError;

/// Checks a CAPTCHA token with some verification service.
pub trait CaptchaVerifier {
    /// `Ok(true)` if the service accepted the token.
    fn verify(&self, token: &str) -> Result<bool, ContactError>;
}

/// Site-verify reply (partial - only fields we need).
#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Verifies tokens against an hCaptcha-compatible `siteverify` endpoint.
#[derive(Debug)]
pub struct HCaptchaVerifier {
    secret: String,
    endpoint: String,
    agent: ureq::Agent,
}

impl HCaptchaVerifier {
    /// Verifier posting to `endpoint` with `secret`; each request gives up after `timeout`.
    pub fn new(secret: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .new_agent();

        Self {
            secret: secret.into(),
            endpoint: endpoint.into(),
            agent,
        }
    }
}

impl CaptchaVerifier for HCaptchaVerifier {
    fn verify(&self, token: &str) -> Result<bool, ContactError> {
        let body = self
            .agent
            .post(&self.endpoint)
            .send_form([("response", token), ("secret", self.secret.as_str())])
            .map_err(ContactError::Transport)?
            .body_mut()
            .read_to_string()
            .map_err(ContactError::Transport)?;

        let reply: SiteVerifyResponse = serde_json::from_str(&body).map_err(ContactError::Decode)?;
        if !reply.success {
            tracing::debug!(errors = ?reply.error_codes, "captcha rejected");
        }
        Ok(reply.success)
    }
}
