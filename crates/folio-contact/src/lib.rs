//! Contact form handling.
//!
//! A submission is a JSON object `{name, email, subject, message,
//! captchaToken}`. The handler validates it, optionally verifies the CAPTCHA
//! token, logs the message and answers with an HTTP-style status plus a JSON
//! body.

mod captcha;

pub use captcha::{CaptchaVerifier, HCaptchaVerifier};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unexpected failures; these become a 500 response.
#[derive(Debug)]
pub enum ContactError {
    /// The request body was not JSON.
    Payload(serde_json::Error),
    /// The request body was the JSON literal `null`.
    NullBody,
    /// The verification service could not be reached or answered with an error.
    Transport(ureq::Error),
    /// The verification service replied with something other than the expected JSON.
    Decode(serde_json::Error),
}

impl fmt::Display for ContactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactError::Payload(e) => write!(f, "invalid request body: {e}"),
            ContactError::NullBody => f.write_str("request body is null"),
            ContactError::Transport(e) => write!(f, "captcha verification failed: {e}"),
            ContactError::Decode(e) => write!(f, "unexpected captcha reply: {e}"),
        }
    }
}

impl std::error::Error for ContactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContactError::Payload(e) | ContactError::Decode(e) => Some(e),
            ContactError::Transport(e) => Some(e),
            ContactError::NullBody => None,
        }
    }
}

/// A contact form submission. Every field may be missing on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "captchaToken")]
    pub captcha_token: Option<String>,
}

/// The required fields of a submission, all present and non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactFields<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub subject: &'a str,
    pub message: &'a str,
}

impl ContactSubmission {
    /// The required fields, or `None` if any is missing or empty.
    pub fn fields(&self) -> Option<ContactFields<'_>> {
        fn present(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|s| !s.is_empty())
        }

        Some(ContactFields {
            name: present(&self.name)?,
            email: present(&self.email)?,
            subject: present(&self.subject)?,
            message: present(&self.message)?,
        })
    }

    fn token(&self) -> Option<&str> {
        self.captcha_token.as_deref().filter(|s| !s.is_empty())
    }
}

/// How a submission was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    MissingFields,
    InvalidCaptcha,
    Internal,
}

impl Outcome {
    /// HTTP status code for this outcome.
    pub fn status(self) -> u16 {
        match self {
            Outcome::Sent => 200,
            Outcome::MissingFields | Outcome::InvalidCaptcha => 400,
            Outcome::Internal => 500,
        }
    }

    /// The full reply for this outcome.
    pub fn response(self) -> ContactResponse {
        let body = match self {
            Outcome::Sent => ResponseBody::Message {
                message: "Message sent successfully".to_string(),
            },
            Outcome::MissingFields => ResponseBody::Error {
                error: "Missing required fields".to_string(),
            },
            Outcome::InvalidCaptcha => ResponseBody::Error {
                error: "Invalid CAPTCHA".to_string(),
            },
            Outcome::Internal => ResponseBody::Error {
                error: "Internal server error".to_string(),
            },
        };
        ContactResponse {
            status: self.status(),
            body,
        }
    }
}

/// JSON body of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Message { message: String },
    Error { error: String },
}

/// An HTTP-style reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ContactResponse {
    /// Whether the submission was accepted.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// The body as a JSON string.
    pub fn body_json(&self) -> String {
        serde_json::to_string(&self.body).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Validates, verifies and logs contact submissions.
pub struct ContactHandler {
    verifier: Option<Box<dyn CaptchaVerifier>>,
}

impl fmt::Debug for ContactHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactHandler")
            .field("verifies_captcha", &self.verifier.is_some())
            .finish()
    }
}

impl Default for ContactHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactHandler {
    /// A handler that skips CAPTCHA verification.
    pub fn new() -> Self {
        Self { verifier: None }
    }

    /// A handler that requires every submission to pass `verifier`.
    pub fn with_verifier(verifier: impl CaptchaVerifier + 'static) -> Self {
        Self {
            verifier: Some(Box::new(verifier)),
        }
    }

    /// Handle a raw JSON request body.
    pub fn handle(&self, body: &str) -> ContactResponse {
        match self.process(body) {
            Ok(outcome) => outcome.response(),
            Err(e) => {
                tracing::error!(error = %e, "contact form error");
                Outcome::Internal.response()
            }
        }
    }

    /// Resolve a raw JSON request body. Errors are unexpected failures.
    ///
    /// Fields are looked up by name, so only a JSON object can carry them;
    /// any other value is missing every field. A `null` body is an error.
    pub fn process(&self, body: &str) -> Result<Outcome, ContactError> {
        let value: serde_json::Value = serde_json::from_str(body).map_err(ContactError::Payload)?;
        let object = match value {
            serde_json::Value::Object(object) => object,
            serde_json::Value::Null => return Err(ContactError::NullBody),
            _ => {
                tracing::debug!("contact body is not a JSON object");
                return Ok(Outcome::MissingFields);
            }
        };
        let submission: ContactSubmission = match serde_json::from_value(object.into()) {
            Ok(submission) => submission,
            Err(e) => {
                tracing::debug!(error = %e, "malformed contact fields");
                return Ok(Outcome::MissingFields);
            }
        };
        self.submit(&submission)
    }

    /// Resolve an already-parsed submission.
    pub fn submit(&self, submission: &ContactSubmission) -> Result<Outcome, ContactError> {
        let Some(fields) = submission.fields() else {
            return Ok(Outcome::MissingFields);
        };

        if let Some(verifier) = &self.verifier {
            let accepted = match submission.token() {
                Some(token) => verifier.verify(token)?,
                None => false,
            };
            if !accepted {
                tracing::warn!(email = fields.email, "contact form captcha rejected");
                return Ok(Outcome::InvalidCaptcha);
            }
        }

        tracing::info!(
            name = fields.name,
            email = fields.email,
            subject = fields.subject,
            body = fields.message,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "contact form submission"
        );
        Ok(Outcome::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Verifier with a fixed answer that counts its calls.
    struct Fixed {
        accept: bool,
        calls: Rc<Cell<u32>>,
    }

    impl Fixed {
        fn new(accept: bool) -> (Self, Rc<Cell<u32>>) {
            let calls = Rc::new(Cell::new(0));
            (
                Self {
                    accept,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl CaptchaVerifier for Fixed {
        fn verify(&self, _token: &str) -> Result<bool, ContactError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.accept)
        }
    }

    struct Unreachable;

    impl CaptchaVerifier for Unreachable {
        fn verify(&self, _token: &str) -> Result<bool, ContactError> {
            let e = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
            Err(ContactError::Decode(e))
        }
    }

    const COMPLETE: &str = r#"{
        "name": "Ada",
        "email": "ada@example.com",
        "subject": "Hello",
        "message": "Nice site",
        "captchaToken": "10000000-aaaa-bbbb-cccc-000000000001"
    }"#;

    #[test]
    fn test_missing_email_is_400() {
        let handler = ContactHandler::new();
        let response =
            handler.handle(r#"{"name": "Ada", "subject": "Hello", "message": "Nice site"}"#);
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body,
            ResponseBody::Error {
                error: "Missing required fields".to_string()
            }
        );
        assert_eq!(response.body_json(), r#"{"error":"Missing required fields"}"#);
    }

    #[test]
    fn test_empty_field_is_missing() {
        let handler = ContactHandler::new();
        let response = handler.handle(
            r#"{"name": "", "email": "a@b.c", "subject": "Hi", "message": "Yo"}"#,
        );
        assert_eq!(response.status, 400);
    }

    #[test]
    fn test_no_secret_skips_captcha() {
        let handler = ContactHandler::new();
        let response = handler.handle(COMPLETE);
        assert!(response.is_success());
        assert_eq!(response.body_json(), r#"{"message":"Message sent successfully"}"#);
    }

    #[test]
    fn test_failed_captcha_is_400() {
        let (verifier, calls) = Fixed::new(false);
        let handler = ContactHandler::with_verifier(verifier);
        let response = handler.handle(COMPLETE);
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body,
            ResponseBody::Error {
                error: "Invalid CAPTCHA".to_string()
            }
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_passed_captcha_is_200() {
        let (verifier, calls) = Fixed::new(true);
        let handler = ContactHandler::with_verifier(verifier);
        assert_eq!(handler.handle(COMPLETE).status, 200);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_missing_token_rejected_without_call() {
        let (verifier, calls) = Fixed::new(true);
        let handler = ContactHandler::with_verifier(verifier);
        let response = handler.handle(
            r#"{"name": "Ada", "email": "a@b.c", "subject": "Hi", "message": "Yo"}"#,
        );
        assert_eq!(response.status, 400);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_validation_runs_before_captcha() {
        let (verifier, calls) = Fixed::new(true);
        let handler = ContactHandler::with_verifier(verifier);
        let response = handler.handle(r#"{"captchaToken": "abc"}"#);
        assert_eq!(response.status, 400);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_invalid_json_is_500() {
        let handler = ContactHandler::new();
        let response = handler.handle("name=Ada");
        assert_eq!(response.status, 500);
        assert_eq!(response.body_json(), r#"{"error":"Internal server error"}"#);
    }

    #[test]
    fn test_verifier_failure_is_500() {
        let handler = ContactHandler::with_verifier(Unreachable);
        assert_eq!(handler.handle(COMPLETE).status, 500);
    }

    #[test]
    fn test_array_body_is_400() {
        let handler = ContactHandler::new();
        let response = handler.handle(r#"["Ada", "a@b.c", "Hi", "Yo"]"#);
        assert_eq!(response.status, 400);
        assert_eq!(response.body_json(), r#"{"error":"Missing required fields"}"#);
        assert_eq!(handler.handle(r#""Ada""#).status, 400);
        assert_eq!(handler.handle("42").status, 400);
    }

    #[test]
    fn test_null_body_is_500() {
        let handler = ContactHandler::new();
        assert!(matches!(handler.process("null"), Err(ContactError::NullBody)));
        let response = handler.handle("null");
        assert_eq!(response.status, 500);
        assert_eq!(response.body_json(), r#"{"error":"Internal server error"}"#);
    }

    #[derive(Clone, Default)]
    struct SharedBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_submission_log_quotes_message_body() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let response = tracing::subscriber::with_default(subscriber, || {
            ContactHandler::new().handle(
                r#"{"name": "Ada", "email": "a@b.c", "subject": "Hi", "message": "Nice site\nlevel=ERROR"}"#,
            )
        });
        assert!(response.is_success());

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.lines().count(), 1, "{output}");
        assert!(output.contains("contact form submission"));
        assert!(output.contains(r#"body="Nice site\nlevel=ERROR""#), "{output}");
    }

    #[test]
    fn test_wrong_field_type_is_400() {
        let handler = ContactHandler::new();
        let response = handler.handle(
            r#"{"name": 5, "email": "a@b.c", "subject": "Hi", "message": "Yo"}"#,
        );
        assert_eq!(response.status, 400);
    }
}
