//! The `contact` command: answer one contact form submission.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use folio_config::ContactConfig;
use folio_contact::{ContactHandler, ContactResponse, HCaptchaVerifier};

/// Build a handler; CAPTCHA verification is enabled only when a secret is set.
pub fn build_handler(config: &ContactConfig) -> ContactHandler {
    match config.captcha_secret.as_deref().filter(|s| !s.is_empty()) {
        Some(secret) => ContactHandler::with_verifier(HCaptchaVerifier::new(
            secret,
            config.verify_url.as_str(),
            config.timeout(),
        )),
        None => {
            tracing::debug!("no captcha secret configured, skipping verification");
            ContactHandler::new()
        }
    }
}

/// Read a JSON body from `file` (or stdin), handle it and print the reply.
pub fn run(config: &ContactConfig, file: Option<&Path>) -> Result<ContactResponse> {
    let body = match file {
        Some(path) => fs::read_to_string(path)
            .wrap_err_with(|| format!("could not read {}", path.display()))?,
        None => {
            let mut body = String::new();
            io::stdin()
                .read_to_string(&mut body)
                .wrap_err("could not read request body from stdin")?;
            body
        }
    };

    let response = build_handler(config).handle(&body);
    println!("{}", response.status);
    println!("{}", response.body_json());
    Ok(response)
}
