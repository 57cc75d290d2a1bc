use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::config::AppConfig;

/// CaptchaError
#[derive(Debug, Error)]
pub enum CaptchaError {
    /// No server secret is configured, so no token can be checked.
    #[error("reCAPTCHA secret key is not configured")]
    MissingSecret,
    /// The verification call failed (connect, timeout, non-JSON body, ...).
    #[error("reCAPTCHA verification request failed: {0}")]
    Request(#[from] reqwest::Error),
}

// 1. CaptchaVerifier Contract
/// CaptchaVerifier
///
/// Checks a client-supplied token with the captcha provider. The contact handler only
/// depends on this trait, so tests swap in `MockCaptchaVerifier` and never touch the
/// network.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Returns the provider's `success` flag for `token`.
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, CaptchaError>;
}

/// SiteVerifyResponse
///
/// The fields of the siteverify JSON we read. Score and hostname are ignored.
#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

// 2. The Real Implementation (Google reCAPTCHA)
/// RecaptchaClient
///
/// POSTs the token to the siteverify endpoint as a form, the way the provider expects.
#[derive(Clone)]
pub struct RecaptchaClient {
    http: reqwest::Client,
    verify_url: String,
    secret: Option<String>,
}

impl RecaptchaClient {
    pub fn new(verify_url: &str, secret: Option<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("falling back to a default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            http,
            verify_url: verify_url.to_string(),
            secret,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.recaptcha_verify_url,
            config.recaptcha_secret.clone(),
            config.recaptcha_timeout,
        )
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaClient {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, CaptchaError> {
        let secret = self.secret.as_deref().ok_or(CaptchaError::MissingSecret)?;

        let mut form = vec![("secret", secret), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        let body = self
            .http
            .post(&self.verify_url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json::<SiteVerifyResponse>()
            .await?;

        if !body.success {
            tracing::info!(error_codes = ?body.error_codes, "reCAPTCHA rejected a token");
        }

        Ok(body.success)
    }
}

// 3. The Mock Implementation (For Tests)
/// MockCaptchaVerifier
///
/// Answers with a fixed outcome and counts how often it was asked, so tests can assert
/// that validation failures never reach the provider.
#[derive(Clone, Default)]
pub struct MockCaptchaVerifier {
    /// Outcome returned for every token.
    pub accept: bool,
    /// When true, behaves like a verifier with no secret configured.
    pub missing_secret: bool,
    calls: Arc<AtomicUsize>,
}

impl MockCaptchaVerifier {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            ..Self::default()
        }
    }

    pub fn rejecting() -> Self {
        Self::default()
    }

    pub fn without_secret() -> Self {
        Self {
            missing_secret: true,
            ..Self::default()
        }
    }

    /// Number of `verify` calls so far, shared between clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptchaVerifier for MockCaptchaVerifier {
    async fn verify(&self, _token: &str, _remote_ip: Option<&str>) -> Result<bool, CaptchaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.missing_secret {
            return Err(CaptchaError::MissingSecret);
        }
        Ok(self.accept)
    }
}

/// CaptchaState
///
/// The shared handle stored in `AppState`.
pub type CaptchaState = Arc<dyn CaptchaVerifier>;
