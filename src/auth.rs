use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use std::time::Duration;

use crate::config::AppConfig;

/// Every path at or below this prefix is an admin page.
pub const ADMIN_PREFIX: &str = "/admin";

/// The only admin path reachable without a session.
pub const LOGIN_PATH: &str = "/admin/login";

/// GateDecision
///
/// Outcome of the admin gate for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    PassThrough,
    RedirectToLogin,
}

/// Joins every `Cookie` header on the request into one `a=1; b=2` string.
/// HTTP/2 clients may split cookies across several header lines.
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Returns the value of cookie `name`, if the header carries it. Malformed pairs are skipped.
pub fn session_cookie(cookie_header: Option<&str>, name: &str) -> Option<String> {
    Cookie::split_parse(cookie_header?)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// is_authenticated
///
/// Presence check: a non-empty cookie named `name` counts as a session. The value is
/// not inspected (see `verify_session_token` for the strict mode).
pub fn is_authenticated(cookie_header: Option<&str>, name: &str) -> bool {
    session_cookie(cookie_header, name).is_some_and(|value| !value.is_empty())
}

pub fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PREFIX || path.starts_with("/admin/")
}

fn is_login_path(path: &str) -> bool {
    path.trim_end_matches('/') == LOGIN_PATH
}

/// gate_decision
///
/// Redirects unauthenticated requests for any admin path except the login page.
/// Everything outside `/admin` passes untouched.
pub fn gate_decision(path: &str, authenticated: bool) -> GateDecision {
    if authenticated || !is_admin_path(path) || is_login_path(path) {
        GateDecision::PassThrough
    } else {
        GateDecision::RedirectToLogin
    }
}

/// Compares a submitted credential with the configured one in constant time.
/// Both sides are hashed first so the comparison does not leak their lengths either.
pub fn credential_matches(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided.ct_eq(&expected).into()
}

// --- Session Tokens (strict mode) ---

/// SessionClaims
///
/// Payload of the session token written into the admin cookie at login.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The admin username that logged in.
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Signs an HS256 session token for `username`, valid for `ttl`.
pub fn issue_session_token(
    username: &str,
    secret: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp().max(0) as usize;
    let claims = SessionClaims {
        sub: username.to_string(),
        iat: now,
        exp: now + ttl.as_secs() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// True when `token` carries a valid signature for `secret` and has not expired.
pub fn verify_session_token(token: &str, secret: &str) -> bool {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("rejected admin session token: {:?}", e.kind());
            false
        }
    }
}

/// Whether the request headers carry an admin session under the configured rules.
pub fn request_is_authenticated(headers: &HeaderMap, config: &AppConfig) -> bool {
    let cookies = cookie_header(headers);
    if config.admin_session_strict {
        session_cookie(cookies.as_deref(), &config.admin_cookie_name)
            .is_some_and(|token| verify_session_token(&token, &config.session_secret))
    } else {
        is_authenticated(cookies.as_deref(), &config.admin_cookie_name)
    }
}

// --- Set-Cookie Builders ---

/// `Set-Cookie` value that stores `value` as the admin session for `ttl`.
pub fn session_set_cookie(name: &str, value: &str, ttl: Duration, secure: bool) -> String {
    Cookie::build((name.to_string(), value.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::seconds(ttl.as_secs() as i64))
        .build()
        .to_string()
}

/// `Set-Cookie` value that expires the admin session immediately.
pub fn session_clear_cookie(name: &str) -> String {
    Cookie::build((name.to_string(), String::new()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::ZERO)
        .build()
        .to_string()
}

/// admin_gate
///
/// Router-wide middleware applying `gate_decision` to the full request path.
pub async fn admin_gate(
    State(config): State<AppConfig>,
    request: Request,
    next: Next,
) -> Response {
    let authenticated = request_is_authenticated(request.headers(), &config);

    match gate_decision(request.uri().path(), authenticated) {
        GateDecision::PassThrough => next.run(request).await,
        GateDecision::RedirectToLogin => {
            tracing::debug!(path = %request.uri().path(), "no admin session, redirecting to login");
            Redirect::temporary(LOGIN_PATH).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_named_cookie_among_others() {
        let header = Some("theme=dark; admin_session=abc; lang=en");
        assert_eq!(
            session_cookie(header, "admin_session").as_deref(),
            Some("abc")
        );
        assert!(is_authenticated(header, "admin_session"));
    }

    #[test]
    fn empty_cookie_value_is_not_a_session() {
        assert!(!is_authenticated(Some("admin_session="), "admin_session"));
        assert!(!is_authenticated(None, "admin_session"));
    }

    #[test]
    fn login_with_trailing_slash_is_exempt() {
        assert_eq!(
            gate_decision("/admin/login/", false),
            GateDecision::PassThrough
        );
    }

    #[test]
    fn credentials_compare_exactly() {
        assert!(credential_matches("hunter2", "hunter2"));
        assert!(!credential_matches("hunter", "hunter2"));
        assert!(!credential_matches("", "hunter2"));
    }

    #[test]
    fn lookalike_prefix_is_not_admin() {
        assert!(!is_admin_path("/administrator"));
        assert!(is_admin_path("/admin"));
    }
}
