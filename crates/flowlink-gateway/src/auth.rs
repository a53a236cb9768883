//! Authentication handling
//!
//! `login` exchanges the configured username/password for an HS256 bearer
//! token. Incoming bearer tokens are verified into an [`Identity`]; an
//! invalid or expired token simply yields no identity. [`check`] is the
//! access gate consulted before any resolution.

use flowlink_core::{AuthConfig, AuthMode, Error, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() { return false; }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// An authenticated caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

impl Identity {
    /// Identity handed out when auth mode is `none`.
    pub fn anonymous() -> Self {
        Self { username: "anonymous".into() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    username: String,
    iat: i64,
    exp: i64,
}

/// Access gate: only a present identity may proceed to resolution.
pub fn check(identity: Option<&Identity>) -> Result<&Identity> {
    identity.ok_or(Error::Unauthorized)
}

#[derive(Clone)]
pub struct ResolvedAuth {
    pub mode: AuthMode,
    username: String,
    password: String,
    secret: String,
    ttl_secs: i64,
}

impl ResolvedAuth {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            mode: config.mode.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            secret: config.secret.clone(),
            ttl_secs: i64::try_from(config.token_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token if `username`/`password` exactly match the configured credentials.
    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        let user_ok = constant_time_eq(self.username.as_bytes(), username.as_bytes());
        let pass_ok = constant_time_eq(self.password.as_bytes(), password.as_bytes());
        if !(user_ok && pass_ok) {
            return Err(Error::InvalidCredentials);
        }
        self.issue_token(username, chrono::Utc::now().timestamp())
    }

    /// Sign a token for `username` issued at `issued_at` (Unix seconds).
    pub fn issue_token(&self, username: &str, issued_at: i64) -> Result<String> {
        let claims = Claims {
            username: username.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl_secs),
        };
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| Error::TokenError(e.to_string()))
    }

    /// Verify a bearer token; bad signature, expiry or garbage all yield `None`.
    pub fn verify_token(&self, token: &str) -> Option<Identity> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        match jsonwebtoken::decode::<Claims>(token, &key, &validation) {
            Ok(data) => Some(Identity { username: data.claims.username }),
            Err(e) => {
                tracing::debug!("rejected bearer token: {}", e);
                None
            }
        }
    }

    /// Derive the caller's identity from an `Authorization` header value.
    pub fn identity_from_header(&self, header: Option<&str>) -> Option<Identity> {
        match self.mode {
            AuthMode::None => Some(Identity::anonymous()),
            AuthMode::Token => {
                let token = header?.strip_prefix("Bearer ")?;
                self.verify_token(token.trim())
            }
        }
    }
}
