//! Signed access tokens.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use openwaitlist_core::UserId;

use super::AuthError;
use crate::models::CurrentUser;

/// Issuer written to and required in every token.
pub const TOKEN_ISSUER: &str = "openwaitlist";

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject; the user's email.
    pub sub: String,
    /// Stringified user ID. Older tokens may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// The user ID claim, if present and numeric.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id.as_deref().and_then(|id| id.parse().ok())
    }

    /// The email claim, falling back to the subject.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.sub)
    }
}

/// HS256 token issuer and verifier.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("keys", &"[REDACTED]")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString, lifetime: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime,
        }
    }

    /// Sign a token for `user`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if encoding fails.
    pub fn issue(&self, user: &CurrentUser) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let lifetime = i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX);
        let email = user.email.as_ref().map(|e| e.as_str().to_owned());
        let claims = Claims {
            sub: email.clone().unwrap_or_else(|| user.id.to_string()),
            user_id: Some(user.id.to_string()),
            email,
            iss: TOKEN_ISSUER.to_owned(),
            iat: now,
            exp: now.saturating_add(lifetime),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(AuthError::Token)
    }

    /// Verify signature, issuer and expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any token that fails validation.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                AuthError::InvalidToken
            })
    }
}
