//! Signs, validates and refreshes HS256 bearer tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::warn;
use uuid::Uuid;

use keyward_core::config::AuthConfig;
use keyward_core::config::auth::DEFAULT_JWT_SECRET;
use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_entity::session::IssuedToken;

use super::claims::Claims;

/// Issues and validates signed bearer tokens with a fixed TTL.
///
/// Every operation has an `*_at` variant taking the current instant, so
/// expiry behaviour can be exercised without waiting on the wall clock.
#[derive(Clone)]
pub struct TokenIssuer {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Signature-only validation; expiry is checked against the caller's clock.
    validation: Validation,
    /// Token lifetime.
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    /// Creates an issuer from auth configuration.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        if config.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if config.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("auth.jwt_secret is the shipped default; tokens are forgeable until it is changed");
        }
        if config.token_ttl_seconds == 0 {
            return Err(AppError::configuration("auth.token_ttl_seconds must be positive"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            ttl: Duration::seconds(config.token_ttl_seconds as i64),
        })
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for the given subject.
    pub fn issue(&self, subject_id: i64, subject_name: &str) -> AppResult<IssuedToken> {
        self.issue_at(subject_id, subject_name, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject_id: i64,
        subject_name: &str,
        now: DateTime<Utc>,
    ) -> AppResult<IssuedToken> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: subject_id,
            username: subject_name.to_string(),
            iat,
            exp: iat + self.ttl.num_seconds(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok(IssuedToken::bearer(token, claims.expires_at()))
    }

    /// Verifies signature and expiry.
    pub fn validate(&self, token: &str) -> AppResult<Claims> {
        self.validate_at(token, Utc::now())
    }

    /// Verifies signature and that `now` is strictly before `exp`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> AppResult<Claims> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    JwtErrorKind::InvalidToken => AppError::invalid_token("Invalid token format"),
                    JwtErrorKind::InvalidSignature => {
                        AppError::invalid_token("Invalid token signature")
                    }
                    _ => AppError::invalid_token(format!("Token validation failed: {e}")),
                }
            })?;

        let claims = token_data.claims;
        if claims.is_expired_at(now) {
            return Err(AppError::invalid_token("Token has expired"));
        }
        Ok(claims)
    }

    /// Issues a new token for the identity in a still-valid `old_token`.
    ///
    /// The old token is not revoked.
    pub fn refresh(&self, old_token: &str) -> AppResult<IssuedToken> {
        self.refresh_at(old_token, Utc::now())
    }

    /// [`refresh`](Self::refresh) at an explicit instant.
    pub fn refresh_at(&self, old_token: &str, now: DateTime<Utc>) -> AppResult<IssuedToken> {
        let claims = self.validate_at(old_token, now)?;
        self.issue_at(claims.sub, &claims.username, now)
    }

    /// Returns `true` when a valid token has less than a sixth of its TTL left.
    pub fn is_expiring_soon(&self, token: &str) -> bool {
        self.is_expiring_soon_at(token, Utc::now())
    }

    /// [`is_expiring_soon`](Self::is_expiring_soon) at an explicit instant.
    pub fn is_expiring_soon_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        match self.validate_at(token, now) {
            Ok(claims) => claims.remaining_seconds_at(now) * 6 < self.ttl.num_seconds(),
            Err(_) => false,
        }
    }
}
