//! JWT access-token generation and validation.
//!
//! Access tokens are HS256-signed JWTs containing a [`Claims`] payload. They
//! are stateless: nothing about them is stored server-side. Refresh tokens are
//! opaque random strings handled by the auth service, never JWTs.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use notekeep_core::access::Principal;
use notekeep_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// Normalized username; notes are owned by username.
    pub username: String,
    /// Role names granted to the user (e.g. `["admin", "user"]`).
    pub roles: Vec<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
    /// Issuer, checked on validation.
    pub iss: String,
}

impl Claims {
    pub fn into_principal(self) -> Principal {
        Principal {
            user_id: self.sub,
            username: self.username,
            roles: self.roles,
        }
    }
}

/// Configuration for JWT token generation and validation.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Value of the `iss` claim.
    pub issuer: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 7).
    pub refresh_token_expiry_days: i64,
    /// Refresh token lifetime in days for "remember me" logins (default: 30).
    pub remember_me_expiry_days: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("access_token_expiry_mins", &self.access_token_expiry_mins)
            .field("refresh_token_expiry_days", &self.refresh_token_expiry_days)
            .field("remember_me_expiry_days", &self.remember_me_expiry_days)
            .finish()
    }
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;
/// Default "remember me" refresh token expiry in days.
const DEFAULT_REMEMBER_ME_EXPIRY_DAYS: i64 = 30;
/// Default `iss` claim.
const DEFAULT_ISSUER: &str = "notekeep";

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                       | Required | Default    |
    /// |-------------------------------|----------|------------|
    /// | `JWT_SECRET`                  | **yes**  | --         |
    /// | `JWT_ISSUER`                  | no       | `notekeep` |
    /// | `JWT_ACCESS_EXPIRY_MINS`      | no       | `15`       |
    /// | `JWT_REFRESH_EXPIRY_DAYS`     | no       | `7`        |
    /// | `JWT_REMEMBER_ME_EXPIRY_DAYS` | no       | `30`       |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let issuer = std::env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.into());

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("JWT_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_DAYS must be a valid i64");

        let remember_me_expiry_days: i64 = std::env::var("JWT_REMEMBER_ME_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REMEMBER_ME_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_REMEMBER_ME_EXPIRY_DAYS must be a valid i64");

        Self {
            secret,
            issuer,
            access_token_expiry_mins,
            refresh_token_expiry_days,
            remember_me_expiry_days,
        }
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    /// Refresh token lifetime; longer when the user asked to be remembered.
    pub fn refresh_ttl(&self, remember_me: bool) -> chrono::Duration {
        if remember_me {
            chrono::Duration::days(self.remember_me_expiry_days)
        } else {
            chrono::Duration::days(self.refresh_token_expiry_days)
        }
    }
}

/// Generate an HS256 access token for the given user.
pub fn generate_access_token(
    user_id: DbId,
    username: &str,
    roles: &[String],
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        roles: roles.to_vec(),
        exp: now + config.access_ttl_secs(),
        iat: now,
        jti: Uuid::new_v4().to_string(),
        iss: config.issuer.clone(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Checks the signature, expiration and issuer.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default(); // HS256, validates exp
    validation.set_issuer(&[config.issuer.as_str()]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}
