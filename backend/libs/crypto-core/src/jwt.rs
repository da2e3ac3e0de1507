/// Shared JWT module for blog services
///
/// Tokens are signed with HS256 using a secret loaded from configuration.
/// The issuing side (login) and the validating side (every authenticated
/// request) share one `JwtManager` built at startup.
///
/// ## Usage
///
/// ```rust
/// use crypto_core::jwt::JwtManager;
/// use uuid::Uuid;
///
/// let manager = JwtManager::new(&"s".repeat(32), "blog-service", 24).unwrap();
/// let token = manager
///     .generate_access_token(Uuid::new_v4(), "a@example.com", "alice", "regular_user")
///     .unwrap();
/// let claims = manager.validate_token(&token).unwrap().claims;
/// assert_eq!(claims.username, "alice");
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// JWT algorithm used for every blog token
const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Minimum secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

const ACCESS_TOKEN_TYPE: &str = "access";

// ============================================================================
// Data Structures
// ============================================================================

/// JWT Claims structure - standard claims plus identity fields
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type, always "access" for now
    pub token_type: String,
    /// Role name in snake_case ("regular_user", "moderator", "admin")
    pub role: String,
    pub email: String,
    pub username: String,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret too short: {0} bytes, need at least 32")]
    WeakSecret(usize),

    #[error("Failed to generate token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("Token validation failed: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

// ============================================================================
// Manager
// ============================================================================

/// Holds the signing keys and token policy
///
/// Keys are built once at startup and never modified. Cloning is cheap
/// enough to hand a copy to every worker.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expiry_hours: i64,
}

impl JwtManager {
    /// Build a manager from a shared secret
    ///
    /// ## Errors
    ///
    /// Returns `JwtError::WeakSecret` if the secret is shorter than 32 bytes.
    pub fn new(secret: &str, issuer: impl Into<String>, expiry_hours: i64) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::WeakSecret(secret.len()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            expiry_hours,
        })
    }

    /// Lifetime of access tokens in seconds
    pub fn expires_in_secs(&self) -> i64 {
        self.expiry_hours * 3600
    }

    // ========================================================================
    // Token Generation
    // ========================================================================

    /// Generate a new access token
    ///
    /// ## Arguments
    ///
    /// * `user_id` - User's UUID, stored as `sub`
    /// * `email` - User's email address
    /// * `username` - User's username
    /// * `role` - Role name as stored in the `role` claim
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        email: &str,
        username: &str,
        role: &str,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.expiry_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            role: role.to_string(),
            email: email.to_string(),
            username: username.to_string(),
        };

        self.encode_claims(&claims)
    }

    /// Sign an arbitrary claims set with this manager's key
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(JWT_ALGORITHM), claims, &self.encoding_key).map_err(JwtError::Encode)
    }

    // ========================================================================
    // Token Validation
    // ========================================================================

    /// Validate and decode a JWT token
    ///
    /// Verifies the HS256 signature, expiration and issuer. The token must be
    /// passed without the "Bearer " prefix.
    pub fn validate_token(&self, token: &str) -> Result<TokenData<Claims>, JwtError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.set_issuer(&[self.issuer.as_str()]);

        decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            JwtError::Invalid(e)
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
