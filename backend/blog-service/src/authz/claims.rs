/// Token claims reader
///
/// Turns an opaque bearer token into an `Actor`. Any failure (missing token,
/// bad signature, expiry, malformed subject, unknown role) is
/// `AppError::InvalidToken`.
use crypto_core::JwtManager;
use uuid::Uuid;

use super::{Actor, Role};
use crate::error::{AppError, Result};

pub trait ClaimsReader: Send + Sync {
    fn read_actor(&self, token: Option<&str>) -> Result<Actor>;
}

impl ClaimsReader for JwtManager {
    fn read_actor(&self, token: Option<&str>) -> Result<Actor> {
        let token = token
            .map(|t| t.strip_prefix("Bearer ").unwrap_or(t).trim())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::InvalidToken("missing bearer token".to_string()))?;

        let claims = self.validate_token(token)?.claims;

        let subject_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::InvalidToken("subject is not a user id".to_string()))?;
        let role: Role = claims.role.parse()?;

        Ok(Actor::new(subject_id, role))
    }
}
