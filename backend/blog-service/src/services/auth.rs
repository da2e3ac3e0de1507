/// Auth service - credential checks and token issuing
use std::sync::Arc;

use crypto_core::{verify_password, JwtManager};

use super::ServiceContext;
use crate::error::{AppError, Result};
use crate::models::{AuthResponse, LoginDto, User};

#[derive(Clone)]
pub struct AuthService {
    ctx: ServiceContext,
    jwt: Arc<JwtManager>,
}

impl AuthService {
    pub fn new(ctx: ServiceContext, jwt: Arc<JwtManager>) -> Self {
        Self { ctx, jwt }
    }

    /// Log in by username or email
    ///
    /// Unknown accounts and wrong passwords both yield
    /// `AppError::InvalidCredentials` so callers cannot tell which accounts exist.
    pub async fn authenticate(&self, login: LoginDto) -> Result<AuthResponse> {
        if login.user_name.trim().is_empty() || login.password.is_empty() {
            return Err(AppError::InvalidArgument(
                "userName and password are required".to_string(),
            ));
        }

        let user = self
            .find_user(&login.user_name)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&login.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let auth_token = self.jwt.generate_access_token(
            user.id,
            &user.email,
            &user.username,
            user.role.as_str(),
        )?;

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(AuthResponse {
            id: user.id,
            auth_token,
            expires_in: self.jwt.expires_in_secs(),
        })
    }

    async fn find_user(&self, name_or_email: &str) -> Result<Option<User>> {
        let users = &self.ctx.repos.users;
        match users.find_by_username(name_or_email).await? {
            Some(user) => Ok(Some(user)),
            None => users.find_by_email(name_or_email).await,
        }
    }
}
