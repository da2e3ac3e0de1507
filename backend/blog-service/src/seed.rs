/// Startup seeding
///
/// Ensures the configured admin account exists. Existing accounts are left
/// untouched, so a changed `ADMIN__PASSWORD` does not overwrite a live one.
/// An email already held by another account is reported and startup goes on.
use chrono::Utc;
use crypto_core::hash_password;
use uuid::Uuid;

use crate::authz::Role;
use crate::config::AdminConfig;
use crate::error::Result;
use crate::models::User;
use crate::repository::Repositories;

/// Returns the admin's id, creating the account when missing
pub async fn ensure_admin(repos: &Repositories, admin: &AdminConfig) -> Result<Uuid> {
    if let Some(existing) = repos.users.find_by_username(&admin.username).await? {
        if existing.role != Role::Admin {
            tracing::warn!(
                username = %existing.username,
                role = %existing.role,
                "configured admin username belongs to a non-admin account"
            );
        }
        return Ok(existing.id);
    }

    if let Some(existing) = repos.users.find_by_email(&admin.email).await? {
        tracing::warn!(
            email = %admin.email,
            username = %existing.username,
            role = %existing.role,
            "configured admin email belongs to another account; admin not created"
        );
        return Ok(existing.id);
    }

    let user = User {
        id: Uuid::new_v4(),
        username: admin.username.clone(),
        email: admin.email.clone(),
        password_hash: hash_password(&admin.password)?,
        role: Role::Admin,
        created_at: Utc::now(),
    };
    repos.users.insert(&user).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "admin account created");
    Ok(user.id)
}
