/// Account handlers - registration, profiles and per-user listings
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::BearerToken;
use crate::models::{PasswordDto, UserDto};
use crate::services::Services;

/// Register a regular user
pub async fn register(
    services: web::Data<Services>,
    req: web::Json<UserDto>,
) -> Result<HttpResponse> {
    let user = services
        .accounts
        .register_regular_user(req.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(user))
}

/// Register a moderator (admin only)
pub async fn register_moderator(
    services: web::Data<Services>,
    token: BearerToken,
    req: web::Json<UserDto>,
) -> Result<HttpResponse> {
    let user = services
        .accounts
        .register_moderator(req.into_inner(), token.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(user))
}

pub async fn get_all_users(services: web::Data<Services>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.accounts.get_all_users().await?))
}

pub async fn get_regular_users(services: web::Data<Services>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.accounts.get_all_regular_users().await?))
}

pub async fn get_moderators(services: web::Data<Services>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.accounts.get_all_moderators().await?))
}

pub async fn get_user(
    services: web::Data<Services>,
    id: web::Path<Uuid>,
    token: BearerToken,
) -> Result<HttpResponse> {
    let user = services
        .accounts
        .get_user_by_id(*id, token.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

pub async fn update_user(
    services: web::Data<Services>,
    id: web::Path<Uuid>,
    token: BearerToken,
    req: web::Json<UserDto>,
) -> Result<HttpResponse> {
    let user = services
        .accounts
        .update_user(*id, req.into_inner(), token.as_deref())
        .await?;

    tracing::info!(user_id = %id, "user updated");
    Ok(HttpResponse::Ok().json(user))
}

pub async fn delete_user(
    services: web::Data<Services>,
    id: web::Path<Uuid>,
    token: BearerToken,
) -> Result<HttpResponse> {
    services
        .accounts
        .delete_user(*id, token.as_deref())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

pub async fn change_password(
    services: web::Data<Services>,
    id: web::Path<Uuid>,
    token: BearerToken,
    req: web::Json<PasswordDto>,
) -> Result<HttpResponse> {
    services
        .accounts
        .change_password(*id, req.into_inner(), token.as_deref())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_user_blogs(
    services: web::Data<Services>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.accounts.get_all_blogs_by_user_id(*id).await?))
}

pub async fn get_user_comments(
    services: web::Data<Services>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.accounts.get_all_comments_by_user_id(*id).await?))
}
