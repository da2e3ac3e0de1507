/// Comment handlers - HTTP endpoints for comment operations
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::BearerToken;
use crate::models::CommentDto;
use crate::services::Services;

/// Create a new comment
pub async fn add_comment(
    services: web::Data<Services>,
    token: BearerToken,
    req: web::Json<CommentDto>,
) -> Result<HttpResponse> {
    let comment = services
        .comments
        .add_comment(req.into_inner(), token.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

pub async fn get_all_comments(services: web::Data<Services>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.comments.get_all_comments().await?))
}

/// Get a single comment
pub async fn get_comment(
    services: web::Data<Services>,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.comments.get_comment_by_id(*id).await?))
}

/// Update a comment
pub async fn update_comment(
    services: web::Data<Services>,
    id: web::Path<i64>,
    token: BearerToken,
    req: web::Json<CommentDto>,
) -> Result<HttpResponse> {
    let comment = services
        .comments
        .update_comment(*id, req.into_inner(), token.as_deref())
        .await?;

    tracing::info!(comment_id = *id, "comment updated");
    Ok(HttpResponse::Ok().json(comment))
}

/// Delete a comment
pub async fn delete_comment(
    services: web::Data<Services>,
    id: web::Path<i64>,
    token: BearerToken,
) -> Result<HttpResponse> {
    services
        .comments
        .delete_comment(*id, token.as_deref())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
