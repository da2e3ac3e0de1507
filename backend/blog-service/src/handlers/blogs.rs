/// Blog handlers - HTTP endpoints for blog operations
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::BearerToken;
use crate::models::BlogDto;
use crate::services::Services;

/// Create a blog owned by the caller
pub async fn create_blog(
    services: web::Data<Services>,
    token: BearerToken,
    req: web::Json<BlogDto>,
) -> Result<HttpResponse> {
    let blog = services
        .blogs
        .create_blog(req.into_inner(), token.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(blog))
}

pub async fn get_all_blogs(services: web::Data<Services>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.blogs.get_all_blogs().await?))
}

/// Get a blog with its articles
pub async fn get_blog(services: web::Data<Services>, id: web::Path<i64>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.blogs.get_blog_by_id(*id).await?))
}

pub async fn get_blog_articles(
    services: web::Data<Services>,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.blogs.get_all_articles_by_blog_id(*id).await?))
}

/// Rename a blog
pub async fn update_blog(
    services: web::Data<Services>,
    id: web::Path<i64>,
    token: BearerToken,
    req: web::Json<BlogDto>,
) -> Result<HttpResponse> {
    let blog = services
        .blogs
        .update_blog_name(*id, req.into_inner(), token.as_deref())
        .await?;

    tracing::info!(blog_id = *id, "blog renamed");
    Ok(HttpResponse::Ok().json(blog))
}

pub async fn delete_blog(
    services: web::Data<Services>,
    id: web::Path<i64>,
    token: BearerToken,
) -> Result<HttpResponse> {
    services.blogs.delete_blog(*id, token.as_deref()).await?;
    Ok(HttpResponse::NoContent().finish())
}
