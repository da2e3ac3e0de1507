/// Article handlers - HTTP endpoints for article operations
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::BearerToken;
use crate::models::{ArticleDto, ArticleQuery};
use crate::services::Services;

/// List articles, optionally filtered
///
/// `?tags=a,b` returns the union of articles tagged with any of the names;
/// otherwise `?text=...` matches name or content. Tags take precedence.
pub async fn get_articles(
    services: web::Data<Services>,
    query: web::Query<ArticleQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let articles = match (query.tags, query.text) {
        (Some(tags), _) => services.articles.get_articles_with_tag_filter(&tags).await?,
        (None, Some(text)) => services.articles.get_articles_with_text_filter(&text).await?,
        (None, None) => services.articles.get_all_articles().await?,
    };

    Ok(HttpResponse::Ok().json(articles))
}

pub async fn create_article(
    services: web::Data<Services>,
    token: BearerToken,
    req: web::Json<ArticleDto>,
) -> Result<HttpResponse> {
    let article = services
        .articles
        .create_article(req.into_inner(), token.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(article))
}

/// Get an article with its comments and tags
pub async fn get_article(
    services: web::Data<Services>,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.articles.get_article_by_id(*id).await?))
}

pub async fn get_article_tags(
    services: web::Data<Services>,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.articles.get_tags_by_article_id(*id).await?))
}

pub async fn get_article_comments(
    services: web::Data<Services>,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.articles.get_comments_by_article_id(*id).await?))
}

pub async fn update_article(
    services: web::Data<Services>,
    id: web::Path<i64>,
    token: BearerToken,
    req: web::Json<ArticleDto>,
) -> Result<HttpResponse> {
    let article = services
        .articles
        .update_article(*id, req.into_inner(), token.as_deref())
        .await?;

    tracing::info!(article_id = *id, "article updated");
    Ok(HttpResponse::Ok().json(article))
}

pub async fn delete_article(
    services: web::Data<Services>,
    id: web::Path<i64>,
    token: BearerToken,
) -> Result<HttpResponse> {
    services
        .articles
        .delete_article(*id, token.as_deref())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
