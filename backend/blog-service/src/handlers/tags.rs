use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::services::Services;

pub async fn get_all_tags(services: web::Data<Services>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.tags.get_all_tags().await?))
}

pub async fn get_tag(services: web::Data<Services>, id: web::Path<i64>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(services.tags.get_tag_by_id(*id).await?))
}
