/// Login handler
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::models::LoginDto;
use crate::services::Services;

/// Exchange credentials for a bearer token
pub async fn login(services: web::Data<Services>, req: web::Json<LoginDto>) -> Result<HttpResponse> {
    let response = services.auth.authenticate(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
