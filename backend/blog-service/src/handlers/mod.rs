/// HTTP handlers for blog-service
///
/// Handlers translate between HTTP and the services. They extract the path,
/// body and bearer token, call one service method, and log the outcome.
/// Errors flow out as `AppError` and are rendered by its `ResponseError` impl.
pub mod accounts;
pub mod articles;
pub mod auth;
pub mod blogs;
pub mod comments;
pub mod tags;

use actix_web::{web, HttpResponse};

use crate::metrics::serve_metrics;
use crate::middleware::MetricsMiddleware;

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "blog-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Register every route; expects `web::Data<Services>` in app data
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/metrics", web::get().to(serve_metrics));

    cfg.service(
        web::scope("/api/v1")
            .wrap(MetricsMiddleware)
            .route("/auth/login", web::post().to(auth::login))
            .service(
                web::scope("/accounts")
                    .route("", web::get().to(accounts::get_all_users))
                    .route("/register", web::post().to(accounts::register))
                    .route("/regular", web::get().to(accounts::get_regular_users))
                    .route("/moderators", web::get().to(accounts::get_moderators))
                    .route("/moderators", web::post().to(accounts::register_moderator))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(accounts::get_user))
                            .route(web::put().to(accounts::update_user))
                            .route(web::delete().to(accounts::delete_user)),
                    )
                    .route("/{id}/password", web::put().to(accounts::change_password))
                    .route("/{id}/blogs", web::get().to(accounts::get_user_blogs))
                    .route("/{id}/comments", web::get().to(accounts::get_user_comments)),
            )
            .service(
                web::scope("/blogs")
                    .service(
                        web::resource("")
                            .route(web::get().to(blogs::get_all_blogs))
                            .route(web::post().to(blogs::create_blog)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(blogs::get_blog))
                            .route(web::put().to(blogs::update_blog))
                            .route(web::delete().to(blogs::delete_blog)),
                    )
                    .route("/{id}/articles", web::get().to(blogs::get_blog_articles)),
            )
            .service(
                web::scope("/articles")
                    .service(
                        web::resource("")
                            .route(web::get().to(articles::get_articles))
                            .route(web::post().to(articles::create_article)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(articles::get_article))
                            .route(web::put().to(articles::update_article))
                            .route(web::delete().to(articles::delete_article)),
                    )
                    .route("/{id}/tags", web::get().to(articles::get_article_tags))
                    .route(
                        "/{id}/comments",
                        web::get().to(articles::get_article_comments),
                    ),
            )
            .service(
                web::scope("/comments")
                    .service(
                        web::resource("")
                            .route(web::get().to(comments::get_all_comments))
                            .route(web::post().to(comments::add_comment)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(comments::get_comment))
                            .route(web::put().to(comments::update_comment))
                            .route(web::delete().to(comments::delete_comment)),
                    ),
            )
            .service(
                web::scope("/tags")
                    .route("", web::get().to(tags::get_all_tags))
                    .route("/{id}", web::get().to(tags::get_tag)),
            ),
    );
}
