use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use blog_service::config::StorageBackend;
use blog_service::handlers;
use blog_service::repository::Repositories;
use blog_service::seed;
use blog_service::services::Services;
use crypto_core::JwtManager;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "info,blog_service=debug,actix_web=info";

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Blog Service
///
/// Serves users, blogs, articles, comments and tags over HTTP.
///
/// # Routes
///
/// - `/api/v1/auth/login` - Exchange credentials for a bearer token
/// - `/api/v1/accounts/*` - Registration, profiles, password changes
/// - `/api/v1/blogs/*`, `/api/v1/articles/*`, `/api/v1/comments/*`, `/api/v1/tags/*`
/// - `/health`, `/metrics`
///
/// # Storage
///
/// PostgreSQL by default (migrations run on startup). `STORAGE__BACKEND=memory`
/// keeps everything in process, which is handy for local runs.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = blog_service::Config::load().context("Failed to load configuration")?;

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.env);

    let jwt = Arc::new(
        JwtManager::new(
            &config.jwt.secret,
            config.jwt.issuer.clone(),
            config.jwt.expiry_hours,
        )
        .context("Failed to initialize JWT keys")?,
    );

    let repos = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&config.database.url)
                .await
                .context("Failed to create database pool")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;

            tracing::info!("Connected to database, migrations applied");
            Repositories::postgres(pool)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Repositories::in_memory()
        }
    };

    seed::ensure_admin(&repos, &config.admin)
        .await
        .context("Failed to seed admin account")?;

    let services = web::Data::new(Services::new(repos, jwt));
    let bind_address = config.bind_address();
    let allowed_origins = config.cors.allowed_origins.clone();

    tracing::info!("Starting HTTP server at {}", bind_address);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(services.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    let server_handle = server.handle();

    tokio::select! {
        result = server => {
            result.context("HTTP server error")?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
        }
    }

    tracing::info!("blog-service shutting down");
    Ok(())
}
