//! Shared fixtures for blog-service integration tests
//!
//! Everything runs against the in-memory store, so no database is needed.
#![allow(dead_code)]

use std::sync::Arc;

use blog_service::config::AdminConfig;
use blog_service::models::{ArticleDto, BlogDto, CommentDto, LoginDto, TagDto, UserDto};
use blog_service::repository::Repositories;
use blog_service::seed;
use blog_service::services::Services;
use crypto_core::JwtManager;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const PASSWORD: &str = "Secret123";
pub const ADMIN_PASSWORD: &str = "Admin123";

/// A registered account together with a bearer token for it
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

impl TestUser {
    pub fn token(&self) -> Option<&str> {
        Some(self.token.as_str())
    }
}

pub fn admin_config() -> AdminConfig {
    AdminConfig {
        username: "admin".to_string(),
        email: "admin@blog.dev".to_string(),
        password: ADMIN_PASSWORD.to_string(),
    }
}

pub fn jwt() -> Arc<JwtManager> {
    Arc::new(JwtManager::new(TEST_SECRET, "blog-service-test", 1).expect("test secret is valid"))
}

/// Fresh in-memory services with the admin account seeded
pub async fn services() -> Services {
    let repos = Repositories::in_memory();
    seed::ensure_admin(&repos, &admin_config())
        .await
        .expect("seed admin");
    Services::new(repos, jwt())
}

pub fn user_dto(username: &str) -> UserDto {
    UserDto {
        user_name: Some(username.to_string()),
        email: Some(format!("{}@example.com", username)),
        password: Some(PASSWORD.to_string()),
        ..Default::default()
    }
}

pub async fn login(services: &Services, username: &str, password: &str) -> TestUser {
    let auth = services
        .auth
        .authenticate(LoginDto {
            user_name: username.to_string(),
            password: password.to_string(),
        })
        .await
        .expect("login");

    TestUser {
        id: auth.id,
        username: username.to_string(),
        token: auth.auth_token,
    }
}

pub async fn admin(services: &Services) -> TestUser {
    login(services, "admin", ADMIN_PASSWORD).await
}

pub async fn regular_user(services: &Services, username: &str) -> TestUser {
    services
        .accounts
        .register_regular_user(user_dto(username))
        .await
        .expect("register regular user");
    login(services, username, PASSWORD).await
}

pub async fn moderator(services: &Services, username: &str) -> TestUser {
    let admin = admin(services).await;
    services
        .accounts
        .register_moderator(user_dto(username), admin.token())
        .await
        .expect("register moderator");
    login(services, username, PASSWORD).await
}

pub async fn blog(services: &Services, owner: &TestUser, name: &str) -> BlogDto {
    services
        .blogs
        .create_blog(
            BlogDto {
                name: Some(name.to_string()),
                ..Default::default()
            },
            owner.token(),
        )
        .await
        .expect("create blog")
}

pub async fn article(
    services: &Services,
    owner: &TestUser,
    blog_id: i64,
    name: &str,
    tags: &[&str],
) -> ArticleDto {
    services
        .articles
        .create_article(
            ArticleDto {
                name: Some(name.to_string()),
                content: Some(format!("Content of {}", name)),
                blog_id: Some(blog_id),
                tags: Some(tags.iter().map(|t| TagDto::named(*t)).collect()),
                ..Default::default()
            },
            owner.token(),
        )
        .await
        .expect("create article")
}

pub async fn comment(
    services: &Services,
    author: &TestUser,
    article_id: i64,
    content: &str,
) -> CommentDto {
    services
        .comments
        .add_comment(
            CommentDto {
                content: Some(content.to_string()),
                article_id: Some(article_id),
                ..Default::default()
            },
            author.token(),
        )
        .await
        .expect("add comment")
}
