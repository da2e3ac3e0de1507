/// Business logic layer for blog-service
///
/// Every mutating operation follows the same order: validate input, load the
/// target (`NotFound`), read the actor from the token (`InvalidToken`), ask
/// the policy engine (`Forbidden`), then mutate and map to a DTO.
///
/// - Account service: registration, profiles, password changes
/// - Auth service: login and token issuing
/// - Blog, article, comment and tag services
pub mod accounts;
pub mod articles;
pub mod auth;
pub mod blogs;
pub mod comments;
pub mod tags;

pub use accounts::AccountService;
pub use articles::ArticleService;
pub use auth::AuthService;
pub use blogs::BlogService;
pub use comments::CommentService;
pub use tags::TagService;

use std::sync::Arc;

use crypto_core::JwtManager;
use uuid::Uuid;

use crate::authz::{Actor, ClaimsReader};
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentDto};
use crate::repository::Repositories;

/// Shared handles every service needs
#[derive(Clone)]
pub struct ServiceContext {
    pub repos: Repositories,
    pub claims: Arc<dyn ClaimsReader>,
}

impl ServiceContext {
    pub fn new(repos: Repositories, claims: Arc<dyn ClaimsReader>) -> Self {
        Self { repos, claims }
    }

    pub fn actor(&self, token: Option<&str>) -> Result<Actor> {
        self.claims.read_actor(token)
    }

    /// Username for display fields; never persisted on the child entity
    pub async fn username_of(&self, user_id: Uuid) -> Result<Option<String>> {
        Ok(self
            .repos
            .users
            .get_by_id(user_id)
            .await?
            .map(|u| u.username))
    }

    pub async fn comment_dto(&self, comment: Comment) -> Result<CommentDto> {
        let creator_username = self.username_of(comment.user_id).await?;
        let mut dto = CommentDto::from(comment);
        dto.creator_username = creator_username;
        Ok(dto)
    }

    pub async fn comment_dtos(&self, comments: Vec<Comment>) -> Result<Vec<CommentDto>> {
        let mut dtos = Vec::with_capacity(comments.len());
        for comment in comments {
            dtos.push(self.comment_dto(comment).await?);
        }
        Ok(dtos)
    }
}

/// All services, built once at startup and shared with the handlers
#[derive(Clone)]
pub struct Services {
    pub accounts: AccountService,
    pub auth: AuthService,
    pub blogs: BlogService,
    pub articles: ArticleService,
    pub comments: CommentService,
    pub tags: TagService,
}

impl Services {
    pub fn new(repos: Repositories, jwt: Arc<JwtManager>) -> Self {
        let claims: Arc<dyn ClaimsReader> = jwt.clone();
        let ctx = ServiceContext::new(repos, claims);

        Self {
            accounts: AccountService::new(ctx.clone()),
            auth: AuthService::new(ctx.clone(), jwt),
            blogs: BlogService::new(ctx.clone()),
            articles: ArticleService::new(ctx.clone()),
            comments: CommentService::new(ctx.clone()),
            tags: TagService::new(ctx),
        }
    }
}

/// Borrow a required string field, rejecting absent or blank values
pub(crate) fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::InvalidArgument(format!("{} is required", field)))
}

pub(crate) fn check_max_len(value: &str, max: u64, field: &str) -> Result<()> {
    if value.chars().count() as u64 > max {
        return Err(AppError::InvalidArgument(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}
