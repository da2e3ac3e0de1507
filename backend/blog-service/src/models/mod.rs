/// Data models for blog-service
///
/// Persisted entities live here; the JSON wire types and the conversions
/// between the two live in `dto`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::authz::Role;

pub mod dto;

pub use dto::{
    ArticleDto, ArticleQuery, AuthResponse, BlogDto, CommentDto, LoginDto, PasswordDto, TagDto,
    UserDto,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Blog {
    pub id: i64,
    pub name: String,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub last_update: DateTime<Utc>,
    pub blog_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub last_updated: DateTime<Utc>,
    pub article_id: i64,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

// Insert payloads; ids are assigned by storage.

#[derive(Debug, Clone)]
pub struct NewBlog {
    pub name: String,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub name: String,
    pub content: String,
    pub last_update: DateTime<Utc>,
    pub blog_id: i64,
    /// Tag names to link; missing tags are created in the same write
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub last_updated: DateTime<Utc>,
    pub article_id: i64,
    pub user_id: Uuid,
}
