/// Wire types for the HTTP API
///
/// Field names are camelCase on the wire. Fields that a client may omit are
/// `Option`; required ones are enforced with `validator` and by the services.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Article, Blog, Comment, Tag, User};
use crate::authz::Role;

pub const MAX_NAME_LEN: u64 = 500;
pub const MAX_TAG_LEN: u64 = 120;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[validate(required, length(min = 1, max = 500))]
    pub name: Option<String>,
    #[validate(required)]
    pub content: Option<String>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[validate(required)]
    pub blog_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentDto>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagDto>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlogDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[validate(required, length(min = 1, max = 500))]
    pub name: Option<String>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub articles: Option<Vec<ArticleDto>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[validate(required)]
    pub content: Option<String>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[validate(required)]
    pub article_id: Option<i64>,
    #[serde(default)]
    pub creator_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TagDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[validate(required, length(min = 1, max = 120))]
    pub name: Option<String>,
}

impl TagDto {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 256))]
    pub user_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    /// Accepted on input only
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Reported on output only
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blogs: Option<Vec<BlogDto>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentDto>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordDto {
    #[validate(required)]
    pub old_password: Option<String>,
    #[validate(required)]
    pub new_password: Option<String>,
}

/// Login request; `user_name` may also be an email address
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginDto {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: Uuid,
    pub auth_token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Filters accepted by `GET /articles`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleQuery {
    pub text: Option<String>,
    /// Comma-separated tag names
    pub tags: Option<String>,
}

// ============================================================================
// Entity <-> DTO mapping
// ============================================================================

impl From<Article> for ArticleDto {
    fn from(a: Article) -> Self {
        Self {
            id: Some(a.id),
            name: Some(a.name),
            content: Some(a.content),
            last_update: Some(a.last_update),
            blog_id: Some(a.blog_id),
            ..Default::default()
        }
    }
}

impl From<ArticleDto> for Article {
    fn from(dto: ArticleDto) -> Self {
        Self {
            id: dto.id.unwrap_or_default(),
            name: dto.name.unwrap_or_default(),
            content: dto.content.unwrap_or_default(),
            last_update: dto.last_update.unwrap_or_else(Utc::now),
            blog_id: dto.blog_id.unwrap_or_default(),
        }
    }
}

impl From<Blog> for BlogDto {
    fn from(b: Blog) -> Self {
        Self {
            id: Some(b.id),
            name: Some(b.name),
            owner_id: Some(b.owner_id),
            ..Default::default()
        }
    }
}

impl From<BlogDto> for Blog {
    fn from(dto: BlogDto) -> Self {
        Self {
            id: dto.id.unwrap_or_default(),
            name: dto.name.unwrap_or_default(),
            owner_id: dto.owner_id.unwrap_or_default(),
        }
    }
}

impl From<Comment> for CommentDto {
    fn from(c: Comment) -> Self {
        Self {
            id: Some(c.id),
            content: Some(c.content),
            last_update: Some(c.last_updated),
            article_id: Some(c.article_id),
            creator_id: Some(c.user_id),
            creator_username: None,
        }
    }
}

impl From<CommentDto> for Comment {
    fn from(dto: CommentDto) -> Self {
        Self {
            id: dto.id.unwrap_or_default(),
            content: dto.content.unwrap_or_default(),
            last_updated: dto.last_update.unwrap_or_else(Utc::now),
            article_id: dto.article_id.unwrap_or_default(),
            user_id: dto.creator_id.unwrap_or_default(),
        }
    }
}

impl From<Tag> for TagDto {
    fn from(t: Tag) -> Self {
        Self {
            id: Some(t.id),
            name: Some(t.name),
        }
    }
}

impl From<TagDto> for Tag {
    fn from(dto: TagDto) -> Self {
        Self {
            id: dto.id.unwrap_or_default(),
            name: dto.name.unwrap_or_default(),
        }
    }
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: Some(u.id),
            user_name: Some(u.username),
            email: Some(u.email),
            password: None,
            role: Some(u.role),
            blogs: None,
            comments: None,
        }
    }
}
