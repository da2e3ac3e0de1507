/// Comment service - handles comment creation, retrieval, and management
use chrono::Utc;
use validator::Validate;

use super::{required, ServiceContext};
use crate::authz::{enforce, Action, Resource};
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentDto, NewComment};

#[derive(Clone)]
pub struct CommentService {
    ctx: ServiceContext,
}

impl CommentService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Comment on an article as the caller
    pub async fn add_comment(&self, dto: CommentDto, token: Option<&str>) -> Result<CommentDto> {
        let content = required(&dto.content, "content")?;
        let article_id = dto
            .article_id
            .ok_or_else(|| AppError::InvalidArgument("articleId is required".to_string()))?;
        dto.validate()?;

        let article = self
            .ctx
            .repos
            .articles
            .get_by_id(article_id)
            .await?
            .ok_or_else(|| AppError::not_found("Article", article_id))?;

        let actor = self.ctx.actor(token)?;
        let user = self
            .ctx
            .repos
            .users
            .get_by_id(actor.subject_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", actor.subject_id))?;
        enforce(&actor, &Resource::comment(user.id), Action::Create)?;

        let comment = self
            .ctx
            .repos
            .comments
            .insert(NewComment {
                content: content.to_string(),
                last_updated: Utc::now(),
                article_id: article.id,
                user_id: user.id,
            })
            .await?;

        tracing::info!(comment_id = comment.id, article_id = article.id, "comment added");
        Ok(CommentDto {
            creator_username: Some(user.username),
            ..CommentDto::from(comment)
        })
    }

    /// Authors may delete their comments; moderators and admins may delete any
    pub async fn delete_comment(&self, id: i64, token: Option<&str>) -> Result<()> {
        let comment = self.load(id).await?;
        let actor = self.ctx.actor(token)?;
        enforce(&actor, &Resource::comment(comment.user_id), Action::Delete)?;

        self.ctx.repos.comments.delete(comment.id).await?;
        tracing::info!(comment_id = comment.id, by = %actor.subject_id, "comment deleted");
        Ok(())
    }

    /// Replace content when given; always refreshes `last_updated`
    pub async fn update_comment(
        &self,
        id: i64,
        dto: CommentDto,
        token: Option<&str>,
    ) -> Result<CommentDto> {
        let mut comment = self.load(id).await?;
        let actor = self.ctx.actor(token)?;
        enforce(&actor, &Resource::comment(comment.user_id), Action::Update)?;

        if let Some(content) = dto.content {
            comment.content = content;
        }
        comment.last_updated = Utc::now();
        self.ctx.repos.comments.update(&comment).await?;

        self.ctx.comment_dto(comment).await
    }

    pub async fn get_comment_by_id(&self, id: i64) -> Result<CommentDto> {
        let comment = self.load(id).await?;
        self.ctx.comment_dto(comment).await
    }

    pub async fn get_all_comments(&self) -> Result<Vec<CommentDto>> {
        let comments = self.ctx.repos.comments.get_all().await?;
        self.ctx.comment_dtos(comments).await
    }

    async fn load(&self, id: i64) -> Result<Comment> {
        self.ctx
            .repos
            .comments
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment", id))
    }
}
