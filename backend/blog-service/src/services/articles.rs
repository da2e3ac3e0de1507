/// Article service - articles, their tags and comment listings
use std::collections::HashSet;

use chrono::Utc;
use validator::Validate;

use super::{check_max_len, required, ServiceContext};
use crate::authz::{enforce, Action, Resource};
use crate::error::{AppError, Result};
use crate::models::dto::{MAX_NAME_LEN, MAX_TAG_LEN};
use crate::models::{Article, ArticleDto, Blog, CommentDto, NewArticle, TagDto};

#[derive(Clone)]
pub struct ArticleService {
    ctx: ServiceContext,
}

impl ArticleService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Publish an article in one of the caller's blogs
    ///
    /// Requested tags are looked up by name and created when missing.
    pub async fn create_article(&self, dto: ArticleDto, token: Option<&str>) -> Result<ArticleDto> {
        let name = required(&dto.name, "name")?;
        let content = required(&dto.content, "content")?;
        let blog_id = dto
            .blog_id
            .ok_or_else(|| AppError::InvalidArgument("blogId is required".to_string()))?;
        dto.validate()?;
        let tag_names = tag_names(dto.tags.as_deref().unwrap_or_default())?;

        let blog = self.load_blog(blog_id).await?;
        let actor = self.ctx.actor(token)?;
        enforce(&actor, &Resource::article(blog.owner_id), Action::Create)?;

        let article = self
            .ctx
            .repos
            .articles
            .insert(NewArticle {
                name: name.to_string(),
                content: content.to_string(),
                last_update: Utc::now(),
                blog_id: blog.id,
                tags: tag_names,
            })
            .await?;

        tracing::info!(article_id = article.id, blog_id = blog.id, "article created");

        let tags = self.ctx.repos.tags.get_by_article(article.id).await?;
        let author_username = self.ctx.username_of(blog.owner_id).await?;
        Ok(ArticleDto {
            author_id: Some(blog.owner_id),
            author_username,
            tags: Some(tags.into_iter().map(TagDto::from).collect()),
            ..ArticleDto::from(article)
        })
    }

    /// Owners may delete their articles; moderators and admins may delete any
    pub async fn delete_article(&self, id: i64, token: Option<&str>) -> Result<()> {
        let article = self.load(id).await?;
        let blog = self.load_blog(article.blog_id).await?;
        let actor = self.ctx.actor(token)?;
        enforce(&actor, &Resource::article(blog.owner_id), Action::Delete)?;

        self.ctx.repos.articles.delete(article.id).await?;
        tracing::info!(article_id = article.id, by = %actor.subject_id, "article deleted");
        Ok(())
    }

    /// Replace name and content; refreshes `last_update`
    pub async fn update_article(
        &self,
        id: i64,
        dto: ArticleDto,
        token: Option<&str>,
    ) -> Result<ArticleDto> {
        let name = required(&dto.name, "name")?;
        let content = required(&dto.content, "content")?;
        check_max_len(name, MAX_NAME_LEN, "name")?;

        let mut article = self.load(id).await?;
        let blog = self.load_blog(article.blog_id).await?;
        let actor = self.ctx.actor(token)?;
        enforce(&actor, &Resource::article(blog.owner_id), Action::Update)?;

        article.name = name.to_string();
        article.content = content.to_string();
        article.last_update = Utc::now();
        self.ctx.repos.articles.update(&article).await?;

        Ok(ArticleDto::from(article))
    }

    /// An article with author, comments and tags
    pub async fn get_article_by_id(&self, id: i64) -> Result<ArticleDto> {
        let article = self.load(id).await?;
        let blog = self.load_blog(article.blog_id).await?;

        let comments = self.comments_of(article.id).await?;
        let tags = self.ctx.repos.tags.get_by_article(article.id).await?;
        let author_username = self.ctx.username_of(blog.owner_id).await?;

        Ok(ArticleDto {
            author_id: Some(blog.owner_id),
            author_username,
            comments: Some(comments),
            tags: Some(tags.into_iter().map(TagDto::from).collect()),
            ..ArticleDto::from(article)
        })
    }

    pub async fn get_comments_by_article_id(&self, id: i64) -> Result<Vec<CommentDto>> {
        let article = self.load(id).await?;
        self.comments_of(article.id).await
    }

    pub async fn get_tags_by_article_id(&self, id: i64) -> Result<Vec<TagDto>> {
        let article = self.load(id).await?;
        let tags = self.ctx.repos.tags.get_by_article(article.id).await?;
        Ok(tags.into_iter().map(TagDto::from).collect())
    }

    /// Articles whose name or content contains `text` (case-sensitive)
    pub async fn get_articles_with_text_filter(&self, text: &str) -> Result<Vec<ArticleDto>> {
        let articles = self.ctx.repos.articles.search_text(text).await?;
        Ok(articles.into_iter().map(ArticleDto::from).collect())
    }

    pub async fn get_all_articles(&self) -> Result<Vec<ArticleDto>> {
        let articles = self.ctx.repos.articles.get_all().await?;
        Ok(articles.into_iter().map(ArticleDto::from).collect())
    }

    /// Filter by a comma-separated list of tag names
    pub async fn get_articles_with_tag_filter(&self, tags: &str) -> Result<Vec<ArticleDto>> {
        let tags: Vec<TagDto> = tags.split(',').map(TagDto::named).collect();
        self.get_articles_with_tags(&tags).await
    }

    /// Union of the articles carrying any of `tags`
    ///
    /// De-duplicated by article id, in first-seen order. A blank name is
    /// `InvalidArgument`; a name with no tag behind it is `NotFound`.
    pub async fn get_articles_with_tags(&self, tags: &[TagDto]) -> Result<Vec<ArticleDto>> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for tag in tags {
            let name = required(&tag.name, "tag name")?.trim();
            let tag = self
                .ctx
                .repos
                .tags
                .find_by_name(name)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", name)))?;

            for article in self.ctx.repos.articles.get_by_tag(tag.id).await? {
                if seen.insert(article.id) {
                    result.push(ArticleDto::from(article));
                }
            }
        }

        Ok(result)
    }

    async fn comments_of(&self, article_id: i64) -> Result<Vec<CommentDto>> {
        let comments = self.ctx.repos.comments.get_by_article(article_id).await?;
        self.ctx.comment_dtos(comments).await
    }

    async fn load(&self, id: i64) -> Result<Article> {
        self.ctx
            .repos
            .articles
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Article", id))
    }

    async fn load_blog(&self, id: i64) -> Result<Blog> {
        self.ctx
            .repos
            .blogs
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Blog", id))
    }
}

/// Trimmed, validated tag names in request order without repeats
fn tag_names(tags: &[TagDto]) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let name = required(&tag.name, "tag name")?.trim();
        check_max_len(name, MAX_TAG_LEN, "tag name")?;
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names_trim_and_dedupe() {
        let tags = vec![
            TagDto::named(" rust "),
            TagDto::named("web"),
            TagDto::named("rust"),
        ];
        assert_eq!(tag_names(&tags).unwrap(), vec!["rust", "web"]);
    }

    #[test]
    fn test_tag_names_reject_blank_and_long() {
        assert!(tag_names(&[TagDto::named("  ")]).is_err());
        assert!(tag_names(&[TagDto::named("x".repeat(121))]).is_err());
    }
}
