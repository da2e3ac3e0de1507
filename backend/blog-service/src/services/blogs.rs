/// Blog service - blog lifecycle and listings
use validator::Validate;

use super::{required, ServiceContext};
use crate::authz::{enforce, Action, Resource};
use crate::error::{AppError, Result};
use crate::models::{ArticleDto, Blog, BlogDto, NewBlog};

#[derive(Clone)]
pub struct BlogService {
    ctx: ServiceContext,
}

impl BlogService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a blog owned by the caller
    pub async fn create_blog(&self, dto: BlogDto, token: Option<&str>) -> Result<BlogDto> {
        let name = required(&dto.name, "name")?;
        dto.validate()?;

        let actor = self.ctx.actor(token)?;
        let owner = self
            .ctx
            .repos
            .users
            .get_by_id(actor.subject_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", actor.subject_id))?;
        enforce(&actor, &Resource::blog(owner.id), Action::Create)?;

        if self.ctx.repos.blogs.find_by_name(name).await?.is_some() {
            return Err(AppError::Conflict(format!("Blog name {} is already taken", name)));
        }

        let blog = self
            .ctx
            .repos
            .blogs
            .insert(NewBlog {
                name: name.to_string(),
                owner_id: owner.id,
            })
            .await?;

        tracing::info!(blog_id = blog.id, owner_id = %owner.id, "blog created");
        Ok(BlogDto {
            owner_username: Some(owner.username),
            ..BlogDto::from(blog)
        })
    }

    pub async fn delete_blog(&self, id: i64, token: Option<&str>) -> Result<()> {
        let blog = self.load(id).await?;
        let actor = self.ctx.actor(token)?;
        enforce(&actor, &Resource::blog(blog.owner_id), Action::Delete)?;

        self.ctx.repos.blogs.delete(blog.id).await?;
        tracing::info!(blog_id = blog.id, "blog deleted");
        Ok(())
    }

    /// Rename a blog; the new name must not belong to another blog
    pub async fn update_blog_name(
        &self,
        id: i64,
        dto: BlogDto,
        token: Option<&str>,
    ) -> Result<BlogDto> {
        let name = required(&dto.name, "name")?;
        dto.validate()?;

        let mut blog = self.load(id).await?;
        let actor = self.ctx.actor(token)?;
        enforce(&actor, &Resource::blog(blog.owner_id), Action::Update)?;

        if let Some(existing) = self.ctx.repos.blogs.find_by_name(name).await? {
            if existing.id != blog.id {
                return Err(AppError::Conflict(format!("Blog name {} is already taken", name)));
            }
        }

        self.ctx.repos.blogs.update_name(blog.id, name).await?;
        blog.name = name.to_string();

        let owner_username = self.ctx.username_of(blog.owner_id).await?;
        Ok(BlogDto {
            owner_username,
            ..BlogDto::from(blog)
        })
    }

    /// A blog with its owner's username and all of its articles
    pub async fn get_blog_by_id(&self, id: i64) -> Result<BlogDto> {
        let blog = self.load(id).await?;
        let owner_username = self.ctx.username_of(blog.owner_id).await?;
        let articles = self.articles_of(&blog, owner_username.clone()).await?;

        Ok(BlogDto {
            owner_username,
            articles: Some(articles),
            ..BlogDto::from(blog)
        })
    }

    pub async fn get_all_blogs(&self) -> Result<Vec<BlogDto>> {
        let blogs = self.ctx.repos.blogs.get_all().await?;

        let mut dtos = Vec::with_capacity(blogs.len());
        for blog in blogs {
            let owner_username = self.ctx.username_of(blog.owner_id).await?;
            dtos.push(BlogDto {
                owner_username,
                ..BlogDto::from(blog)
            });
        }
        Ok(dtos)
    }

    pub async fn get_all_articles_by_blog_id(&self, id: i64) -> Result<Vec<ArticleDto>> {
        let blog = self.load(id).await?;
        let owner_username = self.ctx.username_of(blog.owner_id).await?;
        self.articles_of(&blog, owner_username).await
    }

    async fn articles_of(
        &self,
        blog: &Blog,
        owner_username: Option<String>,
    ) -> Result<Vec<ArticleDto>> {
        let articles = self.ctx.repos.articles.get_by_blog(blog.id).await?;
        Ok(articles
            .into_iter()
            .map(|article| ArticleDto {
                author_id: Some(blog.owner_id),
                author_username: owner_username.clone(),
                ..ArticleDto::from(article)
            })
            .collect())
    }

    async fn load(&self, id: i64) -> Result<Blog> {
        self.ctx
            .repos
            .blogs
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Blog", id))
    }
}
