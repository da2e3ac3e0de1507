/// In-process repository backend
///
/// All tables sit behind a single `RwLock` so cascading deletes see a
/// consistent view. Ids are assigned from per-table counters starting at 1.
/// Unique names are checked under the write lock, mirroring the `UNIQUE`
/// constraints of the PostgreSQL schema.
use std::collections::BTreeMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ArticleRepository, BlogRepository, CommentRepository, TagRepository, UserRepository};
use crate::authz::Role;
use crate::error::{AppError, Result};
use crate::models::dto::MAX_TAG_LEN;
use crate::models::{Article, Blog, Comment, NewArticle, NewBlog, NewComment, Tag, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    blogs: BTreeMap<i64, Blog>,
    articles: BTreeMap<i64, Article>,
    comments: BTreeMap<i64, Comment>,
    tags: BTreeMap<i64, Tag>,
    /// (article_id, tag_id) in link order
    article_tags: Vec<(i64, i64)>,
    next_blog_id: i64,
    next_article_id: i64,
    next_comment_id: i64,
    next_tag_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

fn taken(what: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} {} is already taken", what, value))
}

impl Tables {
    fn check_user_unique(&self, user: &User) -> Result<()> {
        let others = self.users.iter().filter(|u| u.id != user.id);
        for other in others {
            if other.username == user.username {
                return Err(taken("Username", &user.username));
            }
            if other.email == user.email {
                return Err(taken("Email", &user.email));
            }
        }
        Ok(())
    }

    fn check_blog_name(&self, name: &str, except: Option<i64>) -> Result<()> {
        let clash = self
            .blogs
            .values()
            .any(|b| b.name == name && Some(b.id) != except);
        if clash {
            return Err(taken("Blog name", name));
        }
        Ok(())
    }

    fn tag_id_or_create(&mut self, name: &str) -> i64 {
        if let Some(tag) = self.tags.values().find(|t| t.name == name) {
            return tag.id;
        }
        let id = next_id(&mut self.next_tag_id);
        self.tags.insert(
            id,
            Tag {
                id,
                name: name.to_string(),
            },
        );
        id
    }

    fn remove_article(&mut self, id: i64) -> bool {
        let existed = self.articles.remove(&id).is_some();
        self.comments.retain(|_, c| c.article_id != id);
        self.article_tags.retain(|(article_id, _)| *article_id != id);
        existed
    }

    fn remove_blog(&mut self, id: i64) -> bool {
        let existed = self.blogs.remove(&id).is_some();
        let article_ids: Vec<i64> = self
            .articles
            .values()
            .filter(|a| a.blog_id == id)
            .map(|a| a.id)
            .collect();
        for article_id in article_ids {
            self.remove_article(article_id);
        }
        existed
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_by_role(&self, role: Role) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }

    async fn insert(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.check_user_unique(user)?;
        tables.users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.check_user_unique(user)?;
        if let Some(existing) = tables.users.iter_mut().find(|u| u.id == user.id) {
            existing.username = user.username.clone();
            existing.email = user.email.clone();
            existing.password_hash = user.password_hash.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        let existed = tables.users.len() != before;

        let blog_ids: Vec<i64> = tables
            .blogs
            .values()
            .filter(|b| b.owner_id == id)
            .map(|b| b.id)
            .collect();
        for blog_id in blog_ids {
            tables.remove_blog(blog_id);
        }
        tables.comments.retain(|_, c| c.user_id != id);

        Ok(existed)
    }
}

#[async_trait::async_trait]
impl BlogRepository for MemoryStore {
    async fn get_all(&self) -> Result<Vec<Blog>> {
        Ok(self.tables.read().await.blogs.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Blog>> {
        Ok(self.tables.read().await.blogs.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Blog>> {
        let tables = self.tables.read().await;
        Ok(tables.blogs.values().find(|b| b.name == name).cloned())
    }

    async fn get_by_owner(&self, owner_id: Uuid) -> Result<Vec<Blog>> {
        let tables = self.tables.read().await;
        Ok(tables
            .blogs
            .values()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, blog: NewBlog) -> Result<Blog> {
        let mut tables = self.tables.write().await;
        tables.check_blog_name(&blog.name, None)?;
        let id = next_id(&mut tables.next_blog_id);
        let blog = Blog {
            id,
            name: blog.name,
            owner_id: blog.owner_id,
        };
        tables.blogs.insert(id, blog.clone());
        Ok(blog)
    }

    async fn update_name(&self, id: i64, name: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.check_blog_name(name, Some(id))?;
        if let Some(blog) = tables.blogs.get_mut(&id) {
            blog.name = name.to_string();
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().await.remove_blog(id))
    }
}

#[async_trait::async_trait]
impl ArticleRepository for MemoryStore {
    async fn get_all(&self) -> Result<Vec<Article>> {
        Ok(self.tables.read().await.articles.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        Ok(self.tables.read().await.articles.get(&id).cloned())
    }

    async fn get_by_blog(&self, blog_id: i64) -> Result<Vec<Article>> {
        let tables = self.tables.read().await;
        Ok(tables
            .articles
            .values()
            .filter(|a| a.blog_id == blog_id)
            .cloned()
            .collect())
    }

    async fn search_text(&self, text: &str) -> Result<Vec<Article>> {
        let tables = self.tables.read().await;
        Ok(tables
            .articles
            .values()
            .filter(|a| a.name.contains(text) || a.content.contains(text))
            .cloned()
            .collect())
    }

    async fn get_by_tag(&self, tag_id: i64) -> Result<Vec<Article>> {
        let tables = self.tables.read().await;
        Ok(tables
            .articles
            .values()
            .filter(|a| tables.article_tags.contains(&(a.id, tag_id)))
            .cloned()
            .collect())
    }

    async fn insert(&self, article: NewArticle) -> Result<Article> {
        let mut tables = self.tables.write().await;

        // Everything that can fail is checked before the first write
        if !tables.blogs.contains_key(&article.blog_id) {
            return Err(AppError::not_found("Blog", article.blog_id));
        }
        if let Some(bad) = article
            .tags
            .iter()
            .find(|t| t.trim().is_empty() || t.chars().count() as u64 > MAX_TAG_LEN)
        {
            return Err(AppError::InvalidArgument(format!(
                "tag name '{}' must be 1 to {} characters",
                bad, MAX_TAG_LEN
            )));
        }

        let id = next_id(&mut tables.next_article_id);
        let NewArticle {
            name,
            content,
            last_update,
            blog_id,
            tags,
        } = article;
        let article = Article {
            id,
            name,
            content,
            last_update,
            blog_id,
        };
        tables.articles.insert(id, article.clone());

        for tag_name in &tags {
            let tag_id = tables.tag_id_or_create(tag_name);
            if !tables.article_tags.contains(&(id, tag_id)) {
                tables.article_tags.push((id, tag_id));
            }
        }
        Ok(article)
    }

    async fn update(&self, article: &Article) -> Result<()> {
        if let Some(existing) = self.tables.write().await.articles.get_mut(&article.id) {
            existing.name = article.name.clone();
            existing.content = article.content.clone();
            existing.last_update = article.last_update;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().await.remove_article(id))
    }
}

#[async_trait::async_trait]
impl CommentRepository for MemoryStore {
    async fn get_all(&self) -> Result<Vec<Comment>> {
        Ok(self.tables.read().await.comments.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn get_by_article(&self, article_id: i64) -> Result<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect())
    }

    async fn get_by_user(&self, user_id: Uuid) -> Result<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, comment: NewComment) -> Result<Comment> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.next_comment_id);
        let comment = Comment {
            id,
            content: comment.content,
            last_updated: comment.last_updated,
            article_id: comment.article_id,
            user_id: comment.user_id,
        };
        tables.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: &Comment) -> Result<()> {
        if let Some(existing) = self.tables.write().await.comments.get_mut(&comment.id) {
            existing.content = comment.content.clone();
            existing.last_updated = comment.last_updated;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().await.comments.remove(&id).is_some())
    }
}

#[async_trait::async_trait]
impl TagRepository for MemoryStore {
    async fn get_all(&self) -> Result<Vec<Tag>> {
        Ok(self.tables.read().await.tags.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.name == name).cloned())
    }

    async fn get_by_article(&self, article_id: i64) -> Result<Vec<Tag>> {
        let tables = self.tables.read().await;
        Ok(tables
            .article_tags
            .iter()
            .filter(|(a, _)| *a == article_id)
            .filter_map(|(_, tag_id)| tables.tags.get(tag_id).cloned())
            .collect())
    }
}
