/// Persistence layer
///
/// One async trait per aggregate. `Repositories` bundles them into the handle
/// every service receives. Two implementations exist: PostgreSQL (`postgres`)
/// and an in-process store (`memory`) used for local runs and tests.
///
/// Deletes cascade the same way in both backends: a blog takes its articles,
/// an article takes its comments and tag links, a user takes their blogs and
/// comments.
use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::Role;
use crate::error::Result;
use crate::models::{Article, Blog, Comment, NewArticle, NewBlog, NewComment, Tag, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Users holding `role`, oldest first
    async fn get_by_role(&self, role: Role) -> Result<Vec<User>>;

    /// Fails with `Conflict` when the username or email is taken
    async fn insert(&self, user: &User) -> Result<()>;

    /// Persist username, email and password hash; `Conflict` on a taken name
    async fn update(&self, user: &User) -> Result<()>;

    /// Returns false when no such user existed
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait BlogRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Blog>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Blog>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Blog>>;

    async fn get_by_owner(&self, owner_id: Uuid) -> Result<Vec<Blog>>;

    /// Fails with `Conflict` when the name is taken
    async fn insert(&self, blog: NewBlog) -> Result<Blog>;

    /// Rename a blog; the owner never changes. `Conflict` on a taken name
    async fn update_name(&self, id: i64, name: &str) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Article>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    async fn get_by_blog(&self, blog_id: i64) -> Result<Vec<Article>>;

    /// Articles whose name or content contains `text` (case-sensitive)
    async fn search_text(&self, text: &str) -> Result<Vec<Article>>;

    /// Articles linked to a tag, ordered by article id
    async fn get_by_tag(&self, tag_id: i64) -> Result<Vec<Article>>;

    /// Insert an article with its tag links as one unit of work
    ///
    /// Tags are looked up by name and created when missing. Nothing is
    /// written if any step fails.
    async fn insert(&self, article: NewArticle) -> Result<Article>;

    /// Persist name, content and last_update; blog_id is never changed
    async fn update(&self, article: &Article) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait CommentRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Comment>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    async fn get_by_article(&self, article_id: i64) -> Result<Vec<Comment>>;

    async fn get_by_user(&self, user_id: Uuid) -> Result<Vec<Comment>>;

    async fn insert(&self, comment: NewComment) -> Result<Comment>;

    /// Persist content and last_updated
    async fn update(&self, comment: &Comment) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait TagRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Tag>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// Tags linked to an article, ordered by link creation
    async fn get_by_article(&self, article_id: i64) -> Result<Vec<Tag>>;
}

/// Handle to every repository, cloned into each service
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub blogs: Arc<dyn BlogRepository>,
    pub articles: Arc<dyn ArticleRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tags: Arc<dyn TagRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PostgresStore::new(pool));
        Self::from_store(store)
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository
            + BlogRepository
            + ArticleRepository
            + CommentRepository
            + TagRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            blogs: store.clone(),
            articles: store.clone(),
            comments: store.clone(),
            tags: store,
        }
    }
}
