/// PostgreSQL repository backend
///
/// Runtime-checked `sqlx` queries against the schema in `migrations/`.
/// Child rows go through `ON DELETE CASCADE`. User deletion and article
/// creation run in explicit transactions: comments and blogs disappear with
/// their user, and an article is never visible without its tag links.
/// Unique violations surface as `AppError::Conflict` via `From<sqlx::Error>`.
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{ArticleRepository, BlogRepository, CommentRepository, TagRepository, UserRepository};
use crate::authz::Role;
use crate::error::{AppError, Result};
use crate::models::{Article, Blog, Comment, NewArticle, NewBlog, NewComment, Tag, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";
const ARTICLE_COLUMNS: &str = "id, name, content, last_update, blog_id";
const COMMENT_COLUMNS: &str = "id, content, last_updated, article_id, user_id";

/// Row shape of `users`; role is stored as text
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self> {
        let role = row.role.parse::<Role>().map_err(|_| {
            AppError::Internal(anyhow::anyhow!(
                "user {} has unknown role '{}'",
                row.id,
                row.role
            ))
        })?;

        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user(&self, column: &str, value: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait::async_trait]
impl UserRepository for PostgresStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.fetch_user("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.fetch_user("email", email).await
    }

    async fn get_by_role(&self, role: Role) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE role = $1 ORDER BY created_at, id",
            USER_COLUMNS
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = $1, email = $2, password_hash = $3
            WHERE id = $4
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM blogs WHERE owner_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl BlogRepository for PostgresStore {
    async fn get_all(&self) -> Result<Vec<Blog>> {
        let blogs = sqlx::query_as::<_, Blog>("SELECT id, name, owner_id FROM blogs ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(blogs)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Blog>> {
        let blog = sqlx::query_as::<_, Blog>("SELECT id, name, owner_id FROM blogs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(blog)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Blog>> {
        let blog =
            sqlx::query_as::<_, Blog>("SELECT id, name, owner_id FROM blogs WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(blog)
    }

    async fn get_by_owner(&self, owner_id: Uuid) -> Result<Vec<Blog>> {
        let blogs = sqlx::query_as::<_, Blog>(
            "SELECT id, name, owner_id FROM blogs WHERE owner_id = $1 ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(blogs)
    }

    async fn insert(&self, blog: NewBlog) -> Result<Blog> {
        let blog = sqlx::query_as::<_, Blog>(
            r#"
            INSERT INTO blogs (name, owner_id)
            VALUES ($1, $2)
            RETURNING id, name, owner_id
            "#,
        )
        .bind(blog.name)
        .bind(blog.owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(blog)
    }

    async fn update_name(&self, id: i64, name: &str) -> Result<()> {
        sqlx::query("UPDATE blogs SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl ArticleRepository for PostgresStore {
    async fn get_all(&self) -> Result<Vec<Article>> {
        let sql = format!("SELECT {} FROM articles ORDER BY id", ARTICLE_COLUMNS);
        let articles = sqlx::query_as::<_, Article>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let sql = format!("SELECT {} FROM articles WHERE id = $1", ARTICLE_COLUMNS);
        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    async fn get_by_blog(&self, blog_id: i64) -> Result<Vec<Article>> {
        let sql = format!(
            "SELECT {} FROM articles WHERE blog_id = $1 ORDER BY id",
            ARTICLE_COLUMNS
        );
        let articles = sqlx::query_as::<_, Article>(&sql)
            .bind(blog_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    async fn search_text(&self, text: &str) -> Result<Vec<Article>> {
        // strpos keeps the match literal and case-sensitive
        let sql = format!(
            "SELECT {} FROM articles \
             WHERE strpos(name, $1) > 0 OR strpos(content, $1) > 0 \
             ORDER BY id",
            ARTICLE_COLUMNS
        );
        let articles = sqlx::query_as::<_, Article>(&sql)
            .bind(text)
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    async fn get_by_tag(&self, tag_id: i64) -> Result<Vec<Article>> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT a.id, a.name, a.content, a.last_update, a.blog_id
            FROM articles a
            JOIN article_tags atg ON atg.article_id = a.id
            WHERE atg.tag_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(articles)
    }

    async fn insert(&self, article: NewArticle) -> Result<Article> {
        let NewArticle {
            name,
            content,
            last_update,
            blog_id,
            tags,
        } = article;

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO articles (name, content, last_update, blog_id) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            ARTICLE_COLUMNS
        );
        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(name)
            .bind(content)
            .bind(last_update)
            .bind(blog_id)
            .fetch_one(&mut *tx)
            .await?;

        for tag_name in &tags {
            // DO UPDATE instead of DO NOTHING so RETURNING yields the existing row
            let tag = sqlx::query_as::<_, Tag>(
                r#"
                INSERT INTO tags (name) VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id, name
                "#,
            )
            .bind(tag_name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO article_tags (article_id, tag_id)
                VALUES ($1, $2)
                ON CONFLICT (article_id, tag_id) DO NOTHING
                "#,
            )
            .bind(article.id)
            .bind(tag.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(article)
    }

    async fn update(&self, article: &Article) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE articles
            SET name = $1, content = $2, last_update = $3
            WHERE id = $4
            "#,
        )
        .bind(&article.name)
        .bind(&article.content)
        .bind(article.last_update)
        .bind(article.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl CommentRepository for PostgresStore {
    async fn get_all(&self) -> Result<Vec<Comment>> {
        let sql = format!("SELECT {} FROM comments ORDER BY id", COMMENT_COLUMNS);
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let sql = format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS);
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn get_by_article(&self, article_id: i64) -> Result<Vec<Comment>> {
        let sql = format!(
            "SELECT {} FROM comments WHERE article_id = $1 ORDER BY id",
            COMMENT_COLUMNS
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(article_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn get_by_user(&self, user_id: Uuid) -> Result<Vec<Comment>> {
        let sql = format!(
            "SELECT {} FROM comments WHERE user_id = $1 ORDER BY id",
            COMMENT_COLUMNS
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn insert(&self, comment: NewComment) -> Result<Comment> {
        let sql = format!(
            "INSERT INTO comments (content, last_updated, article_id, user_id) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            COMMENT_COLUMNS
        );
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(comment.content)
            .bind(comment.last_updated)
            .bind(comment.article_id)
            .bind(comment.user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn update(&self, comment: &Comment) -> Result<()> {
        sqlx::query("UPDATE comments SET content = $1, last_updated = $2 WHERE id = $3")
            .bind(&comment.content)
            .bind(comment.last_updated)
            .bind(comment.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl TagRepository for PostgresStore {
    async fn get_all(&self) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn get_by_article(&self, article_id: i64) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name
            FROM tags t
            JOIN article_tags atg ON atg.tag_id = t.id
            WHERE atg.article_id = $1
            ORDER BY atg.id
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }
}
