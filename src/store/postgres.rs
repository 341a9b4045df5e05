use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{UniqueViolation, UserStore};
use crate::articles::repo_types::{Article, Comment};
use crate::users::repo_types::{NewUser, User, UserSummary};

/// Unique violations on `users.email` become [`UniqueViolation`]; anything
/// else keeps the sqlx error under `context`.
fn user_write_error(err: sqlx::Error, context: &'static str) -> anyhow::Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            UniqueViolation { what: "Email" }.into()
        }
        _ => anyhow::Error::new(err).context(context),
    }
}

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, nickname, avatar, intro, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get user")?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, nickname, avatar, intro, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn create_user(&self, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, nickname)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, nickname, avatar, intro, created_at
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.nickname)
        .fetch_one(&self.db)
        .await
        .map_err(|e| user_write_error(e, "insert user"))?;
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> anyhow::Result<User> {
        let saved = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET email = $2,
                   password_hash = $3,
                   nickname = $4,
                   avatar = $5,
                   intro = $6
             WHERE id = $1
            RETURNING id, email, password_hash, nickname, avatar, intro, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.nickname)
        .bind(&user.avatar)
        .bind(&user.intro)
        .fetch_one(&self.db)
        .await
        .map_err(|e| user_write_error(e, "update user"))?;
        Ok(saved)
    }

    async fn following(&self, user_id: Uuid) -> anyhow::Result<Vec<UserSummary>> {
        let rows = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.avatar, u.nickname
              FROM follows f
              JOIN users u ON u.id = f.following_id
             WHERE f.follower_id = $1
             ORDER BY f.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list following")?;
        Ok(rows)
    }

    async fn followers(&self, user_id: Uuid) -> anyhow::Result<Vec<UserSummary>> {
        let rows = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.avatar, u.nickname
              FROM follows f
              JOIN users u ON u.id = f.follower_id
             WHERE f.following_id = $1
             ORDER BY f.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list followers")?;
        Ok(rows)
    }

    async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO follows (follower_id, following_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .execute(&self.db)
        .await
        .context("insert follow")?;
        Ok(())
    }

    async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM follows WHERE follower_id = $1 AND following_id = $2"#)
            .bind(follower_id)
            .bind(following_id)
            .execute(&self.db)
            .await
            .context("delete follow")?;
        Ok(())
    }

    async fn articles_by_author(&self, user_id: Uuid) -> anyhow::Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, user_id, title, content, created_at
            FROM articles
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list articles by author")?;
        Ok(rows)
    }

    async fn get_article(&self, id: Uuid) -> anyhow::Result<Option<Article>> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, user_id, title, content, created_at
            FROM articles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get article")?;
        Ok(row)
    }

    async fn create_article(
        &self,
        user_id: Uuid,
        title: &str,
        content: &str,
    ) -> anyhow::Result<Article> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (user_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, content, created_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(content)
        .fetch_one(&self.db)
        .await
        .context("insert article")?;
        Ok(row)
    }

    async fn like_article(&self, article_id: Uuid, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO article_likes (article_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .context("insert like")?;
        Ok(())
    }

    async fn unlike_article(&self, article_id: Uuid, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM article_likes WHERE article_id = $1 AND user_id = $2"#)
            .bind(article_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete like")?;
        Ok(())
    }

    async fn count_likes(&self, article_id: Uuid) -> anyhow::Result<i64> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM article_likes WHERE article_id = $1"#)
                .bind(article_id)
                .fetch_one(&self.db)
                .await
                .context("count likes")?;
        Ok(count)
    }

    async fn count_comments(&self, article_id: Uuid) -> anyhow::Result<i64> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM comments WHERE article_id = $1"#)
                .bind(article_id)
                .fetch_one(&self.db)
                .await
                .context("count comments")?;
        Ok(count)
    }

    async fn add_comment(
        &self,
        article_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> anyhow::Result<Comment> {
        let row = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (article_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, article_id, user_id, content, created_at
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.db)
        .await
        .context("insert comment")?;
        Ok(row)
    }
}
