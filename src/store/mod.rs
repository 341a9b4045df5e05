use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::articles::repo_types::{Article, Comment};
use crate::users::repo_types::{NewUser, User, UserSummary};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

/// A write collided with a unique constraint, e.g. two accounts racing for
/// the same email. Adapters return it inside `anyhow::Error` so services can
/// downcast it into a conflict.
#[derive(Debug, Error)]
#[error("{what} already registered")]
pub struct UniqueViolation {
    pub what: &'static str,
}

/// Storage collaborator for users, follow edges, articles and their
/// relationship sets.
///
/// Relationship queries return fresh rows on every call; nothing here caches
/// counts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn create_user(&self, new: NewUser) -> anyhow::Result<User>;
    /// Persist every mutable column of `user` in a single write.
    async fn save_user(&self, user: &User) -> anyhow::Result<User>;

    /// Users that `user_id` follows.
    async fn following(&self, user_id: Uuid) -> anyhow::Result<Vec<UserSummary>>;
    /// Users following `user_id`.
    async fn followers(&self, user_id: Uuid) -> anyhow::Result<Vec<UserSummary>>;
    async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> anyhow::Result<()>;
    async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> anyhow::Result<()>;

    /// Articles owned by `user_id`. Callers must not rely on the order.
    async fn articles_by_author(&self, user_id: Uuid) -> anyhow::Result<Vec<Article>>;
    async fn get_article(&self, id: Uuid) -> anyhow::Result<Option<Article>>;
    async fn create_article(
        &self,
        user_id: Uuid,
        title: &str,
        content: &str,
    ) -> anyhow::Result<Article>;
    async fn like_article(&self, article_id: Uuid, user_id: Uuid) -> anyhow::Result<()>;
    async fn unlike_article(&self, article_id: Uuid, user_id: Uuid) -> anyhow::Result<()>;
    async fn count_likes(&self, article_id: Uuid) -> anyhow::Result<i64>;
    async fn count_comments(&self, article_id: Uuid) -> anyhow::Result<i64>;
    async fn add_comment(
        &self,
        article_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> anyhow::Result<Comment>;
}
