use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{UniqueViolation, UserStore};
use crate::articles::repo_types::{Article, Comment};
use crate::users::repo_types::{NewUser, User, UserSummary};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    follows: Vec<(Uuid, Uuid)>, // (follower, following)
    articles: Vec<Article>,
    likes: Vec<(Uuid, Uuid)>, // (article, user)
    comments: Vec<Comment>,
}

/// In-memory store for unit tests. Articles come back in insertion order so
/// callers that need an ordering have to impose it themselves.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail: AtomicBool,
    stale_email_lookups: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call return an error.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Email lookups miss every row, like a read that ran before a
    /// concurrent insert committed.
    pub fn set_stale_email_lookups(&self, stale: bool) {
        self.stale_email_lookups.store(stale, Ordering::SeqCst);
    }

    pub fn insert_article_at(
        &self,
        user_id: Uuid,
        title: &str,
        created_at: OffsetDateTime,
    ) -> Article {
        let article = Article {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            content: format!("{title} body"),
            created_at,
        };
        self.tables.lock().unwrap().articles.push(article.clone());
        article
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("memory store unavailable");
        }
        Ok(())
    }

    fn summaries(t: &Tables, ids: impl Iterator<Item = Uuid>) -> Vec<UserSummary> {
        ids.filter_map(|id| t.users.iter().find(|u| u.id == id))
            .map(UserSummary::from)
            .collect()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.check()?;
        if self.stale_email_lookups.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, new: NewUser) -> anyhow::Result<User> {
        self.check()?;
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.email == new.email) {
            return Err(UniqueViolation { what: "Email" }.into());
        }
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            nickname: new.nickname,
            avatar: None,
            intro: None,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> anyhow::Result<User> {
        self.check()?;
        let mut t = self.tables.lock().unwrap();
        if t
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(UniqueViolation { what: "Email" }.into());
        }
        let slot = t
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| anyhow::anyhow!("no such user"))?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn following(&self, user_id: Uuid) -> anyhow::Result<Vec<UserSummary>> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        let ids = t
            .follows
            .iter()
            .filter(|(f, _)| *f == user_id)
            .map(|(_, to)| *to);
        Ok(Self::summaries(&t, ids))
    }

    async fn followers(&self, user_id: Uuid) -> anyhow::Result<Vec<UserSummary>> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        let ids = t
            .follows
            .iter()
            .filter(|(_, to)| *to == user_id)
            .map(|(f, _)| *f);
        Ok(Self::summaries(&t, ids))
    }

    async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> anyhow::Result<()> {
        self.check()?;
        let mut t = self.tables.lock().unwrap();
        let edge = (follower_id, following_id);
        if !t.follows.contains(&edge) {
            t.follows.push(edge);
        }
        Ok(())
    }

    async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> anyhow::Result<()> {
        self.check()?;
        let mut t = self.tables.lock().unwrap();
        t.follows.retain(|e| *e != (follower_id, following_id));
        Ok(())
    }

    async fn articles_by_author(&self, user_id: Uuid) -> anyhow::Result<Vec<Article>> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        Ok(t.articles
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_article(&self, id: Uuid) -> anyhow::Result<Option<Article>> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        Ok(t.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn create_article(
        &self,
        user_id: Uuid,
        title: &str,
        content: &str,
    ) -> anyhow::Result<Article> {
        self.check()?;
        let article = Article {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            content: content.into(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.lock().unwrap().articles.push(article.clone());
        Ok(article)
    }

    async fn like_article(&self, article_id: Uuid, user_id: Uuid) -> anyhow::Result<()> {
        self.check()?;
        let mut t = self.tables.lock().unwrap();
        let edge = (article_id, user_id);
        if !t.likes.contains(&edge) {
            t.likes.push(edge);
        }
        Ok(())
    }

    async fn unlike_article(&self, article_id: Uuid, user_id: Uuid) -> anyhow::Result<()> {
        self.check()?;
        let mut t = self.tables.lock().unwrap();
        t.likes.retain(|e| *e != (article_id, user_id));
        Ok(())
    }

    async fn count_likes(&self, article_id: Uuid) -> anyhow::Result<i64> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        Ok(t.likes.iter().filter(|(a, _)| *a == article_id).count() as i64)
    }

    async fn count_comments(&self, article_id: Uuid) -> anyhow::Result<i64> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        Ok(t.comments.iter().filter(|c| c.article_id == article_id).count() as i64)
    }

    async fn add_comment(
        &self,
        article_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> anyhow::Result<Comment> {
        self.check()?;
        let comment = Comment {
            id: Uuid::new_v4(),
            article_id,
            user_id,
            content: content.into(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.lock().unwrap().comments.push(comment.clone());
        Ok(comment)
    }
}
