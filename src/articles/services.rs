use tracing::info;
use uuid::Uuid;

use super::dto::ArticleSummary;
use super::repo_types::{Article, Comment};
use crate::error::AppError;
use crate::store::UserStore;

/// Counts are queried on every call; nothing is cached on the article.
pub async fn summarize(
    store: &dyn UserStore,
    article: &Article,
) -> Result<ArticleSummary, AppError> {
    let likes = store.count_likes(article.id).await?;
    let comments = store.count_comments(article.id).await?;
    Ok(ArticleSummary {
        pk: article.id,
        user_pk: article.user_id,
        title: article.title.clone(),
        content: article.content.clone(),
        likes,
        comments,
        created_at: article.created_at,
    })
}

pub fn sort_newest_first(items: &mut [ArticleSummary]) {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

pub async fn create_article(
    store: &dyn UserStore,
    user_id: Uuid,
    title: &str,
    content: &str,
) -> Result<ArticleSummary, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::malformed("Title is required"));
    }
    let article = store.create_article(user_id, title, content).await?;
    info!(article_id = %article.id, %user_id, "article created");
    summarize(store, &article).await
}

async fn load_article(store: &dyn UserStore, article_id: Uuid) -> Result<Article, AppError> {
    store
        .get_article(article_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Article".into()))
}

pub async fn set_like(
    store: &dyn UserStore,
    article_id: Uuid,
    user_id: Uuid,
    liked: bool,
) -> Result<ArticleSummary, AppError> {
    let article = load_article(store, article_id).await?;
    if liked {
        store.like_article(article.id, user_id).await?;
    } else {
        store.unlike_article(article.id, user_id).await?;
    }
    summarize(store, &article).await
}

pub async fn add_comment(
    store: &dyn UserStore,
    article_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> Result<Comment, AppError> {
    if content.trim().is_empty() {
        return Err(AppError::malformed("Comment is empty"));
    }
    let article = load_article(store, article_id).await?;
    let comment = store.add_comment(article.id, user_id, content).await?;
    info!(comment_id = %comment.id, %article_id, %user_id, "comment added");
    Ok(comment)
}
