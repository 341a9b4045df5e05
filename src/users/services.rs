use tracing::{info, warn};

use super::dto::{FollowingView, ProfileView, UpdateProfileRequest};
use super::repo_types::User;
use crate::articles::services::{sort_newest_first, summarize};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::services::{is_valid_email, normalize_email};
use crate::error::AppError;
use crate::store::UserStore;

/// Profile of `user` with its follow lists and authored articles.
///
/// Follow lists keep the store's order. Articles are sorted newest first
/// here regardless of what the store returns.
pub async fn build_profile_view(
    store: &dyn UserStore,
    user: &User,
) -> Result<ProfileView, AppError> {
    let followings = store
        .following(user.id)
        .await?
        .into_iter()
        .map(FollowingView::from)
        .collect();
    let followers = store
        .followers(user.id)
        .await?
        .into_iter()
        .map(FollowingView::from)
        .collect();

    let authored = store.articles_by_author(user.id).await?;
    let mut articles = Vec::with_capacity(authored.len());
    for article in &authored {
        articles.push(summarize(store, article).await?);
    }
    sort_newest_first(&mut articles);

    Ok(ProfileView {
        pk: user.id,
        avatar: user.avatar.clone(),
        email: user.email.clone(),
        nickname: user.nickname.clone(),
        intro: user.intro.clone(),
        followings,
        followers,
        articles,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CredentialChange<'a> {
    Keep,
    Replace { current: &'a str, new: &'a str },
}

/// Both fields absent keeps the password; both present and non-empty
/// replaces it; anything else is malformed.
fn credential_change(req: &UpdateProfileRequest) -> Result<CredentialChange<'_>, AppError> {
    match (req.current_password.as_deref(), req.new_password.as_deref()) {
        (None, None) => Ok(CredentialChange::Keep),
        (Some(current), Some(new)) if !current.is_empty() && !new.is_empty() => {
            Ok(CredentialChange::Replace { current, new })
        }
        _ => Err(AppError::malformed(
            "Both current_password and new_password are required to change the password",
        )),
    }
}

/// Empty strings clear optional columns.
fn optional(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty()).then(|| v.to_string())
}

/// Apply `req` to `user` and persist the result in one write.
///
/// Every check runs against a working copy first, so a rejected request
/// leaves the stored user untouched.
pub async fn update_profile(
    store: &dyn UserStore,
    user: &User,
    req: &UpdateProfileRequest,
    min_password_len: usize,
) -> Result<User, AppError> {
    let change = credential_change(req)?;

    if let CredentialChange::Replace { current, .. } = change {
        if !verify_password(current, &user.password_hash)? {
            warn!(user_id = %user.id, "password change with wrong current password");
            return Err(AppError::Unauthenticated);
        }
    }

    let mut updated = user.clone();

    if let Some(avatar) = &req.avatar {
        updated.avatar = optional(avatar);
    }
    if let Some(intro) = &req.intro {
        updated.intro = optional(intro);
    }
    if let Some(nickname) = &req.nickname {
        updated.nickname =
            optional(nickname).ok_or_else(|| AppError::malformed("Nickname is required"))?;
    }
    if let Some(email) = &req.email {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AppError::malformed("Invalid email"));
        }
        if email != user.email {
            if let Some(owner) = store.find_user_by_email(&email).await? {
                if owner.id != user.id {
                    return Err(AppError::Conflict("Email already registered".into()));
                }
            }
        }
        updated.email = email;
    }

    if let CredentialChange::Replace { new, .. } = change {
        if new.len() < min_password_len {
            return Err(AppError::malformed("Password too short"));
        }
        updated.password_hash = hash_password(new)?;
    }

    let saved = store.save_user(&updated).await?;
    info!(
        user_id = %saved.id,
        password_changed = matches!(change, CredentialChange::Replace { .. }),
        "profile updated"
    );
    Ok(saved)
}
