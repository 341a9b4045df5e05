use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::articles::dto::ArticleSummary;
use crate::users::repo_types::UserSummary;

/// Entry in a followings/followers list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowingView {
    pub pk: Uuid,
    pub avatar: Option<String>,
    pub nickname: String,
}

impl From<UserSummary> for FollowingView {
    fn from(u: UserSummary) -> Self {
        Self {
            pk: u.id,
            avatar: u.avatar,
            nickname: u.nickname,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub pk: Uuid,
    pub avatar: Option<String>,
    pub email: String,
    pub nickname: String,
    pub intro: Option<String>,
    pub followings: Vec<FollowingView>,
    pub followers: Vec<FollowingView>,
    pub articles: Vec<ArticleSummary>, // newest first
}

/// Partial profile update. `current_password` and `new_password` must be
/// sent together or not at all.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub avatar: Option<String>,
    pub nickname: Option<String>,
    pub intro: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "password1")]
    pub current_password: Option<String>,
    #[serde(alias = "password2")]
    pub new_password: Option<String>,
}
