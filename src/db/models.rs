use serde::{Deserialize, Serialize};

use crate::forum::domain::{
    JobType, ModerationFlags, SubscriptionTier, TopicCategory, UserId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub avatar_url: Option<String>,
    pub subscription_type: SubscriptionTier,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub github: Option<String>,
    pub telegram: Option<String>,
    #[serde(flatten)]
    pub moderation: ModerationFlags,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub user_id: UserId,
    pub author: String,
    pub author_avatar_url: Option<String>,
    pub title: String,
    pub content: String,
    pub category: TopicCategory,
    pub is_premium: bool,
    pub likes: i64,
    pub views: i64,
    pub comment_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub topic_id: String,
    pub user_id: UserId,
    pub author: String,
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub user_id: UserId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub salary: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: String,
}

// --- Write payloads (already validated and sanitized) ---

#[derive(Debug, Clone, PartialEq)]
pub struct NewTopic {
    pub title: String,
    pub content: String,
    pub category: TopicCategory,
    pub is_premium: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub salary: Option<String>,
    pub logo_url: Option<String>,
}

/// Fields a user may change on their own profile. `None` leaves a field as is;
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub bio: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub github: Option<Option<String>>,
    pub telegram: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
}

impl ProfilePatch {
    pub fn avatar(url: impl Into<String>) -> Self {
        Self {
            avatar_url: Some(Some(url.into())),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicQuery {
    pub category: Option<TopicCategory>,
    pub limit: usize,
    pub offset: usize,
}

/// Result of toggling a like on a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes: i64,
}
