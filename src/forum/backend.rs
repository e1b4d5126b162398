// Backend surface - everything the forum reads or writes goes through here
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

use crate::db::models::{
    Comment, JobListing, LikeState, NewJob, NewTopic, Profile, ProfilePatch, Topic, TopicQuery,
};
use crate::forum::domain::{ModerationFlags, Role, SubscriptionTier, UserId};

/// Errors reported by the backend. The `Display` text is what users see, so
/// the access-control variants carry their message unadorned.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Database error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Conflict(String),
}

impl BackendError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}

/// Tables, storage and row-level checks of the forum.
///
/// Write methods take the acting user and enforce ownership and roles
/// themselves; callers' own checks are advisory.
#[async_trait]
pub trait ForumBackend: Send + Sync {
    // --- profiles ---

    async fn fetch_profile(&self, user: &UserId) -> Result<Option<Profile>, BackendError>;

    async fn list_profiles(&self) -> Result<Vec<Profile>, BackendError>;

    /// Patch the actor's own profile.
    async fn update_profile(
        &self,
        actor: &UserId,
        target: &UserId,
        patch: ProfilePatch,
    ) -> Result<Profile, BackendError>;

    async fn set_subscription(
        &self,
        actor: &UserId,
        target: &UserId,
        tier: SubscriptionTier,
    ) -> Result<Profile, BackendError>;

    async fn set_moderation(
        &self,
        actor: &UserId,
        target: &UserId,
        flags: ModerationFlags,
    ) -> Result<Profile, BackendError>;

    // --- roles ---

    async fn fetch_roles(&self, user: &UserId) -> Result<BTreeSet<Role>, BackendError>;

    async fn grant_role(&self, actor: &UserId, target: &UserId, role: Role)
        -> Result<(), BackendError>;

    async fn revoke_role(
        &self,
        actor: &UserId,
        target: &UserId,
        role: Role,
    ) -> Result<(), BackendError>;

    // --- topics ---

    async fn list_topics(&self, query: &TopicQuery) -> Result<Vec<Topic>, BackendError>;

    async fn fetch_topic(&self, id: &str) -> Result<Option<Topic>, BackendError>;

    async fn insert_topic(&self, actor: &UserId, topic: NewTopic) -> Result<Topic, BackendError>;

    async fn update_topic(
        &self,
        actor: &UserId,
        id: &str,
        topic: NewTopic,
    ) -> Result<Topic, BackendError>;

    async fn delete_topic(&self, actor: &UserId, id: &str) -> Result<(), BackendError>;

    async fn record_topic_view(&self, id: &str) -> Result<(), BackendError>;

    async fn toggle_topic_like(&self, actor: &UserId, id: &str) -> Result<LikeState, BackendError>;

    // --- comments ---

    async fn list_comments(&self, topic_id: &str) -> Result<Vec<Comment>, BackendError>;

    async fn fetch_comment(&self, id: &str) -> Result<Option<Comment>, BackendError>;

    async fn insert_comment(
        &self,
        actor: &UserId,
        topic_id: &str,
        content: String,
    ) -> Result<Comment, BackendError>;

    async fn update_comment(
        &self,
        actor: &UserId,
        id: &str,
        content: String,
    ) -> Result<Comment, BackendError>;

    async fn delete_comment(&self, actor: &UserId, id: &str) -> Result<(), BackendError>;

    // --- jobs ---

    async fn list_jobs(&self) -> Result<Vec<JobListing>, BackendError>;

    async fn insert_job(&self, actor: &UserId, job: NewJob) -> Result<JobListing, BackendError>;

    async fn update_job(
        &self,
        actor: &UserId,
        id: &str,
        job: NewJob,
    ) -> Result<JobListing, BackendError>;

    async fn delete_job(&self, actor: &UserId, id: &str) -> Result<(), BackendError>;

    // --- storage ---

    /// Object paths stored under `prefix`, sorted.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, BackendError>;

    async fn remove_objects(&self, actor: &UserId, paths: &[String]) -> Result<(), BackendError>;

    async fn upload_object(
        &self,
        actor: &UserId,
        path: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<(), BackendError>;

    fn public_url(&self, path: &str) -> String;
}

pub type DynForumBackend = Arc<dyn ForumBackend>;
