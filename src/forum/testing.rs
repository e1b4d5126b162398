// Test double: a real SQLite backend that records every call and can be told
// to fail specific operations.
use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::params;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use tempfile::TempDir;

use crate::db;
use crate::db::models::{
    Comment, JobListing, LikeState, NewJob, NewTopic, Profile, ProfilePatch, Topic, TopicQuery,
};
use crate::forum::backend::{BackendError, ForumBackend};
use crate::forum::domain::{ModerationFlags, Role, SubscriptionTier, UserId};
use crate::forum::repository::SqliteForumBackend;
use crate::forum::storage::ObjectStore;
use crate::state::DbPool;

pub struct RecordingBackend {
    inner: SqliteForumBackend,
    pub pool: DbPool,
    calls: Mutex<Vec<&'static str>>,
    failures: Mutex<HashMap<&'static str, String>>,
    _dir: TempDir,
}

impl RecordingBackend {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let pool = db::create_pool(&dir.path().join("test.db")).unwrap();
        db::run_migrations(&pool).unwrap();
        let store = ObjectStore::new(dir.path().join("uploads"), "/uploads");
        Self {
            inner: SqliteForumBackend::new(pool.clone(), store, 2 * 1024 * 1024),
            pool,
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            _dir: dir,
        }
    }

    pub fn add_user(&self, username: &str, roles: &[Role], tier: SubscriptionTier) -> UserId {
        let conn = self.pool.get().unwrap();
        let id = UserId::generate();
        conn.execute(
            "INSERT INTO profiles (id, username, password_hash, subscription_type)
             VALUES (?1, ?2, 'x', ?3)",
            params![id.as_str(), username, tier.as_str()],
        )
        .unwrap();
        for role in roles {
            conn.execute(
                "INSERT INTO user_roles (user_id, role) VALUES (?1, ?2)",
                params![id.as_str(), role.as_str()],
            )
            .unwrap();
        }
        id
    }

    /// Make every later call to `method` fail with `message`.
    pub fn fail(&self, method: &'static str, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(method, message.to_string());
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, method: &'static str) -> Result<(), BackendError> {
        self.calls.lock().unwrap().push(method);
        match self.failures.lock().unwrap().get(method) {
            Some(message) => Err(BackendError::Rejected(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ForumBackend for RecordingBackend {
    async fn fetch_profile(&self, user: &UserId) -> Result<Option<Profile>, BackendError> {
        self.record("fetch_profile")?;
        self.inner.fetch_profile(user).await
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, BackendError> {
        self.record("list_profiles")?;
        self.inner.list_profiles().await
    }

    async fn update_profile(
        &self,
        actor: &UserId,
        target: &UserId,
        patch: ProfilePatch,
    ) -> Result<Profile, BackendError> {
        self.record("update_profile")?;
        self.inner.update_profile(actor, target, patch).await
    }

    async fn set_subscription(
        &self,
        actor: &UserId,
        target: &UserId,
        tier: SubscriptionTier,
    ) -> Result<Profile, BackendError> {
        self.record("set_subscription")?;
        self.inner.set_subscription(actor, target, tier).await
    }

    async fn set_moderation(
        &self,
        actor: &UserId,
        target: &UserId,
        flags: ModerationFlags,
    ) -> Result<Profile, BackendError> {
        self.record("set_moderation")?;
        self.inner.set_moderation(actor, target, flags).await
    }

    async fn fetch_roles(&self, user: &UserId) -> Result<BTreeSet<Role>, BackendError> {
        self.record("fetch_roles")?;
        self.inner.fetch_roles(user).await
    }

    async fn grant_role(
        &self,
        actor: &UserId,
        target: &UserId,
        role: Role,
    ) -> Result<(), BackendError> {
        self.record("grant_role")?;
        self.inner.grant_role(actor, target, role).await
    }

    async fn revoke_role(
        &self,
        actor: &UserId,
        target: &UserId,
        role: Role,
    ) -> Result<(), BackendError> {
        self.record("revoke_role")?;
        self.inner.revoke_role(actor, target, role).await
    }

    async fn list_topics(&self, query: &TopicQuery) -> Result<Vec<Topic>, BackendError> {
        self.record("list_topics")?;
        self.inner.list_topics(query).await
    }

    async fn fetch_topic(&self, id: &str) -> Result<Option<Topic>, BackendError> {
        self.record("fetch_topic")?;
        self.inner.fetch_topic(id).await
    }

    async fn insert_topic(&self, actor: &UserId, topic: NewTopic) -> Result<Topic, BackendError> {
        self.record("insert_topic")?;
        self.inner.insert_topic(actor, topic).await
    }

    async fn update_topic(
        &self,
        actor: &UserId,
        id: &str,
        topic: NewTopic,
    ) -> Result<Topic, BackendError> {
        self.record("update_topic")?;
        self.inner.update_topic(actor, id, topic).await
    }

    async fn delete_topic(&self, actor: &UserId, id: &str) -> Result<(), BackendError> {
        self.record("delete_topic")?;
        self.inner.delete_topic(actor, id).await
    }

    async fn record_topic_view(&self, id: &str) -> Result<(), BackendError> {
        self.record("record_topic_view")?;
        self.inner.record_topic_view(id).await
    }

    async fn toggle_topic_like(&self, actor: &UserId, id: &str) -> Result<LikeState, BackendError> {
        self.record("toggle_topic_like")?;
        self.inner.toggle_topic_like(actor, id).await
    }

    async fn list_comments(&self, topic_id: &str) -> Result<Vec<Comment>, BackendError> {
        self.record("list_comments")?;
        self.inner.list_comments(topic_id).await
    }

    async fn fetch_comment(&self, id: &str) -> Result<Option<Comment>, BackendError> {
        self.record("fetch_comment")?;
        self.inner.fetch_comment(id).await
    }

    async fn insert_comment(
        &self,
        actor: &UserId,
        topic_id: &str,
        content: String,
    ) -> Result<Comment, BackendError> {
        self.record("insert_comment")?;
        self.inner.insert_comment(actor, topic_id, content).await
    }

    async fn update_comment(
        &self,
        actor: &UserId,
        id: &str,
        content: String,
    ) -> Result<Comment, BackendError> {
        self.record("update_comment")?;
        self.inner.update_comment(actor, id, content).await
    }

    async fn delete_comment(&self, actor: &UserId, id: &str) -> Result<(), BackendError> {
        self.record("delete_comment")?;
        self.inner.delete_comment(actor, id).await
    }

    async fn list_jobs(&self) -> Result<Vec<JobListing>, BackendError> {
        self.record("list_jobs")?;
        self.inner.list_jobs().await
    }

    async fn insert_job(&self, actor: &UserId, job: NewJob) -> Result<JobListing, BackendError> {
        self.record("insert_job")?;
        self.inner.insert_job(actor, job).await
    }

    async fn update_job(
        &self,
        actor: &UserId,
        id: &str,
        job: NewJob,
    ) -> Result<JobListing, BackendError> {
        self.record("update_job")?;
        self.inner.update_job(actor, id, job).await
    }

    async fn delete_job(&self, actor: &UserId, id: &str) -> Result<(), BackendError> {
        self.record("delete_job")?;
        self.inner.delete_job(actor, id).await
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        self.record("list_objects")?;
        self.inner.list_objects(prefix).await
    }

    async fn remove_objects(&self, actor: &UserId, paths: &[String]) -> Result<(), BackendError> {
        self.record("remove_objects")?;
        self.inner.remove_objects(actor, paths).await
    }

    async fn upload_object(
        &self,
        actor: &UserId,
        path: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<(), BackendError> {
        self.record("upload_object")?;
        self.inner.upload_object(actor, path, content_type, data).await
    }

    fn public_url(&self, path: &str) -> String {
        self.inner.public_url(path)
    }
}
