// SQLite + filesystem implementation of the forum backend
use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::db::models::{
    Comment, JobListing, LikeState, NewJob, NewTopic, Profile, ProfilePatch, Topic, TopicQuery,
};
use crate::forum::avatar::{image_content_type, image_extension};
use crate::forum::backend::{BackendError, ForumBackend};
use crate::forum::domain::{ModerationFlags, Role, SubscriptionTier, UnknownVariant, UserId};
use crate::forum::storage::ObjectStore;
use crate::state::DbPool;

const PROFILE_COLUMNS: &str = "id, username, avatar_url, subscription_type, bio, website, \
     github, telegram, is_banned, is_muted, is_frozen, created_at, updated_at";

const TOPIC_SELECT: &str = "SELECT t.id, t.user_id, p.username, p.avatar_url, t.title, t.content,
            t.category, t.is_premium, t.likes, t.views,
            (SELECT COUNT(*) FROM comments c WHERE c.topic_id = t.id),
            t.created_at, t.updated_at
     FROM topics t
     JOIN profiles p ON p.id = t.user_id";

const COMMENT_SELECT: &str = "SELECT c.id, c.topic_id, c.user_id, p.username, p.avatar_url,
            c.content, c.created_at, c.updated_at
     FROM comments c
     JOIN profiles p ON p.id = c.user_id";

const JOB_SELECT: &str = "SELECT id, user_id, title, company, location, job_type, salary,
            logo_url, created_at
     FROM jobs";

const AVATAR_ROOT: &str = "avatars";

pub struct SqliteForumBackend {
    pool: DbPool,
    store: ObjectStore,
    max_object_bytes: usize,
}

impl SqliteForumBackend {
    pub fn new(pool: DbPool, store: ObjectStore, max_object_bytes: usize) -> Self {
        Self {
            pool,
            store,
            max_object_bytes,
        }
    }
}

// --- Row mapping ---

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_profile(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: UserId(row.get(0)?),
        username: row.get(1)?,
        avatar_url: row.get(2)?,
        subscription_type: parse_column(row, 3)?,
        bio: row.get(4)?,
        website: row.get(5)?,
        github: row.get(6)?,
        telegram: row.get(7)?,
        moderation: ModerationFlags {
            is_banned: row.get(8)?,
            is_muted: row.get(9)?,
            is_frozen: row.get(10)?,
        },
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn map_topic(row: &Row<'_>) -> rusqlite::Result<Topic> {
    Ok(Topic {
        id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        author: row.get(2)?,
        author_avatar_url: row.get(3)?,
        title: row.get(4)?,
        content: row.get(5)?,
        category: parse_column(row, 6)?,
        is_premium: row.get(7)?,
        likes: row.get(8)?,
        views: row.get(9)?,
        comment_count: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn map_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        topic_id: row.get(1)?,
        user_id: UserId(row.get(2)?),
        author: row.get(3)?,
        author_avatar_url: row.get(4)?,
        content: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn map_job(row: &Row<'_>) -> rusqlite::Result<JobListing> {
    Ok(JobListing {
        id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        title: row.get(2)?,
        company: row.get(3)?,
        location: row.get(4)?,
        job_type: parse_column(row, 5)?,
        salary: row.get(6)?,
        logo_url: row.get(7)?,
        created_at: row.get(8)?,
    })
}

// --- Query helpers ---

fn load_profile(conn: &Connection, id: &UserId) -> Result<Option<Profile>, BackendError> {
    let sql = format!("SELECT {} FROM profiles WHERE id = ?1", PROFILE_COLUMNS);
    Ok(conn
        .query_row(&sql, params![id.as_str()], map_profile)
        .optional()?)
}

fn require_profile(conn: &Connection, id: &UserId) -> Result<Profile, BackendError> {
    load_profile(conn, id)?.ok_or_else(|| BackendError::not_found("Пользователь не найден"))
}

fn load_roles(conn: &Connection, id: &UserId) -> Result<BTreeSet<Role>, BackendError> {
    let mut stmt = conn.prepare("SELECT role FROM user_roles WHERE user_id = ?1")?;
    let roles = stmt
        .query_map(params![id.as_str()], |row| parse_column::<Role>(row, 0))?
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(roles)
}

fn load_topic(conn: &Connection, id: &str) -> Result<Option<Topic>, BackendError> {
    let sql = format!("{} WHERE t.id = ?1", TOPIC_SELECT);
    Ok(conn.query_row(&sql, params![id], map_topic).optional()?)
}

fn load_comment(conn: &Connection, id: &str) -> Result<Option<Comment>, BackendError> {
    let sql = format!("{} WHERE c.id = ?1", COMMENT_SELECT);
    Ok(conn.query_row(&sql, params![id], map_comment).optional()?)
}

fn load_job(conn: &Connection, id: &str) -> Result<Option<JobListing>, BackendError> {
    let sql = format!("{} WHERE id = ?1", JOB_SELECT);
    Ok(conn.query_row(&sql, params![id], map_job).optional()?)
}

// --- Row-level checks ---

fn can_moderate(conn: &Connection, actor: &UserId) -> Result<bool, BackendError> {
    Ok(load_roles(conn, actor)?
        .iter()
        .any(|role| role.can_moderate_content()))
}

fn ensure_manager(conn: &Connection, actor: &UserId) -> Result<(), BackendError> {
    let allowed = load_roles(conn, actor)?
        .iter()
        .any(|role| role.can_manage_users());
    if allowed {
        Ok(())
    } else {
        Err(BackendError::forbidden("Недостаточно прав"))
    }
}

/// Banned and frozen accounts may not change anything.
fn ensure_active(conn: &Connection, actor: &UserId) -> Result<Profile, BackendError> {
    let profile = load_profile(conn, actor)?
        .ok_or_else(|| BackendError::forbidden("Требуется авторизация"))?;
    if profile.moderation.is_banned || profile.moderation.is_frozen {
        let reason = profile
            .moderation
            .write_block_reason()
            .unwrap_or("Недостаточно прав");
        return Err(BackendError::forbidden(reason));
    }
    Ok(profile)
}

/// Muted accounts additionally may not publish.
fn ensure_can_publish(conn: &Connection, actor: &UserId) -> Result<Profile, BackendError> {
    let profile = ensure_active(conn, actor)?;
    if let Some(reason) = profile.moderation.write_block_reason() {
        return Err(BackendError::forbidden(reason));
    }
    Ok(profile)
}

fn ensure_owner_or_moderator(
    conn: &Connection,
    table: &str,
    id: &str,
    actor: &UserId,
    missing: &str,
) -> Result<(), BackendError> {
    let sql = format!("SELECT user_id FROM {} WHERE id = ?1", table);
    let owner: Option<String> = conn
        .query_row(&sql, params![id], |row| row.get(0))
        .optional()?;

    match owner {
        None => Err(BackendError::not_found(missing)),
        Some(owner) if owner == actor.as_str() => Ok(()),
        Some(_) if can_moderate(conn, actor)? => Ok(()),
        Some(_) => Err(BackendError::forbidden(
            "Недостаточно прав для изменения этой записи",
        )),
    }
}

fn ensure_avatar_path(actor: &UserId, path: &str) -> Result<(), BackendError> {
    let own_prefix = format!("{}/{}/", AVATAR_ROOT, actor);
    if path.starts_with(&own_prefix) {
        Ok(())
    } else {
        Err(BackendError::forbidden("Нет доступа к этому файлу"))
    }
}

fn has_premium_access(conn: &Connection, profile: &Profile) -> Result<bool, BackendError> {
    if profile.subscription_type != SubscriptionTier::Free {
        return Ok(true);
    }
    Ok(load_roles(conn, &profile.id)?
        .iter()
        .any(|role| role.can_manage_users()))
}

#[async_trait]
impl ForumBackend for SqliteForumBackend {
    async fn fetch_profile(&self, user: &UserId) -> Result<Option<Profile>, BackendError> {
        let conn = self.pool.get()?;
        load_profile(&conn, user)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, BackendError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM profiles ORDER BY created_at ASC, id ASC",
            PROFILE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let profiles = stmt
            .query_map([], map_profile)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    async fn update_profile(
        &self,
        actor: &UserId,
        target: &UserId,
        patch: ProfilePatch,
    ) -> Result<Profile, BackendError> {
        if actor != target {
            return Err(BackendError::forbidden("Можно изменять только свой профиль"));
        }

        let conn = self.pool.get()?;
        let mut profile = ensure_active(&conn, actor)?;

        let ProfilePatch {
            bio,
            website,
            github,
            telegram,
            avatar_url,
        } = patch;
        if let Some(bio) = bio {
            profile.bio = bio;
        }
        if let Some(website) = website {
            profile.website = website;
        }
        if let Some(github) = github {
            profile.github = github;
        }
        if let Some(telegram) = telegram {
            profile.telegram = telegram;
        }
        if let Some(avatar_url) = avatar_url {
            profile.avatar_url = avatar_url;
        }

        conn.execute(
            "UPDATE profiles
             SET bio = ?2, website = ?3, github = ?4, telegram = ?5, avatar_url = ?6,
                 updated_at = datetime('now')
             WHERE id = ?1",
            params![
                target.as_str(),
                profile.bio,
                profile.website,
                profile.github,
                profile.telegram,
                profile.avatar_url
            ],
        )?;

        require_profile(&conn, target)
    }

    async fn set_subscription(
        &self,
        actor: &UserId,
        target: &UserId,
        tier: SubscriptionTier,
    ) -> Result<Profile, BackendError> {
        let conn = self.pool.get()?;
        ensure_manager(&conn, actor)?;
        if tier == SubscriptionTier::Admin {
            return Err(BackendError::rejected(
                "Тариф admin назначается автоматически по роли",
            ));
        }
        require_profile(&conn, target)?;

        conn.execute(
            "UPDATE profiles SET subscription_type = ?2, updated_at = datetime('now') WHERE id = ?1",
            params![target.as_str(), tier.as_str()],
        )?;
        tracing::info!("Subscription of {} set to {} by {}", target, tier, actor);

        require_profile(&conn, target)
    }

    async fn set_moderation(
        &self,
        actor: &UserId,
        target: &UserId,
        flags: ModerationFlags,
    ) -> Result<Profile, BackendError> {
        let conn = self.pool.get()?;
        if !can_moderate(&conn, actor)? {
            return Err(BackendError::forbidden("Недостаточно прав"));
        }
        if actor == target {
            return Err(BackendError::rejected("Нельзя изменить собственный статус"));
        }
        require_profile(&conn, target)?;
        if load_roles(&conn, target)?.contains(&Role::Creator) {
            return Err(BackendError::forbidden("Нельзя ограничить создателя форума"));
        }

        conn.execute(
            "UPDATE profiles
             SET is_banned = ?2, is_muted = ?3, is_frozen = ?4, updated_at = datetime('now')
             WHERE id = ?1",
            params![target.as_str(), flags.is_banned, flags.is_muted, flags.is_frozen],
        )?;
        // A ban ends every open session of the target
        if flags.is_banned {
            conn.execute(
                "DELETE FROM sessions WHERE user_id = ?1",
                params![target.as_str()],
            )?;
        }
        tracing::info!("Moderation of {} set to {:?} by {}", target, flags, actor);

        require_profile(&conn, target)
    }

    async fn fetch_roles(&self, user: &UserId) -> Result<BTreeSet<Role>, BackendError> {
        let conn = self.pool.get()?;
        load_roles(&conn, user)
    }

    async fn grant_role(
        &self,
        actor: &UserId,
        target: &UserId,
        role: Role,
    ) -> Result<(), BackendError> {
        let conn = self.pool.get()?;
        ensure_manager(&conn, actor)?;
        if role == Role::Creator {
            return Err(BackendError::forbidden("Роль creator не назначается"));
        }
        require_profile(&conn, target)?;

        conn.execute(
            "INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, ?2)",
            params![target.as_str(), role.as_str()],
        )?;
        tracing::info!("Role {} granted to {} by {}", role, target, actor);
        Ok(())
    }

    async fn revoke_role(
        &self,
        actor: &UserId,
        target: &UserId,
        role: Role,
    ) -> Result<(), BackendError> {
        let conn = self.pool.get()?;
        ensure_manager(&conn, actor)?;
        if role == Role::Creator {
            return Err(BackendError::forbidden("Роль creator не снимается"));
        }
        require_profile(&conn, target)?;

        conn.execute(
            "DELETE FROM user_roles WHERE user_id = ?1 AND role = ?2",
            params![target.as_str(), role.as_str()],
        )?;
        tracing::info!("Role {} revoked from {} by {}", role, target, actor);
        Ok(())
    }

    async fn list_topics(&self, query: &TopicQuery) -> Result<Vec<Topic>, BackendError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "{} WHERE (?1 IS NULL OR t.category = ?1)
             ORDER BY t.created_at DESC, t.id DESC
             LIMIT ?2 OFFSET ?3",
            TOPIC_SELECT
        );
        let category = query.category.map(|c| c.as_str());
        let mut stmt = conn.prepare(&sql)?;
        let topics = stmt
            .query_map(
                params![category, query.limit as i64, query.offset as i64],
                map_topic,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(topics)
    }

    async fn fetch_topic(&self, id: &str) -> Result<Option<Topic>, BackendError> {
        let conn = self.pool.get()?;
        load_topic(&conn, id)
    }

    async fn insert_topic(&self, actor: &UserId, topic: NewTopic) -> Result<Topic, BackendError> {
        let conn = self.pool.get()?;
        let profile = ensure_can_publish(&conn, actor)?;
        if topic.is_premium && !has_premium_access(&conn, &profile)? {
            return Err(BackendError::forbidden(
                "Премиум-темы могут создавать только подписчики",
            ));
        }

        let id = uuid::Uuid::now_v7().to_string();
        conn.execute(
            "INSERT INTO topics (id, user_id, title, content, category, is_premium)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                actor.as_str(),
                topic.title,
                topic.content,
                topic.category.as_str(),
                topic.is_premium
            ],
        )?;

        load_topic(&conn, &id)?.ok_or_else(|| BackendError::not_found("Тема не найдена"))
    }

    async fn update_topic(
        &self,
        actor: &UserId,
        id: &str,
        topic: NewTopic,
    ) -> Result<Topic, BackendError> {
        let conn = self.pool.get()?;
        let profile = ensure_active(&conn, actor)?;
        ensure_owner_or_moderator(&conn, "topics", id, actor, "Тема не найдена")?;
        // Turning premium on needs the same access as creating a premium topic
        if topic.is_premium {
            let was_premium = load_topic(&conn, id)?.is_some_and(|current| current.is_premium);
            if !was_premium && !has_premium_access(&conn, &profile)? {
                return Err(BackendError::forbidden(
                    "Премиум-темы могут создавать только подписчики",
                ));
            }
        }

        conn.execute(
            "UPDATE topics
             SET title = ?2, content = ?3, category = ?4, is_premium = ?5,
                 updated_at = datetime('now')
             WHERE id = ?1",
            params![
                id,
                topic.title,
                topic.content,
                topic.category.as_str(),
                topic.is_premium
            ],
        )?;

        load_topic(&conn, id)?.ok_or_else(|| BackendError::not_found("Тема не найдена"))
    }

    async fn delete_topic(&self, actor: &UserId, id: &str) -> Result<(), BackendError> {
        let conn = self.pool.get()?;
        ensure_active(&conn, actor)?;
        ensure_owner_or_moderator(&conn, "topics", id, actor, "Тема не найдена")?;

        conn.execute("DELETE FROM topics WHERE id = ?1", params![id])?;
        tracing::info!("Topic {} deleted by {}", id, actor);
        Ok(())
    }

    async fn record_topic_view(&self, id: &str) -> Result<(), BackendError> {
        let conn = self.pool.get()?;
        let updated = conn.execute(
            "UPDATE topics SET views = views + 1 WHERE id = ?1",
            params![id],
        )?;
        if updated == 0 {
            return Err(BackendError::not_found("Тема не найдена"));
        }
        Ok(())
    }

    async fn toggle_topic_like(&self, actor: &UserId, id: &str) -> Result<LikeState, BackendError> {
        let mut conn = self.pool.get()?;
        ensure_active(&conn, actor)?;

        let tx = conn.transaction()?;
        let exists: bool = tx.query_row(
            "SELECT COUNT(*) > 0 FROM topics WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(BackendError::not_found("Тема не найдена"));
        }

        let removed = tx.execute(
            "DELETE FROM topic_likes WHERE topic_id = ?1 AND user_id = ?2",
            params![id, actor.as_str()],
        )?;
        if removed == 0 {
            tx.execute(
                "INSERT INTO topic_likes (topic_id, user_id) VALUES (?1, ?2)",
                params![id, actor.as_str()],
            )?;
        }

        tx.execute(
            "UPDATE topics
             SET likes = (SELECT COUNT(*) FROM topic_likes WHERE topic_id = ?1)
             WHERE id = ?1",
            params![id],
        )?;
        let likes: i64 = tx.query_row(
            "SELECT likes FROM topics WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        tx.commit()?;

        Ok(LikeState {
            liked: removed == 0,
            likes,
        })
    }

    async fn list_comments(&self, topic_id: &str) -> Result<Vec<Comment>, BackendError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "{} WHERE c.topic_id = ?1 ORDER BY c.created_at ASC, c.id ASC",
            COMMENT_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let comments = stmt
            .query_map(params![topic_id], map_comment)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    async fn fetch_comment(&self, id: &str) -> Result<Option<Comment>, BackendError> {
        let conn = self.pool.get()?;
        load_comment(&conn, id)
    }

    async fn insert_comment(
        &self,
        actor: &UserId,
        topic_id: &str,
        content: String,
    ) -> Result<Comment, BackendError> {
        let conn = self.pool.get()?;
        ensure_can_publish(&conn, actor)?;
        if load_topic(&conn, topic_id)?.is_none() {
            return Err(BackendError::not_found("Тема не найдена"));
        }

        let id = uuid::Uuid::now_v7().to_string();
        conn.execute(
            "INSERT INTO comments (id, topic_id, user_id, content) VALUES (?1, ?2, ?3, ?4)",
            params![id, topic_id, actor.as_str(), content],
        )?;

        load_comment(&conn, &id)?.ok_or_else(|| BackendError::not_found("Комментарий не найден"))
    }

    async fn update_comment(
        &self,
        actor: &UserId,
        id: &str,
        content: String,
    ) -> Result<Comment, BackendError> {
        let conn = self.pool.get()?;
        ensure_active(&conn, actor)?;
        ensure_owner_or_moderator(&conn, "comments", id, actor, "Комментарий не найден")?;

        conn.execute(
            "UPDATE comments SET content = ?2, updated_at = datetime('now') WHERE id = ?1",
            params![id, content],
        )?;

        load_comment(&conn, id)?.ok_or_else(|| BackendError::not_found("Комментарий не найден"))
    }

    async fn delete_comment(&self, actor: &UserId, id: &str) -> Result<(), BackendError> {
        let conn = self.pool.get()?;
        ensure_active(&conn, actor)?;
        ensure_owner_or_moderator(&conn, "comments", id, actor, "Комментарий не найден")?;

        conn.execute("DELETE FROM comments WHERE id = ?1", params![id])?;
        Ok(())
    }

    async fn list_jobs(&self) -> Result<Vec<JobListing>, BackendError> {
        let conn = self.pool.get()?;
        let sql = format!("{} ORDER BY created_at DESC, id DESC", JOB_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let jobs = stmt
            .query_map([], map_job)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jobs)
    }

    async fn insert_job(&self, actor: &UserId, job: NewJob) -> Result<JobListing, BackendError> {
        let conn = self.pool.get()?;
        ensure_can_publish(&conn, actor)?;

        let id = uuid::Uuid::now_v7().to_string();
        conn.execute(
            "INSERT INTO jobs (id, user_id, title, company, location, job_type, salary, logo_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                actor.as_str(),
                job.title,
                job.company,
                job.location,
                job.job_type.as_str(),
                job.salary,
                job.logo_url
            ],
        )?;

        load_job(&conn, &id)?.ok_or_else(|| BackendError::not_found("Вакансия не найдена"))
    }

    async fn update_job(
        &self,
        actor: &UserId,
        id: &str,
        job: NewJob,
    ) -> Result<JobListing, BackendError> {
        let conn = self.pool.get()?;
        ensure_active(&conn, actor)?;
        ensure_owner_or_moderator(&conn, "jobs", id, actor, "Вакансия не найдена")?;

        conn.execute(
            "UPDATE jobs
             SET title = ?2, company = ?3, location = ?4, job_type = ?5, salary = ?6, logo_url = ?7
             WHERE id = ?1",
            params![
                id,
                job.title,
                job.company,
                job.location,
                job.job_type.as_str(),
                job.salary,
                job.logo_url
            ],
        )?;

        load_job(&conn, id)?.ok_or_else(|| BackendError::not_found("Вакансия не найдена"))
    }

    async fn delete_job(&self, actor: &UserId, id: &str) -> Result<(), BackendError> {
        let conn = self.pool.get()?;
        ensure_active(&conn, actor)?;
        ensure_owner_or_moderator(&conn, "jobs", id, actor, "Вакансия не найдена")?;

        conn.execute("DELETE FROM jobs WHERE id = ?1", params![id])?;
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        self.store.list(prefix)
    }

    async fn remove_objects(&self, actor: &UserId, paths: &[String]) -> Result<(), BackendError> {
        for path in paths {
            ensure_avatar_path(actor, path)?;
        }
        for path in paths {
            self.store.remove(path)?;
        }
        Ok(())
    }

    async fn upload_object(
        &self,
        actor: &UserId,
        path: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<(), BackendError> {
        ensure_avatar_path(actor, path)?;
        let Some(ext) = image_extension(content_type) else {
            return Err(BackendError::rejected("Можно загружать только изображения"));
        };
        if image_content_type(path).and_then(image_extension) != Some(ext) {
            return Err(BackendError::rejected(format!(
                "Расширение файла должно быть .{}",
                ext
            )));
        }
        if data.len() > self.max_object_bytes {
            return Err(BackendError::rejected("Файл слишком большой"));
        }

        self.store.put(path, &data)?;
        tracing::debug!("Stored {} ({} bytes)", path, data.len());
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        self.store.public_url(path)
    }
}
