use chrono::{NaiveDateTime, Utc};
use serde::Serialize;

use crate::db::models::{Comment, JobListing, Topic};
use crate::extractors::MaybeUser;
use crate::forum::backend::ForumBackend;
use crate::forum::domain::UserId;
use crate::forum::notify::Toast;
use crate::forum::permissions::can_modify;
use crate::forum::roles::{RoleResolver, RoleState};

/// Who is looking at a page, with their resolved roles.
pub struct Viewer {
    pub id: Option<UserId>,
    pub roles: RoleState,
}

impl Viewer {
    pub async fn resolve(backend: &dyn ForumBackend, user: &MaybeUser) -> Self {
        let id = user.id().cloned();
        let mut resolver = RoleResolver::new(backend);
        resolver.resolve(id.as_ref()).await;
        Self {
            id,
            roles: resolver.into_state(),
        }
    }

    fn can_modify(&self, owner: &UserId) -> bool {
        can_modify(owner, self.id.as_ref(), &self.roles)
    }

    fn can_read_premium(&self, owner: &UserId) -> bool {
        self.roles.has_premium_access || self.id.as_ref() == Some(owner)
    }

    /// Whether the topic's content and comments are visible to this viewer.
    pub fn can_read(&self, topic: &Topic) -> bool {
        !topic.is_premium || self.can_read_premium(&topic.user_id)
    }
}

// --- View structs ---

#[derive(Debug, Serialize)]
pub struct TopicView {
    #[serde(flatten)]
    pub topic: Topic,
    pub created_ago: String,
    pub can_edit: bool,
    pub can_delete: bool,
    /// Premium content withheld from this viewer
    pub locked: bool,
}

impl TopicView {
    pub fn new(mut topic: Topic, viewer: &Viewer) -> Self {
        let allowed = viewer.can_modify(&topic.user_id);
        let locked = !viewer.can_read(&topic);
        if locked {
            topic.content.clear();
        }
        Self {
            created_ago: parse_and_format_time(&topic.created_at),
            can_edit: allowed,
            can_delete: allowed,
            locked,
            topic,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub created_ago: String,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl CommentView {
    pub fn new(comment: Comment, viewer: &Viewer) -> Self {
        let allowed = viewer.can_modify(&comment.user_id);
        Self {
            created_ago: parse_and_format_time(&comment.created_at),
            can_edit: allowed,
            can_delete: allowed,
            comment,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobView {
    #[serde(flatten)]
    pub job: JobListing,
    pub created_ago: String,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl JobView {
    pub fn new(job: JobListing, viewer: &Viewer) -> Self {
        let allowed = viewer.can_modify(&job.user_id);
        Self {
            created_ago: parse_and_format_time(&job.created_at),
            can_edit: allowed,
            can_delete: allowed,
            job,
        }
    }
}

/// Body of every dialog-backed mutation. `list` is the re-fetched parent
/// list when the dialog's refresh callback fired.
#[derive(Debug, Serialize)]
pub struct MutationResponse<T: Serialize, L: Serialize> {
    pub toast: Option<Toast>,
    pub closed: bool,
    pub refreshed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
    pub list: Vec<L>,
}

// --- Time formatting ---

fn parse_and_format_time(db_time: &str) -> String {
    NaiveDateTime::parse_from_str(db_time, "%Y-%m-%d %H:%M:%S")
        .map(|dt| format_relative_time(&dt))
        .unwrap_or_else(|_| db_time.to_string())
}

pub fn format_relative_time(dt: &NaiveDateTime) -> String {
    let now = Utc::now().naive_utc();
    let diff = now.signed_duration_since(*dt);

    if diff.num_seconds() < 60 {
        return "только что".to_string();
    }

    let minutes = diff.num_minutes();
    if minutes < 60 {
        return format!("{} мин назад", minutes);
    }

    let hours = diff.num_hours();
    if hours < 24 {
        return format!("{} ч назад", hours);
    }

    let days = diff.num_days();
    if days < 7 {
        return format!("{} дн назад", days);
    }

    dt.format("%d.%m.%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::domain::{Role, SubscriptionTier, TopicCategory};
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn topic(owner: &str, premium: bool) -> Topic {
        Topic {
            id: "t1".to_string(),
            user_id: UserId::new(owner),
            author: owner.to_string(),
            author_avatar_url: None,
            title: "Тема".to_string(),
            content: "Секретный текст".to_string(),
            category: TopicCategory::Backend,
            is_premium: premium,
            likes: 0,
            views: 0,
            comment_count: 0,
            created_at: "2025-01-15 12:00:00".to_string(),
            updated_at: "2025-01-15 12:00:00".to_string(),
        }
    }

    fn viewer(id: Option<&str>, roles: &[Role], tier: SubscriptionTier) -> Viewer {
        Viewer {
            id: id.map(UserId::new),
            roles: RoleState::derive(roles.iter().copied().collect::<BTreeSet<_>>(), tier),
        }
    }

    #[test]
    fn free_viewer_sees_locked_premium_topic() {
        let view = TopicView::new(topic("a", true), &viewer(Some("b"), &[], SubscriptionTier::Free));
        assert!(view.locked);
        assert!(view.topic.content.is_empty());
        assert!(!view.can_edit);
    }

    #[test]
    fn author_and_subscribers_read_premium_topic() {
        let own = TopicView::new(topic("a", true), &viewer(Some("a"), &[], SubscriptionTier::Free));
        assert!(!own.locked);
        assert!(own.can_delete);

        let paid = TopicView::new(
            topic("a", true),
            &viewer(Some("b"), &[], SubscriptionTier::Premium),
        );
        assert!(!paid.locked);
        assert_eq!(paid.topic.content, "Секретный текст");
    }

    #[test]
    fn premium_topic_is_readable_by_owner_and_subscribers_only() {
        let premium = topic("a", true);
        assert!(!viewer(None, &[], SubscriptionTier::Free).can_read(&premium));
        assert!(!viewer(Some("b"), &[Role::Moderator], SubscriptionTier::Free).can_read(&premium));
        assert!(viewer(Some("a"), &[], SubscriptionTier::Free).can_read(&premium));
        assert!(viewer(Some("b"), &[], SubscriptionTier::Sponsor).can_read(&premium));
        assert!(viewer(None, &[], SubscriptionTier::Free).can_read(&topic("a", false)));
    }

    #[test]
    fn moderator_gets_affordances_on_foreign_topic() {
        let view = TopicView::new(
            topic("a", false),
            &viewer(Some("m"), &[Role::Moderator], SubscriptionTier::Free),
        );
        assert!(view.can_edit);
        assert!(view.can_delete);
        assert!(!view.locked);
    }

    #[test]
    fn anonymous_gets_no_affordances() {
        let view = TopicView::new(topic("a", false), &viewer(None, &[], SubscriptionTier::Free));
        assert!(!view.can_edit);
        assert_eq!(view.created_ago, "15.01.2025");
    }

    #[test]
    fn format_relative_time_just_now() {
        let now = Utc::now().naive_utc();
        assert_eq!(format_relative_time(&now), "только что");
    }

    #[test]
    fn format_relative_time_minutes_hours_days() {
        let now = Utc::now().naive_utc();
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::minutes(5))),
            "5 мин назад"
        );
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::hours(3))),
            "3 ч назад"
        );
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::days(2))),
            "2 дн назад"
        );
    }

    #[test]
    fn format_relative_time_old_date() {
        let dt = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(format_relative_time(&dt), "15.01.2025");
    }

    #[test]
    fn parse_and_format_bad_input_returns_raw() {
        assert_eq!(parse_and_format_time("not-a-date"), "not-a-date");
    }
}
