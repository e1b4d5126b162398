use async_trait::async_trait;
use serde::Deserialize;

use super::{max_chars, required, DialogAction, ValidationError};
use crate::db::models::{NewTopic, Topic};
use crate::forum::backend::{BackendError, ForumBackend};
use crate::forum::domain::{TopicCategory, UserId};
use crate::forum::sanitize::{sanitize_html, sanitize_text};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_TOPIC_CHARS: usize = 20_000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TopicForm {
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_premium: bool,
}

impl From<&Topic> for TopicForm {
    fn from(topic: &Topic) -> Self {
        Self {
            title: topic.title.clone(),
            content: topic.content.clone(),
            category: topic.category.to_string(),
            is_premium: topic.is_premium,
        }
    }
}

fn prepare_topic(form: &TopicForm) -> Result<NewTopic, ValidationError> {
    let title = required(&form.title, "Введите заголовок темы")?;
    max_chars(&title, MAX_TITLE_CHARS, "Заголовок не длиннее 200 символов")?;
    let content = required(&form.content, "Введите текст темы")?;
    max_chars(&content, MAX_TOPIC_CHARS, "Текст темы не длиннее 20000 символов")?;

    let category = form.category.trim();
    if category.is_empty() {
        return Err(ValidationError::new("Выберите категорию"));
    }
    let category: TopicCategory = category
        .parse()
        .map_err(|_| ValidationError::new(format!("Неизвестная категория: {category}")))?;

    let title = sanitize_text(&title);
    let content = sanitize_html(&content);
    if title.trim().is_empty() {
        return Err(ValidationError::new("Введите заголовок темы"));
    }
    if content.trim().is_empty() {
        return Err(ValidationError::new("Введите текст темы"));
    }

    Ok(NewTopic {
        title,
        content,
        category,
        is_premium: form.is_premium,
    })
}

pub struct CreateTopic;

#[async_trait]
impl DialogAction for CreateTopic {
    type Form = TopicForm;
    type Input = NewTopic;
    type Output = Topic;

    fn prepare(&self, form: &TopicForm) -> Result<NewTopic, ValidationError> {
        prepare_topic(form)
    }

    async fn commit(
        &self,
        backend: &dyn ForumBackend,
        actor: &UserId,
        input: NewTopic,
    ) -> Result<Topic, BackendError> {
        backend.insert_topic(actor, input).await
    }

    fn success_message(&self) -> &'static str {
        "Тема создана"
    }
}

pub struct EditTopic {
    pub id: String,
}

impl EditTopic {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl DialogAction for EditTopic {
    type Form = TopicForm;
    type Input = NewTopic;
    type Output = Topic;

    fn prepare(&self, form: &TopicForm) -> Result<NewTopic, ValidationError> {
        prepare_topic(form)
    }

    async fn commit(
        &self,
        backend: &dyn ForumBackend,
        actor: &UserId,
        input: NewTopic,
    ) -> Result<Topic, BackendError> {
        backend.update_topic(actor, &self.id, input).await
    }

    fn success_message(&self) -> &'static str {
        "Тема обновлена"
    }
}

/// Confirmation dialog; the form is empty.
pub struct DeleteTopic {
    pub id: String,
}

impl DeleteTopic {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl DialogAction for DeleteTopic {
    type Form = ();
    type Input = ();
    type Output = ();

    fn prepare(&self, _form: &()) -> Result<(), ValidationError> {
        Ok(())
    }

    async fn commit(
        &self,
        backend: &dyn ForumBackend,
        actor: &UserId,
        _input: (),
    ) -> Result<(), BackendError> {
        backend.delete_topic(actor, &self.id).await
    }

    fn success_message(&self) -> &'static str {
        "Тема удалена"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::dialogs::{DialogOutcome, MutationDialog};
    use crate::forum::domain::{Role, SubscriptionTier};
    use crate::forum::testing::RecordingBackend;

    fn form(title: &str, content: &str, category: &str) -> TopicForm {
        TopicForm {
            title: title.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            is_premium: false,
        }
    }

    #[test]
    fn prepare_trims_and_parses_category() {
        let topic = prepare_topic(&form("  Rust  ", " <p>текст</p> ", "fullstack")).unwrap();
        assert_eq!(topic.title, "Rust");
        assert_eq!(topic.content, "<p>текст</p>");
        assert_eq!(topic.category, TopicCategory::Fullstack);
    }

    #[test]
    fn prepare_rejects_unknown_category() {
        let err = prepare_topic(&form("Rust", "текст", "devops")).unwrap_err();
        assert_eq!(err.0, "Неизвестная категория: devops");
        let err = prepare_topic(&form("Rust", "текст", " ")).unwrap_err();
        assert_eq!(err.0, "Выберите категорию");
    }

    #[test]
    fn prepare_rejects_long_title() {
        let long = "я".repeat(MAX_TITLE_CHARS + 1);
        let err = prepare_topic(&form(&long, "текст", "backend")).unwrap_err();
        assert_eq!(err.0, "Заголовок не длиннее 200 символов");
        assert!(prepare_topic(&form(&"я".repeat(MAX_TITLE_CHARS), "текст", "backend")).is_ok());
    }

    #[test]
    fn prepare_strips_markup() {
        let topic = prepare_topic(&form(
            "<b>Важно</b>",
            "<p>ok</p><script>alert(1)</script>",
            "frontend",
        ))
        .unwrap();
        assert_eq!(topic.title, "Важно");
        assert_eq!(topic.content, "<p>ok</p>");
    }

    #[test]
    fn content_that_is_only_script_is_empty() {
        let err = prepare_topic(&form("Тема", "<script>alert(1)</script>", "frontend"))
            .unwrap_err();
        assert_eq!(err.0, "Введите текст темы");
    }

    #[tokio::test]
    async fn moderator_deletes_foreign_topic() {
        let backend = RecordingBackend::new();
        let author = backend.add_user("author", &[], SubscriptionTier::Free);
        let moderator = backend.add_user("moder", &[Role::Moderator], SubscriptionTier::Free);

        let mut create = MutationDialog::new(CreateTopic);
        create.open_with(form("Тема", "Текст", "backend"));
        let DialogOutcome::Saved(topic) = create.submit(&backend, &author, || {}).await else {
            panic!("expected saved topic");
        };

        backend.reset_calls();
        let mut delete = MutationDialog::new(DeleteTopic::new(&topic.id));
        delete.open();
        let mut refreshed = false;
        let outcome = delete.submit(&backend, &moderator, || refreshed = true).await;

        assert!(outcome.is_saved());
        assert!(refreshed);
        assert_eq!(backend.calls(), vec!["delete_topic"]);
        assert!(backend.fetch_topic(&topic.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn edit_form_starts_from_topic() {
        let backend = RecordingBackend::new();
        let author = backend.add_user("author", &[], SubscriptionTier::Free);

        let mut create = MutationDialog::new(CreateTopic);
        create.open_with(form("Тема", "Текст", "frontend"));
        let DialogOutcome::Saved(topic) = create.submit(&backend, &author, || {}).await else {
            panic!("expected saved topic");
        };

        let mut edit = MutationDialog::new(EditTopic::new(&topic.id));
        edit.open_with(TopicForm::from(&topic));
        edit.form_mut().content = "Новый текст".to_string();
        let DialogOutcome::Saved(updated) = edit.submit(&backend, &author, || {}).await else {
            panic!("expected updated topic");
        };

        assert_eq!(updated.id, topic.id);
        assert_eq!(updated.title, "Тема");
        assert_eq!(updated.content, "Новый текст");
        assert_eq!(updated.category, TopicCategory::Frontend);
    }
}
