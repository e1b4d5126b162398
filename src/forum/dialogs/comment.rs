use async_trait::async_trait;
use serde::Deserialize;

use super::{max_chars, required, DialogAction, ValidationError};
use crate::db::models::Comment;
use crate::forum::backend::{BackendError, ForumBackend};
use crate::forum::domain::UserId;
use crate::forum::sanitize::sanitize_html;

pub const MAX_COMMENT_CHARS: usize = 5_000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub content: String,
}

fn prepare_comment(form: &CommentForm) -> Result<String, ValidationError> {
    let content = required(&form.content, "Введите текст комментария")?;
    max_chars(
        &content,
        MAX_COMMENT_CHARS,
        "Комментарий не длиннее 5000 символов",
    )?;
    let content = sanitize_html(&content);
    if content.trim().is_empty() {
        return Err(ValidationError::new("Введите текст комментария"));
    }
    Ok(content)
}

pub struct CreateComment {
    pub topic_id: String,
}

impl CreateComment {
    pub fn new(topic_id: impl Into<String>) -> Self {
        Self {
            topic_id: topic_id.into(),
        }
    }
}

#[async_trait]
impl DialogAction for CreateComment {
    type Form = CommentForm;
    type Input = String;
    type Output = Comment;

    fn prepare(&self, form: &CommentForm) -> Result<String, ValidationError> {
        prepare_comment(form)
    }

    async fn commit(
        &self,
        backend: &dyn ForumBackend,
        actor: &UserId,
        content: String,
    ) -> Result<Comment, BackendError> {
        backend.insert_comment(actor, &self.topic_id, content).await
    }

    fn success_message(&self) -> &'static str {
        "Комментарий добавлен"
    }
}

pub struct EditComment {
    pub id: String,
}

impl EditComment {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl DialogAction for EditComment {
    type Form = CommentForm;
    type Input = String;
    type Output = Comment;

    fn prepare(&self, form: &CommentForm) -> Result<String, ValidationError> {
        prepare_comment(form)
    }

    async fn commit(
        &self,
        backend: &dyn ForumBackend,
        actor: &UserId,
        content: String,
    ) -> Result<Comment, BackendError> {
        backend.update_comment(actor, &self.id, content).await
    }

    fn success_message(&self) -> &'static str {
        "Комментарий обновлён"
    }
}

pub struct DeleteComment {
    pub id: String,
}

impl DeleteComment {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl DialogAction for DeleteComment {
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
        backend.delete_comment(actor, &self.id).await
    }

    fn success_message(&self) -> &'static str {
        "Комментарий удалён"
    }
}
