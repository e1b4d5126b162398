//! Form dialogs that create, edit or delete forum content and profiles.
//!
//! A dialog owns its form state. Submitting validates and sanitizes the form,
//! then issues exactly one backend call. Invalid input never reaches the
//! backend; backend errors are kept verbatim and leave the dialog open.

mod comment;
mod job;
mod profile;
mod topic;

pub use comment::{CommentForm, CreateComment, DeleteComment, EditComment};
pub use job::{CreateJob, DeleteJob, EditJob, JobForm};
pub use profile::{EditProfile, ProfileForm};
pub use topic::{CreateTopic, DeleteTopic, EditTopic, TopicForm};

use async_trait::async_trait;

use crate::forum::backend::{BackendError, ForumBackend};
use crate::forum::domain::UserId;
use crate::forum::notify::Toast;

/// Input rejected before any backend call. The message is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug)]
pub enum DialogOutcome<T> {
    Saved(T),
    Invalid(ValidationError),
    Failed(BackendError),
}

impl<T> DialogOutcome<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, DialogOutcome::Saved(_))
    }
}

/// What a dialog does on submit.
#[async_trait]
pub trait DialogAction: Send + Sync {
    type Form: Default + Send + Sync;
    type Input: Send;
    type Output: Send;

    /// Trim, check and sanitize the form. Must not touch the backend.
    fn prepare(&self, form: &Self::Form) -> Result<Self::Input, ValidationError>;

    /// The single backend call of this action.
    async fn commit(
        &self,
        backend: &dyn ForumBackend,
        actor: &UserId,
        input: Self::Input,
    ) -> Result<Self::Output, BackendError>;

    fn success_message(&self) -> &'static str;
}

pub struct MutationDialog<A: DialogAction> {
    action: A,
    form: A::Form,
    open: bool,
    loading: bool,
    error: Option<String>,
    toasts: Vec<Toast>,
}

impl<A: DialogAction> MutationDialog<A> {
    pub fn new(action: A) -> Self {
        Self {
            action,
            form: A::Form::default(),
            open: false,
            loading: false,
            error: None,
            toasts: Vec::new(),
        }
    }

    /// Open the dialog with the given form contents.
    pub fn open_with(&mut self, form: A::Form) {
        self.form = form;
        self.open();
    }

    pub fn open(&mut self) {
        self.open = true;
        self.error = None;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.loading = false;
        self.error = None;
        self.form = A::Form::default();
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn form(&self) -> &A::Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut A::Form {
        &mut self.form
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    /// Validate, persist, and report. `on_success` runs exactly once, after
    /// the dialog has closed, and only when the backend call succeeded.
    pub async fn submit<F>(
        &mut self,
        backend: &dyn ForumBackend,
        actor: &UserId,
        on_success: F,
    ) -> DialogOutcome<A::Output>
    where
        F: FnOnce(),
    {
        if !self.open {
            return self.reject(ValidationError::new("Форма закрыта"));
        }

        let input = match self.action.prepare(&self.form) {
            Ok(input) => input,
            Err(e) => return self.reject(e),
        };

        self.error = None;
        self.loading = true;
        let result = self.action.commit(backend, actor, input).await;
        self.loading = false;

        match result {
            Ok(output) => {
                self.toasts.push(Toast::success(self.action.success_message()));
                self.close();
                on_success();
                DialogOutcome::Saved(output)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!("Dialog submit by {} failed: {}", actor, message);
                self.error = Some(message.clone());
                self.toasts.push(Toast::error(message));
                DialogOutcome::Failed(e)
            }
        }
    }

    fn reject(&mut self, e: ValidationError) -> DialogOutcome<A::Output> {
        self.error = Some(e.0.clone());
        self.toasts.push(Toast::error(e.0.clone()));
        DialogOutcome::Invalid(e)
    }
}

// --- Validation helpers ---

pub(crate) fn required(value: &str, message: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::new(message))
    } else {
        Ok(trimmed.to_string())
    }
}

pub(crate) fn max_chars(value: &str, max: usize, message: &str) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::new(message))
    } else {
        Ok(())
    }
}

/// Trimmed value, or `None` when blank.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
