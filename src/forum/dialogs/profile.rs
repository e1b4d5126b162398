use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{max_chars, DialogAction, ValidationError};
use crate::db::models::{Profile, ProfilePatch};
use crate::forum::backend::{BackendError, ForumBackend};
use crate::forum::domain::UserId;
use crate::forum::sanitize::sanitize_text;

pub const MAX_BIO_CHARS: usize = 500;
const MAX_HANDLE_CHARS: usize = 64;

/// Omitted fields stay unchanged; an empty string clears the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub github: Option<String>,
    pub telegram: Option<String>,
}

type FieldRule = fn(&str) -> Result<String, ValidationError>;

fn field(value: Option<&str>, rule: FieldRule) -> Result<Option<Option<String>>, ValidationError> {
    match value.map(str::trim) {
        None => Ok(None),
        Some("") => Ok(Some(None)),
        Some(value) => rule(value).map(|clean| Some(Some(clean))),
    }
}

fn bio(value: &str) -> Result<String, ValidationError> {
    max_chars(value, MAX_BIO_CHARS, "Описание не длиннее 500 символов")?;
    Ok(sanitize_text(value))
}

fn website(value: &str) -> Result<String, ValidationError> {
    let invalid = || ValidationError::new("Сайт должен начинаться с http:// или https://");
    let url = Url::parse(value).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        _ => Err(invalid()),
    }
}

fn handle(value: &str, message: &str) -> Result<String, ValidationError> {
    let value = value.trim_start_matches('@');
    let valid = !value.is_empty()
        && value.chars().count() <= MAX_HANDLE_CHARS
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(value.to_string())
    } else {
        Err(ValidationError::new(message))
    }
}

fn github(value: &str) -> Result<String, ValidationError> {
    handle(value, "Некорректное имя пользователя GitHub")
}

fn telegram(value: &str) -> Result<String, ValidationError> {
    handle(value, "Некорректное имя пользователя Telegram")
}

/// Edit the actor's own bio and social links.
pub struct EditProfile;

#[async_trait]
impl DialogAction for EditProfile {
    type Form = ProfileForm;
    type Input = ProfilePatch;
    type Output = Profile;

    fn prepare(&self, form: &ProfileForm) -> Result<ProfilePatch, ValidationError> {
        let patch = ProfilePatch {
            bio: field(form.bio.as_deref(), bio)?,
            website: field(form.website.as_deref(), website)?,
            github: field(form.github.as_deref(), github)?,
            telegram: field(form.telegram.as_deref(), telegram)?,
            avatar_url: None,
        };
        if patch.is_empty() {
            return Err(ValidationError::new("Нет изменений для сохранения"));
        }
        Ok(patch)
    }

    async fn commit(
        &self,
        backend: &dyn ForumBackend,
        actor: &UserId,
        patch: ProfilePatch,
    ) -> Result<Profile, BackendError> {
        backend.update_profile(actor, actor, patch).await
    }

    fn success_message(&self) -> &'static str {
        "Профиль сохранён"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::dialogs::{DialogOutcome, MutationDialog};
    use crate::forum::domain::SubscriptionTier;
    use crate::forum::testing::RecordingBackend;

    #[test]
    fn omitted_fields_are_untouched_and_blank_clears() {
        let form = ProfileForm {
            bio: Some("  ".to_string()),
            github: Some("@ferris".to_string()),
            ..ProfileForm::default()
        };
        let patch = EditProfile.prepare(&form).unwrap();
        assert_eq!(patch.bio, Some(None));
        assert_eq!(patch.github, Some(Some("ferris".to_string())));
        assert_eq!(patch.website, None);
        assert_eq!(patch.avatar_url, None);
    }

    #[test]
    fn empty_form_is_rejected() {
        let err = EditProfile.prepare(&ProfileForm::default()).unwrap_err();
        assert_eq!(err.0, "Нет изменений для сохранения");
    }

    #[test]
    fn website_and_handles_are_checked() {
        let form = ProfileForm {
            website: Some("javascript:alert(1)".to_string()),
            ..ProfileForm::default()
        };
        assert!(EditProfile.prepare(&form).is_err());

        let form = ProfileForm {
            telegram: Some("bad handle!".to_string()),
            ..ProfileForm::default()
        };
        assert_eq!(
            EditProfile.prepare(&form).unwrap_err().0,
            "Некорректное имя пользователя Telegram"
        );
    }

    #[tokio::test]
    async fn saves_own_profile() {
        let backend = RecordingBackend::new();
        let user = backend.add_user("ivan", &[], SubscriptionTier::Free);

        let mut dialog = MutationDialog::new(EditProfile);
        dialog.open_with(ProfileForm {
            bio: Some("<b>Пишу на Rust</b>".to_string()),
            website: Some("https://ivan.dev".to_string()),
            ..ProfileForm::default()
        });
        let DialogOutcome::Saved(profile) = dialog.submit(&backend, &user, || {}).await else {
            panic!("expected saved profile");
        };

        assert_eq!(profile.bio.as_deref(), Some("Пишу на Rust"));
        assert_eq!(profile.website.as_deref(), Some("https://ivan.dev/"));
        assert_eq!(backend.calls(), vec!["update_profile"]);
    }
}
