use bytes::Bytes;
use std::fmt;
use std::path::Path;

use crate::db::models::{Profile, ProfilePatch};
use crate::forum::backend::{BackendError, ForumBackend};
use crate::forum::dialogs::{DialogOutcome, ValidationError};
use crate::forum::domain::UserId;
use crate::forum::notify::Toast;

pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

/// Folder holding one user's avatar objects.
pub fn avatar_folder(user: &UserId) -> String {
    format!("avatars/{}", user)
}

/// Image types accepted as avatars, with the extension they are stored under.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// Stored extension for an accepted image content type. Parameters after
/// `;` are ignored.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// Content type a stored object is served with, derived from its extension.
pub fn image_content_type(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    let ext = if ext == "jpeg" { "jpg" } else { ext.as_str() };
    IMAGE_TYPES
        .iter()
        .find(|(_, known)| *known == ext)
        .map(|(mime, _)| *mime)
}

#[derive(Debug, Clone)]
pub struct AvatarFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl AvatarFile {
    /// Checks type and size; returns the extension the file is stored under.
    /// The client's file name never decides it.
    fn validate(&self) -> Result<&'static str, ValidationError> {
        let ext = image_extension(&self.content_type)
            .ok_or_else(|| ValidationError::new("Можно загружать только изображения"))?;
        if self.data.len() > MAX_AVATAR_BYTES {
            return Err(ValidationError::new("Размер файла не должен превышать 2 МБ"));
        }
        Ok(ext)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarStep {
    List,
    Remove,
    Upload,
    Patch,
}

impl fmt::Display for AvatarStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AvatarStep::List => "list",
            AvatarStep::Remove => "remove",
            AvatarStep::Upload => "upload",
            AvatarStep::Patch => "patch",
        };
        f.write_str(name)
    }
}

/// Replaces a user's avatar: list, remove old objects, upload, patch profile.
///
/// The steps are not atomic. If a later step fails, earlier ones stay done
/// (old files may already be gone); the failing step is logged.
#[derive(Debug, Default)]
pub struct AvatarUpload {
    uploading: bool,
    error: Option<String>,
    toasts: Vec<Toast>,
}

impl AvatarUpload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    pub async fn upload(
        &mut self,
        backend: &dyn ForumBackend,
        user: &UserId,
        file: AvatarFile,
    ) -> DialogOutcome<Profile> {
        let ext = match file.validate() {
            Ok(ext) => ext,
            Err(e) => {
                self.error = Some(e.0.clone());
                self.toasts.push(Toast::error(e.0.clone()));
                return DialogOutcome::Invalid(e);
            }
        };

        self.error = None;
        self.uploading = true;
        let result = replace_avatar(backend, user, &file, ext).await;
        self.uploading = false;

        match result {
            Ok(profile) => {
                self.toasts.push(Toast::success("Аватар обновлён"));
                DialogOutcome::Saved(profile)
            }
            Err((step, e)) => {
                tracing::warn!("Avatar {} step failed for {}: {}", step, user, e);
                let message = e.to_string();
                self.error = Some(message.clone());
                self.toasts.push(Toast::error(message));
                DialogOutcome::Failed(e)
            }
        }
    }
}

async fn replace_avatar(
    backend: &dyn ForumBackend,
    user: &UserId,
    file: &AvatarFile,
    ext: &str,
) -> Result<Profile, (AvatarStep, BackendError)> {
    let folder = avatar_folder(user);

    let existing = backend
        .list_objects(&folder)
        .await
        .map_err(|e| (AvatarStep::List, e))?;
    if !existing.is_empty() {
        backend
            .remove_objects(user, &existing)
            .await
            .map_err(|e| (AvatarStep::Remove, e))?;
    }

    let path = format!(
        "{}/{}.{}",
        folder,
        chrono::Utc::now().timestamp_millis(),
        ext
    );
    backend
        .upload_object(user, &path, &file.content_type, file.data.clone())
        .await
        .map_err(|e| (AvatarStep::Upload, e))?;

    let url = backend.public_url(&path);
    backend
        .update_profile(user, user, ProfilePatch::avatar(url))
        .await
        .map_err(|e| (AvatarStep::Patch, e))
}
