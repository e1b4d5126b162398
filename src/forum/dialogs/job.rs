use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{max_chars, optional, required, DialogAction, ValidationError};
use crate::db::models::{JobListing, NewJob};
use crate::forum::backend::{BackendError, ForumBackend};
use crate::forum::domain::{JobType, UserId};
use crate::forum::sanitize::sanitize_text;

pub const MAX_JOB_FIELD_CHARS: usize = 200;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobForm {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub salary: Option<String>,
    pub logo_url: Option<String>,
}

impl From<&JobListing> for JobForm {
    fn from(job: &JobListing) -> Self {
        Self {
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            job_type: job.job_type.to_string(),
            salary: job.salary.clone(),
            logo_url: job.logo_url.clone(),
        }
    }
}

fn text_field(value: &str, missing: &str) -> Result<String, ValidationError> {
    let value = required(value, missing)?;
    max_chars(&value, MAX_JOB_FIELD_CHARS, "Поле не длиннее 200 символов")?;
    let value = sanitize_text(&value);
    if value.trim().is_empty() {
        return Err(ValidationError::new(missing));
    }
    Ok(value)
}

fn logo_url(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(raw) = optional(value) else {
        return Ok(None);
    };
    let invalid = || ValidationError::new("Ссылка на логотип должна начинаться с http:// или https://");
    let parsed = Url::parse(&raw).map_err(|_| invalid())?;
    match parsed.scheme() {
        "http" | "https" => Ok(Some(parsed.to_string())),
        _ => Err(invalid()),
    }
}

fn prepare_job(form: &JobForm) -> Result<NewJob, ValidationError> {
    let title = text_field(&form.title, "Введите название вакансии")?;
    let company = text_field(&form.company, "Укажите компанию")?;
    let location = text_field(&form.location, "Укажите местоположение")?;

    let job_type = form.job_type.trim();
    if job_type.is_empty() {
        return Err(ValidationError::new("Выберите тип занятости"));
    }
    let job_type: JobType = job_type
        .parse()
        .map_err(|_| ValidationError::new(format!("Неизвестный тип занятости: {job_type}")))?;

    let salary = match optional(form.salary.as_deref()) {
        Some(salary) => {
            max_chars(&salary, MAX_JOB_FIELD_CHARS, "Поле не длиннее 200 символов")?;
            Some(sanitize_text(&salary)).filter(|s| !s.trim().is_empty())
        }
        None => None,
    };

    Ok(NewJob {
        title,
        company,
        location,
        job_type,
        salary,
        logo_url: logo_url(form.logo_url.as_deref())?,
    })
}

pub struct CreateJob;

#[async_trait]
impl DialogAction for CreateJob {
    type Form = JobForm;
    type Input = NewJob;
    type Output = JobListing;

    fn prepare(&self, form: &JobForm) -> Result<NewJob, ValidationError> {
        prepare_job(form)
    }

    async fn commit(
        &self,
        backend: &dyn ForumBackend,
        actor: &UserId,
        input: NewJob,
    ) -> Result<JobListing, BackendError> {
        backend.insert_job(actor, input).await
    }

    fn success_message(&self) -> &'static str {
        "Вакансия опубликована"
    }
}

pub struct EditJob {
    pub id: String,
}

impl EditJob {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl DialogAction for EditJob {
    type Form = JobForm;
    type Input = NewJob;
    type Output = JobListing;

    fn prepare(&self, form: &JobForm) -> Result<NewJob, ValidationError> {
        prepare_job(form)
    }

    async fn commit(
        &self,
        backend: &dyn ForumBackend,
        actor: &UserId,
        input: NewJob,
    ) -> Result<JobListing, BackendError> {
        backend.update_job(actor, &self.id, input).await
    }

    fn success_message(&self) -> &'static str {
        "Вакансия обновлена"
    }
}

pub struct DeleteJob {
    pub id: String,
}

impl DeleteJob {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl DialogAction for DeleteJob {
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
        backend.delete_job(actor, &self.id).await
    }

    fn success_message(&self) -> &'static str {
        "Вакансия удалена"
    }
}
