use base64::engine::general_purpose;
use base64::Engine as _;
use derive_new::new;
use serde::{Deserialize, Serialize};
use snafu::ensure;
use tracing::instrument;
use url::Url;

use super::error::*;
use super::http::{with_query, Authorized, Http};
use crate::model::{AuthToken, CourseFile, FileId, LessonId, ModuleId, Timestamp};

const SERVICE: &str = "upload";

/// Body of a `POST` to the upload service: inline base64 content or an external link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
    pub file_type: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<LessonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<ModuleId>,
    pub is_welcome_video: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

impl Upload {
    pub fn inline(
        file_name: impl Into<String>, content: &[u8], file_type: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            file_name: Some(file_name.into()),
            file_content: Some(general_purpose::STANDARD.encode(content)),
            file_type: file_type.into(),
            title: title.into(),
            description: String::new(),
            lesson_id: None,
            module_id: None,
            is_welcome_video: false,
            external_url: None,
        }
    }

    pub fn link(url: impl Into<String>, file_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            file_name: None,
            file_content: None,
            file_type: file_type.into(),
            title: title.into(),
            description: String::new(),
            lesson_id: None,
            module_id: None,
            is_welcome_video: false,
            external_url: Some(url.into()),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn for_lesson(mut self, lesson_id: LessonId) -> Self {
        self.lesson_id = Some(lesson_id);
        self
    }

    pub fn for_module(mut self, module_id: ModuleId) -> Self {
        self.module_id = Some(module_id);
        self
    }

    pub fn welcome_video(mut self) -> Self {
        self.is_welcome_video = true;
        self
    }

    fn is_valid(&self) -> bool {
        let inline = self.file_name.is_some() && self.file_content.is_some();
        let linked = self
            .external_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty());

        inline || linked
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    pub id: FileId,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "uploadedAt")]
    pub uploaded_at: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
struct FileListing {
    #[serde(default)]
    files: Vec<CourseFile>,
}

#[derive(Debug, Deserialize)]
struct Deleted {
    #[serde(default)]
    success: bool,
}

#[derive(Debug, Clone, new)]
pub struct UploadClient {
    http: Http,
    endpoint: Url,
}

impl UploadClient {
    #[instrument(skip(self, token, upload), fields(title = %upload.title, welcome = upload.is_welcome_video))]
    pub async fn upload(&self, token: &AuthToken, upload: &Upload) -> Result<UploadedFile> {
        ensure!(upload.is_valid(), InvalidUploadSnafu);

        let request = self
            .http
            .post(self.endpoint.clone())
            .authorized(token)
            .json(upload);

        let file: UploadedFile = self.http.send(SERVICE, request).await?;
        tracing::info!(file.id = %file.id, "stored course file");

        Ok(file)
    }

    #[instrument(skip(self, token))]
    pub async fn files(
        &self, token: &AuthToken, lesson_id: Option<LessonId>, module_id: Option<ModuleId>,
    ) -> Result<Vec<CourseFile>> {
        let url = with_query(
            self.endpoint.clone(),
            [
                ("lesson_id", lesson_id.map(|id| id.to_string())),
                ("module_id", module_id.map(|id| id.to_string())),
            ],
        );

        let listing: FileListing = self.http.send(SERVICE, self.http.get(url).authorized(token)).await?;
        Ok(listing.files)
    }

    /// Returns whether the service confirmed the removal.
    #[instrument(skip(self, token))]
    pub async fn delete(&self, token: &AuthToken, file_id: FileId) -> Result<bool> {
        let url = with_query(self.endpoint.clone(), [("id", Some(file_id.to_string()))]);

        let deleted: Deleted = self
            .http
            .send(SERVICE, self.http.delete(url).authorized(token))
            .await?;
        Ok(deleted.success)
    }
}
