use derive_new::new;
use serde::de::IgnoredAny;
use tracing::instrument;
use url::Url;

use super::error::*;
use super::http::{Authorized, Http};
use crate::model::{AuthToken, Course, ProgressUpdate};

const SERVICE: &str = "course";

/// Course-content and course-progress endpoints; both live on the same url.
#[derive(Debug, Clone, new)]
pub struct CourseClient {
    http: Http,
    endpoint: Url,
}

impl CourseClient {
    /// The whole module/lesson/progress tree for the token's learner.
    ///
    /// A learner without access gets [ApiError::Remote] carrying the service message.
    #[instrument(skip_all)]
    pub async fn content(&self, token: &AuthToken) -> Result<Course> {
        let request = self.http.get(self.endpoint.clone()).authorized(token);
        let course: Course = self.http.send(SERVICE, request).await?;

        tracing::debug!(
            modules = course.modules.len(),
            lessons = course.lesson_count(),
            "fetched course content"
        );

        Ok(course)
    }

    #[instrument(skip(self, token))]
    pub async fn update_progress(&self, token: &AuthToken, update: &ProgressUpdate) -> Result<()> {
        let request = self
            .http
            .post(self.endpoint.clone())
            .authorized(token)
            .json(update);

        let _: IgnoredAny = self.http.send(SERVICE, request).await?;
        Ok(())
    }
}
