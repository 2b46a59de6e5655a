use async_trait::async_trait;
use derive_new::new;

use super::error::*;
use super::{CourseClient, UploadClient};
use crate::model::{AuthToken, Course, CourseFile, ProgressUpdate};
use crate::service::dashboard::CourseSource;
use crate::service::reporter::ProgressSink;

/// Course and upload clients bound to one learner's token.
#[derive(Debug, Clone, new)]
pub struct LearnerApi {
    course: CourseClient,
    upload: UploadClient,
    token: AuthToken,
}

#[async_trait]
impl ProgressSink for LearnerApi {
    async fn send(&self, update: ProgressUpdate) -> Result<()> {
        self.course.update_progress(&self.token, &update).await
    }
}

#[async_trait]
impl CourseSource for LearnerApi {
    async fn course(&self) -> Result<Course> {
        self.course.content(&self.token).await
    }

    async fn files(&self) -> Result<Vec<CourseFile>> {
        self.upload.files(&self.token, None, None).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::model::fixtures::course_json;
    use crate::model::LessonId;
    use crate::service::api::testing::{http, serve};

    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    fn token_of(headers: &HeaderMap) -> String {
        headers
            .get("x-auth-token")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn learner() -> (LearnerApi, Seen) {
        let seen = Seen::default();

        let course = Router::new()
            .route(
                "/",
                get(|| async { Json(course_json()) }).post(
                    |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        seen.lock().unwrap().push((token_of(&headers), body));
                        Json(json!({"success": true}))
                    },
                ),
            )
            .with_state(seen.clone());
        let upload = Router::new().route(
            "/",
            get(|| async {
                Json(json!({"files": [
                    {"id": 1, "title": "Welcome", "fileType": "video/mp4", "isWelcomeVideo": true}
                ]}))
            }),
        );

        let api = LearnerApi::new(
            CourseClient::new(http(), serve(course).await),
            UploadClient::new(http(), serve(upload).await),
            AuthToken::new("learner-token".to_string()),
        );

        (api, seen)
    }

    #[tokio::test]
    async fn progress_goes_out_with_the_learner_token() {
        let (api, seen) = learner().await;

        ProgressSink::send(&api, ProgressUpdate::new(LessonId(42), false, 120))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            [(
                "learner-token".to_string(),
                json!({"lesson_id": 42, "completed": false, "watch_time_seconds": 120})
            )]
        );
    }

    #[tokio::test]
    async fn content_and_files() {
        let (api, _) = learner().await;

        assert_eq!(api.course().await.unwrap().lesson_count(), 3);

        let files = api.files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].is_welcome_video);
    }
}
