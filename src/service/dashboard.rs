use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::instrument;
use url::Url;

use crate::model::{Course, CourseFile, LessonId, ModuleId, ProgressUpdate};
use crate::service::api::ApiError;
use crate::service::reporter::{ProgressEvent, ProgressReporter};

/// Where the dashboard reads the learner's course from.
#[async_trait]
pub trait CourseSource: Send + Sync + 'static {
    async fn course(&self) -> Result<Course, ApiError>;

    async fn files(&self) -> Result<Vec<CourseFile>, ApiError>;
}

/// Why the course tree could not be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// The learner has no access to the course; show the way to buy it.
    NoAccess { message: String, purchase_url: Url },
    Unavailable { message: String },
}

impl LoadFailure {
    fn classify(error: &ApiError, purchase_url: &Url) -> Self {
        let denied = match error {
            ApiError::Remote { status, .. } => *status != StatusCode::UNAUTHORIZED,
            ApiError::Status { status, .. } => {
                *status == StatusCode::PAYMENT_REQUIRED || *status == StatusCode::FORBIDDEN
            }
            _ => false,
        };

        let message = error
            .remote_message()
            .map_or_else(|| error.to_string(), str::to_string);

        if denied {
            LoadFailure::NoAccess {
                message,
                purchase_url: purchase_url.clone(),
            }
        } else {
            LoadFailure::Unavailable { message }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LoadFailure::NoAccess { message, .. } | LoadFailure::Unavailable { message } => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    Loading,
    Error(LoadFailure),
    Ready(Course),
}

/// The learner's module/lesson tree, refetched from the course service after every change.
pub struct DashboardState {
    source: Arc<dyn CourseSource>,
    reporter: ProgressReporter,
    purchase_url: Url,
    view: RwLock<DashboardView>,
    files: RwLock<Vec<CourseFile>>,
}

impl std::fmt::Debug for DashboardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardState")
            .field("reporter", &self.reporter)
            .field("purchase_url", &self.purchase_url.as_str())
            .finish_non_exhaustive()
    }
}

impl DashboardState {
    pub fn new(source: Arc<dyn CourseSource>, reporter: ProgressReporter, purchase_url: Url) -> Self {
        Self {
            source,
            reporter,
            purchase_url,
            view: RwLock::new(DashboardView::Loading),
            files: RwLock::default(),
        }
    }

    pub async fn view(&self) -> DashboardView {
        self.view.read().await.clone()
    }

    /// Replaces the tree with a fresh copy from the course service.
    ///
    /// The view stays where it is while the request runs, so only the very first load is ever
    /// seen as [DashboardView::Loading].
    #[instrument(skip(self))]
    pub async fn load(&self) -> DashboardView {
        let view = match self.source.course().await {
            Ok(course) => {
                tracing::debug!(lessons = course.lesson_count(), "course loaded");
                DashboardView::Ready(course)
            }
            Err(error) => {
                let failure = LoadFailure::classify(&error, &self.purchase_url);
                tracing::warn!(%error, ?failure, "could not load the course");
                DashboardView::Error(failure)
            }
        };

        *self.view.write().await = view.clone();
        view
    }

    /// Refreshes the file listing. A failure keeps the previous listing.
    #[instrument(skip(self))]
    pub async fn load_files(&self) {
        match self.source.files().await {
            Ok(files) => *self.files.write().await = files,
            Err(error) => tracing::warn!(%error, "could not load course files"),
        }
    }

    /// Content and files together, the way the dashboard opens.
    pub async fn load_all(&self) -> DashboardView {
        let (view, ()) = futures::join!(self.load(), self.load_files());
        view
    }

    /// Marks a lesson as done regardless of playback, then refetches.
    ///
    /// The refetch happens even when the update was refused, so the view never shows a
    /// completion the server does not know about.
    #[instrument(skip(self))]
    pub async fn mark_complete(&self, lesson_id: LessonId) -> DashboardView {
        if self.reporter.send(ProgressUpdate::mark_complete(lesson_id)).await.is_err() {
            tracing::debug!(lesson.id = %lesson_id, "completion refused, reloading anyway");
        }

        self.load().await
    }

    /// Share of completed lessons in percent. `0` while there is no course or no lesson.
    pub async fn aggregate_progress(&self) -> f64 {
        match &*self.view.read().await {
            DashboardView::Ready(course) => course.progress(),
            _ => 0.0,
        }
    }

    pub async fn module_progress(&self, module_id: ModuleId) -> Option<f64> {
        match &*self.view.read().await {
            DashboardView::Ready(course) => course
                .modules
                .iter()
                .find(|module| module.id == module_id)
                .map(|module| module.progress()),
            _ => None,
        }
    }

    pub async fn lesson_watch_fraction(&self, lesson_id: LessonId) -> Option<f64> {
        match &*self.view.read().await {
            DashboardView::Ready(course) => course.lesson(lesson_id).map(|lesson| lesson.watch_fraction()),
            _ => None,
        }
    }

    pub async fn files(&self) -> Vec<CourseFile> {
        self.files.read().await.clone()
    }

    pub async fn welcome_video(&self) -> Option<CourseFile> {
        self.files
            .read()
            .await
            .iter()
            .find(|file| file.is_welcome_video)
            .cloned()
    }

    /// Reloads after every completion the reporter publishes, until the channel closes.
    pub fn follow(self: Arc<Self>, mut events: UnboundedReceiver<ProgressEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    ProgressEvent::Completed { lesson_id } => {
                        tracing::info!(lesson.id = %lesson_id, "lesson completed, refreshing the dashboard");
                        self.load().await;
                    }
                }
            }
        })
    }
}
