use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::model::{LessonId, ProgressUpdate};
use crate::service::api::ApiError;

/// Destination of progress updates, normally the course-progress endpoint.
#[async_trait]
pub trait ProgressSink: Send + Sync + 'static {
    async fn send(&self, update: ProgressUpdate) -> Result<(), ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The server accepted a completed update for this lesson.
    Completed { lesson_id: LessonId },
}

/// Delivers progress updates without ever failing or blocking the caller.
#[derive(Clone)]
pub struct ProgressReporter {
    sink: Arc<dyn ProgressSink>,
    events: Option<UnboundedSender<ProgressEvent>>,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("publishes_events", &self.events.is_some())
            .finish_non_exhaustive()
    }
}

impl ProgressReporter {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self { sink, events: None }
    }

    /// A reporter that also publishes a [ProgressEvent] for every accepted completion.
    pub fn with_events(sink: Arc<dyn ProgressSink>) -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = unbounded_channel();
        let reporter = Self {
            sink,
            events: Some(tx),
        };

        (reporter, rx)
    }

    /// Fire-and-forget delivery. Failures are logged and dropped; the next report supersedes them.
    pub fn report(&self, update: ProgressUpdate) -> JoinHandle<()> {
        let reporter = self.clone();

        tokio::spawn(async move {
            if reporter.send(update).await.is_ok() && update.completed {
                reporter.publish(ProgressEvent::Completed {
                    lesson_id: update.lesson_id,
                });
            }
        })
    }

    /// Awaited delivery without publishing, for callers that refresh on their own.
    #[instrument(skip(self))]
    pub async fn send(&self, update: ProgressUpdate) -> Result<(), ApiError> {
        match self.sink.send(update).await {
            Ok(()) => {
                tracing::debug!(lesson.id = %update.lesson_id, "progress delivered");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(lesson.id = %update.lesson_id, %error, "could not deliver progress");
                Err(error)
            }
        }
    }

    fn publish(&self, event: ProgressEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                tracing::debug!(?event, "nobody is listening for progress events");
            }
        }
    }
}
