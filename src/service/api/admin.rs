use derive_new::new;
use serde::de::IgnoredAny;
use snafu::ensure;
use tracing::instrument;
use url::Url;

use super::error::*;
use super::http::{with_query, Authorized, Http};
use crate::model::{LessonId, LessonRecord, MaterialRecord, ModuleId, ModuleRecord, Session};

const SERVICE: &str = "admin";

/// Module, lesson and material management. Every call needs an administrator session,
/// which is checked before anything is sent.
#[derive(Debug, Clone, new)]
pub struct AdminClient {
    http: Http,
    endpoint: Url,
}

impl AdminClient {
    fn resource(&self, resource: &str) -> Url {
        with_query(self.endpoint.clone(), [("resource", Some(resource.to_string()))])
    }

    fn ensure_admin(session: &Session, action: &'static str) -> Result<()> {
        ensure!(session.is_admin(), ForbiddenSnafu { action });
        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn modules(&self, session: &Session) -> Result<Vec<ModuleRecord>> {
        Self::ensure_admin(session, "listing modules")?;

        let request = self.http.get(self.resource("modules")).authorized(&session.token);
        self.http.send(SERVICE, request).await
    }

    #[instrument(skip(self, session))]
    pub async fn create_module(&self, session: &Session, module: &ModuleRecord) -> Result<()> {
        Self::ensure_admin(session, "creating a module")?;

        let request = self
            .http
            .post(self.resource("modules"))
            .authorized(&session.token)
            .json(module);

        let _: IgnoredAny = self.http.send(SERVICE, request).await?;
        tracing::info!(title = %module.title, "created module");
        Ok(())
    }

    #[instrument(skip(self, session))]
    pub async fn update_module(&self, session: &Session, module: &ModuleRecord) -> Result<()> {
        Self::ensure_admin(session, "updating a module")?;

        let request = self
            .http
            .put(self.resource("modules"))
            .authorized(&session.token)
            .json(module);

        let _: IgnoredAny = self.http.send(SERVICE, request).await?;
        tracing::info!(module.id = ?module.id, "updated module");
        Ok(())
    }

    #[instrument(skip(self, session))]
    pub async fn lessons(
        &self, session: &Session, module_id: Option<ModuleId>,
    ) -> Result<Vec<LessonRecord>> {
        Self::ensure_admin(session, "listing lessons")?;

        let url = with_query(
            self.resource("lessons"),
            [("module_id", module_id.map(|id| id.to_string()))],
        );
        let request = self.http.get(url).authorized(&session.token);
        self.http.send(SERVICE, request).await
    }

    #[instrument(skip(self, session))]
    pub async fn create_lesson(&self, session: &Session, lesson: &LessonRecord) -> Result<()> {
        Self::ensure_admin(session, "creating a lesson")?;

        let request = self
            .http
            .post(self.resource("lessons"))
            .authorized(&session.token)
            .json(lesson);

        let _: IgnoredAny = self.http.send(SERVICE, request).await?;
        tracing::info!(title = %lesson.title, module.id = %lesson.module_id, "created lesson");
        Ok(())
    }

    #[instrument(skip(self, session))]
    pub async fn update_lesson(&self, session: &Session, lesson: &LessonRecord) -> Result<()> {
        Self::ensure_admin(session, "updating a lesson")?;

        let request = self
            .http
            .put(self.resource("lessons"))
            .authorized(&session.token)
            .json(lesson);

        let _: IgnoredAny = self.http.send(SERVICE, request).await?;
        tracing::info!(lesson.id = ?lesson.id, "updated lesson");
        Ok(())
    }

    #[instrument(skip(self, session))]
    pub async fn materials(
        &self, session: &Session, lesson_id: Option<LessonId>, module_id: Option<ModuleId>,
    ) -> Result<Vec<MaterialRecord>> {
        Self::ensure_admin(session, "listing materials")?;

        let url = with_query(
            self.resource("materials"),
            [
                ("lesson_id", lesson_id.map(|id| id.to_string())),
                ("module_id", module_id.map(|id| id.to_string())),
            ],
        );
        let request = self.http.get(url).authorized(&session.token);
        self.http.send(SERVICE, request).await
    }

    #[instrument(skip(self, session))]
    pub async fn create_material(&self, session: &Session, material: &MaterialRecord) -> Result<()> {
        Self::ensure_admin(session, "creating a material")?;

        let request = self
            .http
            .post(self.resource("materials"))
            .authorized(&session.token)
            .json(material);

        let _: IgnoredAny = self.http.send(SERVICE, request).await?;
        Ok(())
    }
}
