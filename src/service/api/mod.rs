//! Typed clients for the remote course-platform functions.

use std::time::Duration;

use url::Url;

pub use admin::AdminClient;
pub use auth::AuthClient;
pub use course::CourseClient;
pub use error::*;
pub use http::{Http, AUTH_HEADER};
pub use learner::LearnerApi;
pub use payment::{PaymentClient, PollPolicy};
pub use recovery::{RecoveryClient, MIN_PASSWORD_LENGTH};
pub use upload::{Upload, UploadClient, UploadedFile};

mod admin;
mod auth;
mod course;
mod error;
mod http;
mod learner;
mod payment;
mod recovery;
mod upload;

#[cfg(test)]
pub(crate) mod testing;

use crate::model::Session;

/// Where each remote function lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub auth: Url,
    pub course: Url,
    pub admin: Url,
    pub payment: Url,
    pub upload: Url,
    pub reset_password: Url,
}

/// Every client, sharing one connection pool.
#[derive(Debug, Clone)]
pub struct Api {
    pub auth: AuthClient,
    pub course: CourseClient,
    pub admin: AdminClient,
    pub payment: PaymentClient,
    pub upload: UploadClient,
    pub recovery: RecoveryClient,
}

impl Api {
    pub fn connect(endpoints: Endpoints, timeout: Duration) -> Result<Self> {
        let http = Http::new(timeout)?;

        Ok(Self {
            auth: AuthClient::new(http.clone(), endpoints.auth),
            course: CourseClient::new(http.clone(), endpoints.course),
            admin: AdminClient::new(http.clone(), endpoints.admin),
            payment: PaymentClient::new(http.clone(), endpoints.payment),
            upload: UploadClient::new(http.clone(), endpoints.upload),
            recovery: RecoveryClient::new(http, endpoints.reset_password),
        })
    }

    /// The calls a signed-in learner makes on their own behalf.
    pub fn learner(&self, session: &Session) -> LearnerApi {
        LearnerApi::new(self.course.clone(), self.upload.clone(), session.token.clone())
    }
}
