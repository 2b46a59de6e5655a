use derive_new::new;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use snafu::ensure;
use tracing::instrument;
use url::Url;

use super::error::*;
use super::http::{Authorized, Http};
use crate::model::{AuthToken, Registration, Session, User};

const SERVICE: &str = "auth";

#[derive(Debug, Clone, new)]
pub struct AuthClient {
    http: Http,
    endpoint: Url,
}

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum AuthRequest<'a> {
    Register(&'a Registration),
    Login { email: &'a str, password: &'a str },
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    #[serde(default)]
    valid: bool,
    user: User,
}

impl AuthClient {
    #[instrument(skip_all, fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<Session> {
        let request = self
            .http
            .post(self.endpoint.clone())
            .json(&AuthRequest::Register(registration));

        let session: Session = self.http.send(SERVICE, request).await?;
        tracing::info!(user.id = %session.user.id, "registered a new learner");

        Ok(session)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let request = self
            .http
            .post(self.endpoint.clone())
            .json(&AuthRequest::Login { email, password });

        let session: Session = self.http.send(SERVICE, request).await?;
        tracing::info!(user.id = %session.user.id, admin = session.is_admin(), "signed in");

        Ok(session)
    }

    /// Checks a stored token and rebuilds the session it belongs to.
    #[instrument(skip_all)]
    pub async fn validate(&self, token: AuthToken) -> Result<Session> {
        let request = self.http.get(self.endpoint.clone()).authorized(&token);
        let info: TokenInfo = self.http.send(SERVICE, request).await?;

        ensure!(
            info.valid,
            RemoteSnafu {
                service: SERVICE,
                status: StatusCode::UNAUTHORIZED,
                message: "token is not valid",
            }
        );

        Ok(Session::new(token, info.user))
    }
}
