use derive_new::new;
use serde::{Deserialize, Serialize};
use snafu::ensure;
use tracing::instrument;
use url::Url;

use super::error::*;
use super::http::Http;

const SERVICE: &str = "reset-password";

/// Shortest password the reset service accepts.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Password recovery: a reset link by email, then a new password for the link's token.
#[derive(Debug, Clone, new)]
pub struct RecoveryClient {
    http: Http,
    endpoint: Url,
}

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum ResetRequest<'a> {
    Request { email: String },
    Confirm { token: &'a str, password: &'a str },
}

#[derive(Debug, Deserialize)]
struct Acknowledged {
    #[serde(default)]
    message: String,
}

impl RecoveryClient {
    /// Asks for a reset link. The service answers the same way whether or not the
    /// address is known, so the returned message says nothing about the account.
    #[instrument(skip(self))]
    pub async fn request_reset(&self, email: &str) -> Result<String> {
        let email = email.trim().to_lowercase();
        let request = self
            .http
            .post(self.endpoint.clone())
            .json(&ResetRequest::Request { email });

        let answer: Acknowledged = self.http.send(SERVICE, request).await?;
        Ok(answer.message)
    }

    /// Sets a new password with the token from the reset link.
    #[instrument(skip_all)]
    pub async fn confirm_reset(&self, token: &str, password: &str) -> Result<String> {
        ensure!(
            password.chars().count() >= MIN_PASSWORD_LENGTH,
            WeakPasswordSnafu {
                minimum: MIN_PASSWORD_LENGTH
            }
        );

        let request = self
            .http
            .post(self.endpoint.clone())
            .json(&ResetRequest::Confirm {
                token: token.trim(),
                password,
            });

        let answer: Acknowledged = self.http.send(SERVICE, request).await?;
        tracing::info!("password changed through a reset link");

        Ok(answer.message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::service::api::testing::{http, serve};

    type Seen = Arc<Mutex<Vec<Value>>>;

    async fn handle(State(seen): State<Seen>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        seen.lock().unwrap().push(body.clone());

        match body["action"].as_str() {
            Some("request") => (StatusCode::OK, Json(json!({"message": "Письмо с инструкциями отправлено"}))),
            Some("confirm") if body["token"] == "fresh" => {
                (StatusCode::OK, Json(json!({"message": "Пароль успешно изменен"})))
            }
            Some("confirm") => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Неверный или использованный токен"})),
            ),
            _ => (StatusCode::BAD_REQUEST, Json(json!({"error": "Invalid action"}))),
        }
    }

    async fn client() -> (RecoveryClient, Seen) {
        let seen = Seen::default();
        let router = Router::new()
            .route("/", post(handle))
            .with_state(seen.clone());

        (RecoveryClient::new(http(), serve(router).await), seen)
    }

    #[tokio::test]
    async fn request_normalizes_the_address() {
        let (client, seen) = client().await;

        let message = client.request_reset("  Anna@Example.COM ").await.unwrap();

        assert_eq!(message, "Письмо с инструкциями отправлено");
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            [json!({"action": "request", "email": "anna@example.com"})]
        );
    }

    #[tokio::test]
    async fn confirm_with_a_valid_token() {
        let (client, seen) = client().await;

        let message = client.confirm_reset("fresh", "new-secret").await.unwrap();

        assert_eq!(message, "Пароль успешно изменен");
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            [json!({"action": "confirm", "token": "fresh", "password": "new-secret"})]
        );
    }

    #[tokio::test]
    async fn used_token_is_refused() {
        let (client, _) = client().await;

        let error = client.confirm_reset("spent", "new-secret").await.unwrap_err();
        assert_eq!(error.remote_message(), Some("Неверный или использованный токен"));
    }

    #[tokio::test]
    async fn short_password_never_leaves_the_client() {
        let (client, seen) = client().await;

        let error = client.confirm_reset("fresh", "12345").await.unwrap_err();

        assert!(matches!(error, ApiError::WeakPassword { minimum: 6 }));
        assert!(seen.lock().unwrap().is_empty());
    }
}
