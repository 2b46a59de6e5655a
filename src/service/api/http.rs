use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use snafu::ResultExt;
use url::Url;

use super::error::*;
use crate::model::AuthToken;

pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Shared HTTP plumbing for every remote service client.
#[derive(Debug, Clone)]
pub struct Http {
    client: reqwest::Client,
}

impl Http {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context(BuildClientSnafu)?;

        Ok(Self { client })
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        self.client.post(url)
    }

    pub fn put(&self, url: Url) -> RequestBuilder {
        self.client.put(url)
    }

    pub fn delete(&self, url: Url) -> RequestBuilder {
        self.client.delete(url)
    }

    pub async fn send<T: DeserializeOwned>(
        &self, service: &'static str, request: RequestBuilder,
    ) -> Result<T> {
        let response = request.send().await.context(RequestSnafu { service })?;
        let status = response.status();
        let body = response.bytes().await.context(RequestSnafu { service })?;

        tracing::debug!(service, %status, size = body.len(), "received response");

        decode(service, status, &body)
    }
}

pub trait Authorized {
    fn authorized(self, token: &AuthToken) -> Self;
}

impl Authorized for RequestBuilder {
    fn authorized(self, token: &AuthToken) -> Self {
        self.header(AUTH_HEADER, token.as_str())
    }
}

/// Appends query pairs, skipping the ones without a value.
pub fn with_query<'a>(
    mut url: Url, pairs: impl IntoIterator<Item = (&'a str, Option<String>)>,
) -> Url {
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            if let Some(value) = value {
                query.append_pair(key, &value);
            }
        }
    }

    if url.query() == Some("") {
        url.set_query(None);
    }

    url
}

/// The services report refusals as `{"error": "..."}`, sometimes with a success status,
/// so the body is checked for an error object before the status.
pub(crate) fn decode<T: DeserializeOwned>(
    service: &'static str, status: StatusCode, body: &[u8],
) -> Result<T> {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => return StatusSnafu { service, status }.fail(),
        Err(source) => return Err(source).context(DecodeSnafu { service }),
    };

    if let Some(message) = value.get("error") {
        let message = match message {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        };

        return RemoteSnafu {
            service,
            status,
            message,
        }
        .fail();
    }

    if !status.is_success() {
        return StatusSnafu { service, status }.fail();
    }

    serde_json::from_value(value).context(DecodeSnafu { service })
}
