use reqwest::StatusCode;
use snafu::Snafu;

pub type Result<T, E = ApiError> = ::std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(display("could not build the http client: {source}"))]
    BuildClient { source: reqwest::Error },

    #[snafu(display("request to the {service} service failed: {source}"))]
    Request {
        service: &'static str,
        source: reqwest::Error,
    },

    #[snafu(display("{service} service answered with status {status}"))]
    Status {
        service: &'static str,
        status: StatusCode,
    },

    /// The service answered with an error object, whatever the status.
    #[snafu(display("{service} service refused the request: {message}"))]
    Remote {
        service: &'static str,
        status: StatusCode,
        message: String,
    },

    #[snafu(display("malformed response from the {service} service: {source}"))]
    Decode {
        service: &'static str,
        source: serde_json::Error,
    },

    #[snafu(display("{action} requires an administrator session"))]
    Forbidden { action: &'static str },

    #[snafu(display("an upload needs either a file with content or an external url"))]
    InvalidUpload,

    #[snafu(display("payment `{payment_id}` is not paid yet"))]
    Unpaid { payment_id: String },

    #[snafu(display("a password needs at least {minimum} characters"))]
    WeakPassword { minimum: usize },
}

impl ApiError {
    /// The message of an error object answer, if this is one.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            ApiError::Remote { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } | ApiError::Remote { status, .. } => Some(*status),
            ApiError::Request { source, .. } => source.status(),
            _ => None,
        }
    }
}
