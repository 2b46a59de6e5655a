use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use snafu::{ResultExt, Snafu};
use url::Url;

use crate::model::CompletionThreshold;
use crate::service::api::Endpoints;

/// Runtime configuration, read from the environment (and `.env` through `dotenvy`).
///
/// Fields are kept flat since `envy` cannot parse numbers through `#[serde(flatten)]`.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub auth_url: Url,
    pub course_url: Url,
    pub admin_url: Url,
    pub payment_url: Url,
    pub upload_url: Url,
    pub reset_password_url: Url,

    /// Page a learner without access is sent to.
    pub purchase_url: Url,
    /// Where the payment gateway redirects after checkout.
    pub return_url: Url,

    #[serde(default = "default_sample_interval", deserialize_with = "human_duration")]
    pub sample_interval: Duration,
    #[serde(default)]
    pub completion_threshold: CompletionThreshold,
    #[serde(default = "default_request_timeout", deserialize_with = "human_duration")]
    pub request_timeout: Duration,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        envy::from_env::<Config>().context(LoadSnafu)
    }

    pub fn from_vars<I>(vars: I) -> Result<Config, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars).context(LoadSnafu)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            auth: self.auth_url.clone(),
            course: self.course_url.clone(),
            admin: self.admin_url.clone(),
            payment: self.payment_url.clone(),
            upload: self.upload_url.clone(),
            reset_password: self.reset_password_url.clone(),
        }
    }
}

fn default_sample_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn human_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    humantime::parse_duration(&text).map_err(serde::de::Error::custom)
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("could not read the configuration from the environment: {source}"))]
    Load { source: envy::Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut vars = vec![
            ("AUTH_URL", "https://fn.example/auth"),
            ("COURSE_URL", "https://fn.example/course"),
            ("ADMIN_URL", "https://fn.example/admin"),
            ("PAYMENT_URL", "https://fn.example/payment"),
            ("UPLOAD_URL", "https://fn.example/upload"),
            ("RESET_PASSWORD_URL", "https://fn.example/reset-password"),
            ("PURCHASE_URL", "https://site.example/payment"),
            ("RETURN_URL", "https://site.example/payment-success"),
        ];
        vars.extend_from_slice(extra);

        vars.into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let config = Config::from_vars(vars(&[])).unwrap();

        assert_eq!(config.sample_interval, Duration::from_secs(5));
        assert_eq!(config.completion_threshold, CompletionThreshold::DEFAULT);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.endpoints().course.as_str(), "https://fn.example/course");
        assert_eq!(
            config.endpoints().reset_password.as_str(),
            "https://fn.example/reset-password"
        );
    }

    #[test]
    fn overrides() {
        let config = Config::from_vars(vars(&[
            ("SAMPLE_INTERVAL", "2s 500ms"),
            ("COMPLETION_THRESHOLD", "0.75"),
            ("REQUEST_TIMEOUT", "1m"),
        ]))
        .unwrap();

        assert_eq!(config.sample_interval, Duration::from_millis(2500));
        assert_eq!(config.completion_threshold.fraction(), 0.75);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn threshold_outside_range_is_rejected() {
        let result = Config::from_vars(vars(&[("COMPLETION_THRESHOLD", "1.5")]));
        assert!(result.is_err());
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        let vars = vars(&[])
            .into_iter()
            .filter(|(key, _)| key != "COURSE_URL")
            .collect::<Vec<_>>();

        assert!(Config::from_vars(vars).is_err());
    }
}
