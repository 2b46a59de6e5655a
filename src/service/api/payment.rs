use std::time::Duration;

use derive_new::new;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::Retry;
use tracing::instrument;
use url::Url;

use super::error::*;
use super::http::{with_query, Http};
use crate::model::{PaymentCreated, PaymentRequest, PaymentStatus};

const SERVICE: &str = "payment";

/// How long [PaymentClient::wait_until_paid] keeps asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub first_delay: Duration,
    pub max_delay: Duration,
    pub attempts: usize,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            first_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            attempts: 6,
        }
    }
}

impl PollPolicy {
    /// Delays double from `first_delay`, rounded up to whole milliseconds and never below 2ms.
    fn strategy(self) -> impl Iterator<Item = Duration> {
        let base = self.first_delay.as_millis().max(1) as u64;

        // the backoff yields `2^n * factor`, starting at n = 1
        ExponentialBackoff::from_millis(2)
            .factor((base + 1) / 2)
            .max_delay(self.max_delay)
            .take(self.attempts)
    }
}

#[derive(Debug, Clone, new)]
pub struct PaymentClient {
    http: Http,
    endpoint: Url,
}

impl PaymentClient {
    fn action(&self, action: &str) -> Url {
        with_query(self.endpoint.clone(), [("action", Some(action.to_string()))])
    }

    /// Opens a payment at the gateway; the learner continues at `confirmation_url`.
    #[instrument(skip(self), fields(user.id = %request.user_id, amount = request.amount))]
    pub async fn create(&self, request: &PaymentRequest) -> Result<PaymentCreated> {
        let http_request = self.http.post(self.action("create")).json(request);
        let created: PaymentCreated = self.http.send(SERVICE, http_request).await?;

        tracing::info!(
            payment.id = %created.payment_id,
            purchase.id = %created.purchase_id,
            status = %created.status,
            "created payment"
        );

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn status(&self, payment_id: &str) -> Result<PaymentStatus> {
        let url = with_query(self.action("status"), [("payment_id", Some(payment_id.to_string()))]);
        self.http.send(SERVICE, self.http.get(url)).await
    }

    /// Polls the status with a bounded exponential backoff until the gateway reports it paid.
    ///
    /// Fails with [ApiError::Unpaid] once the attempts run out on an unpaid payment.
    #[instrument(skip(self))]
    pub async fn wait_until_paid(&self, payment_id: &str, policy: PollPolicy) -> Result<PaymentStatus> {
        Retry::spawn(policy.strategy(), || async {
            let status = self.status(payment_id).await?;
            tracing::debug!(payment.id = %payment_id, paid = status.paid, "polled payment status");

            if status.paid {
                Ok(status)
            } else {
                UnpaidSnafu { payment_id }.fail()
            }
        })
        .await
    }
}
