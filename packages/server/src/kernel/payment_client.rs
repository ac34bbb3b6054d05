use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{BasePaymentService, CreatedPayment, NewPayment, Payment};
use crate::common::PaymentId;

/// HTTP client for the payment service
pub struct HttpPaymentService {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    valid: bool,
}

impl HttpPaymentService {
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl BasePaymentService for HttpPaymentService {
    #[instrument(skip(self), fields(offer_id = %payment.offer_id, tariff = %payment.tariff))]
    async fn create_payment(&self, payment: NewPayment) -> Result<CreatedPayment> {
        let created = self
            .client
            .post(self.url("payments"))
            .json(&payment)
            .send()
            .await
            .context("Payment service request failed")?
            .error_for_status()
            .context("Payment service rejected the payment")?
            .json::<CreatedPayment>()
            .await
            .context("Failed to parse payment response")?;

        info!(payment_id = %created.id, "Promotion payment created");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn find_payment(&self, id: PaymentId) -> Result<Option<Payment>> {
        let response = self
            .client
            .get(self.url(&format!("payments/{}", id)))
            .send()
            .await
            .context("Payment service request failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let payment = response
            .error_for_status()
            .context("Payment service returned an error")?
            .json::<Payment>()
            .await
            .context("Failed to parse payment response")?;

        Ok(Some(payment))
    }

    #[instrument(skip(self))]
    async fn validate_payment(&self, id: PaymentId) -> Result<bool> {
        let response = self
            .client
            .post(self.url(&format!("payments/{}/validate", id)))
            .send()
            .await
            .context("Payment service request failed")?
            .error_for_status()
            .context("Payment service returned an error")?
            .json::<ValidateResponse>()
            .await
            .context("Failed to parse validation response")?;

        Ok(response.valid)
    }
}
