use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::instrument;

use super::{BaseProfileService, SellerProfile};
use crate::common::UserId;

/// HTTP client for the profile service
pub struct HttpProfileService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpProfileService {
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl BaseProfileService for HttpProfileService {
    #[instrument(skip(self))]
    async fn get_profile(&self, user_id: UserId) -> Result<SellerProfile> {
        let url = format!("{}/profiles/{}", self.base_url.trim_end_matches('/'), user_id);

        let profile = self
            .client
            .get(&url)
            .send()
            .await
            .context("Profile service request failed")?
            .error_for_status()
            .context("Profile service returned an error")?
            .json::<SellerProfile>()
            .await
            .context("Failed to parse profile response")?;

        Ok(profile)
    }
}
