use anyhow::{Context, Result};
use async_trait::async_trait;

use super::BaseGeocoder;
use crate::common::utils::{geocode_address, GeocodedLocation};

/// Nominatim (OpenStreetMap) geocoder
pub struct NominatimGeocoder {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl BaseGeocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodedLocation> {
        geocode_address(&self.client, &self.base_url, address).await
    }
}
