use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

/// Nominatim API response for geocoding
#[derive(Debug, Deserialize)]
struct NominatimResponse {
    lat: String,
    lon: String,
    display_name: String,
}

/// Geocoded street address
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// Resolve a free-text street address to coordinates using a Nominatim-compatible endpoint
///
/// # Arguments
/// * `client` - Shared HTTP client
/// * `base_url` - Endpoint root, e.g. `https://nominatim.openstreetmap.org`
/// * `address` - Address exactly as the seller typed it
#[instrument(skip(client))]
pub async fn geocode_address(
    client: &reqwest::Client,
    base_url: &str,
    address: &str,
) -> Result<GeocodedLocation> {
    let query = address.trim();
    let url = format!(
        "{}/search?q={}&format=json&limit=1",
        base_url.trim_end_matches('/'),
        urlencoding::encode(query)
    );

    debug!("Geocoding address: {}", query);

    let response: Vec<NominatimResponse> = client
        .get(&url)
        .header("User-Agent", "EstateServer/1.0 (Property Classifieds)")
        .timeout(std::time::Duration::from_secs(10))
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, address = %query, "Geocoding API request failed");
            anyhow!("Geocoding API request failed: {}", e)
        })?
        .error_for_status()
        .map_err(|e| anyhow!("Geocoding API returned an error: {}", e))?
        .json()
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to parse geocoding response");
            anyhow!("Failed to parse geocoding response: {}", e)
        })?;

    let result = response.first().ok_or_else(|| {
        warn!(address = %query, "Address not found by geocoding API");
        anyhow!("Address not found: {}", query)
    })?;

    parse_location(result)
}

fn parse_location(result: &NominatimResponse) -> Result<GeocodedLocation> {
    let latitude: f64 = result
        .lat
        .parse()
        .map_err(|e| anyhow!("Invalid latitude in response: {}", e))?;
    let longitude: f64 = result
        .lon
        .parse()
        .map_err(|e| anyhow!("Invalid longitude in response: {}", e))?;

    Ok(GeocodedLocation {
        latitude,
        longitude,
        display_name: result.display_name.clone(),
    })
}
