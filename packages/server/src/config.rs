use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Tunables of the offer aggregation and ranking engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Score contributed by each like
    pub like_weight: u32,
    /// Flat score bonus while a promotion window is open
    pub promotion_weight: u32,
    /// How long a repeat view from the same visitor is ignored
    pub view_dedup_ttl: Duration,
    /// Price history rows attached to a composite view
    pub price_history_limit: i64,
    /// Prefix joined with stored image keys to build public URLs
    pub image_base_url: String,
    /// Offers aggregated concurrently by batch reads
    pub aggregation_width: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            like_weight: 1,
            promotion_weight: 1000,
            view_dedup_ttl: Duration::from_secs(600),
            price_history_limit: 5,
            image_base_url: "/images".to_string(),
            aggregation_width: 8,
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub profile_service_url: String,
    pub payment_service_url: String,
    pub geocoder_url: String,
    pub image_dir: String,
    pub allowed_origins: Vec<String>,
    /// Read client addresses from forwarding headers (only behind a proxy)
    pub trust_proxy_headers: bool,
    pub engine: EngineSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = EngineSettings::default();

        let engine = EngineSettings {
            like_weight: parse_or("RANKING_LIKE_WEIGHT", defaults.like_weight)?,
            promotion_weight: parse_or("RANKING_PROMOTION_WEIGHT", defaults.promotion_weight)?,
            view_dedup_ttl: Duration::from_secs(parse_or(
                "VIEW_DEDUP_TTL_SECS",
                defaults.view_dedup_ttl.as_secs(),
            )?),
            price_history_limit: parse_or("PRICE_HISTORY_LIMIT", defaults.price_history_limit)?,
            image_base_url: env::var("IMAGE_BASE_URL").unwrap_or(defaults.image_base_url),
            aggregation_width: parse_or("AGGREGATION_WIDTH", defaults.aggregation_width)?,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            port: parse_or("PORT", 8080)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "estate".to_string()),
            profile_service_url: env::var("PROFILE_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            payment_service_url: env::var("PAYMENT_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8082".to_string()),
            geocoder_url: env::var("GEOCODER_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            image_dir: env::var("IMAGE_DIR").unwrap_or_else(|_| "./images".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| split_origins(&origins))
                .unwrap_or_default(),
            trust_proxy_headers: parse_or("TRUST_PROXY_HEADERS", false)?,
            engine,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value", key)),
        Err(_) => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
