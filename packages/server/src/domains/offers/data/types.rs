use chrono::Duration;
use serde::{Deserialize, Deserializer, Serialize};

use crate::common::{ComplexId, MetroStationId, PaymentId, UserId};

/// Who is looking at an offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    /// Authenticated user, if any
    pub user_id: Option<UserId>,
    /// Stable visitor identity for view dedup (user id or client address)
    pub visitor_key: String,
}

impl Viewer {
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            visitor_key: format!("user:{}", user_id),
        }
    }

    pub fn anonymous(client_addr: impl Into<String>) -> Self {
        Self {
            user_id: None,
            visitor_key: format!("addr:{}", client_addr.into()),
        }
    }

    pub fn is_owner_of(&self, seller_id: UserId) -> bool {
        self.user_id == Some(seller_id)
    }
}

/// What to do when a sibling service call fails while building a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamPolicy {
    /// Log and render the affected block empty
    Degrade,
    /// Fail the whole request with `Upstream`
    Propagate,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateOfferInput {
    pub offer_type_id: i64,
    pub purchase_type_id: i64,
    pub rent_type_id: i64,
    pub renovation_id: i64,
    pub house_type_id: i64,
    pub complex_id: Option<ComplexId>,
    pub metro_station_id: Option<MetroStationId>,
    pub price: i64,
    pub area: f64,
    pub floor: i32,
    pub rooms: i32,
    pub ceiling_height: f64,
    pub address: Option<String>,
    pub description: Option<String>,
}

/// Partial edit; absent fields keep their value.
/// `complex_id: null` detaches the offer from its complex.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateOfferInput {
    pub offer_type_id: Option<i64>,
    pub purchase_type_id: Option<i64>,
    pub rent_type_id: Option<i64>,
    pub renovation_id: Option<i64>,
    pub house_type_id: Option<i64>,
    #[serde(deserialize_with = "present")]
    pub complex_id: Option<Option<ComplexId>>,
    #[serde(deserialize_with = "present")]
    pub metro_station_id: Option<Option<MetroStationId>>,
    pub price: Option<i64>,
    pub area: Option<f64>,
    pub floor: Option<i32>,
    pub rooms: Option<i32>,
    pub ceiling_height: Option<f64>,
    pub address: Option<String>,
    pub description: Option<String>,
}

/// Distinguishes an explicit `null` from a missing key
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Outcome of a like/favorite toggle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToggleResult {
    pub is_active: bool,
    pub total: i64,
}

/// Promotion packages sold for an offer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PromotionTariff {
    Day,
    Week,
    Month,
}

impl PromotionTariff {
    pub fn duration(&self) -> Duration {
        match self {
            PromotionTariff::Day => Duration::days(1),
            PromotionTariff::Week => Duration::days(7),
            PromotionTariff::Month => Duration::days(30),
        }
    }

    /// Price in minor currency units
    pub fn price(&self) -> i64 {
        match self {
            PromotionTariff::Day => 9_900,
            PromotionTariff::Week => 49_900,
            PromotionTariff::Month => 149_900,
        }
    }
}

impl std::fmt::Display for PromotionTariff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromotionTariff::Day => write!(f, "day"),
            PromotionTariff::Week => write!(f, "week"),
            PromotionTariff::Month => write!(f, "month"),
        }
    }
}

impl std::str::FromStr for PromotionTariff {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(PromotionTariff::Day),
            "week" => Ok(PromotionTariff::Week),
            "month" => Ok(PromotionTariff::Month),
            _ => Err(anyhow::anyhow!("Unknown promotion tariff: {}", s)),
        }
    }
}

/// Payment opened for a promotion; the user finishes checkout at the URL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromotionPurchase {
    pub payment_id: PaymentId,
    pub tariff: PromotionTariff,
    pub amount: i64,
    pub confirmation_url: String,
}
