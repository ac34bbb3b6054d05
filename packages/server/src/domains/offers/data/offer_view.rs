use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ComplexId, ImageId, MetroStationId, OfferId, UserId};
use crate::domains::offers::models::{
    HousingComplex, MetroStation, Offer, OfferImage, PriceHistoryEntry,
};
use crate::kernel::SellerProfile;

/// API representation of an offer with everything hanging off it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferView {
    pub id: OfferId,
    pub seller_id: UserId,
    pub status: String,

    // Categories (0 = unset)
    pub offer_type_id: i64,
    pub purchase_type_id: i64,
    pub rent_type_id: i64,
    pub renovation_id: i64,
    pub house_type_id: i64,

    // Attributes
    pub price: i64,
    pub area: f64,
    pub floor: i32,
    pub rooms: i32,
    pub ceiling_height: f64,
    pub address: String,
    pub description: String,

    // Location
    pub latitude: f64,
    pub longitude: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub images: Vec<ImageData>,
    pub seller: SellerData,
    pub metro_station: Option<MetroStationData>,
    pub housing_complex: Option<HousingComplexData>,
    pub stats: OfferStats,

    /// Sort key of ranked lists
    pub promotion_score: u64,
}

impl OfferView {
    /// Base view from the row alone; derived blocks are filled by aggregation
    pub fn from_offer(offer: Offer) -> Self {
        Self {
            id: offer.id,
            seller_id: offer.seller_id,
            status: offer.status,
            offer_type_id: offer.offer_type_id,
            purchase_type_id: offer.purchase_type_id,
            rent_type_id: offer.rent_type_id,
            renovation_id: offer.renovation_id,
            house_type_id: offer.house_type_id,
            price: offer.price,
            area: offer.area,
            floor: offer.floor,
            rooms: offer.rooms,
            ceiling_height: offer.ceiling_height,
            address: offer.address,
            description: offer.description,
            latitude: offer.latitude,
            longitude: offer.longitude,
            created_at: offer.created_at,
            updated_at: offer.updated_at,
            images: Vec::new(),
            seller: SellerData::anonymous(offer.seller_id),
            metro_station: None,
            housing_complex: None,
            stats: OfferStats::default(),
            promotion_score: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageData {
    pub id: ImageId,
    pub url: String,
}

impl ImageData {
    pub fn from_image(image: OfferImage, base_url: &str) -> Self {
        Self {
            id: image.id,
            url: format!("{}/{}", base_url.trim_end_matches('/'), image.image_key),
        }
    }
}

/// Seller summary; identity fields stay empty when the profile lookup failed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellerData {
    pub id: UserId,
    pub name: String,
    pub avatar_url: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl SellerData {
    pub fn anonymous(id: UserId) -> Self {
        Self {
            id,
            name: String::new(),
            avatar_url: None,
            joined_at: None,
        }
    }
}

impl From<SellerProfile> for SellerData {
    fn from(profile: SellerProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            avatar_url: profile.avatar_url,
            joined_at: profile.joined_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetroStationData {
    pub id: MetroStationId,
    pub name: String,
    pub line_color: Option<String>,
}

impl From<MetroStation> for MetroStationData {
    fn from(station: MetroStation) -> Self {
        Self {
            id: station.id,
            name: station.name,
            line_color: station.line_color,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HousingComplexData {
    pub id: ComplexId,
    pub name: String,
    pub developer: Option<String>,
}

impl From<HousingComplex> for HousingComplexData {
    fn from(complex: HousingComplex) -> Self {
        Self {
            id: complex.id,
            name: complex.name,
            developer: complex.developer,
        }
    }
}

/// Live counters and owner-only details
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OfferStats {
    pub likes_count: i64,
    pub favorites_count: i64,
    pub is_liked: bool,
    pub is_favorited: bool,
    /// Owner only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views_count: Option<i64>,
    /// Newest first
    pub price_history: Vec<PricePoint>,
    /// Owner only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub price: i64,
    pub recorded_at: DateTime<Utc>,
}

impl From<PriceHistoryEntry> for PricePoint {
    fn from(entry: PriceHistoryEntry) -> Self {
        Self {
            price: entry.price,
            recorded_at: entry.recorded_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromotionInfo {
    pub is_promoted: bool,
    pub promoted_until: Option<DateTime<Utc>>,
}
