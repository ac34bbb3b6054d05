// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic lives in domain activities that take these traits via ServerDeps.
//
// Naming convention: Base* for trait names (e.g., BaseOfferStore, BaseGeocoder)

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::utils::GeocodedLocation;
use crate::common::{ComplexId, ImageId, MetroStationId, OfferId, PaymentId, UserId};
use crate::domains::offers::models::{
    CreateOffer, EngagementKind, HousingComplex, MetroStation, Offer, OfferImage, OfferStatus,
    PriceHistoryEntry, QueryPlan, UpdateOffer,
};

// =============================================================================
// Offer Store Trait (Infrastructure - relational persistence)
// =============================================================================

/// Row-level persistence for offers and everything hanging off them.
///
/// Each call is independently atomic; there is no cross-call transaction.
/// The store does not authorize, callers run the ownership guard first.
#[async_trait]
pub trait BaseOfferStore: Send + Sync {
    /// Cheap round trip for health checks
    async fn ping(&self) -> Result<()>;

    async fn find_offer(&self, id: OfferId) -> Result<Option<Offer>>;

    /// All active offers (the unfiltered read path)
    async fn list_active_offers(&self) -> Result<Vec<Offer>>;

    async fn search_offers(&self, plan: &QueryPlan) -> Result<Vec<Offer>>;

    /// Active offers the user liked or favorited
    async fn engaged_offers(&self, kind: EngagementKind, user_id: UserId) -> Result<Vec<Offer>>;

    async fn insert_offer(&self, input: CreateOffer) -> Result<Offer>;

    async fn update_offer(&self, id: OfferId, input: UpdateOffer) -> Result<Offer>;

    async fn set_status(&self, id: OfferId, status: OfferStatus) -> Result<()>;

    async fn set_promoted_until(&self, id: OfferId, until: DateTime<Utc>) -> Result<()>;

    /// Atomic increment; returns the new counter value
    async fn increment_views(&self, id: OfferId) -> Result<i64>;

    async fn delete_offer(&self, id: OfferId) -> Result<bool>;

    // Price history

    async fn append_price(&self, id: OfferId, price: i64) -> Result<()>;

    /// Replace the whole series with a single row (empty when `price <= 0`)
    async fn restart_price_history(&self, id: OfferId, price: i64) -> Result<()>;

    /// Newest first
    async fn recent_prices(&self, id: OfferId, limit: i64) -> Result<Vec<PriceHistoryEntry>>;

    async fn delete_price_history(&self, id: OfferId) -> Result<u64>;

    // Images

    /// Oldest first
    async fn offer_images(&self, id: OfferId) -> Result<Vec<OfferImage>>;

    async fn add_image(&self, id: OfferId, image_key: &str) -> Result<OfferImage>;

    async fn find_image(&self, image_id: ImageId) -> Result<Option<OfferImage>>;

    async fn delete_image(&self, image_id: ImageId) -> Result<bool>;

    // Likes / favorites

    async fn has_engagement(
        &self,
        kind: EngagementKind,
        user_id: UserId,
        offer_id: OfferId,
    ) -> Result<bool>;

    /// `Ok(false)` when the pair already exists
    async fn add_engagement(
        &self,
        kind: EngagementKind,
        user_id: UserId,
        offer_id: OfferId,
    ) -> Result<bool>;

    /// `Ok(false)` when the pair was already gone
    async fn remove_engagement(
        &self,
        kind: EngagementKind,
        user_id: UserId,
        offer_id: OfferId,
    ) -> Result<bool>;

    async fn count_engagement(&self, kind: EngagementKind, offer_id: OfferId) -> Result<i64>;

    // Catalog lookups

    async fn find_metro_station(&self, id: MetroStationId) -> Result<Option<MetroStation>>;

    async fn find_housing_complex(&self, id: ComplexId) -> Result<Option<HousingComplex>>;
}

// =============================================================================
// View Cache Trait (Infrastructure - short-TTL key/value)
// =============================================================================

#[async_trait]
pub trait BaseViewCache: Send + Sync {
    /// Store `key` with a TTL unless it already exists.
    /// Returns `true` only for the caller that created the key.
    async fn insert_if_absent(&self, key: &str, ttl: Duration) -> Result<bool>;
}

// =============================================================================
// Geocoder Trait (Infrastructure - address -> coordinates)
// =============================================================================

#[async_trait]
pub trait BaseGeocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeocodedLocation>;
}

// =============================================================================
// Profile Service Trait (Sibling RPC)
// =============================================================================

/// Public part of a user profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellerProfile {
    pub id: UserId,
    pub name: String,
    pub avatar_url: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait BaseProfileService: Send + Sync {
    async fn get_profile(&self, user_id: UserId) -> Result<SellerProfile>;
}

// =============================================================================
// Payment Service Trait (Sibling RPC)
// =============================================================================

/// Request to open a promotion payment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPayment {
    pub offer_id: OfferId,
    pub user_id: UserId,
    pub tariff: String,
    /// Minor currency units
    pub amount: i64,
    pub description: String,
}

/// Payment opened by the payment service; the user pays at `confirmation_url`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatedPayment {
    pub id: PaymentId,
    pub confirmation_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: PaymentId,
    pub offer_id: OfferId,
    pub user_id: UserId,
    pub tariff: String,
    pub amount: i64,
}

#[async_trait]
pub trait BasePaymentService: Send + Sync {
    async fn create_payment(&self, payment: NewPayment) -> Result<CreatedPayment>;

    async fn find_payment(&self, id: PaymentId) -> Result<Option<Payment>>;

    /// `true` exactly once per paid payment: the service marks it consumed.
    /// Unpaid or already consumed payments return `false`.
    async fn validate_payment(&self, id: PaymentId) -> Result<bool>;
}

// =============================================================================
// File Storage Trait (Infrastructure - image blobs)
// =============================================================================

#[async_trait]
pub trait BaseFileStorage: Send + Sync {
    async fn delete(&self, key: &str) -> Result<()>;
}
