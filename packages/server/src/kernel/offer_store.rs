//! Postgres-backed offer store.
//!
//! Thin adapter: every method delegates to the SQL living on the models.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::BaseOfferStore;
use crate::common::{ComplexId, ImageId, MetroStationId, OfferId, UserId};
use crate::domains::offers::models::{
    CreateOffer, Engagement, EngagementKind, HousingComplex, MetroStation, Offer, OfferImage,
    OfferStatus, PriceHistoryEntry, QueryPlan, UpdateOffer,
};

pub struct PgOfferStore {
    pool: PgPool,
}

impl PgOfferStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseOfferStore for PgOfferStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }

    async fn find_offer(&self, id: OfferId) -> Result<Option<Offer>> {
        Offer::find_by_id(id, &self.pool).await
    }

    async fn list_active_offers(&self) -> Result<Vec<Offer>> {
        Offer::search(&QueryPlan::active_only(), &self.pool).await
    }

    async fn search_offers(&self, plan: &QueryPlan) -> Result<Vec<Offer>> {
        Offer::search(plan, &self.pool).await
    }

    async fn engaged_offers(&self, kind: EngagementKind, user_id: UserId) -> Result<Vec<Offer>> {
        Offer::find_engaged_by(kind, user_id, &self.pool).await
    }

    async fn insert_offer(&self, input: CreateOffer) -> Result<Offer> {
        Offer::create(input, &self.pool).await
    }

    async fn update_offer(&self, id: OfferId, input: UpdateOffer) -> Result<Offer> {
        Offer::update(id, input, &self.pool).await
    }

    async fn set_status(&self, id: OfferId, status: OfferStatus) -> Result<()> {
        Offer::update_status(id, status, &self.pool).await
    }

    async fn set_promoted_until(&self, id: OfferId, until: DateTime<Utc>) -> Result<()> {
        Offer::update_promoted_until(id, until, &self.pool).await
    }

    async fn increment_views(&self, id: OfferId) -> Result<i64> {
        Offer::increment_views(id, &self.pool).await
    }

    async fn delete_offer(&self, id: OfferId) -> Result<bool> {
        Offer::delete(id, &self.pool).await
    }

    async fn append_price(&self, id: OfferId, price: i64) -> Result<()> {
        PriceHistoryEntry::append(id, price, &self.pool).await?;
        Ok(())
    }

    async fn restart_price_history(&self, id: OfferId, price: i64) -> Result<()> {
        PriceHistoryEntry::restart(id, price, &self.pool).await
    }

    async fn recent_prices(&self, id: OfferId, limit: i64) -> Result<Vec<PriceHistoryEntry>> {
        PriceHistoryEntry::find_recent(id, limit, &self.pool).await
    }

    async fn delete_price_history(&self, id: OfferId) -> Result<u64> {
        PriceHistoryEntry::delete_for_offer(id, &self.pool).await
    }

    async fn offer_images(&self, id: OfferId) -> Result<Vec<OfferImage>> {
        OfferImage::find_for_offer(id, &self.pool).await
    }

    async fn add_image(&self, id: OfferId, image_key: &str) -> Result<OfferImage> {
        OfferImage::create(id, image_key, &self.pool).await
    }

    async fn find_image(&self, image_id: ImageId) -> Result<Option<OfferImage>> {
        OfferImage::find_by_id(image_id, &self.pool).await
    }

    async fn delete_image(&self, image_id: ImageId) -> Result<bool> {
        OfferImage::delete(image_id, &self.pool).await
    }

    async fn has_engagement(
        &self,
        kind: EngagementKind,
        user_id: UserId,
        offer_id: OfferId,
    ) -> Result<bool> {
        Engagement::exists(kind, user_id, offer_id, &self.pool).await
    }

    async fn add_engagement(
        &self,
        kind: EngagementKind,
        user_id: UserId,
        offer_id: OfferId,
    ) -> Result<bool> {
        Engagement::insert(kind, user_id, offer_id, &self.pool).await
    }

    async fn remove_engagement(
        &self,
        kind: EngagementKind,
        user_id: UserId,
        offer_id: OfferId,
    ) -> Result<bool> {
        Engagement::delete(kind, user_id, offer_id, &self.pool).await
    }

    async fn count_engagement(&self, kind: EngagementKind, offer_id: OfferId) -> Result<i64> {
        Engagement::count(kind, offer_id, &self.pool).await
    }

    async fn find_metro_station(&self, id: MetroStationId) -> Result<Option<MetroStation>> {
        MetroStation::find_by_id(id, &self.pool).await
    }

    async fn find_housing_complex(&self, id: ComplexId) -> Result<Option<HousingComplex>> {
        HousingComplex::find_by_id(id, &self.pool).await
    }
}
