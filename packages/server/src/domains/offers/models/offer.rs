use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use typed_builder::TypedBuilder;

use crate::common::{ComplexId, MetroStationId, OfferId, Owned, UserId};
use crate::domains::offers::models::filter::QueryPlan;
use crate::domains::offers::models::EngagementKind;

/// Offer - one property advertisement
///
/// Categorical columns (`offer_type_id`, `purchase_type_id`, ...) reference
/// dictionary tables owned by the catalog service; `0` means "not chosen yet",
/// which is allowed for drafts only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Offer {
    pub id: OfferId,
    pub seller_id: UserId,

    // Categories
    pub offer_type_id: i64,
    pub purchase_type_id: i64,
    pub rent_type_id: i64,
    pub renovation_id: i64,
    pub house_type_id: i64,
    pub status: String, // 'draft', 'active'

    // Catalog links
    pub complex_id: Option<ComplexId>,
    pub metro_station_id: Option<MetroStationId>,

    // Numbers
    pub price: i64,
    pub area: f64,
    pub floor: i32,
    pub rooms: i32,
    pub ceiling_height: f64,

    // Text (stored HTML-escaped)
    pub address: String,
    pub description: String,

    // Geocoded from address
    pub latitude: f64,
    pub longitude: f64,

    pub views_count: i64,
    pub promoted_until: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Offer lifecycle: `draft -> active`, never back
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Draft,
    Active,
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OfferStatus::Draft => write!(f, "draft"),
            OfferStatus::Active => write!(f, "active"),
        }
    }
}

impl std::str::FromStr for OfferStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(OfferStatus::Draft),
            "active" => Ok(OfferStatus::Active),
            _ => Err(anyhow::anyhow!("Invalid offer status: {}", s)),
        }
    }
}

/// Input for inserting a new offer row
#[derive(Debug, Clone, TypedBuilder)]
pub struct CreateOffer {
    pub seller_id: UserId,
    #[builder(default)]
    pub offer_type_id: i64,
    #[builder(default)]
    pub purchase_type_id: i64,
    #[builder(default)]
    pub rent_type_id: i64,
    #[builder(default)]
    pub renovation_id: i64,
    #[builder(default)]
    pub house_type_id: i64,
    #[builder(default = OfferStatus::Draft)]
    pub status: OfferStatus,
    #[builder(default)]
    pub complex_id: Option<ComplexId>,
    #[builder(default)]
    pub metro_station_id: Option<MetroStationId>,
    #[builder(default)]
    pub price: i64,
    #[builder(default)]
    pub area: f64,
    #[builder(default)]
    pub floor: i32,
    #[builder(default)]
    pub rooms: i32,
    #[builder(default)]
    pub ceiling_height: f64,
    #[builder(setter(into))]
    pub address: String,
    #[builder(default, setter(into))]
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Partial update; `None` leaves the column untouched. Status is not patchable.
#[derive(Debug, Clone, Default)]
pub struct UpdateOffer {
    pub offer_type_id: Option<i64>,
    pub purchase_type_id: Option<i64>,
    pub rent_type_id: Option<i64>,
    pub renovation_id: Option<i64>,
    pub house_type_id: Option<i64>,
    pub complex_id: Option<Option<ComplexId>>,
    pub metro_station_id: Option<Option<MetroStationId>>,
    pub price: Option<i64>,
    pub area: Option<f64>,
    pub floor: Option<i32>,
    pub rooms: Option<i32>,
    pub ceiling_height: Option<f64>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Owned for Offer {
    fn owner_id(&self) -> UserId {
        self.seller_id
    }

    fn resource_label(&self) -> String {
        format!("offer {}", self.id)
    }
}

impl Offer {
    pub fn status(&self) -> OfferStatus {
        self.status.parse().unwrap_or(OfferStatus::Draft)
    }

    /// A promotion counts only while its window is still open
    pub fn is_promoted_at(&self, now: DateTime<Utc>) -> bool {
        self.promoted_until.is_some_and(|until| until > now)
    }

    /// Fields that must be filled before the offer may go live
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.offer_type_id <= 0 {
            missing.push("offer_type_id");
        }
        if self.purchase_type_id <= 0 {
            missing.push("purchase_type_id");
        }
        if self.renovation_id <= 0 {
            missing.push("renovation_id");
        }
        if self.house_type_id <= 0 {
            missing.push("house_type_id");
        }
        if self.price <= 0 {
            missing.push("price");
        }
        if self.area <= 0.0 {
            missing.push("area");
        }
        if self.floor <= 0 {
            missing.push("floor");
        }
        if self.rooms <= 0 {
            missing.push("rooms");
        }
        if self.ceiling_height <= 0.0 {
            missing.push("ceiling_height");
        }
        if self.address.trim().is_empty() {
            missing.push("address");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }

        missing
    }

    /// Apply a patch in memory, mirroring what `update` does in SQL
    pub fn apply(&mut self, patch: &UpdateOffer) {
        if let Some(v) = patch.offer_type_id {
            self.offer_type_id = v;
        }
        if let Some(v) = patch.purchase_type_id {
            self.purchase_type_id = v;
        }
        if let Some(v) = patch.rent_type_id {
            self.rent_type_id = v;
        }
        if let Some(v) = patch.renovation_id {
            self.renovation_id = v;
        }
        if let Some(v) = patch.house_type_id {
            self.house_type_id = v;
        }
        if let Some(v) = patch.complex_id {
            self.complex_id = v;
        }
        if let Some(v) = patch.metro_station_id {
            self.metro_station_id = v;
        }
        if let Some(v) = patch.price {
            self.price = v;
        }
        if let Some(v) = patch.area {
            self.area = v;
        }
        if let Some(v) = patch.floor {
            self.floor = v;
        }
        if let Some(v) = patch.rooms {
            self.rooms = v;
        }
        if let Some(v) = patch.ceiling_height {
            self.ceiling_height = v;
        }
        if let Some(v) = &patch.address {
            self.address = v.clone();
        }
        if let Some(v) = &patch.description {
            self.description = v.clone();
        }
        if let Some(v) = patch.latitude {
            self.latitude = v;
        }
        if let Some(v) = patch.longitude {
            self.longitude = v;
        }
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Offer {
    pub async fn find_by_id(id: OfferId, pool: &PgPool) -> Result<Option<Self>> {
        let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(offer)
    }

    /// Run a filtered search; the plan always carries the status predicate
    pub async fn search(plan: &QueryPlan, pool: &PgPool) -> Result<Vec<Self>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM offers");
        plan.push_where(&mut query);
        query.push(" ORDER BY created_at DESC");

        let offers = query.build_query_as::<Offer>().fetch_all(pool).await?;
        Ok(offers)
    }

    /// Active offers the user liked or favorited, most recent engagement first
    pub async fn find_engaged_by(
        kind: EngagementKind,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let sql = format!(
            "SELECT o.* FROM offers o
             JOIN {} e ON e.offer_id = o.id
             WHERE e.user_id = $1 AND o.status = 'active'
             ORDER BY e.created_at DESC",
            kind.table()
        );

        let offers = sqlx::query_as::<_, Offer>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(offers)
    }

    pub async fn create(input: CreateOffer, pool: &PgPool) -> Result<Self> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            INSERT INTO offers (
                seller_id,
                offer_type_id,
                purchase_type_id,
                rent_type_id,
                renovation_id,
                house_type_id,
                status,
                complex_id,
                metro_station_id,
                price,
                area,
                floor,
                rooms,
                ceiling_height,
                address,
                description,
                latitude,
                longitude
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(input.seller_id)
        .bind(input.offer_type_id)
        .bind(input.purchase_type_id)
        .bind(input.rent_type_id)
        .bind(input.renovation_id)
        .bind(input.house_type_id)
        .bind(input.status.to_string())
        .bind(input.complex_id)
        .bind(input.metro_station_id)
        .bind(input.price)
        .bind(input.area)
        .bind(input.floor)
        .bind(input.rooms)
        .bind(input.ceiling_height)
        .bind(input.address)
        .bind(input.description)
        .bind(input.latitude)
        .bind(input.longitude)
        .fetch_one(pool)
        .await?;

        Ok(offer)
    }

    /// Patch an offer. Status is deliberately absent from the column list.
    pub async fn update(id: OfferId, input: UpdateOffer, pool: &PgPool) -> Result<Self> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers SET
                offer_type_id = COALESCE($2, offer_type_id),
                purchase_type_id = COALESCE($3, purchase_type_id),
                rent_type_id = COALESCE($4, rent_type_id),
                renovation_id = COALESCE($5, renovation_id),
                house_type_id = COALESCE($6, house_type_id),
                complex_id = CASE WHEN $7 THEN $8 ELSE complex_id END,
                metro_station_id = CASE WHEN $9 THEN $10 ELSE metro_station_id END,
                price = COALESCE($11, price),
                area = COALESCE($12, area),
                floor = COALESCE($13, floor),
                rooms = COALESCE($14, rooms),
                ceiling_height = COALESCE($15, ceiling_height),
                address = COALESCE($16, address),
                description = COALESCE($17, description),
                latitude = COALESCE($18, latitude),
                longitude = COALESCE($19, longitude),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.offer_type_id)
        .bind(input.purchase_type_id)
        .bind(input.rent_type_id)
        .bind(input.renovation_id)
        .bind(input.house_type_id)
        .bind(input.complex_id.is_some())
        .bind(input.complex_id.flatten())
        .bind(input.metro_station_id.is_some())
        .bind(input.metro_station_id.flatten())
        .bind(input.price)
        .bind(input.area)
        .bind(input.floor)
        .bind(input.rooms)
        .bind(input.ceiling_height)
        .bind(input.address)
        .bind(input.description)
        .bind(input.latitude)
        .bind(input.longitude)
        .fetch_one(pool)
        .await?;

        Ok(offer)
    }

    pub async fn update_status(id: OfferId, status: OfferStatus, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE offers SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.to_string())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn update_promoted_until(
        id: OfferId,
        until: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query("UPDATE offers SET promoted_until = $1, updated_at = NOW() WHERE id = $2")
            .bind(until)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Atomic counter bump; returns the new value
    pub async fn increment_views(id: OfferId, pool: &PgPool) -> Result<i64> {
        let views: i64 = sqlx::query_scalar(
            "UPDATE offers SET views_count = views_count + 1 WHERE id = $1 RETURNING views_count",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(views)
    }

    pub async fn delete(id: OfferId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::active_offer;
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_roundtrip() {
        assert_eq!("draft".parse::<OfferStatus>().unwrap(), OfferStatus::Draft);
        assert_eq!(OfferStatus::Active.to_string(), "active");
        assert!("archived".parse::<OfferStatus>().is_err());
    }

    #[test]
    fn test_expired_promotion_is_not_promoted() {
        let now = Utc::now();
        let mut offer = active_offer(1, 1);

        offer.promoted_until = Some(now - Duration::minutes(1));
        assert!(!offer.is_promoted_at(now));

        offer.promoted_until = Some(now + Duration::days(1));
        assert!(offer.is_promoted_at(now));

        offer.promoted_until = None;
        assert!(!offer.is_promoted_at(now));
    }

    #[test]
    fn test_missing_required_fields() {
        let mut offer = active_offer(1, 1);
        assert!(offer.missing_required_fields().is_empty());

        offer.area = 0.0;
        offer.description = "   ".to_string();
        assert_eq!(offer.missing_required_fields(), vec!["area", "description"]);
    }

    #[test]
    fn test_apply_patch_keeps_status() {
        let mut offer = active_offer(1, 1);
        offer.apply(&UpdateOffer {
            price: Some(5),
            complex_id: Some(None),
            ..Default::default()
        });
        assert_eq!(offer.price, 5);
        assert_eq!(offer.status(), OfferStatus::Active);
        assert_eq!(offer.complex_id, None);
    }
}
