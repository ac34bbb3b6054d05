use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ImageId, OfferId};

/// Link between an offer and a blob in object storage
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OfferImage {
    pub id: ImageId,
    pub offer_id: OfferId,
    /// Storage key; never a full URL
    pub image_key: String,
    pub created_at: DateTime<Utc>,
}

impl OfferImage {
    pub async fn find_by_id(id: ImageId, pool: &PgPool) -> Result<Option<Self>> {
        let image = sqlx::query_as::<_, OfferImage>("SELECT * FROM offer_images WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(image)
    }

    /// Images in upload order
    pub async fn find_for_offer(offer_id: OfferId, pool: &PgPool) -> Result<Vec<Self>> {
        let images = sqlx::query_as::<_, OfferImage>(
            "SELECT * FROM offer_images WHERE offer_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(offer_id)
        .fetch_all(pool)
        .await?;
        Ok(images)
    }

    pub async fn create(offer_id: OfferId, image_key: &str, pool: &PgPool) -> Result<Self> {
        let image = sqlx::query_as::<_, OfferImage>(
            "INSERT INTO offer_images (offer_id, image_key) VALUES ($1, $2) RETURNING *",
        )
        .bind(offer_id)
        .bind(image_key)
        .fetch_one(pool)
        .await?;
        Ok(image)
    }

    pub async fn delete(id: ImageId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM offer_images WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
