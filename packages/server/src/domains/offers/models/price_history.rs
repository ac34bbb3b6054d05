use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::OfferId;

/// One point of an offer's price series. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PriceHistoryEntry {
    pub id: i64,
    pub offer_id: OfferId,
    pub price: i64,
    pub recorded_at: DateTime<Utc>,
}

impl PriceHistoryEntry {
    pub async fn append(offer_id: OfferId, price: i64, pool: &PgPool) -> Result<Self> {
        let entry = sqlx::query_as::<_, PriceHistoryEntry>(
            "INSERT INTO offer_price_history (offer_id, price) VALUES ($1, $2) RETURNING *",
        )
        .bind(offer_id)
        .bind(price)
        .fetch_one(pool)
        .await?;
        Ok(entry)
    }

    /// Drop the whole series and restart it at `price`, atomically.
    /// A non-positive price leaves the series empty.
    pub async fn restart(offer_id: OfferId, price: i64, pool: &PgPool) -> Result<()> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM offer_price_history WHERE offer_id = $1")
            .bind(offer_id)
            .execute(&mut *tx)
            .await?;

        if price > 0 {
            sqlx::query("INSERT INTO offer_price_history (offer_id, price) VALUES ($1, $2)")
                .bind(offer_id)
                .bind(price)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Most recent `limit` rows, newest first
    pub async fn find_recent(offer_id: OfferId, limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let entries = sqlx::query_as::<_, PriceHistoryEntry>(
            "SELECT * FROM offer_price_history
             WHERE offer_id = $1
             ORDER BY recorded_at DESC, id DESC
             LIMIT $2",
        )
        .bind(offer_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(entries)
    }

    pub async fn delete_for_offer(offer_id: OfferId, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM offer_price_history WHERE offer_id = $1")
            .bind(offer_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
