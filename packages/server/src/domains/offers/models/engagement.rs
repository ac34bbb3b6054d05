use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{OfferId, UserId};

/// Like and favorite share one shape: a unique (user, offer) pair whose
/// presence is the boolean state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    Like,
    Favorite,
}

impl EngagementKind {
    pub fn table(&self) -> &'static str {
        match self {
            EngagementKind::Like => "offer_likes",
            EngagementKind::Favorite => "offer_favorites",
        }
    }
}

impl std::fmt::Display for EngagementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngagementKind::Like => write!(f, "like"),
            EngagementKind::Favorite => write!(f, "favorite"),
        }
    }
}

/// SQL for the like/favorite join tables
pub struct Engagement;

impl Engagement {
    pub async fn exists(
        kind: EngagementKind,
        user_id: UserId,
        offer_id: OfferId,
        pool: &PgPool,
    ) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = $1 AND offer_id = $2)",
            kind.table()
        );
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(user_id)
            .bind(offer_id)
            .fetch_one(pool)
            .await?;
        Ok(exists)
    }

    /// Returns `false` when the pair already existed (lost a concurrent race)
    pub async fn insert(
        kind: EngagementKind,
        user_id: UserId,
        offer_id: OfferId,
        pool: &PgPool,
    ) -> Result<bool> {
        let sql = format!(
            "INSERT INTO {} (user_id, offer_id) VALUES ($1, $2)
             ON CONFLICT (user_id, offer_id) DO NOTHING",
            kind.table()
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(offer_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `false` when there was nothing to delete
    pub async fn delete(
        kind: EngagementKind,
        user_id: UserId,
        offer_id: OfferId,
        pool: &PgPool,
    ) -> Result<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND offer_id = $2",
            kind.table()
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(offer_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(kind: EngagementKind, offer_id: OfferId, pool: &PgPool) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE offer_id = $1", kind.table());
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(offer_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
