use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ComplexId, MetroStationId};

/// Metro station label shown next to an offer
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MetroStation {
    pub id: MetroStationId,
    pub name: String,
    pub line_color: Option<String>,
}

/// Housing complex summary shown next to an offer in a new building
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HousingComplex {
    pub id: ComplexId,
    pub name: String,
    pub developer: Option<String>,
}

impl MetroStation {
    pub async fn find_by_id(id: MetroStationId, pool: &PgPool) -> Result<Option<Self>> {
        let station =
            sqlx::query_as::<_, MetroStation>("SELECT * FROM metro_stations WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(station)
    }
}

impl HousingComplex {
    pub async fn find_by_id(id: ComplexId, pool: &PgPool) -> Result<Option<Self>> {
        let complex = sqlx::query_as::<_, HousingComplex>(
            "SELECT id, name, developer FROM housing_complexes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(complex)
    }
}
