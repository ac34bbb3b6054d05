//! Test fixtures for creating test data.

use anyhow::Result;
use estate_core::common::{MetroStationId, UserId};
use estate_core::domains::offers::data::CreateOfferInput;
use estate_core::domains::offers::models::{CreateOffer, Offer, OfferStatus};
use estate_core::kernel::BaseOfferStore;
use sqlx::PgPool;

/// Input that passes every publish precondition
pub fn complete_offer_input(address: &str, price: i64) -> CreateOfferInput {
    CreateOfferInput {
        offer_type_id: 1,
        purchase_type_id: 1,
        renovation_id: 2,
        house_type_id: 3,
        price,
        area: 48.0,
        floor: 4,
        rooms: 2,
        ceiling_height: 2.8,
        address: Some(address.to_string()),
        description: Some("Quiet courtyard, close to the park".to_string()),
        ..CreateOfferInput::default()
    }
}

/// Insert an active offer straight through the store
pub async fn create_active_offer(
    store: &dyn BaseOfferStore,
    seller: UserId,
    price: i64,
) -> Result<Offer> {
    let offer = store
        .insert_offer(
            CreateOffer::builder()
                .seller_id(seller)
                .offer_type_id(1)
                .purchase_type_id(1)
                .renovation_id(1)
                .house_type_id(1)
                .price(price)
                .area(30.0)
                .floor(2)
                .rooms(1)
                .ceiling_height(2.5)
                .address("Lenina 5")
                .description("Fixture offer")
                .latitude(55.7)
                .longitude(37.6)
                .build(),
        )
        .await?;

    store.set_status(offer.id, OfferStatus::Active).await?;
    Ok(Offer {
        status: OfferStatus::Active.to_string(),
        ..offer
    })
}

pub async fn create_metro_station(pool: &PgPool, name: &str) -> Result<MetroStationId> {
    let id: MetroStationId =
        sqlx::query_scalar("INSERT INTO metro_stations (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await?;
    Ok(id)
}
