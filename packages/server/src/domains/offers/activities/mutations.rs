//! Write paths: create, edit, publish, delete, images
//!
//! Every operation on an existing offer goes through `load_owned_offer`
//! before touching anything. Side effects (geocoding, price history) run
//! synchronously in the same call.

use tracing::{info, warn};

use crate::common::utils::clean_text;
use crate::common::{ImageId, OfferId, OwnerCapability, UserId};
use crate::domains::offers::data::{CreateOfferInput, ImageData, UpdateOfferInput};
use crate::domains::offers::errors::{OfferError, OfferResult};
use crate::domains::offers::models::{CreateOffer, Offer, OfferStatus, UpdateOffer};
use crate::kernel::ServerDeps;

use super::access::load_owned_offer;

/// Create a draft offer owned by `seller_id`. Returns its id.
pub async fn create_offer(
    input: CreateOfferInput,
    seller_id: UserId,
    deps: &ServerDeps,
) -> OfferResult<OfferId> {
    let raw_address = input
        .address
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| OfferError::Validation("address is required".to_string()))?;

    let location = deps
        .geocoder
        .geocode(raw_address)
        .await
        .map_err(|e| OfferError::Upstream(format!("cannot geocode address: {}", e)))?;

    let create = CreateOffer::builder()
        .seller_id(seller_id)
        .offer_type_id(input.offer_type_id)
        .purchase_type_id(input.purchase_type_id)
        .rent_type_id(input.rent_type_id)
        .renovation_id(input.renovation_id)
        .house_type_id(input.house_type_id)
        .complex_id(input.complex_id)
        .metro_station_id(input.metro_station_id)
        .price(input.price)
        .area(input.area)
        .floor(input.floor)
        .rooms(input.rooms)
        .ceiling_height(input.ceiling_height)
        .address(clean_text(Some(raw_address)).unwrap_or_default())
        .description(clean_text(input.description.as_deref()).unwrap_or_default())
        .latitude(location.latitude)
        .longitude(location.longitude)
        .build();

    let offer = deps.store.insert_offer(create).await?;

    if offer.price > 0 {
        deps.store.append_price(offer.id, offer.price).await?;
    }

    info!(offer_id = %offer.id, seller_id = %seller_id, "Offer draft created");
    Ok(offer.id)
}

/// Apply a partial edit. Status is never touched here.
pub async fn update_offer(
    offer_id: OfferId,
    input: UpdateOfferInput,
    actor: UserId,
    deps: &ServerDeps,
) -> OfferResult<Offer> {
    let current = load_owned_offer(offer_id, actor, OwnerCapability::EditOffer, deps).await?;

    let mut patch = UpdateOffer {
        offer_type_id: input.offer_type_id,
        purchase_type_id: input.purchase_type_id,
        rent_type_id: input.rent_type_id,
        renovation_id: input.renovation_id,
        house_type_id: input.house_type_id,
        complex_id: input.complex_id,
        metro_station_id: input.metro_station_id,
        price: input.price,
        area: input.area,
        floor: input.floor,
        rooms: input.rooms,
        ceiling_height: input.ceiling_height,
        description: input
            .description
            .as_deref()
            .map(|d| clean_text(Some(d)).unwrap_or_default()),
        ..UpdateOffer::default()
    };

    if let Some(raw) = input.address.as_deref() {
        let address = clean_text(Some(raw))
            .ok_or_else(|| OfferError::Validation("address cannot be empty".to_string()))?;

        // Geocoding is an external call; skip it when the text is unchanged
        if address != current.address {
            let location = deps
                .geocoder
                .geocode(raw.trim())
                .await
                .map_err(|e| OfferError::Upstream(format!("cannot geocode address: {}", e)))?;
            patch.latitude = Some(location.latitude);
            patch.longitude = Some(location.longitude);
            patch.address = Some(address);
        }
    }

    let updated = deps.store.update_offer(offer_id, patch).await?;

    if updated.offer_type_id != current.offer_type_id {
        // Different market: the old series is not comparable
        deps.store
            .restart_price_history(offer_id, updated.price)
            .await?;
        info!(offer_id = %offer_id, "Offer type changed, price history restarted");
    } else if updated.price != current.price && updated.price > 0 {
        deps.store.append_price(offer_id, updated.price).await?;
    }

    info!(offer_id = %offer_id, "Offer updated");
    Ok(updated)
}

/// Move a complete draft to active. Publishing an active offer is a no-op.
pub async fn publish_offer(
    offer_id: OfferId,
    actor: UserId,
    deps: &ServerDeps,
) -> OfferResult<Offer> {
    let mut offer = load_owned_offer(offer_id, actor, OwnerCapability::PublishOffer, deps).await?;

    if offer.status() == OfferStatus::Active {
        return Ok(offer);
    }

    let missing = offer.missing_required_fields();
    if !missing.is_empty() {
        return Err(OfferError::Validation(format!(
            "cannot publish offer {}: missing {}",
            offer_id,
            missing.join(", ")
        )));
    }

    deps.store
        .set_status(offer_id, OfferStatus::Active)
        .await?;
    offer.status = OfferStatus::Active.to_string();

    info!(offer_id = %offer_id, "Offer published");
    Ok(offer)
}

/// Remove an offer. History and blob cleanup are advisory.
pub async fn delete_offer(offer_id: OfferId, actor: UserId, deps: &ServerDeps) -> OfferResult<()> {
    load_owned_offer(offer_id, actor, OwnerCapability::DeleteOffer, deps).await?;

    if let Err(e) = deps.store.delete_price_history(offer_id).await {
        warn!(offer_id = %offer_id, error = %e, "Failed to delete price history");
    }

    let images = deps.store.offer_images(offer_id).await?;

    if !deps.store.delete_offer(offer_id).await? {
        return Err(OfferError::NotFound(format!("offer {}", offer_id)));
    }

    for image in images {
        if let Err(e) = deps.file_storage.delete(&image.image_key).await {
            warn!(offer_id = %offer_id, key = %image.image_key, error = %e, "Failed to delete image blob");
        }
    }

    info!(offer_id = %offer_id, "Offer deleted");
    Ok(())
}

/// Link an already stored blob to an offer
pub async fn add_offer_image(
    offer_id: OfferId,
    image_key: &str,
    actor: UserId,
    deps: &ServerDeps,
) -> OfferResult<ImageData> {
    load_owned_offer(offer_id, actor, OwnerCapability::ManageImages, deps).await?;

    let key = image_key.trim();
    if key.is_empty() || key.contains('/') || key.contains("..") {
        return Err(OfferError::Validation(format!("invalid image key: {}", image_key)));
    }

    let image = deps.store.add_image(offer_id, key).await?;
    Ok(ImageData::from_image(image, &deps.settings.image_base_url))
}

pub async fn delete_offer_image(
    image_id: ImageId,
    actor: UserId,
    deps: &ServerDeps,
) -> OfferResult<()> {
    let image = deps
        .store
        .find_image(image_id)
        .await?
        .ok_or_else(|| OfferError::NotFound(format!("image {}", image_id)))?;

    load_owned_offer(image.offer_id, actor, OwnerCapability::ManageImages, deps).await?;

    deps.store.delete_image(image_id).await?;

    if let Err(e) = deps.file_storage.delete(&image.image_key).await {
        warn!(image_id = %image_id, error = %e, "Failed to delete image blob");
    }

    Ok(())
}
