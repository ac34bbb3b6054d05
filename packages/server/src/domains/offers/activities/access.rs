//! Ownership guard shared by every mutating operation

use crate::common::{Actor, OfferId, OwnerCapability, UserId};
use crate::domains::offers::errors::{OfferError, OfferResult};
use crate::domains::offers::models::Offer;
use crate::kernel::ServerDeps;

/// Load an offer and make sure `actor` may perform `capability` on it.
///
/// Runs before any side effect. Unknown ids are `NotFound`, foreign
/// offers are `Forbidden`.
pub async fn load_owned_offer(
    offer_id: OfferId,
    actor: UserId,
    capability: OwnerCapability,
    deps: &ServerDeps,
) -> OfferResult<Offer> {
    let offer = deps
        .store
        .find_offer(offer_id)
        .await?
        .ok_or_else(|| OfferError::NotFound(format!("offer {}", offer_id)))?;

    Actor::new(actor).can(capability).on(&offer).check()?;

    Ok(offer)
}
