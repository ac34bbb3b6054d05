//! Paid promotion windows
//!
//! Purchase opens a payment with the payment service; confirmation checks
//! the payment and extends `promoted_until`. Payment service failures are
//! never degraded.

use chrono::Utc;
use tracing::info;

use crate::common::{OfferId, OwnerCapability, PaymentId, UserId};
use crate::domains::offers::data::{PromotionInfo, PromotionPurchase, PromotionTariff};
use crate::domains::offers::errors::{OfferError, OfferResult};
use crate::domains::offers::models::OfferStatus;
use crate::kernel::{NewPayment, ServerDeps};

use super::access::load_owned_offer;

fn upstream(e: anyhow::Error) -> OfferError {
    OfferError::Upstream(format!("payment service: {}", e))
}

pub async fn purchase_promotion(
    offer_id: OfferId,
    tariff: &str,
    actor: UserId,
    deps: &ServerDeps,
) -> OfferResult<PromotionPurchase> {
    let tariff: PromotionTariff = tariff
        .parse()
        .map_err(|e: anyhow::Error| OfferError::Validation(e.to_string()))?;

    let offer = load_owned_offer(offer_id, actor, OwnerCapability::PromoteOffer, deps).await?;

    if offer.status() != OfferStatus::Active {
        return Err(OfferError::Validation(format!(
            "offer {} must be published before it can be promoted",
            offer_id
        )));
    }

    let created = deps
        .payments
        .create_payment(NewPayment {
            offer_id,
            user_id: actor,
            tariff: tariff.to_string(),
            amount: tariff.price(),
            description: format!("Promotion of offer {} ({})", offer_id, tariff),
        })
        .await
        .map_err(upstream)?;

    info!(offer_id = %offer_id, payment_id = %created.id, %tariff, "Promotion payment opened");

    Ok(PromotionPurchase {
        payment_id: created.id,
        tariff,
        amount: tariff.price(),
        confirmation_url: created.confirmation_url,
    })
}

/// Apply a paid promotion. The window extends from the later of now and
/// the current end, so renewals stack.
pub async fn confirm_promotion(
    offer_id: OfferId,
    payment_id: PaymentId,
    actor: UserId,
    deps: &ServerDeps,
) -> OfferResult<PromotionInfo> {
    let offer = load_owned_offer(offer_id, actor, OwnerCapability::PromoteOffer, deps).await?;

    let payment = deps
        .payments
        .find_payment(payment_id)
        .await
        .map_err(upstream)?
        .ok_or_else(|| OfferError::NotFound(format!("payment {}", payment_id)))?;

    if payment.offer_id != offer_id || payment.user_id != actor {
        return Err(OfferError::Validation(format!(
            "payment {} was not made for offer {}",
            payment_id, offer_id
        )));
    }

    let tariff: PromotionTariff = payment
        .tariff
        .parse()
        .map_err(|e: anyhow::Error| OfferError::Validation(e.to_string()))?;

    if !deps
        .payments
        .validate_payment(payment_id)
        .await
        .map_err(upstream)?
    {
        return Err(OfferError::Validation(format!(
            "payment {} is not paid or was already applied",
            payment_id
        )));
    }

    let now = Utc::now();
    let start = offer.promoted_until.filter(|until| *until > now).unwrap_or(now);
    let until = start + tariff.duration();

    deps.store.set_promoted_until(offer_id, until).await?;

    info!(offer_id = %offer_id, payment_id = %payment_id, promoted_until = %until, "Promotion applied");

    Ok(PromotionInfo {
        is_promoted: true,
        promoted_until: Some(until),
    })
}
