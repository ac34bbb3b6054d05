//! Composite view assembly
//!
//! Turns one raw offer row into an `OfferView`: images, seller summary,
//! metro/complex labels, live counters, recent prices and, for the owner
//! only, the view counter and promotion window. Nothing is cached; every
//! call reads fresh data.

use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::warn;

use crate::domains::offers::data::{
    ImageData, OfferStats, OfferView, PricePoint, PromotionInfo, SellerData, UpstreamPolicy,
    Viewer,
};
use crate::domains::offers::errors::{OfferError, OfferResult};
use crate::domains::offers::models::{EngagementKind, Offer};
use crate::kernel::ServerDeps;

use super::ranking::promotion_score;

/// Seller lookups degrade; a missing profile must not hide the offer.
pub const SELLER_POLICY: UpstreamPolicy = UpstreamPolicy::Degrade;

pub async fn build_offer_view(
    offer: Offer,
    viewer: &Viewer,
    seller_policy: UpstreamPolicy,
    deps: &ServerDeps,
) -> OfferResult<OfferView> {
    let store = deps.store.as_ref();
    let settings = &deps.settings;
    let now = Utc::now();

    let is_owner = viewer.is_owner_of(offer.seller_id);
    let is_promoted = offer.is_promoted_at(now);
    let views_count = offer.views_count;
    let promoted_until = offer.promoted_until;
    let metro_station_id = offer.metro_station_id;
    let complex_id = offer.complex_id;
    let offer_id = offer.id;
    let seller_id = offer.seller_id;

    let mut view = OfferView::from_offer(offer);

    view.images = store
        .offer_images(offer_id)
        .await?
        .into_iter()
        .map(|image| ImageData::from_image(image, &settings.image_base_url))
        .collect();

    view.seller = match deps.profiles.get_profile(seller_id).await {
        Ok(profile) => SellerData::from(profile),
        Err(e) => match seller_policy {
            UpstreamPolicy::Degrade => {
                warn!(
                    offer_id = %offer_id,
                    seller_id = %seller_id,
                    error = %e,
                    "Profile lookup failed, rendering empty seller"
                );
                SellerData::anonymous(seller_id)
            }
            UpstreamPolicy::Propagate => {
                return Err(OfferError::Upstream(format!("profile service: {}", e)))
            }
        },
    };

    if let Some(id) = metro_station_id {
        view.metro_station = store.find_metro_station(id).await?.map(Into::into);
    }
    if let Some(id) = complex_id {
        view.housing_complex = store.find_housing_complex(id).await?.map(Into::into);
    }

    let likes_count = store
        .count_engagement(EngagementKind::Like, offer_id)
        .await?;
    let favorites_count = store
        .count_engagement(EngagementKind::Favorite, offer_id)
        .await?;

    let (is_liked, is_favorited) = match viewer.user_id {
        Some(user_id) => (
            store
                .has_engagement(EngagementKind::Like, user_id, offer_id)
                .await?,
            store
                .has_engagement(EngagementKind::Favorite, user_id, offer_id)
                .await?,
        ),
        None => (false, false),
    };

    let price_history = store
        .recent_prices(offer_id, settings.price_history_limit)
        .await?
        .into_iter()
        .map(PricePoint::from)
        .collect();

    view.stats = OfferStats {
        likes_count,
        favorites_count,
        is_liked,
        is_favorited,
        views_count: is_owner.then_some(views_count),
        price_history,
        promotion: is_owner.then_some(PromotionInfo {
            is_promoted,
            promoted_until,
        }),
    };
    view.promotion_score = promotion_score(likes_count, is_promoted, settings);

    Ok(view)
}

/// Aggregate a batch with bounded concurrency; output keeps input order.
pub async fn build_offer_views(
    offers: Vec<Offer>,
    viewer: &Viewer,
    deps: &ServerDeps,
) -> OfferResult<Vec<OfferView>> {
    let width = deps.settings.aggregation_width.max(1);

    stream::iter(offers)
        .map(|offer| build_offer_view(offer, viewer, SELLER_POLICY, deps))
        .buffered(width)
        .try_collect()
        .await
}
