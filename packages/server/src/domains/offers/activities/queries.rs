//! Read paths: single offer, filtered lists, user collections

use tracing::{debug, info};

use crate::common::{OfferId, UserId};
use crate::domains::offers::data::{OfferView, Viewer};
use crate::domains::offers::errors::{OfferError, OfferResult};
use crate::domains::offers::models::{EngagementKind, OfferFilter, OfferStatus};
use crate::kernel::ServerDeps;

use super::aggregation::{build_offer_view, build_offer_views, SELLER_POLICY};
use super::ranking::rank;
use super::views::record_view;

/// Load one offer as a composite view and count the visit.
///
/// Drafts exist only for their owner; everyone else gets `NotFound`.
pub async fn get_offer(
    offer_id: OfferId,
    viewer: &Viewer,
    deps: &ServerDeps,
) -> OfferResult<OfferView> {
    let mut offer = deps
        .store
        .find_offer(offer_id)
        .await?
        .ok_or_else(|| OfferError::NotFound(format!("offer {}", offer_id)))?;

    if offer.status() != OfferStatus::Active && !viewer.is_owner_of(offer.seller_id) {
        return Err(OfferError::NotFound(format!("offer {}", offer_id)));
    }

    if let Some(views) = record_view(offer_id, &viewer.visitor_key, deps).await? {
        offer.views_count = views;
    }

    build_offer_view(offer, viewer, SELLER_POLICY, deps).await
}

/// Ranked composite views for a (possibly empty) filter.
///
/// A filter with nothing set takes the plain active-offers path, so it
/// returns exactly what an unfiltered call returns.
pub async fn get_offers(
    filter: Option<&OfferFilter>,
    viewer: &Viewer,
    deps: &ServerDeps,
) -> OfferResult<Vec<OfferView>> {
    let offers = match filter {
        Some(filter) if filter.has_any(viewer.user_id) => {
            let plan = filter.plan(viewer.user_id);
            debug!(predicates = plan.predicates().len(), "Filtered offer search");
            deps.store.search_offers(&plan).await?
        }
        _ => deps.store.list_active_offers().await?,
    };

    let mut views = build_offer_views(offers, viewer, deps).await?;
    rank(&mut views);

    info!(count = views.len(), "Offers listed");
    Ok(views)
}

/// Active offers the user liked, ranked
pub async fn liked_offers(user_id: UserId, deps: &ServerDeps) -> OfferResult<Vec<OfferView>> {
    engaged_offers(EngagementKind::Like, user_id, deps).await
}

/// Active offers the user saved, ranked
pub async fn favorite_offers(user_id: UserId, deps: &ServerDeps) -> OfferResult<Vec<OfferView>> {
    engaged_offers(EngagementKind::Favorite, user_id, deps).await
}

async fn engaged_offers(
    kind: EngagementKind,
    user_id: UserId,
    deps: &ServerDeps,
) -> OfferResult<Vec<OfferView>> {
    let offers = deps.store.engaged_offers(kind, user_id).await?;

    let mut views = build_offer_views(offers, &Viewer::user(user_id), deps).await?;
    rank(&mut views);
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::offers::models::offer::fixtures::active_offer;
    use crate::kernel::TestDependencies;

    fn draft_offer(id: i64, seller: i64) -> crate::domains::offers::models::Offer {
        let mut offer = active_offer(id, seller);
        offer.status = OfferStatus::Draft.to_string();
        offer
    }

    #[tokio::test]
    async fn test_draft_hidden_from_strangers() {
        let test_deps = TestDependencies::new();
        test_deps.store.seed_offer(draft_offer(1, 7));
        let deps = test_deps.deps();

        let stranger = get_offer(OfferId::new(1), &Viewer::user(UserId::new(8)), &deps).await;
        assert!(matches!(stranger, Err(OfferError::NotFound(_))));

        let owner = get_offer(OfferId::new(1), &Viewer::user(UserId::new(7)), &deps)
            .await
            .unwrap();
        assert_eq!(owner.status, "draft");
    }

    #[tokio::test]
    async fn test_get_offer_counts_view_for_owner_display() {
        let test_deps = TestDependencies::new();
        test_deps.store.seed_offer(active_offer(1, 7));
        let deps = test_deps.deps();
        let owner = Viewer::user(UserId::new(7));

        let first = get_offer(OfferId::new(1), &owner, &deps).await.unwrap();
        let second = get_offer(OfferId::new(1), &owner, &deps).await.unwrap();

        assert_eq!(first.stats.views_count, Some(1));
        assert_eq!(second.stats.views_count, Some(1));
    }

    #[tokio::test]
    async fn test_unknown_offer_not_found() {
        let deps = TestDependencies::new().deps();
        let result = get_offer(OfferId::new(404), &Viewer::anonymous("x"), &deps).await;
        assert!(matches!(result, Err(OfferError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_filter_matches_unfiltered_path() {
        let test_deps = TestDependencies::new();
        test_deps.store.seed_offer(active_offer(1, 7));
        test_deps.store.seed_offer(draft_offer(2, 7));
        test_deps.store.seed_offer(active_offer(3, 8));
        let deps = test_deps.deps();
        let viewer = Viewer::anonymous("x");

        let ids = |views: Vec<OfferView>| -> Vec<OfferId> { views.into_iter().map(|v| v.id).collect() };

        let unfiltered = ids(get_offers(None, &viewer, &deps).await.unwrap());
        let empty = ids(get_offers(Some(&OfferFilter::default()), &viewer, &deps)
            .await
            .unwrap());

        assert_eq!(unfiltered, empty);
        assert_eq!(unfiltered, vec![OfferId::new(3), OfferId::new(1)]);
    }

    #[tokio::test]
    async fn test_only_mine_for_anonymous_is_no_filter() {
        let test_deps = TestDependencies::new();
        test_deps.store.seed_offer(active_offer(1, 7));
        test_deps.store.seed_offer(active_offer(2, 8));
        let deps = test_deps.deps();

        let filter = OfferFilter {
            only_mine: true,
            ..OfferFilter::default()
        };

        let anonymous = get_offers(Some(&filter), &Viewer::anonymous("x"), &deps)
            .await
            .unwrap();
        assert_eq!(anonymous.len(), 2);

        let mine = get_offers(Some(&filter), &Viewer::user(UserId::new(8)), &deps)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].seller_id, UserId::new(8));
    }
}
