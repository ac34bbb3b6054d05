//! Like / favorite toggles
//!
//! Read-then-write without a lock: two concurrent first toggles can both
//! read "absent". The store's unique pair turns the second insert into a
//! no-op, which is reported as already being in the requested state.

use tracing::{debug, info};

use crate::common::{OfferId, UserId};
use crate::domains::offers::data::ToggleResult;
use crate::domains::offers::errors::{OfferError, OfferResult};
use crate::domains::offers::models::{EngagementKind, OfferStatus};
use crate::kernel::ServerDeps;

pub async fn toggle_like(
    user_id: UserId,
    offer_id: OfferId,
    deps: &ServerDeps,
) -> OfferResult<ToggleResult> {
    toggle(EngagementKind::Like, user_id, offer_id, deps).await
}

pub async fn toggle_favorite(
    user_id: UserId,
    offer_id: OfferId,
    deps: &ServerDeps,
) -> OfferResult<ToggleResult> {
    toggle(EngagementKind::Favorite, user_id, offer_id, deps).await
}

async fn toggle(
    kind: EngagementKind,
    user_id: UserId,
    offer_id: OfferId,
    deps: &ServerDeps,
) -> OfferResult<ToggleResult> {
    let offer = deps
        .store
        .find_offer(offer_id)
        .await?
        .ok_or_else(|| OfferError::NotFound(format!("offer {}", offer_id)))?;

    // Drafts are invisible to everyone but the seller
    if offer.status() != OfferStatus::Active && offer.seller_id != user_id {
        return Err(OfferError::NotFound(format!("offer {}", offer_id)));
    }

    let present = deps.store.has_engagement(kind, user_id, offer_id).await?;

    let is_active = if present {
        if !deps.store.remove_engagement(kind, user_id, offer_id).await? {
            debug!(%kind, offer_id = %offer_id, "Engagement already removed");
        }
        false
    } else {
        if !deps.store.add_engagement(kind, user_id, offer_id).await? {
            debug!(%kind, offer_id = %offer_id, "Engagement already present");
        }
        true
    };

    let total = deps.store.count_engagement(kind, offer_id).await?;

    info!(%kind, offer_id = %offer_id, user_id = %user_id, is_active, total, "Engagement toggled");
    Ok(ToggleResult { is_active, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::offers::models::offer::fixtures::active_offer;
    use crate::kernel::test_dependencies::InMemoryOfferStore;
    use crate::kernel::TestDependencies;

    #[tokio::test]
    async fn test_double_toggle_restores_state() {
        let test_deps = TestDependencies::new();
        test_deps.store.seed_offer(active_offer(1, 7));
        let deps = test_deps.deps();
        let (user, offer) = (UserId::new(2), OfferId::new(1));

        let on = toggle_like(user, offer, &deps).await.unwrap();
        assert_eq!(on, ToggleResult { is_active: true, total: 1 });

        let off = toggle_like(user, offer, &deps).await.unwrap();
        assert_eq!(off, ToggleResult { is_active: false, total: 0 });

        let fav_on = toggle_favorite(user, offer, &deps).await.unwrap();
        let fav_off = toggle_favorite(user, offer, &deps).await.unwrap();
        assert!(fav_on.is_active);
        assert_eq!(fav_off, ToggleResult { is_active: false, total: 0 });
    }

    #[tokio::test]
    async fn test_racing_first_likes_leave_one_row() {
        let test_deps =
            TestDependencies::new().mock_store(InMemoryOfferStore::new().with_stale_engagement_reads());
        test_deps.store.seed_offer(active_offer(1, 7));
        let deps = test_deps.deps();
        let (user, offer) = (UserId::new(2), OfferId::new(1));

        let (a, b) = tokio::join!(
            toggle_like(user, offer, &deps),
            toggle_like(user, offer, &deps)
        );

        assert_eq!(a.unwrap(), ToggleResult { is_active: true, total: 1 });
        assert_eq!(b.unwrap(), ToggleResult { is_active: true, total: 1 });
        assert_eq!(test_deps.store.engagement_rows(EngagementKind::Like, offer), 1);
    }

    #[tokio::test]
    async fn test_cannot_like_foreign_draft() {
        let test_deps = TestDependencies::new();
        let mut draft = active_offer(1, 7);
        draft.status = OfferStatus::Draft.to_string();
        test_deps.store.seed_offer(draft);

        let result = toggle_like(UserId::new(2), OfferId::new(1), &test_deps.deps()).await;
        assert!(matches!(result, Err(OfferError::NotFound(_))));
    }
}
