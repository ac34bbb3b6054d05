//! View counting with per-visitor dedup through the view cache.

use tracing::debug;

use crate::common::OfferId;
use crate::domains::offers::errors::OfferResult;
use crate::kernel::ServerDeps;

/// Cache key marking `visitor_key` as counted for this offer
pub fn view_key(offer_id: OfferId, visitor_key: &str) -> String {
    format!("offer_view:{}:{}", offer_id, visitor_key)
}

/// Count a view unless this visitor was already counted within the dedup window.
///
/// The cache insert is a single atomic set-if-absent, so only the request
/// that creates the key increments the counter. Returns the new counter
/// value when the view was counted.
pub async fn record_view(
    offer_id: OfferId,
    visitor_key: &str,
    deps: &ServerDeps,
) -> OfferResult<Option<i64>> {
    let key = view_key(offer_id, visitor_key);

    let first_view = deps
        .view_cache
        .insert_if_absent(&key, deps.settings.view_dedup_ttl)
        .await?;

    if !first_view {
        debug!(offer_id = %offer_id, "Repeat view inside dedup window");
        return Ok(None);
    }

    let views = deps.store.increment_views(offer_id).await?;
    Ok(Some(views))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::offers::errors::OfferError;
    use crate::domains::offers::models::offer::fixtures::active_offer;
    use crate::kernel::test_dependencies::InMemoryViewCache;
    use crate::kernel::TestDependencies;

    #[tokio::test]
    async fn test_repeat_view_counted_once() {
        let test_deps = TestDependencies::new();
        test_deps.store.seed_offer(active_offer(1, 1));
        let deps = test_deps.deps();

        let first = record_view(OfferId::new(1), "addr:1.2.3.4", &deps).await.unwrap();
        let second = record_view(OfferId::new(1), "addr:1.2.3.4", &deps).await.unwrap();

        assert_eq!(first, Some(1));
        assert_eq!(second, None);
        assert_eq!(
            test_deps.store.stored_offer(OfferId::new(1)).unwrap().views_count,
            1
        );
    }

    #[tokio::test]
    async fn test_distinct_visitors_both_counted() {
        let test_deps = TestDependencies::new();
        test_deps.store.seed_offer(active_offer(1, 1));
        let deps = test_deps.deps();

        record_view(OfferId::new(1), "addr:a", &deps).await.unwrap();
        record_view(OfferId::new(1), "addr:b", &deps).await.unwrap();

        assert_eq!(
            test_deps.store.stored_offer(OfferId::new(1)).unwrap().views_count,
            2
        );
        assert!(test_deps.view_cache.contains("offer_view:1:addr:a"));
    }

    #[tokio::test]
    async fn test_concurrent_first_views_counted_once() {
        let test_deps = TestDependencies::new();
        test_deps.store.seed_offer(active_offer(1, 1));
        let deps = test_deps.deps();

        let (a, b) = tokio::join!(
            record_view(OfferId::new(1), "addr:same", &deps),
            record_view(OfferId::new(1), "addr:same", &deps)
        );

        assert_eq!(a.unwrap().is_some() as u8 + b.unwrap().is_some() as u8, 1);
        assert_eq!(
            test_deps.store.stored_offer(OfferId::new(1)).unwrap().views_count,
            1
        );
    }

    #[tokio::test]
    async fn test_cache_failure_counts_nothing() {
        let test_deps = TestDependencies::new().mock_view_cache(InMemoryViewCache::failing());
        test_deps.store.seed_offer(active_offer(1, 1));

        let result = record_view(OfferId::new(1), "addr:a", &test_deps.deps()).await;

        assert!(matches!(result, Err(OfferError::Transient(_))));
        assert_eq!(
            test_deps.store.stored_offer(OfferId::new(1)).unwrap().views_count,
            0
        );
    }
}
