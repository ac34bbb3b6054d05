//! Promotion score and the ordering of result lists

use std::cmp::Reverse;

use crate::config::EngineSettings;
use crate::domains::offers::data::OfferView;

/// `likes * like_weight + (promoted ? promotion_weight : 0)`, never negative
pub fn promotion_score(likes: i64, promoted: bool, settings: &EngineSettings) -> u64 {
    let likes = likes.max(0) as u64;
    let bonus = if promoted {
        u64::from(settings.promotion_weight)
    } else {
        0
    };

    likes
        .saturating_mul(u64::from(settings.like_weight))
        .saturating_add(bonus)
}

/// Highest score first; equal scores fall back to the newest id.
pub fn rank(views: &mut [OfferView]) {
    views.sort_by_key(|view| (Reverse(view.promotion_score), Reverse(view.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::offers::models::offer::fixtures::active_offer;

    fn view(id: i64, score: u64) -> OfferView {
        let mut view = OfferView::from_offer(active_offer(id, 1));
        view.promotion_score = score;
        view
    }

    #[test]
    fn test_score_grows_with_likes() {
        let settings = EngineSettings::default();
        let mut previous = promotion_score(0, false, &settings);
        for likes in 1..50 {
            let score = promotion_score(likes, false, &settings);
            assert!(score > previous);
            previous = score;
        }
    }

    #[test]
    fn test_promotion_bonus() {
        let settings = EngineSettings::default();
        assert_eq!(promotion_score(3, false, &settings), 3);
        assert_eq!(promotion_score(3, true, &settings), 1003);
        assert_eq!(promotion_score(-5, false, &settings), 0);
    }

    #[test]
    fn test_custom_weights() {
        let settings = EngineSettings {
            like_weight: 10,
            promotion_weight: 7,
            ..EngineSettings::default()
        };
        assert_eq!(promotion_score(2, true, &settings), 27);
    }

    #[test]
    fn test_rank_orders_by_score_then_id() {
        let mut views = vec![view(1, 5), view(2, 50), view(3, 5), view(4, 0)];
        rank(&mut views);

        let ids: Vec<i64> = views.iter().map(|v| v.id.into_inner()).collect();
        assert_eq!(ids, vec![2, 3, 1, 4]);
    }
}
