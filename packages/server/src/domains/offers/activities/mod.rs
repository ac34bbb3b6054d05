//! Offer activities - entry-point business logic
//!
//! Called from the HTTP routes. Activities take typed ids and inputs,
//! run the ownership guard, and return views or models.

pub mod access;
pub mod aggregation;
pub mod engagement;
pub mod mutations;
pub mod promotion;
pub mod queries;
pub mod ranking;
pub mod views;

pub use aggregation::{build_offer_view, build_offer_views};
pub use engagement::{toggle_favorite, toggle_like};
pub use mutations::{
    add_offer_image, create_offer, delete_offer, delete_offer_image, publish_offer, update_offer,
};
pub use promotion::{confirm_promotion, purchase_promotion};
pub use queries::{favorite_offers, get_offer, get_offers, liked_offers};
pub use ranking::{promotion_score, rank};
pub use views::record_view;
