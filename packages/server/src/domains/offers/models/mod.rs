pub mod catalog;
pub mod engagement;
pub mod filter;
pub mod offer;
pub mod offer_image;
pub mod price_history;

pub use catalog::{HousingComplex, MetroStation};
pub use engagement::{Engagement, EngagementKind};
pub use filter::{CategoryColumn, OfferFilter, OfferPredicate, QueryPlan};
pub use offer::{CreateOffer, Offer, OfferStatus, UpdateOffer};
pub use offer_image::OfferImage;
pub use price_history::PriceHistoryEntry;
