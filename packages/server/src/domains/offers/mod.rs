pub mod activities;
pub mod data;
pub mod errors;
pub mod models;

pub use data::{OfferView, ToggleResult, Viewer};
pub use errors::{OfferError, OfferResult};
pub use models::{Offer, OfferFilter, OfferStatus};
