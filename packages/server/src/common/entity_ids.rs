//! Typed ID definitions for all domain entities.
//!
//! # Example
//!
//! ```rust
//! use estate_core::common::{OfferId, UserId};
//!
//! let seller: UserId = UserId::new(1);
//! let offer: OfferId = OfferId::new(1);
//!
//! // This would be a compile error:
//! // let wrong: OfferId = seller;
//! # let _ = (seller, offer);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for users (sellers, buyers, anonymous visitors never get one).
pub struct User;

/// Marker type for property offers.
pub struct Offer;

/// Marker type for images attached to an offer.
pub struct OfferImage;

/// Marker type for housing complexes (new buildings).
pub struct HousingComplex;

/// Marker type for metro stations.
pub struct MetroStation;

/// Marker type for promotion payments held by the payment service.
pub struct Payment;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type UserId = Id<User>;

pub type OfferId = Id<Offer>;

pub type ImageId = Id<OfferImage>;

pub type ComplexId = Id<HousingComplex>;

pub type MetroStationId = Id<MetroStation>;

pub type PaymentId = Id<Payment>;
