/// Authorization module
///
/// Provides a fluent ownership guard used by every mutating offer operation:
///
/// ```rust,ignore
/// use crate::common::auth::{Actor, OwnerCapability};
///
/// Actor::new(user_id)
///     .can(OwnerCapability::EditOffer)
///     .on(&offer)
///     .check()?;
/// ```
///
/// The guard runs before any side effect; it never touches storage itself,
/// the caller fetches the resource first.

mod builder;
mod capability;
mod errors;

pub use builder::{Actor, CapabilityBuilder, Owned};
pub use capability::OwnerCapability;
pub use errors::AuthError;
