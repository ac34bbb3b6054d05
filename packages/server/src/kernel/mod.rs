//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod file_storage;
pub mod geocoder;
pub mod offer_store;
pub mod payment_client;
pub mod profile_client;
pub mod test_dependencies;
pub mod traits;
pub mod view_cache;

pub use deps::ServerDeps;
pub use file_storage::LocalFileStorage;
pub use geocoder::NominatimGeocoder;
pub use offer_store::PgOfferStore;
pub use payment_client::HttpPaymentService;
pub use profile_client::HttpProfileService;
pub use test_dependencies::TestDependencies;
pub use traits::*;
pub use view_cache::RedisViewCache;
