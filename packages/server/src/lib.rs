// Real-estate offers - API Core
//
// Listing aggregation and ranking engine behind the classifieds backend:
// composite offer views, filtered and ranked lists, view dedup, price
// history, likes/favorites and paid promotions.
//
// Business logic lives in domains/*/activities, infrastructure in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
