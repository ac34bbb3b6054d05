//! Auth domain - bearer token verification
//!
//! Accounts and sessions are owned by the account service; this server
//! only verifies the tokens it issues.

pub mod jwt;

pub use jwt::{Claims, JwtService};
