use thiserror::Error;

/// Authorization errors raised by the ownership guard
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("No access: {0}")]
    NoAccess(String),
}
