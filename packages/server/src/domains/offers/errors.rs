use thiserror::Error;

use crate::common::AuthError;

/// Failures surfaced by offer operations
///
/// Nothing here is retried internally; `Transient` tells the caller a retry
/// at the transport layer may succeed.
#[derive(Error, Debug)]
pub enum OfferError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No access: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Upstream service failed: {0}")]
    Upstream(String),

    #[error("Temporary failure: {0}")]
    Transient(#[from] anyhow::Error),
}

impl From<AuthError> for OfferError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationRequired => OfferError::Forbidden(err.to_string()),
            AuthError::NoAccess(reason) => OfferError::Forbidden(reason),
        }
    }
}

pub type OfferResult<T> = std::result::Result<T, OfferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_transient() {
        fn store_call() -> anyhow::Result<()> {
            Err(anyhow::anyhow!("connection reset"))
        }

        fn engine_call() -> OfferResult<()> {
            store_call()?;
            Ok(())
        }

        assert!(matches!(engine_call(), Err(OfferError::Transient(_))));
    }

    #[test]
    fn test_auth_errors_are_forbidden() {
        let err: OfferError = AuthError::NoAccess("not yours".to_string()).into();
        assert!(matches!(err, OfferError::Forbidden(ref m) if m == "not yours"));
    }
}
