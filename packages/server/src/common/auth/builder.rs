use super::{AuthError, OwnerCapability};
use crate::common::entity_ids::UserId;

/// A resource that belongs to exactly one user.
pub trait Owned {
    fn owner_id(&self) -> UserId;

    /// Short label used in rejection messages, e.g. `offer 12`.
    fn resource_label(&self) -> String;
}

/// Entry point for authorization checks
///
/// Usage:
/// ```rust,ignore
/// Actor::new(user_id)
///     .can(OwnerCapability::DeleteOffer)
///     .on(&offer)
///     .check()?;
/// ```
pub struct Actor {
    actor_id: UserId,
}

impl Actor {
    pub fn new(actor_id: UserId) -> Self {
        Self { actor_id }
    }

    /// Specify what the actor wants to do
    pub fn can(self, capability: OwnerCapability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor_id: self.actor_id,
            capability,
        }
    }

    /// Non-failing ownership test, for read paths that hide fields instead of rejecting.
    pub fn owns<R: Owned + ?Sized>(&self, resource: &R) -> bool {
        resource.owner_id() == self.actor_id
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor_id: UserId,
    capability: OwnerCapability,
}

impl CapabilityBuilder {
    /// Bind the resource the capability is checked against
    pub fn on<'r, R: Owned + ?Sized>(self, resource: &'r R) -> OwnershipCheck<'r, R> {
        OwnershipCheck {
            actor_id: self.actor_id,
            capability: self.capability,
            resource,
        }
    }
}

pub struct OwnershipCheck<'r, R: Owned + ?Sized> {
    actor_id: UserId,
    capability: OwnerCapability,
    resource: &'r R,
}

impl<R: Owned + ?Sized> OwnershipCheck<'_, R> {
    /// Fails closed unless the actor owns the resource
    pub fn check(self) -> Result<(), AuthError> {
        if self.resource.owner_id() == self.actor_id {
            return Ok(());
        }

        tracing::warn!(
            actor_id = %self.actor_id,
            capability = %self.capability,
            resource = %self.resource.resource_label(),
            "Ownership check failed"
        );

        Err(AuthError::NoAccess(format!(
            "user {} cannot {} on {}",
            self.actor_id,
            self.capability,
            self.resource.resource_label()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Parcel {
        owner: UserId,
    }

    impl Owned for Parcel {
        fn owner_id(&self) -> UserId {
            self.owner
        }

        fn resource_label(&self) -> String {
            "parcel".to_string()
        }
    }

    #[test]
    fn test_owner_passes() {
        let parcel = Parcel {
            owner: UserId::new(5),
        };

        let result = Actor::new(UserId::new(5))
            .can(OwnerCapability::EditOffer)
            .on(&parcel)
            .check();

        assert!(result.is_ok());
    }

    #[test]
    fn test_stranger_rejected() {
        let parcel = Parcel {
            owner: UserId::new(5),
        };

        let result = Actor::new(UserId::new(6))
            .can(OwnerCapability::DeleteOffer)
            .on(&parcel)
            .check();

        match result {
            Err(AuthError::NoAccess(message)) => {
                assert!(message.contains("delete offer"));
                assert!(message.contains("parcel"));
            }
            other => panic!("expected NoAccess, got {:?}", other),
        }
    }

    #[test]
    fn test_owns_is_non_failing() {
        let parcel = Parcel {
            owner: UserId::new(1),
        };
        assert!(Actor::new(UserId::new(1)).owns(&parcel));
        assert!(!Actor::new(UserId::new(2)).owns(&parcel));
    }
}
