/// Owner-only actions on a resource.
///
/// Every mutating offer operation names one of these when it runs the
/// ownership guard, so a rejection can say what was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerCapability {
    /// Change offer fields
    EditOffer,

    /// Remove the offer and its price history
    DeleteOffer,

    /// Move a draft to active
    PublishOffer,

    /// Attach or remove images
    ManageImages,

    /// Buy or confirm a promotion
    PromoteOffer,

    /// See owner-only fields (view counter, promotion window)
    ViewPrivateStats,
}

impl std::fmt::Display for OwnerCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerCapability::EditOffer => write!(f, "edit offer"),
            OwnerCapability::DeleteOffer => write!(f, "delete offer"),
            OwnerCapability::PublishOffer => write!(f, "publish offer"),
            OwnerCapability::ManageImages => write!(f, "manage images"),
            OwnerCapability::PromoteOffer => write!(f, "promote offer"),
            OwnerCapability::ViewPrivateStats => write!(f, "view private stats"),
        }
    }
}
