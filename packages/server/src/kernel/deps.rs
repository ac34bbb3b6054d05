//! Server dependencies for activities (using traits for testability)
//!
//! This module provides the central dependency container used by the offer
//! activities. All external services sit behind trait objects so tests can
//! swap in the doubles from `test_dependencies`.

use std::sync::Arc;

use crate::config::EngineSettings;
use crate::kernel::{
    BaseFileStorage, BaseGeocoder, BaseOfferStore, BasePaymentService, BaseProfileService,
    BaseViewCache,
};

/// Server dependencies accessible to activities
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseOfferStore>,
    pub view_cache: Arc<dyn BaseViewCache>,
    pub geocoder: Arc<dyn BaseGeocoder>,
    /// Sibling profile service; failures degrade the seller block
    pub profiles: Arc<dyn BaseProfileService>,
    /// Sibling payment service; failures propagate
    pub payments: Arc<dyn BasePaymentService>,
    pub file_storage: Arc<dyn BaseFileStorage>,
    pub settings: EngineSettings,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseOfferStore>,
        view_cache: Arc<dyn BaseViewCache>,
        geocoder: Arc<dyn BaseGeocoder>,
        profiles: Arc<dyn BaseProfileService>,
        payments: Arc<dyn BasePaymentService>,
        file_storage: Arc<dyn BaseFileStorage>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            view_cache,
            geocoder,
            profiles,
            payments,
            file_storage,
            settings,
        }
    }
}
