// TestDependencies - in-memory implementations for testing
//
// Provides doubles for every infrastructure trait so activities can be
// exercised without Postgres, Redis or sibling services.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    BaseFileStorage, BaseGeocoder, BaseOfferStore, BasePaymentService, BaseProfileService,
    BaseViewCache, CreatedPayment, NewPayment, Payment, SellerProfile, ServerDeps,
};
use crate::common::utils::GeocodedLocation;
use crate::common::{ComplexId, ImageId, MetroStationId, OfferId, PaymentId, UserId};
use crate::config::EngineSettings;
use crate::domains::offers::models::{
    CreateOffer, EngagementKind, HousingComplex, MetroStation, Offer, OfferImage, OfferStatus,
    PriceHistoryEntry, QueryPlan, UpdateOffer,
};

/// Poisoning only happens after a panic in another test thread; keep going.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// In-memory Offer Store
// =============================================================================

#[derive(Default)]
struct StoreState {
    next_offer_id: i64,
    next_row_id: i64,
    offers: BTreeMap<OfferId, Offer>,
    prices: Vec<PriceHistoryEntry>,
    images: Vec<OfferImage>,
    /// Insertion order doubles as engagement time
    engagements: Vec<(EngagementKind, UserId, OfferId)>,
    metro_stations: HashMap<MetroStationId, MetroStation>,
    complexes: HashMap<ComplexId, HousingComplex>,
}

impl StoreState {
    fn next_row_id(&mut self) -> i64 {
        self.next_row_id += 1;
        self.next_row_id
    }

    fn newest_first(&self, keep: impl Fn(&Offer) -> bool) -> Vec<Offer> {
        self.offers.values().rev().filter(|o| keep(o)).cloned().collect()
    }
}

/// Offer store backed by plain collections; honours the same uniqueness
/// and ordering rules as the Postgres schema.
#[derive(Default)]
pub struct InMemoryOfferStore {
    state: Mutex<StoreState>,
    stale_engagement_reads: bool,
    failing_history_delete: bool,
}

impl InMemoryOfferStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metro_station(self, station: MetroStation) -> Self {
        lock(&self.state).metro_stations.insert(station.id, station);
        self
    }

    /// `has_engagement` always answers `false`, as when two requests both
    /// read before either writes
    pub fn with_stale_engagement_reads(mut self) -> Self {
        self.stale_engagement_reads = true;
        self
    }

    /// `delete_price_history` errors; every other call behaves normally
    pub fn with_failing_history_delete(mut self) -> Self {
        self.failing_history_delete = true;
        self
    }

    pub fn with_housing_complex(self, complex: HousingComplex) -> Self {
        lock(&self.state).complexes.insert(complex.id, complex);
        self
    }

    /// Insert a fully formed offer, bypassing the activities
    pub fn seed_offer(&self, offer: Offer) {
        let mut state = lock(&self.state);
        state.next_offer_id = state.next_offer_id.max(offer.id.into_inner());
        state.offers.insert(offer.id, offer);
    }

    /// Full price series, oldest first
    pub fn price_series(&self, id: OfferId) -> Vec<i64> {
        lock(&self.state)
            .prices
            .iter()
            .filter(|p| p.offer_id == id)
            .map(|p| p.price)
            .collect()
    }

    pub fn engagement_rows(&self, kind: EngagementKind, offer_id: OfferId) -> usize {
        lock(&self.state)
            .engagements
            .iter()
            .filter(|(k, _, o)| *k == kind && *o == offer_id)
            .count()
    }

    pub fn stored_offer(&self, id: OfferId) -> Option<Offer> {
        lock(&self.state).offers.get(&id).cloned()
    }
}

#[async_trait]
impl BaseOfferStore for InMemoryOfferStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_offer(&self, id: OfferId) -> Result<Option<Offer>> {
        Ok(self.stored_offer(id))
    }

    async fn list_active_offers(&self) -> Result<Vec<Offer>> {
        Ok(lock(&self.state).newest_first(|o| o.status() == OfferStatus::Active))
    }

    async fn search_offers(&self, plan: &QueryPlan) -> Result<Vec<Offer>> {
        Ok(lock(&self.state).newest_first(|o| plan.matches(o)))
    }

    async fn engaged_offers(&self, kind: EngagementKind, user_id: UserId) -> Result<Vec<Offer>> {
        let state = lock(&self.state);
        Ok(state
            .engagements
            .iter()
            .rev()
            .filter(|(k, u, _)| *k == kind && *u == user_id)
            .filter_map(|(_, _, offer_id)| state.offers.get(offer_id))
            .filter(|o| o.status() == OfferStatus::Active)
            .cloned()
            .collect())
    }

    async fn insert_offer(&self, input: CreateOffer) -> Result<Offer> {
        let mut state = lock(&self.state);
        state.next_offer_id += 1;
        let now = Utc::now();

        let offer = Offer {
            id: OfferId::new(state.next_offer_id),
            seller_id: input.seller_id,
            offer_type_id: input.offer_type_id,
            purchase_type_id: input.purchase_type_id,
            rent_type_id: input.rent_type_id,
            renovation_id: input.renovation_id,
            house_type_id: input.house_type_id,
            status: input.status.to_string(),
            complex_id: input.complex_id,
            metro_station_id: input.metro_station_id,
            price: input.price,
            area: input.area,
            floor: input.floor,
            rooms: input.rooms,
            ceiling_height: input.ceiling_height,
            address: input.address,
            description: input.description,
            latitude: input.latitude,
            longitude: input.longitude,
            views_count: 0,
            promoted_until: None,
            created_at: now,
            updated_at: now,
        };

        state.offers.insert(offer.id, offer.clone());
        Ok(offer)
    }

    async fn update_offer(&self, id: OfferId, input: UpdateOffer) -> Result<Offer> {
        let mut state = lock(&self.state);
        let offer = state
            .offers
            .get_mut(&id)
            .ok_or_else(|| anyhow!("no rows returned"))?;
        offer.apply(&input);
        offer.updated_at = Utc::now();
        Ok(offer.clone())
    }

    async fn set_status(&self, id: OfferId, status: OfferStatus) -> Result<()> {
        if let Some(offer) = lock(&self.state).offers.get_mut(&id) {
            offer.status = status.to_string();
        }
        Ok(())
    }

    async fn set_promoted_until(&self, id: OfferId, until: DateTime<Utc>) -> Result<()> {
        if let Some(offer) = lock(&self.state).offers.get_mut(&id) {
            offer.promoted_until = Some(until);
        }
        Ok(())
    }

    async fn increment_views(&self, id: OfferId) -> Result<i64> {
        let mut state = lock(&self.state);
        let offer = state
            .offers
            .get_mut(&id)
            .ok_or_else(|| anyhow!("no rows returned"))?;
        offer.views_count += 1;
        Ok(offer.views_count)
    }

    async fn delete_offer(&self, id: OfferId) -> Result<bool> {
        let mut state = lock(&self.state);
        let removed = state.offers.remove(&id).is_some();
        // mirrors ON DELETE CASCADE
        state.images.retain(|i| i.offer_id != id);
        state.engagements.retain(|(_, _, o)| *o != id);
        Ok(removed)
    }

    async fn append_price(&self, id: OfferId, price: i64) -> Result<()> {
        let mut state = lock(&self.state);
        let row_id = state.next_row_id();
        state.prices.push(PriceHistoryEntry {
            id: row_id,
            offer_id: id,
            price,
            recorded_at: Utc::now(),
        });
        Ok(())
    }

    async fn restart_price_history(&self, id: OfferId, price: i64) -> Result<()> {
        let mut state = lock(&self.state);
        state.prices.retain(|p| p.offer_id != id);
        if price > 0 {
            let row_id = state.next_row_id();
            state.prices.push(PriceHistoryEntry {
                id: row_id,
                offer_id: id,
                price,
                recorded_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn recent_prices(&self, id: OfferId, limit: i64) -> Result<Vec<PriceHistoryEntry>> {
        let state = lock(&self.state);
        Ok(state
            .prices
            .iter()
            .rev()
            .filter(|p| p.offer_id == id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn delete_price_history(&self, id: OfferId) -> Result<u64> {
        if self.failing_history_delete {
            return Err(anyhow!("price history delete failed"));
        }
        let mut state = lock(&self.state);
        let before = state.prices.len();
        state.prices.retain(|p| p.offer_id != id);
        Ok((before - state.prices.len()) as u64)
    }

    async fn offer_images(&self, id: OfferId) -> Result<Vec<OfferImage>> {
        Ok(lock(&self.state)
            .images
            .iter()
            .filter(|i| i.offer_id == id)
            .cloned()
            .collect())
    }

    async fn add_image(&self, id: OfferId, image_key: &str) -> Result<OfferImage> {
        let mut state = lock(&self.state);
        let row_id = state.next_row_id();
        let image = OfferImage {
            id: ImageId::new(row_id),
            offer_id: id,
            image_key: image_key.to_string(),
            created_at: Utc::now(),
        };
        state.images.push(image.clone());
        Ok(image)
    }

    async fn find_image(&self, image_id: ImageId) -> Result<Option<OfferImage>> {
        Ok(lock(&self.state)
            .images
            .iter()
            .find(|i| i.id == image_id)
            .cloned())
    }

    async fn delete_image(&self, image_id: ImageId) -> Result<bool> {
        let mut state = lock(&self.state);
        let before = state.images.len();
        state.images.retain(|i| i.id != image_id);
        Ok(state.images.len() < before)
    }

    async fn has_engagement(
        &self,
        kind: EngagementKind,
        user_id: UserId,
        offer_id: OfferId,
    ) -> Result<bool> {
        if self.stale_engagement_reads {
            return Ok(false);
        }
        Ok(lock(&self.state)
            .engagements
            .contains(&(kind, user_id, offer_id)))
    }

    async fn add_engagement(
        &self,
        kind: EngagementKind,
        user_id: UserId,
        offer_id: OfferId,
    ) -> Result<bool> {
        let mut state = lock(&self.state);
        let row = (kind, user_id, offer_id);
        if state.engagements.contains(&row) {
            return Ok(false);
        }
        state.engagements.push(row);
        Ok(true)
    }

    async fn remove_engagement(
        &self,
        kind: EngagementKind,
        user_id: UserId,
        offer_id: OfferId,
    ) -> Result<bool> {
        let mut state = lock(&self.state);
        let before = state.engagements.len();
        state
            .engagements
            .retain(|row| *row != (kind, user_id, offer_id));
        Ok(state.engagements.len() < before)
    }

    async fn count_engagement(&self, kind: EngagementKind, offer_id: OfferId) -> Result<i64> {
        Ok(self.engagement_rows(kind, offer_id) as i64)
    }

    async fn find_metro_station(&self, id: MetroStationId) -> Result<Option<MetroStation>> {
        Ok(lock(&self.state).metro_stations.get(&id).cloned())
    }

    async fn find_housing_complex(&self, id: ComplexId) -> Result<Option<HousingComplex>> {
        Ok(lock(&self.state).complexes.get(&id).cloned())
    }
}

// =============================================================================
// In-memory View Cache
// =============================================================================

#[derive(Default)]
pub struct InMemoryViewCache {
    entries: Mutex<HashMap<String, Instant>>,
    failing: bool,
}

impl InMemoryViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails, as if the cache were unreachable
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.entries)
            .get(key)
            .is_some_and(|expires| *expires > Instant::now())
    }
}

#[async_trait]
impl BaseViewCache for InMemoryViewCache {
    async fn insert_if_absent(&self, key: &str, ttl: Duration) -> Result<bool> {
        if self.failing {
            return Err(anyhow!("cache unavailable"));
        }

        let now = Instant::now();
        let mut entries = lock(&self.entries);
        match entries.get(key) {
            Some(expires) if *expires > now => Ok(false),
            _ => {
                entries.insert(key.to_string(), now + ttl);
                Ok(true)
            }
        }
    }
}

// =============================================================================
// Mock Geocoder
// =============================================================================

#[derive(Default)]
pub struct MockGeocoder {
    calls: Mutex<Vec<String>>,
    failing: bool,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Addresses that were geocoded, in call order
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl BaseGeocoder for MockGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodedLocation> {
        lock(&self.calls).push(address.to_string());

        if self.failing {
            return Err(anyhow!("Address not found: {}", address));
        }

        // Deterministic but address-dependent coordinates
        let spread = (address.len() % 100) as f64 / 1000.0;
        Ok(GeocodedLocation {
            latitude: 55.75 + spread,
            longitude: 37.61 + spread,
            display_name: address.to_string(),
        })
    }
}

// =============================================================================
// Mock Profile Service
// =============================================================================

#[derive(Default)]
pub struct MockProfileService {
    profiles: Mutex<HashMap<UserId, SellerProfile>>,
    failing: bool,
}

impl MockProfileService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_profile(self, profile: SellerProfile) -> Self {
        lock(&self.profiles).insert(profile.id, profile);
        self
    }
}

#[async_trait]
impl BaseProfileService for MockProfileService {
    async fn get_profile(&self, user_id: UserId) -> Result<SellerProfile> {
        if self.failing {
            return Err(anyhow!("profile service unavailable"));
        }

        Ok(lock(&self.profiles)
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| SellerProfile {
                id: user_id,
                name: format!("User {}", user_id),
                avatar_url: None,
                joined_at: None,
            }))
    }
}

// =============================================================================
// Mock Payment Service
// =============================================================================

struct PaymentRecord {
    payment: Payment,
    paid: bool,
    consumed: bool,
}

#[derive(Default)]
pub struct MockPaymentService {
    payments: Mutex<BTreeMap<PaymentId, PaymentRecord>>,
    failing: bool,
}

impl MockPaymentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Simulate the user completing checkout
    pub fn mark_paid(&self, id: PaymentId) {
        if let Some(record) = lock(&self.payments).get_mut(&id) {
            record.paid = true;
        }
    }

    pub fn created(&self) -> Vec<Payment> {
        lock(&self.payments)
            .values()
            .map(|r| r.payment.clone())
            .collect()
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(anyhow!("payment service unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl BasePaymentService for MockPaymentService {
    async fn create_payment(&self, payment: NewPayment) -> Result<CreatedPayment> {
        self.check()?;

        let mut payments = lock(&self.payments);
        let id = PaymentId::new(payments.len() as i64 + 1);
        payments.insert(
            id,
            PaymentRecord {
                payment: Payment {
                    id,
                    offer_id: payment.offer_id,
                    user_id: payment.user_id,
                    tariff: payment.tariff,
                    amount: payment.amount,
                },
                paid: false,
                consumed: false,
            },
        );

        Ok(CreatedPayment {
            id,
            confirmation_url: format!("https://pay.example/checkout/{}", id),
        })
    }

    async fn find_payment(&self, id: PaymentId) -> Result<Option<Payment>> {
        self.check()?;
        Ok(lock(&self.payments).get(&id).map(|r| r.payment.clone()))
    }

    async fn validate_payment(&self, id: PaymentId) -> Result<bool> {
        self.check()?;

        let mut payments = lock(&self.payments);
        match payments.get_mut(&id) {
            Some(record) if record.paid && !record.consumed => {
                record.consumed = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// =============================================================================
// Mock File Storage
// =============================================================================

#[derive(Default)]
pub struct MockFileStorage {
    deleted: Mutex<Vec<String>>,
    failing: bool,
}

impl MockFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn deleted(&self) -> Vec<String> {
        lock(&self.deleted).clone()
    }
}

#[async_trait]
impl BaseFileStorage for MockFileStorage {
    async fn delete(&self, key: &str) -> Result<()> {
        if self.failing {
            return Err(anyhow!("storage unavailable"));
        }
        lock(&self.deleted).push(key.to_string());
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Container for test doubles; keeps typed handles so tests can inspect them
pub struct TestDependencies {
    pub store: Arc<InMemoryOfferStore>,
    pub view_cache: Arc<InMemoryViewCache>,
    pub geocoder: Arc<MockGeocoder>,
    pub profiles: Arc<MockProfileService>,
    pub payments: Arc<MockPaymentService>,
    pub file_storage: Arc<MockFileStorage>,
    pub settings: EngineSettings,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryOfferStore::new()),
            view_cache: Arc::new(InMemoryViewCache::new()),
            geocoder: Arc::new(MockGeocoder::new()),
            profiles: Arc::new(MockProfileService::new()),
            payments: Arc::new(MockPaymentService::new()),
            file_storage: Arc::new(MockFileStorage::new()),
            settings: EngineSettings::default(),
        }
    }

    pub fn mock_store(mut self, store: InMemoryOfferStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    pub fn mock_view_cache(mut self, cache: InMemoryViewCache) -> Self {
        self.view_cache = Arc::new(cache);
        self
    }

    pub fn mock_geocoder(mut self, geocoder: MockGeocoder) -> Self {
        self.geocoder = Arc::new(geocoder);
        self
    }

    pub fn mock_profiles(mut self, profiles: MockProfileService) -> Self {
        self.profiles = Arc::new(profiles);
        self
    }

    pub fn mock_payments(mut self, payments: MockPaymentService) -> Self {
        self.payments = Arc::new(payments);
        self
    }

    pub fn mock_file_storage(mut self, storage: MockFileStorage) -> Self {
        self.file_storage = Arc::new(storage);
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the ServerDeps the activities take
    pub fn deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.store.clone(),
            self.view_cache.clone(),
            self.geocoder.clone(),
            self.profiles.clone(),
            self.payments.clone(),
            self.file_storage.clone(),
            self.settings.clone(),
        )
    }
}
