//! Sparse offer filter and the query plan it folds into.
//!
//! A filter is a bag of optional predicates. `OfferFilter::plan` turns the
//! ones that are set into a flat list of `OfferPredicate`s and appends the
//! status predicate, which callers cannot override. The same plan drives
//! both the SQL builder and the in-memory matcher used by tests.

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use super::{Offer, OfferStatus};
use crate::common::utils::escape_html;
use crate::common::{ComplexId, MetroStationId, UserId};

/// Query-string filter for offer searches
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OfferFilter {
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub min_floor: Option<i32>,
    pub max_floor: Option<i32>,
    pub min_rooms: Option<i32>,
    pub max_rooms: Option<i32>,
    pub address: Option<String>,
    pub offer_type_id: Option<i64>,
    pub purchase_type_id: Option<i64>,
    pub rent_type_id: Option<i64>,
    pub renovation_id: Option<i64>,
    pub house_type_id: Option<i64>,
    pub metro_station_id: Option<MetroStationId>,
    pub complex_id: Option<ComplexId>,
    pub seller_id: Option<UserId>,
    /// `true`: only offers inside a housing complex; `false`: only outside
    pub new_building: Option<bool>,
    /// Restrict to the viewer's own offers (ignored for anonymous viewers)
    pub only_mine: bool,
}

/// Dictionary-backed columns filtered by equality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryColumn {
    OfferType,
    PurchaseType,
    RentType,
    Renovation,
    HouseType,
}

impl CategoryColumn {
    pub fn column(&self) -> &'static str {
        match self {
            CategoryColumn::OfferType => "offer_type_id",
            CategoryColumn::PurchaseType => "purchase_type_id",
            CategoryColumn::RentType => "rent_type_id",
            CategoryColumn::Renovation => "renovation_id",
            CategoryColumn::HouseType => "house_type_id",
        }
    }

    fn value_of(&self, offer: &Offer) -> i64 {
        match self {
            CategoryColumn::OfferType => offer.offer_type_id,
            CategoryColumn::PurchaseType => offer.purchase_type_id,
            CategoryColumn::RentType => offer.rent_type_id,
            CategoryColumn::Renovation => offer.renovation_id,
            CategoryColumn::HouseType => offer.house_type_id,
        }
    }
}

/// One parameterized condition
#[derive(Debug, Clone, PartialEq)]
pub enum OfferPredicate {
    PriceAtLeast(i64),
    PriceAtMost(i64),
    AreaAtLeast(f64),
    AreaAtMost(f64),
    FloorAtLeast(i32),
    FloorAtMost(i32),
    RoomsAtLeast(i32),
    RoomsAtMost(i32),
    AddressContains(String),
    Category(CategoryColumn, i64),
    MetroStation(MetroStationId),
    Complex(ComplexId),
    Seller(UserId),
    NewBuilding(bool),
    Status(OfferStatus),
}

impl OfferPredicate {
    /// Append this condition with bound parameters; never interpolates values
    fn push_sql(&self, query: &mut QueryBuilder<'_, Postgres>) {
        match self {
            OfferPredicate::PriceAtLeast(v) => query.push("price >= ").push_bind(*v),
            OfferPredicate::PriceAtMost(v) => query.push("price <= ").push_bind(*v),
            OfferPredicate::AreaAtLeast(v) => query.push("area >= ").push_bind(*v),
            OfferPredicate::AreaAtMost(v) => query.push("area <= ").push_bind(*v),
            OfferPredicate::FloorAtLeast(v) => query.push("floor >= ").push_bind(*v),
            OfferPredicate::FloorAtMost(v) => query.push("floor <= ").push_bind(*v),
            OfferPredicate::RoomsAtLeast(v) => query.push("rooms >= ").push_bind(*v),
            OfferPredicate::RoomsAtMost(v) => query.push("rooms <= ").push_bind(*v),
            OfferPredicate::AddressContains(needle) => query
                .push("address ILIKE ")
                .push_bind(format!("%{}%", escape_like(needle)))
                .push(" ESCAPE '\\'"),
            OfferPredicate::Category(column, v) => query
                .push(column.column())
                .push(" = ")
                .push_bind(*v),
            OfferPredicate::MetroStation(id) => query.push("metro_station_id = ").push_bind(*id),
            OfferPredicate::Complex(id) => query.push("complex_id = ").push_bind(*id),
            OfferPredicate::Seller(id) => query.push("seller_id = ").push_bind(*id),
            OfferPredicate::NewBuilding(true) => query.push("complex_id IS NOT NULL"),
            OfferPredicate::NewBuilding(false) => query.push("complex_id IS NULL"),
            OfferPredicate::Status(status) => query.push("status = ").push_bind(status.to_string()),
        };
    }

    pub fn matches(&self, offer: &Offer) -> bool {
        match self {
            OfferPredicate::PriceAtLeast(v) => offer.price >= *v,
            OfferPredicate::PriceAtMost(v) => offer.price <= *v,
            OfferPredicate::AreaAtLeast(v) => offer.area >= *v,
            OfferPredicate::AreaAtMost(v) => offer.area <= *v,
            OfferPredicate::FloorAtLeast(v) => offer.floor >= *v,
            OfferPredicate::FloorAtMost(v) => offer.floor <= *v,
            OfferPredicate::RoomsAtLeast(v) => offer.rooms >= *v,
            OfferPredicate::RoomsAtMost(v) => offer.rooms <= *v,
            OfferPredicate::AddressContains(needle) => offer
                .address
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            OfferPredicate::Category(column, v) => column.value_of(offer) == *v,
            OfferPredicate::MetroStation(id) => offer.metro_station_id == Some(*id),
            OfferPredicate::Complex(id) => offer.complex_id == Some(*id),
            OfferPredicate::Seller(id) => offer.seller_id == *id,
            OfferPredicate::NewBuilding(flag) => offer.complex_id.is_some() == *flag,
            OfferPredicate::Status(status) => offer.status() == *status,
        }
    }
}

/// Conjunction of predicates, ending with the implicit status condition
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    predicates: Vec<OfferPredicate>,
}

impl QueryPlan {
    /// The plan for "no filter": active offers only
    pub fn active_only() -> Self {
        Self {
            predicates: vec![OfferPredicate::Status(OfferStatus::Active)],
        }
    }

    pub fn predicates(&self) -> &[OfferPredicate] {
        &self.predicates
    }

    pub fn push_where(&self, query: &mut QueryBuilder<'_, Postgres>) {
        query.push(" WHERE ");
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                query.push(" AND ");
            }
            predicate.push_sql(query);
        }
    }

    pub fn matches(&self, offer: &Offer) -> bool {
        self.predicates.iter().all(|p| p.matches(offer))
    }
}

impl OfferFilter {
    /// Whether any user-facing predicate is set for this viewer
    pub fn has_any(&self, viewer: Option<UserId>) -> bool {
        !self.user_predicates(viewer).is_empty()
    }

    /// Fold the set predicates into a plan; status is always appended last
    pub fn plan(&self, viewer: Option<UserId>) -> QueryPlan {
        let mut predicates = self.user_predicates(viewer);
        predicates.push(OfferPredicate::Status(OfferStatus::Active));
        QueryPlan { predicates }
    }

    fn user_predicates(&self, viewer: Option<UserId>) -> Vec<OfferPredicate> {
        use OfferPredicate::*;

        // "only mine" wins over an explicit seller when we know who is asking
        let seller = match (self.only_mine, viewer) {
            (true, Some(me)) => Some(me),
            _ => self.seller_id,
        };

        // Stored addresses are HTML-escaped, so compare in the same encoding
        let address = self
            .address
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(escape_html);

        let categories = [
            (CategoryColumn::OfferType, self.offer_type_id),
            (CategoryColumn::PurchaseType, self.purchase_type_id),
            (CategoryColumn::RentType, self.rent_type_id),
            (CategoryColumn::Renovation, self.renovation_id),
            (CategoryColumn::HouseType, self.house_type_id),
        ];

        let candidates = [
            self.min_price.map(PriceAtLeast),
            self.max_price.map(PriceAtMost),
            self.min_area.map(AreaAtLeast),
            self.max_area.map(AreaAtMost),
            self.min_floor.map(FloorAtLeast),
            self.max_floor.map(FloorAtMost),
            self.min_rooms.map(RoomsAtLeast),
            self.max_rooms.map(RoomsAtMost),
            address.map(AddressContains),
            self.metro_station_id.map(MetroStation),
            self.complex_id.map(Complex),
            seller.map(Seller),
            self.new_building.map(NewBuilding),
        ];

        candidates
            .into_iter()
            .flatten()
            .chain(
                categories
                    .into_iter()
                    .filter_map(|(column, value)| value.map(|v| Category(column, v))),
            )
            .collect()
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::offers::models::offer::fixtures::active_offer;

    #[test]
    fn test_empty_filter_has_no_predicates() {
        let filter = OfferFilter::default();
        assert!(!filter.has_any(None));
        assert!(!filter.has_any(Some(UserId::new(1))));
        assert_eq!(filter.plan(None), QueryPlan::active_only());
    }

    #[test]
    fn test_only_mine_without_viewer_is_ignored() {
        let filter = OfferFilter {
            only_mine: true,
            ..Default::default()
        };
        assert!(!filter.has_any(None));
        assert!(filter.has_any(Some(UserId::new(4))));
    }

    #[test]
    fn test_only_mine_overrides_seller() {
        let filter = OfferFilter {
            only_mine: true,
            seller_id: Some(UserId::new(99)),
            ..Default::default()
        };

        let plan = filter.plan(Some(UserId::new(4)));
        assert!(plan.predicates().contains(&OfferPredicate::Seller(UserId::new(4))));
        assert!(!plan.predicates().contains(&OfferPredicate::Seller(UserId::new(99))));

        // anonymous: the explicit seller stays
        let plan = filter.plan(None);
        assert!(plan.predicates().contains(&OfferPredicate::Seller(UserId::new(99))));
    }

    #[test]
    fn test_status_is_always_last() {
        let filter = OfferFilter {
            min_price: Some(1),
            renovation_id: Some(2),
            ..Default::default()
        };
        let plan = filter.plan(None);
        assert_eq!(
            plan.predicates().last(),
            Some(&OfferPredicate::Status(OfferStatus::Active))
        );
        assert_eq!(plan.predicates().len(), 3);
    }

    #[test]
    fn test_blank_address_is_not_a_predicate() {
        let filter = OfferFilter {
            address: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!filter.has_any(None));
    }

    #[test]
    fn test_plan_matches_offer() {
        let mut offer = active_offer(1, 7);

        let filter = OfferFilter {
            min_rooms: Some(2),
            max_price: Some(20_000_000),
            address: Some("tverskaya".to_string()),
            new_building: Some(false),
            ..Default::default()
        };
        assert!(filter.plan(None).matches(&offer));

        offer.complex_id = Some(ComplexId::new(3));
        assert!(!filter.plan(None).matches(&offer));

        offer.complex_id = None;
        offer.status = OfferStatus::Draft.to_string();
        assert!(!filter.plan(None).matches(&offer));
    }

    #[test]
    fn test_address_matches_escaped_storage() {
        let mut offer = active_offer(1, 7);
        offer.address = "O&#39;Connell Street 5".to_string();

        let filter = OfferFilter {
            address: Some(" o'connell ".to_string()),
            ..Default::default()
        };
        let plan = filter.plan(None);
        assert!(plan
            .predicates()
            .contains(&OfferPredicate::AddressContains("o&#39;connell".to_string())));
        assert!(plan.matches(&offer));

        let filter = OfferFilter {
            address: Some("O&Connell".to_string()),
            ..Default::default()
        };
        assert!(!filter.plan(None).matches(&offer));
    }

    #[test]
    fn test_sql_is_parameterized() {
        let filter = OfferFilter {
            address: Some("'; DROP TABLE offers; --".to_string()),
            house_type_id: Some(3),
            new_building: Some(true),
            ..Default::default()
        };

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM offers");
        filter.plan(None).push_where(&mut query);
        let sql = query.sql();

        assert!(!sql.contains("DROP TABLE"));
        assert!(sql.contains("address ILIKE $1"));
        assert!(sql.contains("complex_id IS NOT NULL"));
        assert!(sql.contains("house_type_id = $2"));
        assert!(sql.ends_with("status = $3"));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
