//! Typed numeric id wrappers for compile-time type safety.
//!
//! `Id<T>` wraps the `BIGSERIAL` primary key of a table and prevents
//! accidentally mixing up ids of different entities (e.g. passing a
//! `UserId` where an `OfferId` was expected).
//!
//! # Example
//!
//! ```rust
//! use estate_core::common::id::Id;
//!
//! pub struct User;
//! pub struct Offer;
//!
//! pub type UserId = Id<User>;
//! pub type OfferId = Id<Offer>;
//!
//! let user_id = UserId::new(7);
//! let offer_id = OfferId::new(7);
//!
//! // This would be a compile error:
//! // let wrong: OfferId = user_id;
//! # let _ = (user_id, offer_id);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::num::ParseIntError;
use std::str::FromStr;

/// A typed wrapper around an `i64` row id.
///
/// IDs with different `T` parameters are incompatible at compile time:
///
/// ```compile_fail
/// use estate_core::common::id::Id;
///
/// struct User;
/// struct Offer;
///
/// let user_id: Id<User> = Id::new(1);
/// let offer_id: Id<Offer> = user_id; // Compile error!
/// ```
#[repr(transparent)]
pub struct Id<T>(i64, PhantomData<fn() -> T>);

// ============================================================================
// Core implementations
// ============================================================================

impl<T> Id<T> {
    /// Wraps a raw row id.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value, PhantomData)
    }

    /// Returns the raw row id.
    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Parses an `Id` from a path segment or query value.
    #[inline]
    pub fn parse(s: &str) -> Result<Self, ParseIntError> {
        s.trim().parse::<i64>().map(Self::new)
    }
}

// ============================================================================
// Standard trait implementations
// ============================================================================

impl<T> Clone for Id<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(&format!("Id<{}>", std::any::type_name::<T>()))
            .field(&self.0)
            .finish()
    }
}

impl<T> Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for Id<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Hash for Id<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> From<i64> for Id<T> {
    #[inline]
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<T> From<Id<T>> for i64 {
    #[inline]
    fn from(id: Id<T>) -> Self {
        id.0
    }
}

impl<T> FromStr for Id<T> {
    type Err = ParseIntError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Serde support
// ============================================================================

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::new)
    }
}

// ============================================================================
// sqlx support (always enabled)
// ============================================================================

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgHasArrayType, PgTypeInfo, PgValueRef, Postgres};
use sqlx::{Decode, Encode, Type};

impl<T> Type<Postgres> for Id<T> {
    fn type_info() -> PgTypeInfo {
        <i64 as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <i64 as Type<Postgres>>::compatible(ty)
    }
}

impl<T> PgHasArrayType for Id<T> {
    fn array_type_info() -> PgTypeInfo {
        <i64 as PgHasArrayType>::array_type_info()
    }
}

impl<T> Encode<'_, Postgres> for Id<T> {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <i64 as Encode<Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<T> Decode<'_, Postgres> for Id<T> {
    fn decode(value: PgValueRef<'_>) -> Result<Self, BoxDynError> {
        <i64 as Decode<Postgres>>::decode(value).map(Self::new)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct User;

    type UserId = Id<User>;

    #[test]
    fn test_parse_and_display() {
        let id = UserId::parse(" 42 ").unwrap();
        assert_eq!(id.into_inner(), 42);
        assert_eq!(id.to_string(), "42");
        assert!(UserId::parse("forty-two").is_err());
    }

    #[test]
    fn test_serde_is_plain_number() {
        let id = UserId::new(17);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "17");
        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_hash_map_key() {
        use std::collections::HashMap;
        let mut map: HashMap<UserId, &str> = HashMap::new();
        let id = UserId::new(3);
        map.insert(id, "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }

    #[test]
    fn test_debug_includes_type_name() {
        let id = UserId::new(1);
        let debug = format!("{:?}", id);
        assert!(debug.contains("User"));
    }
}
