//! Catalog object identifier new-type.
//!
//! Postgres identifies every catalog object (databases, relations, tablespaces, filenodes) by an
//! unsigned 32-bit `oid`. [`Oid`] wraps that value and integrates with sqlx and serde so it can be
//! read straight from catalog rows and written as a plain JSON integer.

use sqlx::{Database, Postgres, encode::IsNull, error::BoxDynError, postgres::types::Oid as PgOid};

/// The first object id handed out to objects that are not built into the system catalog.
///
/// Ids below this value belong to bootstrap, initdb-created and other system objects.
pub const FIRST_NORMAL_OBJECT_ID: Oid = Oid(16384);

/// Oid of the `pg_default` tablespace.
pub const DEFAULT_TABLESPACE_OID: Oid = Oid(1663);

/// A catalog object identifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Oid(u32);

impl Oid {
    /// The catalog's `InvalidOid`, used by link columns to mean "no object".
    pub const INVALID: Oid = Oid(0);

    /// Wraps a raw oid value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw oid value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns `true` unless this is [`Oid::INVALID`].
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Returns `true` for ids reserved for system objects (below [`FIRST_NORMAL_OBJECT_ID`]).
    pub const fn is_system(self) -> bool {
        self.0 < FIRST_NORMAL_OBJECT_ID.0
    }
}

impl From<u32> for Oid {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Oid> for u32 {
    fn from(value: Oid) -> Self {
        value.0
    }
}

impl std::str::FromStr for Oid {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>().map(Self)
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl sqlx::Type<Postgres> for Oid {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <PgOid as sqlx::Type<Postgres>>::type_info()
    }
}

impl sqlx::postgres::PgHasArrayType for Oid {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        <PgOid as sqlx::postgres::PgHasArrayType>::array_type_info()
    }
}

impl<'r> sqlx::Decode<'r, Postgres> for Oid {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let PgOid(oid) = <PgOid as sqlx::Decode<Postgres>>::decode(value)?;
        Ok(Self(oid))
    }
}

impl<'q> sqlx::Encode<'q, Postgres> for Oid {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        <PgOid as sqlx::Encode<'q, Postgres>>::encode_by_ref(&PgOid(self.0), buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_ids_stop_at_first_normal_object_id() {
        assert!(Oid::new(1259).is_system());
        assert!(Oid::new(16383).is_system());
        assert!(!Oid::new(16384).is_system());
        assert!(!Oid::new(u32::MAX).is_system());
    }

    #[test]
    fn invalid_oid_is_zero() {
        assert!(!Oid::INVALID.is_valid());
        assert!(!Oid::default().is_valid());
        assert!(Oid::new(1).is_valid());
    }

    #[test]
    fn serializes_as_plain_integer() {
        //* When
        let json = serde_json::to_string(&Oid::new(16390)).expect("oid should serialize");
        let parsed: Oid = serde_json::from_str("4294967295").expect("oid should deserialize");

        //* Then
        assert_eq!(json, "16390");
        assert_eq!(parsed, Oid::new(u32::MAX));
    }

    #[test]
    fn parses_from_decimal_string() {
        assert_eq!("1663".parse::<Oid>().ok(), Some(DEFAULT_TABLESPACE_OID));
        assert!("-1".parse::<Oid>().is_err());
        assert!("abc".parse::<Oid>().is_err());
    }
}
