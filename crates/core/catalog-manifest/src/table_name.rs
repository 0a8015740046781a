//! Validated relation name used to select base tables.

/// Longest relation name Postgres stores (`NAMEDATALEN - 1` bytes).
pub const MAX_TABLE_NAME_LEN: usize = 63;

/// A relation name as stored in `pg_class.relname`.
///
/// Names are matched exactly against the catalog, without case folding or quote stripping: the
/// value is what the catalog holds, not an SQL identifier. Construction rejects names the catalog
/// could never contain. The name travels to the server as a bound array parameter, never as SQL
/// text.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableName(String);

impl TableName {
    /// Validates and wraps a relation name.
    ///
    /// # Errors
    ///
    /// - `TableNameError::Empty` if the name is empty
    /// - `TableNameError::TooLong` if the name exceeds [`MAX_TABLE_NAME_LEN`] bytes
    /// - `TableNameError::ContainsNul` if the name contains a NUL byte
    pub fn new(name: impl Into<String>) -> Result<Self, TableNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TableNameError::Empty);
        }
        if name.len() > MAX_TABLE_NAME_LEN {
            return Err(TableNameError::TooLong(name));
        }
        if name.contains('\0') {
            return Err(TableNameError::ContainsNul(name));
        }
        Ok(Self(name))
    }

    /// Get a reference to the inner str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for TableName {
    type Err = TableNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::ops::Deref for TableName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for TableName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Debug for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Errors that can occur when validating a [`TableName`].
#[derive(Debug, thiserror::Error)]
pub enum TableNameError {
    /// The name is empty.
    #[error("table name must not be empty")]
    Empty,
    /// The name is longer than the catalog allows.
    #[error("table name '{0}' exceeds {max} bytes", max = MAX_TABLE_NAME_LEN)]
    TooLong(String),
    /// The name contains a NUL byte.
    #[error("table name {0:?} contains a NUL byte")]
    ContainsNul(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_names_the_catalog_can_hold() {
        let longest = "t".repeat(MAX_TABLE_NAME_LEN);

        assert_eq!(TableName::new("ao_table").expect("valid name"), "ao_table");
        assert_eq!(TableName::new("Mixed Case").expect("valid name"), "Mixed Case");
        assert!(TableName::new(longest).is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        assert!(matches!(TableName::new(""), Err(TableNameError::Empty)));
    }

    #[test]
    fn rejects_overlong_name() {
        let name = "t".repeat(MAX_TABLE_NAME_LEN + 1);
        assert!(matches!(
            TableName::new(name),
            Err(TableNameError::TooLong(_))
        ));
    }

    #[test]
    fn rejects_nul_byte() {
        assert!(matches!(
            "bad\0name".parse::<TableName>(),
            Err(TableNameError::ContainsNul(_))
        ));
    }
}
