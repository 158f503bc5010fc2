//! Type-safe wrappers for keyspace and table names.
//!
//! Names are validated on construction and normalized to lowercase, so a
//! `KeyspaceName` can never be accidentally used where a `TableName` is
//! expected and lookups are case-insensitive by construction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when a keyspace or table name fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameValidationError {
    pub name: String,
    pub reason: String,
}

impl fmt::Display for NameValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid name '{}': {}", self.name, self.reason)
    }
}

impl std::error::Error for NameValidationError {}

/// Validates an identifier for use as a keyspace or table name.
///
/// Rejected:
/// - Empty strings
/// - Names not starting with an ASCII letter or underscore
/// - Names containing anything but ASCII alphanumerics and underscores
fn validate(name: &str) -> Result<(), NameValidationError> {
    if name.is_empty() {
        return Err(NameValidationError {
            name: name.to_string(),
            reason: "name cannot be empty".to_string(),
        });
    }

    let mut chars = name.chars();
    let first = chars.next().unwrap();
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(NameValidationError {
            name: name.to_string(),
            reason: "name must start with a letter or underscore".to_string(),
        });
    }

    if name.chars().any(|c| !c.is_ascii_alphanumeric() && c != '_') {
        return Err(NameValidationError {
            name: name.to_string(),
            reason: "name may only contain letters, digits and underscores".to_string(),
        });
    }

    Ok(())
}

macro_rules! name_type {
    ($(#[$doc:meta])* $ty:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $ty(String);

        impl $ty {
            /// Creates a new name, with validation.
            ///
            /// Names are case-insensitive and normalized to lowercase.
            pub fn try_new(name: impl Into<String>) -> Result<Self, NameValidationError> {
                let name = name.into();
                validate(&name)?;
                Ok(Self(name.to_lowercase()))
            }

            /// Creates a new name.
            ///
            /// # Panics
            ///
            /// Panics if the name fails validation. Use `try_new` for
            /// fallible creation.
            #[inline]
            pub fn new(name: impl Into<String>) -> Self {
                let name = name.into();
                validate(&name).expect("invalid identifier");
                Self(name.to_lowercase())
            }

            /// Returns the name as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the wrapper and returns the inner `String`.
            #[inline]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

name_type! {
    /// A named namespace grouping tables, analogous to a schema or database.
    KeyspaceName
}

name_type! {
    /// The name of a table within a keyspace.
    TableName
}

/// A table reference fully qualified with its keyspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedTable {
    pub keyspace: KeyspaceName,
    pub table: TableName,
}

impl QualifiedTable {
    pub fn new(keyspace: KeyspaceName, table: TableName) -> Self {
        Self { keyspace, table }
    }
}

impl fmt::Display for QualifiedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.keyspace, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_case_insensitive() {
        let a = KeyspaceName::new("Keyspace1");
        let b = KeyspaceName::new("keyspace1");
        let c = KeyspaceName::new("KEYSPACE1");
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.as_str(), "keyspace1");
    }

    #[test]
    fn test_valid_names() {
        assert!(TableName::try_new("test").is_ok());
        assert!(TableName::try_new("_internal").is_ok());
        assert!(TableName::try_new("events_2024").is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        let err = KeyspaceName::try_new("").unwrap_err();
        assert!(err.reason.contains("empty"));
    }

    #[test]
    fn test_rejects_leading_digit() {
        assert!(TableName::try_new("1users").is_err());
    }

    #[test]
    fn test_rejects_punctuation() {
        assert!(TableName::try_new("users;drop").is_err());
        assert!(TableName::try_new("a.b").is_err());
        assert!(TableName::try_new("a/b").is_err());
        assert!(TableName::try_new("a\0b").is_err());
    }

    #[test]
    fn test_qualified_display() {
        let qt = QualifiedTable::new(KeyspaceName::new("ks1"), TableName::new("Test"));
        assert_eq!(qt.to_string(), "ks1.test");
    }

    #[test]
    #[should_panic(expected = "invalid identifier")]
    fn test_new_panics_on_invalid() {
        let _ = TableName::new("no spaces");
    }
}
