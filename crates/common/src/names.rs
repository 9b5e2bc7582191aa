//! Database, table and column name rules.
//!
//! Names follow the portable subset of MySQL identifiers: 1-64 ASCII
//! letters, digits or underscores, not starting with a digit.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CommonError;

/// Maximum length for database, table and column names
pub const MAX_DB_NAME_LEN: usize = 64;

/// Returns `true` if `name` is usable as a database, table or column name.
///
/// # Examples
///
/// ```
/// use stashdb_common::names::is_valid_db_name;
///
/// assert!(is_valid_db_name("orders_2024"));
/// assert!(!is_valid_db_name("2024_orders"));
/// assert!(!is_valid_db_name("order-lines"));
/// ```
pub fn is_valid_db_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.first() {
        Some(first) if !first.is_ascii_digit() => {
            bytes.len() <= MAX_DB_NAME_LEN
                && bytes.iter().all(|&b| b.is_ascii_alphanumeric() || b == b'_')
        }
        _ => false,
    }
}

// ============================================================================
// DbName
// ============================================================================

/// A validated database, table or column name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DbName(String);

impl DbName {
    /// Create a new validated name.
    ///
    /// # Errors
    ///
    /// Returns `CommonError::Validation` if:
    /// - The name is empty
    /// - The name exceeds 64 characters
    /// - The name starts with a digit
    /// - The name contains anything but ASCII letters, digits and underscores
    pub fn new(name: impl Into<String>) -> Result<Self, CommonError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CommonError::validation("Name cannot be empty"));
        }
        if name.len() > MAX_DB_NAME_LEN {
            return Err(CommonError::validation(format!(
                "Name cannot exceed {} characters",
                MAX_DB_NAME_LEN
            )));
        }
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(CommonError::validation("Name cannot start with a digit"));
        }
        if !is_valid_db_name(&name) {
            return Err(CommonError::validation(
                "Name must contain only ASCII letters, digits and underscores",
            ));
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DbName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DbName {
    type Error = CommonError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DbName> for String {
    fn from(name: DbName) -> String {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod valid_db_name {
        use super::*;

        #[test]
        fn length_limits() {
            assert!(!is_valid_db_name(""));
            assert!(is_valid_db_name("a"));
            assert!(is_valid_db_name(&"a".repeat(64)));
            assert!(!is_valid_db_name(&"a".repeat(65)));
        }

        #[test]
        fn rejected_characters() {
            for name in ["1a", "a-a", "a&a", "a)a", "a).a", "喵", "a b", "a\0"] {
                assert!(!is_valid_db_name(name), "{name:?} should be rejected");
            }
        }

        #[test]
        fn accepted_characters() {
            assert!(is_valid_db_name("____"));
            assert!(is_valid_db_name("_1"));
            assert!(is_valid_db_name("abcdefghijklmnopqrstuvwxyz_0123456789"));
            assert!(is_valid_db_name("ABCDEFGHIJKLMNOPQRSTUVWXYZ_0123456789"));
        }
    }

    mod db_name {
        use super::*;

        #[test]
        fn valid_name() {
            let name = DbName::new("customers").unwrap();
            assert_eq!(name.as_str(), "customers");
            assert_eq!(name.to_string(), "customers");
        }

        #[test]
        fn is_not_trimmed() {
            assert!(DbName::new(" customers").is_err());
        }

        #[test]
        fn error_messages() {
            let cases = [
                ("", "empty"),
                ("9lives", "digit"),
                ("a-b", "ASCII"),
            ];
            for (input, fragment) in cases {
                let err = DbName::new(input).unwrap_err();
                assert!(
                    err.to_string().contains(fragment),
                    "{input:?}: {err} should mention {fragment}"
                );
            }
            let err = DbName::new("a".repeat(65)).unwrap_err();
            assert!(err.to_string().contains("64"));
        }

        #[test]
        fn serde_roundtrip() {
            let name = DbName::new("line_items").unwrap();
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, "\"line_items\"");
            let back: DbName = serde_json::from_str(&json).unwrap();
            assert_eq!(back, name);
        }

        #[test]
        fn serde_rejects_invalid() {
            let result: Result<DbName, _> = serde_json::from_str("\"1st\"");
            assert!(result.is_err());
        }
    }
}
