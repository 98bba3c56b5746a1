//! Container identifier handling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque container identifier.
///
/// The harness performs no local validation: identifiers are passed to the
/// runtime under test verbatim, including the empty string, so that the
/// runtime's own validation can be exercised and its error observed.
/// Uniqueness within a test run comes from [`ContainerId::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    /// Wrap an identifier verbatim, without validation.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a random identifier.
    ///
    /// A UUID v4 rendered in hyphenated form: 128 random bits, which makes
    /// collisions within one test run negligible.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ContainerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for ContainerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let id1 = ContainerId::generate();
        let id2 = ContainerId::generate();
        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 36);
    }

    #[test]
    fn empty_id_passes_through() {
        let id = ContainerId::new("");
        assert!(id.is_empty());
        assert_eq!(id.as_str(), "");
    }

    #[test]
    fn arbitrary_ids_are_not_rejected() {
        let id = ContainerId::new("spaces and ! punctuation");
        assert_eq!(id.as_str(), "spaces and ! punctuation");
    }
}
