//! Player, clan and war tags as issued by the game API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag the API uses in league groups for rounds that have not been drawn yet.
pub const PLACEHOLDER_WAR_TAG: &str = "#0";

/// An opaque `#`-prefixed identifier (player, clan or league war).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Create a tag, trimming whitespace and upper-casing it the way the
    /// game displays tags.
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim().to_uppercase();
        if trimmed.starts_with('#') || trimmed.is_empty() {
            Self(trimmed)
        } else {
            Self(format!("#{}", trimmed))
        }
    }

    /// Get the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the `#0` slot of an undrawn league round.
    pub fn is_placeholder(&self) -> bool {
        self.0 == PLACEHOLDER_WAR_TAG
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.0)
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_new_adds_hash() {
        assert_eq!(Tag::new("2lg8pvy8r").as_str(), "#2LG8PVY8R");
        assert_eq!(Tag::new(" #2LG8PVY8R ").as_str(), "#2LG8PVY8R");
    }

    #[test]
    fn test_tag_placeholder() {
        assert!(Tag::from("#0").is_placeholder());
        assert!(!Tag::from("#8QU0V2PJ").is_placeholder());
    }

    #[test]
    fn test_tag_serde_transparent() {
        let tag: Tag = serde_json::from_str("\"#ABC\"").unwrap();
        assert_eq!(tag, Tag::from("#ABC"));
        assert_eq!(serde_json::to_string(&tag).unwrap(), "\"#ABC\"");
    }
}
