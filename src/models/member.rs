//! Clan roster entries.

use serde::{Deserialize, Serialize};

use super::Tag;

/// A clan member as listed in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub tag: Tag,
    pub name: String,
    pub town_hall_level: u32,
}

impl Member {
    pub fn new(tag: impl Into<Tag>, name: impl Into<String>, town_hall_level: u32) -> Self {
        Self {
            tag: tag.into(),
            name: name.into(),
            town_hall_level,
        }
    }
}
