//! Shared types for the todo list and the widget tile.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One todo row as the widget understands it.
///
/// The host app's richer model may carry more fields under the same key; the
/// widget only ever reads and writes these two. Items have no identifier, so
/// their position in the list is their address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub text: String,
    #[serde(rename = "isDone")]
    pub is_done: bool,
}

impl TodoItem {
    pub fn new(text: impl Into<String>, is_done: bool) -> Self {
        TodoItem {
            text: text.into(),
            is_done,
        }
    }
}

/// Display capacity used when the rendering context reports an unknown family.
pub const DEFAULT_CAPACITY: usize = 5;

/// Widget family / tile size tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
    ExtraLarge,
    /// A family this build doesn't know, such as an accessory or lock-screen slot.
    Other,
}

impl SizeClass {
    /// The families with a dedicated capacity.
    pub const ALL: [SizeClass; 4] = [
        SizeClass::Small,
        SizeClass::Medium,
        SizeClass::Large,
        SizeClass::ExtraLarge,
    ];

    /// How many rows fit in a tile of this size.
    pub fn capacity(self) -> usize {
        match self {
            SizeClass::Small => 3,
            SizeClass::Medium => 5,
            SizeClass::Large => 10,
            SizeClass::ExtraLarge => 15,
            SizeClass::Other => DEFAULT_CAPACITY,
        }
    }

    /// Maps a platform family name onto a size class. Unrecognized names
    /// become [`SizeClass::Other`].
    pub fn from_family(name: &str) -> SizeClass {
        match name.trim().to_ascii_lowercase().as_str() {
            "small" | "system_small" | "systemsmall" => SizeClass::Small,
            "medium" | "system_medium" | "systemmedium" => SizeClass::Medium,
            "large" | "system_large" | "systemlarge" => SizeClass::Large,
            "extra-large" | "extra_large" | "xl" | "system_extra_large" | "systemextralarge" => {
                SizeClass::ExtraLarge
            }
            _ => SizeClass::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
            SizeClass::ExtraLarge => "extra-large",
            SizeClass::Other => "other",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeClass {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().is_empty() {
            return Err("size class must not be empty".to_string());
        }
        Ok(SizeClass::from_family(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacities_match_tiers() {
        let capacities: Vec<usize> = SizeClass::ALL.iter().map(|s| s.capacity()).collect();
        assert_eq!(capacities, vec![3, 5, 10, 15]);
    }

    #[test]
    fn unknown_family_uses_default_capacity() {
        assert_eq!(SizeClass::from_family("accessoryCircular"), SizeClass::Other);
        assert_eq!(SizeClass::Other.capacity(), 5);
    }

    #[test]
    fn parses_platform_family_names() {
        assert_eq!("systemSmall".parse::<SizeClass>(), Ok(SizeClass::Small));
        assert_eq!("extra-large".parse::<SizeClass>(), Ok(SizeClass::ExtraLarge));
        assert_eq!(
            "accessoryRectangular".parse::<SizeClass>(),
            Ok(SizeClass::Other)
        );
        assert!("  ".parse::<SizeClass>().is_err());
    }

    #[test]
    fn todo_item_uses_camel_case_done_flag() {
        let json = serde_json::to_string(&TodoItem::new("a", true)).unwrap();
        assert_eq!(json, r#"{"text":"a","isDone":true}"#);
    }
}
