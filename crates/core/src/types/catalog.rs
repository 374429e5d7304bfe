//! The fixed catalog of recognized cart items.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing a [`CatalogItem`] from an unrecognized name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown catalog item: {name}")]
pub struct UnknownItemError {
    /// The name that failed to parse.
    pub name: String,
}

/// An item in the fixed catalog.
///
/// The server is the source of truth for what is in a cart; the client only
/// ever sends names drawn from this set. Parsing is case-insensitive
/// (`"apple"`, `"Apple"`, and `"APPLE"` are the same item), and the display
/// name is the canonical capitalized form the backend expects.
///
/// ## Examples
///
/// ```
/// use greengrocer_core::CatalogItem;
///
/// let item: CatalogItem = "banana".parse().unwrap();
/// assert_eq!(item, CatalogItem::Banana);
/// assert_eq!(item.to_string(), "Banana");
///
/// assert!("Dragonfruit".parse::<CatalogItem>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CatalogItem {
    Apple,
    Banana,
    Melon,
    Lime,
}

impl CatalogItem {
    /// All catalog items, in display order.
    pub const ALL: [Self; 4] = [Self::Apple, Self::Banana, Self::Melon, Self::Lime];

    /// The canonical name sent over the wire (e.g. `"Apple"`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Apple => "Apple",
            Self::Banana => "Banana",
            Self::Melon => "Melon",
            Self::Lime => "Lime",
        }
    }

    /// Lowercase key used for map-style display (e.g. `"apple"`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Apple => "apple",
            Self::Banana => "banana",
            Self::Melon => "melon",
            Self::Lime => "lime",
        }
    }

    /// Parse a wire name into a catalog item, case-insensitively.
    ///
    /// Returns `None` for unrecognized names. Use this when tolerating
    /// unknown entries (e.g. counting a server-provided snapshot); use
    /// [`FromStr`] when an unknown name is an input error.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|item| item.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CatalogItem {
    type Err = UnknownItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire_name(s).ok_or_else(|| UnknownItemError { name: s.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("apple".parse::<CatalogItem>().unwrap(), CatalogItem::Apple);
        assert_eq!("APPLE".parse::<CatalogItem>().unwrap(), CatalogItem::Apple);
        assert_eq!("Melon".parse::<CatalogItem>().unwrap(), CatalogItem::Melon);
        assert_eq!("lIme".parse::<CatalogItem>().unwrap(), CatalogItem::Lime);
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let err = "Dragonfruit".parse::<CatalogItem>().unwrap_err();
        assert_eq!(err.name, "Dragonfruit");
        assert_eq!(err.to_string(), "unknown catalog item: Dragonfruit");
    }

    #[test]
    fn test_wire_name_round_trip() {
        for item in CatalogItem::ALL {
            assert_eq!(CatalogItem::from_wire_name(item.name()), Some(item));
        }
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(CatalogItem::Banana.to_string(), "Banana");
        assert_eq!(CatalogItem::Banana.key(), "banana");
    }
}
