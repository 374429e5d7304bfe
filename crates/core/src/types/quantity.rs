//! Per-item counts derived from a cart snapshot.

use core::fmt;

use super::catalog::CatalogItem;

/// Quantity of each catalog item in a cart snapshot.
///
/// Always derived from the server-provided snapshot by counting
/// case-insensitive name matches - never stored or mutated independently, so
/// it cannot diverge from the cart it was computed from. Unrecognized names
/// in the snapshot are ignored.
///
/// ## Examples
///
/// ```
/// use greengrocer_core::{CatalogItem, QuantityMap};
///
/// let quantities = QuantityMap::from_snapshot(["Apple", "apple", "Mystery"]);
/// assert_eq!(quantities.get(CatalogItem::Apple), 2);
/// assert_eq!(quantities.get(CatalogItem::Banana), 0);
/// assert_eq!(quantities.total(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuantityMap {
    counts: [u32; CatalogItem::ALL.len()],
}

impl QuantityMap {
    /// Count the recognized items in a snapshot of wire names.
    ///
    /// Matching is case-insensitive; unknown names are dropped without
    /// error and do not inflate any count.
    pub fn from_snapshot<I, S>(snapshot: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::default();
        for name in snapshot {
            if let Some(item) = CatalogItem::from_wire_name(name.as_ref()) {
                map.counts[item as usize] += 1;
            }
        }
        map
    }

    /// Quantity of a single catalog item.
    #[must_use]
    pub const fn get(&self, item: CatalogItem) -> u32 {
        self.counts[item as usize]
    }

    /// Total count across all recognized items.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// True when no recognized item has a non-zero count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Iterate over `(item, count)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (CatalogItem, u32)> + '_ {
        CatalogItem::ALL.into_iter().map(|item| (item, self.get(item)))
    }
}

impl fmt::Display for QuantityMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        write!(f, "{{")?;
        for (item, count) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {count}", item.key())?;
            first = false;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_is_all_zero() {
        let quantities = QuantityMap::from_snapshot(Vec::<String>::new());
        for item in CatalogItem::ALL {
            assert_eq!(quantities.get(item), 0);
        }
        assert!(quantities.is_empty());
    }

    #[test]
    fn test_counts_are_case_insensitive() {
        let quantities = QuantityMap::from_snapshot(["Apple", "apple", "APPLE", "banana"]);
        assert_eq!(quantities.get(CatalogItem::Apple), 3);
        assert_eq!(quantities.get(CatalogItem::Banana), 1);
        assert_eq!(quantities.get(CatalogItem::Melon), 0);
    }

    #[test]
    fn test_unknown_names_are_dropped() {
        let quantities = QuantityMap::from_snapshot(["Apple", "Durian", "", "Lime"]);
        assert_eq!(quantities.get(CatalogItem::Apple), 1);
        assert_eq!(quantities.get(CatalogItem::Lime), 1);
        assert_eq!(quantities.total(), 2);
    }

    #[test]
    fn test_total_matches_recognized_length() {
        let snapshot = ["Apple", "Banana", "banana", "Melon", "unknown"];
        let quantities = QuantityMap::from_snapshot(snapshot);
        let recognized = snapshot
            .iter()
            .filter(|name| CatalogItem::from_wire_name(name).is_some())
            .count();
        assert_eq!(quantities.total() as usize, recognized);
    }

    #[test]
    fn test_display_lists_every_item() {
        let quantities = QuantityMap::from_snapshot(["Apple"]);
        assert_eq!(
            quantities.to_string(),
            "{apple: 1, banana: 0, melon: 0, lime: 0}"
        );
    }
}
