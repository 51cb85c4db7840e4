// Article pick-time tables

use crate::models::{ArticleId, Seconds};
use std::collections::HashMap;

/// Number of priced units before the flat tail (1st..4th, then 5th-and-beyond)
pub const PICK_TIERS: usize = 5;

/// Per-unit pick times of one article.
///
/// The Nth unit picked costs `tiers[N - 1]` for N up to four; the fifth unit
/// and every unit after it cost `tiers[4]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickTimeTable {
    pub tiers: [Seconds; PICK_TIERS],
}

impl PickTimeTable {
    pub fn new(tiers: [Seconds; PICK_TIERS]) -> Self {
        Self { tiers }
    }

    /// Time to pick the `unit`-th item (1-based)
    pub fn unit_seconds(&self, unit: u32) -> Seconds {
        let tier = (unit.max(1) as usize - 1).min(PICK_TIERS - 1);
        self.tiers[tier]
    }

    /// Total time to pick `quantity` units, saturating at `Seconds::MAX`
    pub fn seconds_for(&self, quantity: u32) -> Seconds {
        let priced = (1..=quantity.min(PICK_TIERS as u32 - 1))
            .map(|unit| self.unit_seconds(unit))
            .fold(0, Seconds::saturating_add);
        let tail = quantity.saturating_sub(PICK_TIERS as u32 - 1);
        priced.saturating_add(tail.saturating_mul(self.tiers[PICK_TIERS - 1]))
    }
}

/// Pick-time tables of every known article
#[derive(Debug, Clone, Default)]
pub struct PickTimeCatalog {
    tables: HashMap<ArticleId, PickTimeTable>,
}

impl PickTimeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table; a later table for the same article replaces it
    pub fn insert<S: Into<ArticleId>>(&mut self, article: S, table: PickTimeTable) {
        self.tables.insert(article.into(), table);
    }

    pub fn get(&self, article: &str) -> Option<&PickTimeTable> {
        self.tables.get(article)
    }

    /// Total pick time for `quantity` units of an article
    pub fn seconds_for(&self, article: &str, quantity: u32) -> Option<Seconds> {
        self.get(article).map(|table| table.seconds_for(quantity))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_tiers() {
        let table = PickTimeTable::new([10, 8, 6, 4, 2]);
        assert_eq!(table.unit_seconds(1), 10);
        assert_eq!(table.unit_seconds(4), 4);
        assert_eq!(table.unit_seconds(5), 2);
        assert_eq!(table.unit_seconds(40), 2);
    }

    #[test]
    fn test_seconds_for_quantity() {
        let table = PickTimeTable::new([10, 8, 6, 4, 2]);
        assert_eq!(table.seconds_for(0), 0);
        assert_eq!(table.seconds_for(1), 10);
        assert_eq!(table.seconds_for(3), 24);
        assert_eq!(table.seconds_for(4), 28);
        assert_eq!(table.seconds_for(7), 28 + 3 * 2);
    }

    #[test]
    fn test_huge_quantity_saturates() {
        let table = PickTimeTable::new([1, 1, 1, 1, 2]);
        assert_eq!(table.seconds_for(3_000_000_000), Seconds::MAX);
        assert_eq!(table.seconds_for(u32::MAX), Seconds::MAX);
    }

    #[test]
    fn test_catalog_lookup() {
        let mut catalog = PickTimeCatalog::new();
        catalog.insert("milk", PickTimeTable::new([5, 4, 3, 2, 1]));
        assert_eq!(catalog.seconds_for("milk", 2), Some(9));
        assert_eq!(catalog.seconds_for("bread", 1), None);
        assert_eq!(catalog.len(), 1);
    }
}
