//! Inventory ledger with soft locks and hard reservations.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common::ItemId;

use crate::error::InventoryError;

/// Stock counters for a single item.
///
/// Invariant: `locked <= available`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockLevel {
    /// Units physically in stock.
    pub available: u32,
    /// Units held by in-flight orders.
    pub locked: u32,
}

impl StockLevel {
    /// Units that can still be locked.
    pub fn free(&self) -> u32 {
        self.available - self.locked
    }
}

/// Tracks available and locked stock per item.
///
/// Locking holds capacity without touching real stock; reserving converts a
/// lock into a permanent decrement. All operations are synchronous and never
/// suspend. Clones share the same ledger.
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    stock: Arc<RwLock<HashMap<ItemId, StockLevel>>>,
}

impl InventoryLedger {
    /// Creates an empty ledger. Every item has zero stock.
    pub fn empty() -> Self {
        Self {
            stock: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates a ledger seeded with the given stock counts.
    pub fn with_stock<I, K>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, u32)>,
        K: Into<ItemId>,
    {
        let stock = items
            .into_iter()
            .map(|(item, available)| {
                (
                    item.into(),
                    StockLevel {
                        available,
                        locked: 0,
                    },
                )
            })
            .collect();
        Self {
            stock: Arc::new(RwLock::new(stock)),
        }
    }

    /// Sets the available stock of an item, keeping existing locks.
    ///
    /// The lock count is clamped so that `locked <= available` keeps holding.
    pub fn set_stock(&self, item: impl Into<ItemId>, available: u32) {
        let mut stock = self.write();
        let level = stock.entry(item.into()).or_default();
        level.available = available;
        level.locked = level.locked.min(available);
    }

    /// Locks `quantity` units of `item` if enough unlocked stock remains.
    pub fn lock_item(&self, item: &ItemId, quantity: u32) -> Result<(), InventoryError> {
        let mut stock = self.write();
        let level = stock.entry(item.clone()).or_default();

        if level.free() < quantity {
            tracing::debug!(%item, quantity, free = level.free(), "failed to lock item");
            return Err(InventoryError::InsufficientStock {
                item: item.clone(),
                requested: quantity,
                free: level.free(),
            });
        }

        level.locked += quantity;
        tracing::debug!(%item, quantity, locked = level.locked, "locked item");
        Ok(())
    }

    /// Releases a previous lock. Leaves the ledger untouched if fewer than
    /// `quantity` units are locked.
    pub fn unlock_item(&self, item: &ItemId, quantity: u32) -> Result<(), InventoryError> {
        let mut stock = self.write();
        let locked = stock.get(item).map(|l| l.locked).unwrap_or(0);

        match stock.get_mut(item) {
            Some(level) if level.locked >= quantity => {
                level.locked -= quantity;
                tracing::debug!(%item, quantity, locked = level.locked, "unlocked item");
                Ok(())
            }
            _ => {
                tracing::warn!(%item, quantity, locked, "unlock failed: not enough locked quantity");
                Err(InventoryError::InsufficientLock {
                    item: item.clone(),
                    requested: quantity,
                    locked,
                })
            }
        }
    }

    /// Converts `quantity` locked units into a real stock decrement.
    pub fn reserve_item(&self, item: &ItemId, quantity: u32) -> Result<(), InventoryError> {
        let mut stock = self.write();

        match stock.get_mut(item) {
            Some(level) if level.locked >= quantity => {
                level.available -= quantity;
                level.locked -= quantity;
                tracing::debug!(%item, quantity, remaining = level.available, "reserved item");
                Ok(())
            }
            other => {
                let locked = other.map(|l| l.locked).unwrap_or(0);
                tracing::warn!(%item, quantity, locked, "reserve failed: not enough locked quantity");
                Err(InventoryError::InsufficientLock {
                    item: item.clone(),
                    requested: quantity,
                    locked,
                })
            }
        }
    }

    /// Returns `quantity` units to stock, undoing a reservation.
    pub fn release_item(&self, item: &ItemId, quantity: u32) {
        let mut stock = self.write();
        let level = stock.entry(item.clone()).or_default();
        level.available = level.available.checked_add(quantity).unwrap_or_else(|| {
            tracing::warn!(
                %item,
                quantity,
                available = level.available,
                "release overflows stock; capping"
            );
            u32::MAX
        });
        tracing::debug!(%item, quantity, available = level.available, "released item");
    }

    /// Returns the stock counters for an item.
    pub fn level(&self, item: &ItemId) -> StockLevel {
        self.read().get(item).copied().unwrap_or_default()
    }

    /// Units physically in stock.
    pub fn available(&self, item: &ItemId) -> u32 {
        self.level(item).available
    }

    /// Units currently locked.
    pub fn locked(&self, item: &ItemId) -> u32 {
        self.level(item).locked
    }

    /// Units that can still be locked.
    pub fn free(&self, item: &ItemId) -> u32 {
        self.level(item).free()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ItemId, StockLevel>> {
        self.stock.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ItemId, StockLevel>> {
        self.stock.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InventoryLedger {
    /// Seeds the reference catalogue: `item1: 10`, `item2: 5`.
    fn default() -> Self {
        Self::with_stock([("item1", 10), ("item2", 5)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> ItemId {
        ItemId::new(id)
    }

    #[test]
    fn test_default_catalogue() {
        let ledger = InventoryLedger::default();
        assert_eq!(ledger.available(&item("item1")), 10);
        assert_eq!(ledger.available(&item("item2")), 5);
        assert_eq!(ledger.available(&item("item3")), 0);
    }

    #[test]
    fn test_lock_and_unlock() {
        let ledger = InventoryLedger::default();

        ledger.lock_item(&item("item1"), 4).unwrap();
        assert_eq!(ledger.locked(&item("item1")), 4);
        assert_eq!(ledger.free(&item("item1")), 6);
        assert_eq!(ledger.available(&item("item1")), 10);

        ledger.unlock_item(&item("item1"), 4).unwrap();
        assert_eq!(ledger.locked(&item("item1")), 0);
    }

    #[test]
    fn test_lock_counts_existing_locks() {
        let ledger = InventoryLedger::default();

        ledger.lock_item(&item("item2"), 3).unwrap();
        let err = ledger.lock_item(&item("item2"), 3).unwrap_err();

        assert_eq!(
            err,
            InventoryError::InsufficientStock {
                item: item("item2"),
                requested: 3,
                free: 2,
            }
        );
        assert_eq!(ledger.locked(&item("item2")), 3);
    }

    #[test]
    fn test_lock_exact_free_quantity() {
        let ledger = InventoryLedger::default();
        ledger.lock_item(&item("item2"), 5).unwrap();
        assert_eq!(ledger.free(&item("item2")), 0);
    }

    #[test]
    fn test_lock_unknown_item_fails() {
        let ledger = InventoryLedger::default();
        assert!(ledger.lock_item(&item("ghost"), 1).is_err());
        assert_eq!(ledger.level(&item("ghost")), StockLevel::default());
    }

    #[test]
    fn test_unlock_more_than_locked_is_noop() {
        let ledger = InventoryLedger::default();
        ledger.lock_item(&item("item1"), 2).unwrap();

        let err = ledger.unlock_item(&item("item1"), 3).unwrap_err();
        assert!(matches!(err, InventoryError::InsufficientLock { locked: 2, .. }));
        assert_eq!(ledger.locked(&item("item1")), 2);
    }

    #[test]
    fn test_reserve_converts_lock() {
        let ledger = InventoryLedger::default();
        ledger.lock_item(&item("item1"), 3).unwrap();

        ledger.reserve_item(&item("item1"), 3).unwrap();

        assert_eq!(ledger.available(&item("item1")), 7);
        assert_eq!(ledger.locked(&item("item1")), 0);
    }

    #[test]
    fn test_reserve_requires_lock() {
        let ledger = InventoryLedger::default();
        assert!(ledger.reserve_item(&item("item1"), 1).is_err());
        assert_eq!(ledger.available(&item("item1")), 10);
    }

    #[test]
    fn test_release_restores_stock() {
        let ledger = InventoryLedger::default();
        ledger.lock_item(&item("item1"), 2).unwrap();
        ledger.reserve_item(&item("item1"), 2).unwrap();

        ledger.release_item(&item("item1"), 2);
        assert_eq!(ledger.available(&item("item1")), 10);
    }

    #[test]
    fn test_release_caps_at_max() {
        let ledger = InventoryLedger::empty();
        ledger.set_stock("item1", u32::MAX - 1);

        ledger.release_item(&item("item1"), 5);

        assert_eq!(ledger.available(&item("item1")), u32::MAX);
        assert_eq!(ledger.locked(&item("item1")), 0);
    }

    #[test]
    fn test_set_stock_clamps_locks() {
        let ledger = InventoryLedger::default();
        ledger.lock_item(&item("item1"), 8).unwrap();

        ledger.set_stock("item1", 5);

        let level = ledger.level(&item("item1"));
        assert_eq!(level.available, 5);
        assert_eq!(level.locked, 5);
    }

    #[test]
    fn test_clones_share_state() {
        let ledger = InventoryLedger::empty();
        let handle = ledger.clone();
        ledger.set_stock("widget", 1);

        handle.lock_item(&item("widget"), 1).unwrap();
        assert_eq!(ledger.locked(&item("widget")), 1);
    }
}
