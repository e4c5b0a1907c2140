//! Resource inventory ledger.

use geometropolis_core::ResourceKind;

/// Non-negative stock counter for a single resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InventoryItem {
    kind: ResourceKind,
    quantity: u64,
}

impl InventoryItem {
    /// Creates a counter holding `quantity` units.
    #[must_use]
    pub const fn new(kind: ResourceKind, quantity: u64) -> Self {
        Self { kind, quantity }
    }

    /// Resource tracked by the counter.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Current stock.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.quantity
    }

    /// Adds to the stock, saturating at `u64::MAX`.
    pub fn add(&mut self, amount: u64) {
        self.quantity = self.quantity.saturating_add(amount);
    }

    /// Removes `amount` from the stock.
    ///
    /// Returns `false` and leaves the stock unchanged when `amount` exceeds it.
    #[must_use]
    pub fn subtract(&mut self, amount: u64) -> bool {
        match self.quantity.checked_sub(amount) {
            Some(remaining) => {
                self.quantity = remaining;
                true
            }
            None => false,
        }
    }
}

/// Wood and stone counters owned by the city.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inventory {
    wood: InventoryItem,
    stone: InventoryItem,
}

impl Inventory {
    /// Creates an inventory with the provided starting stock.
    #[must_use]
    pub const fn new(wood: u64, stone: u64) -> Self {
        Self {
            wood: InventoryItem::new(ResourceKind::Wood, wood),
            stone: InventoryItem::new(ResourceKind::Stone, stone),
        }
    }

    /// Counter for `resource`.
    #[must_use]
    pub const fn item(&self, resource: ResourceKind) -> &InventoryItem {
        match resource {
            ResourceKind::Wood => &self.wood,
            ResourceKind::Stone => &self.stone,
        }
    }

    /// Mutable counter for `resource`.
    pub fn item_mut(&mut self, resource: ResourceKind) -> &mut InventoryItem {
        match resource {
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Stone => &mut self.stone,
        }
    }
}
