//! The in-memory collection manager.
//!
//! [`Inventory`] knows nothing about files. It enforces key uniqueness and
//! field validity, and every operation either succeeds completely or leaves
//! the collection untouched.

use std::cmp::Ordering;

use crate::domain::{
    item::{round_cents, Item, ItemId, ItemPatch, ValidationError},
    normalize::normalize,
};

/// Errors returned by [`Inventory`] operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InventoryError {
    /// No item has the given key.
    #[error("no item with id {0}")]
    NotFound(ItemId),

    /// An item with the given key already exists.
    #[error("an item with id {0} already exists")]
    Duplicate(ItemId),

    /// A field value was rejected.
    #[error("invalid value: {0}")]
    Invalid(#[from] ValidationError),
}

/// Aggregate figures over the whole collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    /// Number of distinct items.
    pub items: usize,
    /// Sum of all quantities. Wide enough that no collection can overflow it.
    pub units: u128,
    /// Sum of `quantity * price`, rounded to cents.
    pub value: f64,
}

/// An ordered collection of [`Item`]s with unique keys.
///
/// Items are kept in insertion order, which is also the order they are
/// written to disk. Listings are sorted independently of that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Creates a collection with room for `capacity` items.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items in storage (insertion) order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Looks up an item by key.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Adds a new item.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Duplicate`] if the key is already present.
    pub fn add(&mut self, item: Item) -> Result<(), InventoryError> {
        if self.get(item.id()).is_some() {
            return Err(InventoryError::Duplicate(item.id().clone()));
        }
        self.items.push(item);
        Ok(())
    }

    /// Removes an item, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::NotFound`] if the key is absent.
    pub fn remove(&mut self, id: &ItemId) -> Result<Item, InventoryError> {
        self.remove_entry(id).map(|(_, item)| item)
    }

    /// Removes an item, returning it with the position it occupied.
    pub(crate) fn remove_entry(&mut self, id: &ItemId) -> Result<(usize, Item), InventoryError> {
        let index = self
            .position(id)
            .ok_or_else(|| InventoryError::NotFound(id.clone()))?;
        Ok((index, self.items.remove(index)))
    }

    /// Puts a previously removed item back where it was.
    pub(crate) fn restore(&mut self, index: usize, item: Item) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    /// Applies a partial update, returning the item as it was before.
    ///
    /// The whole patch is validated first; on error nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::NotFound`] if the key is absent, or
    /// [`InventoryError::Invalid`] if a field is out of its domain.
    pub fn update(&mut self, id: &ItemId, patch: &ItemPatch) -> Result<Item, InventoryError> {
        let index = self
            .position(id)
            .ok_or_else(|| InventoryError::NotFound(id.clone()))?;
        let updated = patch.apply(&self.items[index])?;
        Ok(std::mem::replace(&mut self.items[index], updated))
    }

    /// Overwrites the item with the same key, returning the old record.
    pub(crate) fn replace(&mut self, item: Item) -> Option<Item> {
        let index = self.position(item.id())?;
        Some(std::mem::replace(&mut self.items[index], item))
    }

    /// Items whose name contains `query`, ignoring case and accents.
    ///
    /// Results are sorted the same way as [`Inventory::list_all`].
    #[must_use]
    pub fn find_by_name(&self, query: &str) -> Vec<&Item> {
        let query = normalize(query);
        let mut found: Vec<_> = self
            .items
            .iter()
            .filter(|item| normalize(item.name()).contains(&query))
            .collect();
        found.sort_by(|a, b| listing_order(a, b));
        found
    }

    /// All items, sorted by normalized name and then by key.
    #[must_use]
    pub fn list_all(&self) -> Vec<&Item> {
        let mut all: Vec<_> = self.items.iter().collect();
        all.sort_by(|a, b| listing_order(a, b));
        all
    }

    /// Item count, total units and total stock value.
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            items: self.items.len(),
            units: self
                .items
                .iter()
                .map(|item| u128::from(item.quantity()))
                .sum(),
            value: round_cents(self.items.iter().map(Item::value).sum()),
        }
    }
}

fn listing_order(a: &Item, b: &Item) -> Ordering {
    normalize(a.name())
        .cmp(&normalize(b.name()))
        .then_with(|| a.id().cmp(b.id()))
}

impl FromIterator<Item> for Inventory {
    /// Collects items, keeping the first of any duplicated keys.
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let mut inventory = Self::new();
        for item in iter {
            let _ = inventory.add(item);
        }
        inventory
    }
}
