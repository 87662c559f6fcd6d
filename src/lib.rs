//! A toolkit of small console programs built around a write-through inventory.
//!
//! Inventory items live in a CSV or JSON file that is rewritten atomically
//! after every change. The other programs (BMI, weather, hotel, library,
//! bank) share the same domain and error conventions.

pub mod domain;
pub use domain::{Config, Inventory, InventoryError, Item, ItemId, ItemPatch, StoreFormat};

pub mod storage;
pub use storage::{Backend, Repository, RepositoryError, StoreError};
