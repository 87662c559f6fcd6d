//! Domain models for the desk toolkit.
//!
//! Every type here is independent of files and terminals. Persistence lives
//! in [`crate::storage`].

/// Validated stock records.
pub mod item;
pub use item::{Item, ItemId, ItemPatch, ValidationError};

/// The in-memory collection manager.
pub mod inventory;
pub use inventory::{Inventory, InventoryError, Stats};

/// Accent- and case-insensitive text comparison.
pub mod normalize;

mod config;
pub use config::{
    BankSettings, Config, ConfigError, DashboardSettings, InventorySettings, SeedItem,
    StoreFormat, DEFAULT_CONFIG_FILE,
};

pub mod bank;
pub mod bmi;
pub mod hotel;
pub mod library;
pub mod weather;
