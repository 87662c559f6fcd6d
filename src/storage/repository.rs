//! A write-through store of inventory items.
//!
//! The [`Repository`] wraps the file-agnostic [`Inventory`] and persists it
//! through a [`Backend`] after every mutation. A mutation is only reported as
//! successful once the file has been rewritten; if the write fails, the
//! in-memory change is undone so memory and disk never disagree.

use std::{io, path::PathBuf};

use crate::{
    domain::{Inventory, InventoryError, Item, ItemId, ItemPatch, Stats, StoreFormat},
    storage::{
        backend::{Backend, Snapshot, StoreError},
        csv_table::CsvTable,
        json_document::JsonDocument,
    },
};

/// State of a [`Repository`] whose items are in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    inventory: Inventory,
    summary: LoadSummary,
}

/// State of a [`Repository`] that has not read its store yet.
#[derive(Debug, PartialEq, Eq)]
pub struct Unloaded;

/// What happened when the store was last read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    /// Records accepted.
    pub loaded: usize,
    /// Records skipped because they were malformed or duplicated.
    pub skipped: usize,
    /// `true` if the file was missing and has just been created.
    pub created: bool,
}

impl From<&Snapshot> for LoadSummary {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            loaded: snapshot.items.len(),
            skipped: snapshot.skipped,
            created: snapshot.created,
        }
    }
}

/// Errors returned by repository mutations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The change was rejected before anything was written.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// The file could not be rewritten; the change was rolled back.
    #[error("failed to save {path}: {source}")]
    Persist { path: PathBuf, source: io::Error },

    /// The file could not be read back.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An inventory kept in sync with a file.
pub struct Repository<B, S = Unloaded> {
    backend: B,
    state: S,
}

impl<B: Backend> Repository<B, Unloaded> {
    /// A repository over `backend`. Nothing is read until [`Self::load`].
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            state: Unloaded,
        }
    }

    /// Reads the store, creating it if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read as a whole.
    /// Individual bad records do not fail the load; see
    /// [`Repository::summary`].
    pub fn load(self) -> Result<Repository<B, Loaded>, StoreError> {
        let snapshot = self.backend.load()?;
        let summary = LoadSummary::from(&snapshot);
        tracing::info!(
            "loaded {} item(s) from {}",
            summary.loaded,
            self.backend.location().display()
        );
        if summary.skipped > 0 {
            tracing::warn!(
                "skipped {} malformed or duplicate record(s) in {}",
                summary.skipped,
                self.backend.location().display()
            );
        }

        Ok(Repository {
            backend: self.backend,
            state: Loaded {
                inventory: snapshot.items.into_iter().collect(),
                summary,
            },
        })
    }
}

impl Repository<Box<dyn Backend>, Unloaded> {
    /// A repository over a file of the given format.
    #[must_use]
    pub fn open(path: PathBuf, format: StoreFormat) -> Self {
        let backend: Box<dyn Backend> = match format {
            StoreFormat::Csv => Box::new(CsvTable::new(path)),
            StoreFormat::Json => Box::new(JsonDocument::new(path)),
        };
        Self::new(backend)
    }
}

impl<B: Backend> Repository<B, Loaded> {
    /// The in-memory view of the store.
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.state.inventory
    }

    /// What the most recent load found.
    #[must_use]
    pub const fn summary(&self) -> LoadSummary {
        self.state.summary
    }

    /// The underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    fn persist(&self) -> Result<(), RepositoryError> {
        self.backend
            .save(self.state.inventory.items())
            .map_err(|source| {
                tracing::warn!(
                    "failed to save {}: {source}",
                    self.backend.location().display()
                );
                RepositoryError::Persist {
                    path: self.backend.location().to_path_buf(),
                    source,
                }
            })
    }

    /// Adds an item and saves.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Inventory`] if the key is taken, or
    /// [`RepositoryError::Persist`] if saving failed, in which case the item
    /// is not added.
    pub fn add(&mut self, item: Item) -> Result<(), RepositoryError> {
        let id = item.id().clone();
        self.state.inventory.add(item)?;
        if let Err(e) = self.persist() {
            let _ = self.state.inventory.remove(&id);
            return Err(e);
        }
        tracing::info!("added item {id}");
        Ok(())
    }

    /// Removes an item and saves, returning the removed item.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Inventory`] if the key is absent, or
    /// [`RepositoryError::Persist`] if saving failed, in which case the item
    /// is put back where it was.
    pub fn remove(&mut self, id: &ItemId) -> Result<Item, RepositoryError> {
        let (index, removed) = self.state.inventory.remove_entry(id)?;
        if let Err(e) = self.persist() {
            self.state.inventory.restore(index, removed);
            return Err(e);
        }
        tracing::info!("removed item {id}");
        Ok(removed)
    }

    /// Applies a partial update and saves, returning the updated item.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Inventory`] if the key is absent or a field
    /// is invalid, or [`RepositoryError::Persist`] if saving failed, in which
    /// case the previous record is restored.
    pub fn update(&mut self, id: &ItemId, patch: &ItemPatch) -> Result<Item, RepositoryError> {
        let previous = self.state.inventory.update(id, patch)?;
        if let Err(e) = self.persist() {
            self.state.inventory.replace(previous);
            return Err(e);
        }
        tracing::info!("updated item {id}");
        Ok(self
            .state
            .inventory
            .get(id)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound(id.clone()))?)
    }

    /// Looks up an item by key.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.state.inventory.get(id)
    }

    /// See [`Inventory::find_by_name`].
    #[must_use]
    pub fn find_by_name(&self, query: &str) -> Vec<&Item> {
        self.state.inventory.find_by_name(query)
    }

    /// See [`Inventory::list_all`].
    #[must_use]
    pub fn list_all(&self) -> Vec<&Item> {
        self.state.inventory.list_all()
    }

    /// See [`Inventory::stats`].
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.state.inventory.stats()
    }

    /// Discards the in-memory state and reads the store again.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read; the current state is
    /// then kept.
    pub fn reload(&mut self) -> Result<LoadSummary, RepositoryError> {
        let snapshot = self.backend.load()?;
        let summary = LoadSummary::from(&snapshot);
        self.state = Loaded {
            inventory: snapshot.items.into_iter().collect(),
            summary,
        };
        tracing::debug!("reloaded {}", self.backend.location().display());
        Ok(summary)
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn load(&self) -> Result<Snapshot, StoreError> {
        (**self).load()
    }

    fn save(&self, items: &[Item]) -> io::Result<()> {
        (**self).save(items)
    }

    fn location(&self) -> &std::path::Path {
        (**self).location()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, path::Path};

    use super::*;

    /// Keeps items in memory and fails saves on demand.
    #[derive(Default)]
    struct Memory {
        saved: std::cell::RefCell<Vec<Item>>,
        fail: Cell<bool>,
    }

    impl Backend for Memory {
        fn load(&self) -> Result<Snapshot, StoreError> {
            Ok(Snapshot {
                items: self.saved.borrow().clone(),
                ..Snapshot::default()
            })
        }

        fn save(&self, items: &[Item]) -> io::Result<()> {
            if self.fail.get() {
                return Err(io::Error::other("disk full"));
            }
            *self.saved.borrow_mut() = items.to_vec();
            Ok(())
        }

        fn location(&self) -> &Path {
            Path::new("memory")
        }
    }

    fn id(id: &str) -> ItemId {
        ItemId::new(id).unwrap()
    }

    #[test]
    fn every_mutation_reaches_the_backend() {
        let mut repository = Repository::new(Memory::default()).load().unwrap();

        repository
            .add(Item::new("1", "Café", 10, 2.5).unwrap())
            .unwrap();
        repository
            .update(
                &id("1"),
                &ItemPatch {
                    quantity: Some(4),
                    ..ItemPatch::default()
                },
            )
            .unwrap();

        let saved = repository.backend().saved.borrow().clone();
        assert_eq!(saved, [Item::new("1", "Café", 4, 2.5).unwrap()]);
    }

    #[test]
    fn failed_save_rolls_back_update() {
        let mut repository = Repository::new(Memory::default()).load().unwrap();
        repository
            .add(Item::new("1", "Café", 10, 2.5).unwrap())
            .unwrap();
        repository.backend().fail.set(true);

        let error = repository
            .update(
                &id("1"),
                &ItemPatch {
                    price: Some(3.0),
                    ..ItemPatch::default()
                },
            )
            .unwrap_err();

        assert!(matches!(error, RepositoryError::Persist { .. }));
        assert!((repository.get(&id("1")).unwrap().price() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn reload_picks_up_backend_state() {
        let backend = Memory::default();
        backend
            .save(&[Item::new("7", "Sal", 1, 0.5).unwrap()])
            .unwrap();
        let mut repository = Repository::new(backend).load().unwrap();
        assert_eq!(repository.summary().loaded, 1);

        repository.backend().saved.borrow_mut().clear();
        let summary = repository.reload().unwrap();

        assert_eq!(summary.loaded, 0);
        assert!(repository.inventory().is_empty());
    }
}
