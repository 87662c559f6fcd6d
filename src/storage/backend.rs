use std::{io, path::Path};

use crate::domain::Item;

/// Errors that abort loading a store.
///
/// Individual bad records are not errors; they are skipped and counted in
/// [`Snapshot::skipped`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file could not be read or created.
    #[error("failed to access {path}: {source}")]
    Io {
        /// The store's location.
        path: String,
        /// The underlying failure.
        source: io::Error,
    },

    /// A CSV header lacks columns every row needs.
    #[error("{path}: header is missing required column(s): {}", missing.join(", "))]
    Header {
        /// The store's location.
        path: String,
        /// The absent column names.
        missing: Vec<&'static str>,
    },

    /// The file as a whole could not be parsed.
    #[error("{path}: malformed file: {reason}")]
    Malformed {
        /// The store's location.
        path: String,
        /// The parser's message.
        reason: String,
    },

    /// A JSON document declares a version this build cannot read.
    #[error("{path}: unsupported format version {found}")]
    UnsupportedVersion {
        /// The store's location.
        path: String,
        /// The declared version.
        found: u64,
    },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// What a backend read from disk.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Snapshot {
    /// Valid records, in file order, duplicates removed.
    pub items: Vec<Item>,
    /// Number of records that were malformed or repeated an earlier key.
    pub skipped: usize,
    /// `true` if the file did not exist and was created empty.
    pub created: bool,
}

impl Snapshot {
    /// Adds a record unless its key was already seen, in which case it
    /// counts as skipped.
    pub(crate) fn push_unique(&mut self, item: Item) {
        if self.items.iter().any(|existing| existing.id() == item.id()) {
            tracing::warn!("skipping duplicate id {}", item.id());
            self.skipped += 1;
        } else {
            self.items.push(item);
        }
    }
}

/// A file format the repository can persist to.
///
/// Implementations rewrite the whole file on every save.
pub trait Backend {
    /// Reads every record, creating an empty file if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read as a whole.
    fn load(&self) -> Result<Snapshot, StoreError>;

    /// Replaces the file with `items`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file could not be written. The previous
    /// content is then left in place.
    fn save(&self, items: &[Item]) -> io::Result<()>;

    /// Human-readable location of the store, for messages.
    fn location(&self) -> &Path;
}
