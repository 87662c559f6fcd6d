//! Inventory stored as a versioned JSON document.
//!
//! ```json
//! {
//!   "formato": 1,
//!   "productos": [
//!     { "id": "1", "nombre": "Café", "cantidad": 10, "precio": 2.5 }
//!   ]
//! }
//! ```

use std::{
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Item, ItemId},
    storage::{
        atomic::write_atomic,
        backend::{Backend, Snapshot, StoreError},
    },
};

/// The document version written by [`JsonDocument::save`].
pub const FORMAT_VERSION: u64 = 1;

/// A JSON file holding every item in a single document.
#[derive(Debug, Clone)]
pub struct JsonDocument {
    path: PathBuf,
}

impl JsonDocument {
    /// A document stored at `path`. Nothing is read until [`Backend::load`].
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[derive(Deserialize)]
struct RawDocument {
    formato: u64,
    #[serde(default)]
    productos: Vec<serde_json::Value>,
}

/// Older files store numeric ids as JSON numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

#[derive(Deserialize)]
struct RawProduct {
    id: RawId,
    nombre: String,
    cantidad: i64,
    precio: f64,
}

impl RawProduct {
    fn into_item(self) -> Option<Item> {
        let id = match self.id {
            RawId::Text(text) => ItemId::new(text).ok()?,
            RawId::Number(number) => ItemId::from(number),
        };
        Item::new(id, &self.nombre, self.cantidad, self.precio).ok()
    }
}

#[derive(Serialize)]
struct Document<'a> {
    formato: u64,
    productos: Vec<Product<'a>>,
}

#[derive(Serialize)]
struct Product<'a> {
    id: &'a str,
    nombre: &'a str,
    cantidad: u64,
    precio: f64,
}

impl<'a> From<&'a Item> for Product<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            id: item.id().as_str(),
            nombre: item.name(),
            cantidad: item.quantity(),
            precio: item.price(),
        }
    }
}

impl Backend for JsonDocument {
    fn load(&self) -> Result<Snapshot, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.save(&[]).map_err(|e| StoreError::io(&self.path, e))?;
                tracing::info!("created empty inventory at {}", self.path.display());
                return Ok(Snapshot {
                    created: true,
                    ..Snapshot::default()
                });
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let document: RawDocument =
            serde_json::from_str(&content).map_err(|e| StoreError::Malformed {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
        if document.formato != FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                path: self.path.display().to_string(),
                found: document.formato,
            });
        }

        let mut snapshot = Snapshot::default();
        for (index, entry) in document.productos.into_iter().enumerate() {
            let item = serde_json::from_value::<RawProduct>(entry)
                .ok()
                .and_then(RawProduct::into_item);
            if let Some(item) = item {
                snapshot.push_unique(item);
            } else {
                tracing::warn!(
                    "skipping malformed entry {index} in {}",
                    self.path.display()
                );
                snapshot.skipped += 1;
            }
        }
        Ok(snapshot)
    }

    fn save(&self, items: &[Item]) -> io::Result<()> {
        let document = Document {
            formato: FORMAT_VERSION,
            productos: items.iter().map(Product::from).collect(),
        };
        write_atomic(&self.path, |out| {
            serde_json::to_writer_pretty(&mut *out, &document)?;
            out.write_all(b"\n")
        })
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
