//! Inventory stored as a CSV table.
//!
//! ```text
//! id,nombre,cantidad,precio
//! 1,Café,10,2.50
//! ```

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use csv::StringRecord;

use crate::{
    domain::Item,
    storage::{
        atomic::write_atomic,
        backend::{Backend, Snapshot, StoreError},
    },
};

/// The required columns, in the order they are written.
pub const HEADER: [&str; 4] = ["id", "nombre", "cantidad", "precio"];

/// A CSV file holding one item per row.
#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
}

impl CsvTable {
    /// A table stored at `path`. Nothing is read until [`Backend::load`].
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path_string(&self) -> String {
        self.path.display().to_string()
    }
}

/// Column positions of the required fields within a header.
struct Columns([usize; 4]);

impl Columns {
    fn locate(header: &StringRecord) -> Result<Self, Vec<&'static str>> {
        let mut positions = [0; 4];
        let mut missing = Vec::new();
        for (slot, name) in positions.iter_mut().zip(HEADER) {
            let found = header.iter().position(|column| {
                column
                    .trim_start_matches('\u{feff}')
                    .trim()
                    .eq_ignore_ascii_case(name)
            });
            match found {
                Some(index) => *slot = index,
                None => missing.push(name),
            }
        }
        if missing.is_empty() {
            Ok(Self(positions))
        } else {
            Err(missing)
        }
    }

    fn parse(&self, record: &StringRecord) -> Option<Item> {
        let [id, name, quantity, price] = self.0.map(|index| record.get(index).map(str::trim));
        let quantity = quantity?.parse::<i64>().ok()?;
        let price = price?.parse::<f64>().ok()?;
        Item::new(id?, name?, quantity, price).ok()
    }
}

impl Backend for CsvTable {
    fn load(&self) -> Result<Snapshot, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
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

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(io::BufReader::new(file));

        let header = reader.headers().map_err(|e| StoreError::Malformed {
            path: self.path_string(),
            reason: e.to_string(),
        })?;
        let columns = Columns::locate(header).map_err(|missing| StoreError::Header {
            path: self.path_string(),
            missing,
        })?;

        let mut snapshot = Snapshot::default();
        for record in reader.records() {
            let parsed = record.as_ref().ok().and_then(|record| columns.parse(record));
            match parsed {
                Some(item) => snapshot.push_unique(item),
                None => {
                    let line = record
                        .ok()
                        .and_then(|r| r.position().map(csv::Position::line));
                    tracing::warn!(
                        "skipping malformed row{} in {}",
                        line.map(|l| format!(" at line {l}")).unwrap_or_default(),
                        self.path.display()
                    );
                    snapshot.skipped += 1;
                }
            }
        }

        tracing::debug!(
            "loaded {} item(s) from {}, skipped {}",
            snapshot.items.len(),
            self.path.display(),
            snapshot.skipped
        );
        Ok(snapshot)
    }

    fn save(&self, items: &[Item]) -> io::Result<()> {
        write_atomic(&self.path, |out| {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(HEADER)?;
            for item in items {
                let quantity = item.quantity().to_string();
                let price = format!("{:.2}", item.price());
                writer.write_record([item.id().as_str(), item.name(), &quantity, &price])?;
            }
            writer.flush()
        })
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn table(content: Option<&str>) -> (TempDir, CsvTable) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("inventario.csv");
        if let Some(content) = content {
            std::fs::write(&path, content).unwrap();
        }
        (tmp, CsvTable::new(path))
    }

    #[test]
    fn missing_file_is_created_with_header() {
        let (_tmp, table) = table(None);

        let snapshot = table.load().unwrap();

        assert!(snapshot.created);
        assert!(snapshot.items.is_empty());
        assert_eq!(
            std::fs::read_to_string(table.location()).unwrap(),
            "id,nombre,cantidad,precio\n"
        );
    }

    #[test]
    fn bad_rows_and_duplicates_are_skipped_and_counted() {
        let (_tmp, table) = table(Some(
            "id,nombre,cantidad,precio\n\
             1,Café,10,2.50\n\
             2,Té,muchos,1.00\n\
             3,Arroz,-4,1.00\n\
             1,Café otra vez,1,1.00\n\
             4,Azúcar\n\
             5,Sal,2,0.75\n",
        ));

        let snapshot = table.load().unwrap();

        let ids: Vec<_> = snapshot.items.iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, ["1", "5"]);
        assert_eq!(snapshot.skipped, 4);
        assert!(!snapshot.created);
    }

    #[test]
    fn header_missing_a_column_is_an_error() {
        let (_tmp, table) = table(Some("id,nombre,precio\n1,Café,2.50\n"));

        let error = table.load().unwrap_err();

        match error {
            StoreError::Header { missing, .. } => assert_eq!(missing, ["cantidad"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            std::fs::read_to_string(table.location()).unwrap(),
            "id,nombre,precio\n1,Café,2.50\n"
        );
    }

    #[test]
    fn columns_may_appear_in_any_order() {
        let (_tmp, table) = table(Some("precio,cantidad,nombre,id\n2.5,10,Café,1\n"));

        let snapshot = table.load().unwrap();

        assert_eq!(snapshot.items, [Item::new("1", "Café", 10, 2.5).unwrap()]);
    }

    #[test]
    fn save_quotes_names_with_commas() {
        let (_tmp, table) = table(None);
        let items = [Item::new("1", "Leche, entera", 3, 1.2).unwrap()];

        table.save(&items).unwrap();

        assert_eq!(
            std::fs::read_to_string(table.location()).unwrap(),
            "id,nombre,cantidad,precio\n1,\"Leche, entera\",3,1.20\n"
        );
        assert_eq!(table.load().unwrap().items, items);
    }
}
