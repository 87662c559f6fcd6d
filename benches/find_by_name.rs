//! This bench measures accent-insensitive name search over an inventory of a
//! few thousand items, and the cost of one write-through save.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use deskwork::{storage::CsvTable, Backend, Inventory, Item};
use tempfile::TempDir;

const NAMES: [&str; 6] = [
    "Café molido",
    "Azúcar morena",
    "Té verde",
    "Jabón líquido",
    "Papel higiénico",
    "Arroz",
];

fn inventory(size: usize) -> Inventory {
    (0..size)
        .map(|i| {
            let name = format!("{} {i}", NAMES[i % NAMES.len()]);
            Item::new(i.to_string(), &name, i64::try_from(i % 50).unwrap(), 1.25).unwrap()
        })
        .collect()
}

fn find_by_name(c: &mut Criterion) {
    let inventory = inventory(5_000);
    c.bench_function("find by name", |b| {
        b.iter(|| inventory.find_by_name(black_box("CAFE")));
    });
    c.bench_function("list all", |b| {
        b.iter(|| inventory.list_all().len());
    });
}

fn save_csv(c: &mut Criterion) {
    let inventory = inventory(5_000);
    c.bench_function("save csv", |b| {
        b.iter_batched(
            || {
                let tmp_dir = TempDir::new().unwrap();
                let table = CsvTable::new(tmp_dir.path().join("inventario.csv"));
                (tmp_dir, table)
            },
            |(_tmp_dir, table)| table.save(inventory.items()).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, find_by_name, save_csv);
criterion_main!(benches);
