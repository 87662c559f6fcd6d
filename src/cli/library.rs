use std::{io::Write, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use deskwork::{
    domain::library::{AuditSink, Book, Library as LibraryModel, Patron},
    storage::AuditLog,
};
use tracing::instrument;

/// Command arguments for `desk library`.
///
/// Registers patrons and books, lends and returns a book, and records every
/// action in an audit log.
#[derive(Debug, Parser)]
pub struct Library {
    /// Audit log file (appended to)
    #[arg(long, default_value = "data/app.log")]
    log: PathBuf,

    /// Also open a second log and drop it without closing it
    #[arg(long)]
    drop_demo: bool,
}

impl Library {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let mut out = std::io::stdout();
        let mut log = AuditLog::open(&self.log)
            .with_context(|| format!("failed to open audit log {}", self.log.display()))?;

        demo(&mut log, &mut out)?;

        writeln!(out, "Closing the audit log explicitly...")?;
        log.close()
            .with_context(|| format!("failed to close audit log {}", self.log.display()))?;

        if self.drop_demo {
            let path = self.log.with_file_name("demo-drop.log");
            let mut unclosed = AuditLog::open(&path)?;
            unclosed.record("[DEMO] this log is dropped without close()")?;
            drop(unclosed);
            writeln!(
                out,
                "Dropped {} without closing it; see its last line.",
                path.display()
            )?;
        }
        Ok(())
    }
}

fn demo(sink: &mut dyn AuditSink, out: &mut impl Write) -> anyhow::Result<()> {
    let mut library = LibraryModel::with_audit(sink);

    library.register_patron(Patron::new("2402", "Adriel Sánchez"))?;
    library.register_patron(Patron::new("2109", "Thais Estrada"))?;
    library.register_book(
        "L001",
        Book::new("El Principito", "Antoine de Saint-Exupéry"),
    )?;
    library.register_book(
        "L002",
        Book::new("Cien años de soledad", "Gabriel García Márquez"),
    )?;

    library.lend("L001", "2402")?;
    library.give_back("L001")?;

    writeln!(out, "Books:")?;
    for (code, book) in library.books() {
        writeln!(out, "  {code}: {book}")?;
    }
    writeln!(out, "Patrons:")?;
    for patron in library.patrons() {
        writeln!(out, "  {patron}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_records_each_action() {
        let mut lines: Vec<String> = Vec::new();
        let mut out = Vec::new();

        demo(&mut lines, &mut out).unwrap();

        assert_eq!(lines.len(), 6);
        assert!(lines[4].starts_with("[LOAN]"));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("L001: \"El Principito\" by Antoine de Saint-Exupéry (available)"));
        assert!(text.contains("Thais Estrada (2109)"));
    }

    #[test]
    fn run_closes_the_log() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join("app.log");

        Library {
            log: log.clone(),
            drop_demo: true,
        }
        .run()
        .unwrap();

        let content = std::fs::read_to_string(&log).unwrap();
        assert!(content.ends_with("[CLOSE] explicit close\n"));
        let dropped = std::fs::read_to_string(tmp.path().join("demo-drop.log")).unwrap();
        assert!(dropped.ends_with("[CLOSE] implicit close on drop\n"));
    }
}
