//! An append-only text log of library actions.

use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::domain::library::AuditSink;

/// A log file held open for appending.
///
/// Call [`AuditLog::close`] when done. Dropping an open log still writes a
/// closing line, but any error doing so is lost.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    file: Option<File>,
}

impl AuditLog {
    /// Opens (or creates) the log at `path` and writes an opening line.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be
    /// created, or the opening line cannot be written.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut log = Self {
            path,
            file: Some(file),
        };
        let opened = format!(
            "[OPEN] {} at {}",
            log.path.display(),
            chrono::Local::now().to_rfc3339()
        );
        log.record(&opened)?;
        tracing::debug!("opened audit log {}", log.path.display());
        Ok(log)
    }

    /// Where the log is written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a closing line and releases the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the closing line cannot be written or synced. The
    /// file is released either way.
    pub fn close(mut self) -> io::Result<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        writeln!(file, "[CLOSE] explicit close")?;
        file.sync_all()?;
        tracing::debug!("closed audit log {}", self.path.display());
        Ok(())
    }
}

impl AuditSink for AuditLog {
    fn record(&mut self, line: &str) -> io::Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other("audit log is closed"))?;
        writeln!(file, "{line}")?;
        file.flush()
    }
}

impl Drop for AuditLog {
    fn drop(&mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = writeln!(file, "[CLOSE] implicit close on drop") {
                tracing::debug!("could not finish audit log {}: {e}", self.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn explicit_close_writes_footer() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data/app.log");

        let mut log = AuditLog::open(&path).unwrap();
        log.record("[LOAN] book L001 lent to patron 2402").unwrap();
        log.close().unwrap();

        let lines = lines(&path);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[OPEN]"));
        assert_eq!(lines[1], "[LOAN] book L001 lent to patron 2402");
        assert_eq!(lines[2], "[CLOSE] explicit close");
    }

    #[test]
    fn drop_writes_implicit_footer() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("demo.log");

        drop(AuditLog::open(&path).unwrap());

        assert_eq!(lines(&path).last().unwrap(), "[CLOSE] implicit close on drop");
    }

    #[test]
    fn reopening_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("app.log");

        AuditLog::open(&path).unwrap().close().unwrap();
        AuditLog::open(&path).unwrap().close().unwrap();

        assert_eq!(lines(&path).len(), 4);
    }
}
