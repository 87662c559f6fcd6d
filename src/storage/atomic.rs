use std::{
    io::{self, BufWriter, Write},
    path::Path,
};

use tempfile::NamedTempFile;

/// Replaces the file at `path` with whatever `write` produces.
///
/// The content goes to a temporary file in the same directory, which is
/// flushed, synced and then renamed over `path`. Readers therefore see either
/// the old file or the new one, never a partial write. If `write` or any step
/// after it fails, the temporary file is deleted and `path` is untouched.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns any error from `write`, from creating the temporary file, or
/// from syncing and renaming it.
pub fn write_atomic<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
