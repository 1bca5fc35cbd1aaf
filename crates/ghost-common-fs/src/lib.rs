//! File system utilities for GHOST.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use ghost_common_core::{Error, Result};

/// Read a file to string with size limit.
pub fn read_to_string(path: impl AsRef<Path>, max_size: u64) -> Result<String> {
    let path = path.as_ref();

    let metadata = fs::metadata(path)
        .map_err(|e| Error::file_system("failed to read metadata", path, e))?;

    if metadata.len() > max_size {
        return Err(Error::new(format!(
            "file too large: {} bytes (max: {}): {}",
            metadata.len(),
            max_size,
            path.display()
        )));
    }

    fs::read_to_string(path).map_err(|e| Error::file_system("failed to read file", path, e))
}

/// Write to a file atomically (write to temp, then rename).
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    ensure_dir(parent)?;

    let mut temp_path = path.to_path_buf();
    if let Some(name) = path.file_name() {
        temp_path.set_file_name(format!(".{}.tmp", name.to_string_lossy()));
    } else {
        temp_path.push(".tmp");
    }

    {
        let mut file = File::create(&temp_path)
            .map_err(|e| Error::file_system("failed to create temporary file", &temp_path, e))?;

        file.write_all(contents)
            .map_err(|e| Error::file_system("failed to write temporary file", &temp_path, e))?;

        file.sync_all()
            .map_err(|e| Error::file_system("failed to sync temporary file", &temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::file_system("failed to rename temporary file to target", path, e)
    })?;

    Ok(())
}

/// Write string to file atomically.
pub fn write_string_atomic(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    write_atomic(path, contents.as_bytes())
}

/// Ensure a directory exists.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| Error::file_system("failed to create directory", path, e))?;
    }
    Ok(())
}
