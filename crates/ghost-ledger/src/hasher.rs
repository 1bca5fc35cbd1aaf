//! Content hashing.

use crate::error::{LedgerError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Digest recorded for delete events in place of a content hash.
pub const DELETED: &str = "deleted";

const CHUNK_SIZE: usize = 4096;

/// SHA-256 of `bytes` as lowercase hex.
pub fn digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 of a file's content, read in fixed-size chunks.
pub fn digest_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| LedgerError::file_read(path, e))?;
    digest_reader(file).map_err(|e| LedgerError::file_read(path, e))
}

fn digest_reader(mut reader: impl Read) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Source of content digests for live files.
pub trait ContentHasher: Send + Sync {
    /// Digest of the file at `path`.
    fn digest_file(&self, path: &Path) -> Result<String>;
}

/// Streaming SHA-256 over the file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256FileHasher;

impl ContentHasher for Sha256FileHasher {
    fn digest_file(&self, path: &Path) -> Result<String> {
        digest_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_chunked_matches_whole() {
        let data: Vec<u8> = (0..(CHUNK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        assert_eq!(digest_reader(Cursor::new(&data)).unwrap(), digest(&data));
    }

    #[test]
    fn test_digest_file() {
        let (_dir, path) = ghost_test_utils::temp_file("abc");

        assert_eq!(digest_file(&path).unwrap(), digest(b"abc"));
        assert_eq!(Sha256FileHasher.digest_file(&path).unwrap(), digest(b"abc"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = digest_file(&dir.path().join("nope")).unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, LedgerError::FileRead { .. }));
    }
}
