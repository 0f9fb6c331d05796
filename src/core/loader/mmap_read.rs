//! Memory-mapped file reads for large source images.
//!
//! Files of 1MB or more are mapped instead of copied into a heap buffer.

use crate::error::LoadError;
use memmap2::Mmap;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Files at least this large are mapped rather than read
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Read a whole file, mapping it when it is large.
pub fn read_file_bytes(path: &Path) -> Result<SourceBytes, LoadError> {
    let metadata = std::fs::metadata(path).map_err(|e| io_error(path, e))?;

    if !metadata.is_file() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if metadata.len() >= MMAP_THRESHOLD {
        read_mmap(path)
    } else {
        let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;
        Ok(SourceBytes::Owned(bytes))
    }
}

fn read_mmap(path: &Path) -> Result<SourceBytes, LoadError> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;

    // SAFETY: read-only mapping; the file is not modified while it is loaded.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| io_error(path, e))?;

    Ok(SourceBytes::Mapped(mmap))
}

fn io_error(path: &Path, source: std::io::Error) -> LoadError {
    if source.kind() == ErrorKind::NotFound {
        LoadError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Contents of a source image file
#[derive(Debug)]
pub enum SourceBytes {
    /// Read into memory
    Owned(Vec<u8>),
    /// Mapped from disk
    Mapped(Mmap),
}

impl SourceBytes {
    pub fn is_mapped(&self) -> bool {
        matches!(self, SourceBytes::Mapped(_))
    }
}

impl std::ops::Deref for SourceBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            SourceBytes::Owned(bytes) => bytes,
            SourceBytes::Mapped(map) => map,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn small_files_are_read_into_memory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("small.bin");
        File::create(&path).unwrap().write_all(b"hello").unwrap();

        let bytes = read_file_bytes(&path).unwrap();
        assert!(!bytes.is_mapped());
        assert_eq!(&*bytes, b"hello");
        assert!(format!("{:?}", bytes).starts_with("Owned"));
    }

    #[test]
    fn large_files_are_mapped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("large.bin");
        let data = vec![7u8; MMAP_THRESHOLD as usize];
        File::create(&path).unwrap().write_all(&data).unwrap();

        let bytes = read_file_bytes(&path).unwrap();
        assert!(bytes.is_mapped());
        assert_eq!(bytes.len(), data.len());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_file_bytes(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }
}
