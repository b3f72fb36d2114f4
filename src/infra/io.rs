use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use memmap2::Mmap;

use crate::core::error::LineEditError;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

/// Raw file bytes, mapped or buffered depending on size.
pub enum FileBytes {
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl AsRef<[u8]> for FileBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            FileBytes::Mapped(mmap) => &mmap[..],
            FileBytes::Buffered(v) => v.as_slice(),
        }
    }
}

impl FileBytes {
    pub fn into_vec(self) -> Vec<u8> {
        match self {
            FileBytes::Mapped(mmap) => mmap.to_vec(),
            FileBytes::Buffered(v) => v,
        }
    }
}

/// Read a file's bytes without any decoding.
/// A missing file maps to `FileNotFound`; everything else to `Io`.
pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<FileBytes, LineEditError> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|e| not_found_or_io(path, "stat", e))?;

    if metadata.len() > MMAP_THRESHOLD {
        let file = File::open(path).map_err(|e| not_found_or_io(path, "open", e))?;

        // Safety: read-only mapping; the file is replaced by rename, never rewritten in place
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| LineEditError::io("memory-map", path, e))?;

        Ok(FileBytes::Mapped(mmap))
    } else {
        let bytes = std::fs::read(path).map_err(|e| not_found_or_io(path, "read", e))?;
        Ok(FileBytes::Buffered(bytes))
    }
}

fn not_found_or_io(path: &Path, action: &'static str, e: std::io::Error) -> LineEditError {
    if e.kind() == ErrorKind::NotFound {
        LineEditError::FileNotFound(path.to_path_buf())
    } else {
        LineEditError::io(action, path, e)
    }
}

/// True when the first KiB holds a NUL byte.
pub fn looks_binary(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    memchr::memchr(0, head).is_some()
}

/// Human-readable byte size: `512B`, `1.5KB`, `2.0MB`.
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if size < KB {
        format!("{size}B")
    } else if size < MB {
        format!("{:.1}KB", size as f64 / KB as f64)
    } else {
        format!("{:.1}MB", size as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1023), "1023B");
        assert_eq!(format_size(1536), "1.5KB");
        assert_eq!(format_size(2 * 1024 * 1024), "2.0MB");
    }

    #[test]
    fn test_read_bytes_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_bytes(dir.path().join("nope.txt")).err().unwrap();
        assert!(matches!(err, LineEditError::FileNotFound(_)));
    }

    #[test]
    fn test_read_bytes_small_and_large() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("small.bin");
        std::fs::write(&small, b"\xFF\x00abc").unwrap();
        let got = read_bytes(&small).unwrap();
        assert!(matches!(got, FileBytes::Buffered(_)));
        assert_eq!(got.as_ref(), b"\xFF\x00abc");

        let large = dir.path().join("large.txt");
        let body = vec![b'x'; (MMAP_THRESHOLD + 10) as usize];
        std::fs::write(&large, &body).unwrap();
        let got = read_bytes(&large).unwrap();
        assert!(matches!(got, FileBytes::Mapped(_)));
        assert_eq!(got.into_vec(), body);
    }

    #[test]
    fn test_looks_binary() {
        assert!(looks_binary(b"ab\0cd"));
        assert!(!looks_binary(b"plain text\n"));
    }
}
