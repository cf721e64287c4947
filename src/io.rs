use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;

/// Threshold in bytes above which we attempt to use mmap for reading.
/// Callers can override via API; this is a reasonable default.
pub const DEFAULT_MMAP_THRESHOLD_BYTES: u64 = 16 * 1024 * 1024; // 16 MiB

/// Decide whether to use mmap based on file size and threshold.
pub fn should_use_mmap(file_size_bytes: u64, threshold_bytes: u64) -> bool {
    file_size_bytes >= threshold_bytes
}

fn text_from_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Read the whole file through a buffered handle.
pub fn read_document_bufread<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut file =
        File::open(&path).with_context(|| format!("open {}", path.as_ref().display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .with_context(|| format!("read {}", path.as_ref().display()))?;
    Ok(text_from_bytes(&bytes))
}

/// Read the whole file through a memory map.
pub fn read_document_mmap<P: AsRef<Path>>(path: P) -> Result<String> {
    let file = File::open(&path).with_context(|| format!("open {}", path.as_ref().display()))?;
    let mmap =
        unsafe { Mmap::map(&file) }.with_context(|| format!("mmap {}", path.as_ref().display()))?;
    Ok(text_from_bytes(&mmap))
}

/// Choose mmap or bufread and return the document text. Invalid UTF-8 is
/// replaced rather than rejected.
pub fn read_document<P: AsRef<Path>>(path: P, threshold_bytes: u64) -> Result<String> {
    let meta =
        std::fs::metadata(&path).with_context(|| format!("stat {}", path.as_ref().display()))?;
    if meta.is_file() && meta.len() > 0 && should_use_mmap(meta.len(), threshold_bytes) {
        read_document_mmap(path)
    } else {
        read_document_bufread(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn both_paths_read_the_same_text() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("dump.html");
        std::fs::write(&p, b"<table>caf\xc3\xa9\xff</table>").unwrap();
        let small = read_document(&p, u64::MAX).unwrap();
        let mapped = read_document(&p, 1).unwrap();
        assert_eq!(small, mapped);
        assert!(small.starts_with("<table>café"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = read_document(dir.path().join("nope.html"), 1).unwrap_err();
        assert!(err.to_string().contains("stat"));
    }
}
