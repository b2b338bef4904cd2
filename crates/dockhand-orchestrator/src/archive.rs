//! Extraction of single files from container archive streams.
//!
//! The engine's archive endpoint returns a tar stream even for a single
//! file; this module unwraps the requested entry and writes its raw bytes
//! to the caller's sink.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use dockhand_common::error::{DockhandError, Result};

/// Copies the entry matching `wanted` (by full path or file name) from a
/// tar stream into `out`, returning the number of bytes written.
///
/// # Errors
///
/// `Io` when the stream is not a readable tar archive, the entry is
/// absent, or the sink fails.
pub(crate) fn extract_file(
    stream: impl Read,
    wanted: &str,
    out: &mut dyn Write,
) -> Result<u64> {
    let wanted_name = Path::new(wanted).file_name();
    let mut archive = tar::Archive::new(stream);
    let entries = archive
        .entries()
        .map_err(|e| io_error(wanted, e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| io_error(wanted, e))?;
        let path = entry.path().map_err(|e| io_error(wanted, e))?;
        let matches = &*path == Path::new(wanted)
            || (path.file_name().is_some() && path.file_name() == wanted_name);
        if matches && entry.header().entry_type().is_file() {
            return std::io::copy(&mut entry, out).map_err(|e| io_error(wanted, e));
        }
    }

    Err(io_error(
        wanted,
        std::io::Error::new(std::io::ErrorKind::NotFound, "entry not present in archive"),
    ))
}

fn io_error(path: &str, source: std::io::Error) -> DockhandError {
    DockhandError::Io {
        path: PathBuf::from(path),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tar_with_file(path: &str, contents: &[u8]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, contents).unwrap();
        builder.into_inner().unwrap()
    }

    #[test]
    fn extracts_entry_by_file_name() {
        let tar_bytes = tar_with_file("server.xml", b"<Server/>");
        let mut out = Vec::new();
        let size = extract_file(tar_bytes.as_slice(), "/opt/conf/server.xml", &mut out).unwrap();
        assert_eq!(size, 9);
        assert_eq!(out, b"<Server/>");
    }

    #[test]
    fn missing_entry_is_an_error() {
        let tar_bytes = tar_with_file("other.txt", b"x");
        let mut out = Vec::new();
        let result = extract_file(tar_bytes.as_slice(), "server.xml", &mut out);
        assert!(matches!(result, Err(DockhandError::Io { .. })));
        assert!(out.is_empty());
    }

    #[test]
    fn garbage_stream_is_an_error() {
        let mut out = Vec::new();
        let result = extract_file(&b"not a tar stream at all"[..], "f", &mut out);
        assert!(result.is_err());
    }
}
