// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Zip packaging for operations that fan out to one file per page.

use std::io::{Cursor, Write};

use orbit_core::{EngineError, Result};
use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Entry name for page `page` (1-based) of a document called `base_name`.
pub fn page_entry_name(base_name: &str, page: usize, extension: &str) -> String {
    format!("{}_page_{}.{}", base_name, page, extension)
}

/// File name without directories or its final extension, e.g.
/// `/tmp/report.final.pdf` becomes `report.final`.
pub fn base_name(file_name: &str) -> &str {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Deflate every `(name, bytes)` entry into one archive, in the given order.
pub fn build_archive(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in entries {
        writer
            .start_file(name.as_str(), options)
            .map_err(|err| EngineError::Archive(format!("cannot add '{}': {}", name, err)))?;
        writer
            .write_all(bytes)
            .map_err(|err| EngineError::Archive(format!("cannot write '{}': {}", name, err)))?;
    }

    let cursor = writer
        .finish()
        .map_err(|err| EngineError::Archive(format!("cannot finish archive: {}", err)))?;
    let archive = cursor.into_inner();
    debug!(entries = entries.len(), archive_bytes = archive.len(), "Archive built");
    Ok(archive)
}

/// Package documents produced by a page fan-out as `<base>_page_<n>.<ext>`.
pub fn package_pages(base: &str, extension: &str, pages: Vec<Vec<u8>>) -> Result<Vec<u8>> {
    let entries: Vec<(String, Vec<u8>)> = pages
        .into_iter()
        .enumerate()
        .map(|(index, bytes)| (page_entry_name(base, index + 1, extension), bytes))
        .collect();
    build_archive(&entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn base_name_strips_directories_and_extension() {
        assert_eq!(base_name("/tmp/report.final.pdf"), "report.final");
        assert_eq!(base_name("C:\\docs\\scan.pdf"), "scan");
        assert_eq!(base_name("noext"), "noext");
        assert_eq!(base_name(".hidden"), ".hidden");
    }

    #[test]
    fn entries_keep_page_order() {
        let archive =
            package_pages("doc", "pdf", vec![b"one".to_vec(), b"two".to_vec()]).unwrap();
        let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
        assert_eq!(zip.len(), 2);

        let mut second = zip.by_index(1).unwrap();
        assert_eq!(second.name(), "doc_page_2.pdf");
        let mut body = String::new();
        second.read_to_string(&mut body).unwrap();
        assert_eq!(body, "two");
    }
}
