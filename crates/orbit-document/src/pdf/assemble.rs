// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page assembly and whole-document edits. Every operation copies pages into
// a fresh document or mutates a loaded one, then serialises it.

use orbit_core::{EngineError, Margins, MetadataFields, Result};
use tracing::{debug, info, instrument, warn};

use crate::pdf::clone::PageCopier;
use crate::pdf::handle::{DocumentHandle, attach_to_pages};
use crate::pdf::range::parse_page_range;

/// Copy the zero-based `indices` of `source` into `target`, in the given
/// order, appending them to the target page tree. Indices may repeat.
pub fn copy_pages(
    source: &DocumentHandle,
    indices: &[usize],
    target: &mut DocumentHandle,
) -> Result<()> {
    let page_ids = source.page_ids();
    let pages_root = target.pages_root()?;
    let mut copier = PageCopier::new(source.document());

    for &index in indices {
        let page_id = *page_ids.get(index).ok_or_else(|| {
            EngineError::InvalidArgument(format!(
                "page index {} out of range (document has {} pages)",
                index,
                page_ids.len()
            ))
        })?;
        let new_id = copier.copy_page(target.document_mut(), page_id)?;
        attach_to_pages(target.document_mut(), pages_root, new_id)?;
    }
    debug!(
        copied = indices.len(),
        shared_objects = copier.shared_objects(),
        "Pages copied"
    );
    Ok(())
}

/// Concatenate the pages of every input, in input order.
#[instrument(skip_all, fields(inputs = inputs.len()))]
pub fn merge(inputs: &[&[u8]]) -> Result<Vec<u8>> {
    let mut merged = DocumentHandle::new();
    for (position, data) in inputs.iter().enumerate() {
        let source = DocumentHandle::load(data).map_err(|err| match err {
            EngineError::Load(reason) => {
                EngineError::Load(format!("input #{}: {}", position + 1, reason))
            }
            other => other,
        })?;
        let all: Vec<usize> = (0..source.page_count()).collect();
        copy_pages(&source, &all, &mut merged)?;
    }
    info!(pages = merged.page_count(), "Merge complete");
    merged.save()
}

/// One document holding exactly the pages selected by a range expression,
/// in ascending page order.
#[instrument(skip(data), fields(bytes_len = data.len()))]
pub fn extract_range(data: &[u8], range: &str) -> Result<Vec<u8>> {
    let source = DocumentHandle::load(data)?;
    let pages = parse_page_range(range, source.page_count())?;
    let indices: Vec<usize> = pages.iter().map(|page| page - 1).collect();

    let mut extracted = DocumentHandle::new();
    copy_pages(&source, &indices, &mut extracted)?;
    info!(selected = indices.len(), "Range extracted");
    extracted.save()
}

/// One single-page document per page, in page order.
#[instrument(skip_all, fields(bytes_len = data.len()))]
pub fn burst(data: &[u8]) -> Result<Vec<Vec<u8>>> {
    let source = DocumentHandle::load(data)?;
    let mut outputs = Vec::with_capacity(source.page_count());
    for index in 0..source.page_count() {
        let mut single = DocumentHandle::new();
        copy_pages(&source, &[index], &mut single)?;
        outputs.push(single.save()?);
    }
    info!(pages = outputs.len(), "Burst complete");
    Ok(outputs)
}

/// Rebuild the document from zero-based source indices in output order.
/// Omitted indices are deleted; repeated indices are duplicated.
#[instrument(skip(data), fields(bytes_len = data.len()))]
pub fn organize(data: &[u8], order: &[usize]) -> Result<Vec<u8>> {
    let source = DocumentHandle::load(data)?;
    let mut organized = DocumentHandle::new();
    copy_pages(&source, order, &mut organized)?;
    info!(
        source_pages = source.page_count(),
        output_pages = order.len(),
        "Pages organized"
    );
    organized.save()
}

/// Add `degrees` (multiple of 90) to the rotation of every page.
#[instrument(skip(data), fields(bytes_len = data.len()))]
pub fn rotate(data: &[u8], degrees: i64) -> Result<Vec<u8>> {
    let mut handle = DocumentHandle::load(data)?;
    for index in 0..handle.page_count() {
        handle.rotate_page(index, degrees)?;
    }
    handle.save()
}

/// Subtract per-side margins from every page's crop box. Pages whose crop
/// box would become degenerate are left unchanged.
#[instrument(skip(data), fields(bytes_len = data.len()))]
pub fn trim(data: &[u8], margins: &Margins) -> Result<Vec<u8>> {
    let mut handle = DocumentHandle::load(data)?;
    let mut skipped = 0usize;
    for index in 0..handle.page_count() {
        let crop = handle.page_geometry(index)?.crop_box;
        match crop.trimmed(margins) {
            Some(trimmed) => handle.set_crop_box(index, trimmed)?,
            None => {
                warn!(index, ?crop, "Trim would leave no visible area, page skipped");
                skipped += 1;
            }
        }
    }
    info!(pages = handle.page_count(), skipped, "Trim complete");
    handle.save()
}

/// Write the provided metadata fields; absent fields keep their old values.
#[instrument(skip_all, fields(bytes_len = data.len()))]
pub fn edit_metadata(data: &[u8], fields: &MetadataFields) -> Result<Vec<u8>> {
    let mut handle = DocumentHandle::load(data)?;
    handle.set_metadata(fields)?;
    handle.save()
}
