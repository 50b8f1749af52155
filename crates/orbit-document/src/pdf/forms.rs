// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interactive content: form flattening and annotation removal.

use lopdf::{Dictionary, Document, Object, ObjectId};
use orbit_core::{Rect, Result};
use tracing::{debug, info, instrument, warn};

use crate::geometry::Matrix;
use crate::pdf::canvas::Canvas;
use crate::pdf::handle::DocumentHandle;
use crate::pdf::objects::{name_of, number, rect_from_object, resolve, resolve_dict};

/// Annotation flag bit 2.
const HIDDEN_FLAG: i64 = 1 << 1;

/// A widget's normal appearance and where it is drawn.
struct Appearance {
    stream: ObjectId,
    rect: Rect,
    bbox: Rect,
    matrix: Matrix,
}

impl Appearance {
    /// Maps the appearance box (after the form's own /Matrix) onto the
    /// annotation rectangle.
    fn placement(&self) -> Option<Matrix> {
        let corners = [
            self.matrix.apply(self.bbox.x, self.bbox.y),
            self.matrix.apply(self.bbox.x + self.bbox.width, self.bbox.y),
            self.matrix.apply(self.bbox.x, self.bbox.y + self.bbox.height),
            self.matrix
                .apply(self.bbox.x + self.bbox.width, self.bbox.y + self.bbox.height),
        ];
        let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
        let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
        let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);
        let (w, h) = (max_x - min_x, max_y - min_y);
        if w <= 0.0 || h <= 0.0 || self.rect.is_degenerate() {
            return None;
        }
        Some(
            Matrix::translate(-min_x, -min_y)
                .then(&Matrix::scale(self.rect.width / w, self.rect.height / h))
                .then(&Matrix::translate(self.rect.x, self.rect.y)),
        )
    }
}

fn is_widget(annot: &Dictionary) -> bool {
    annot.get(b"Subtype").ok().and_then(name_of) == Some(b"Widget".as_slice())
}

/// The normal appearance stream selected by /AS, or the only one present.
fn appearance_of(doc: &Document, annot: &Dictionary) -> Option<Appearance> {
    let flags = annot.get(b"F").ok().and_then(number).unwrap_or(0.0) as i64;
    if flags & HIDDEN_FLAG != 0 {
        return None;
    }
    let rect = rect_from_object(doc, annot.get(b"Rect").ok()?)?;
    let normal = resolve_dict(doc, annot.get(b"AP").ok()?)?.get(b"N").ok()?;

    let stream = match normal {
        Object::Reference(id) if doc.get_object(*id).and_then(Object::as_stream).is_ok() => *id,
        other => {
            let states = resolve_dict(doc, other)?;
            let state = annot.get(b"AS").ok().and_then(name_of);
            let chosen = match state {
                Some(state) => states.get(state).ok()?,
                None => states.iter().next()?.1,
            };
            chosen.as_reference().ok()?
        }
    };

    let dict = &doc.get_object(stream).ok()?.as_stream().ok()?.dict;
    let bbox = rect_from_object(doc, dict.get(b"BBox").ok()?)?;
    let matrix = dict
        .get(b"Matrix")
        .ok()
        .map(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .and_then(|values| {
            let values: Vec<f32> = values.iter().filter_map(number).collect();
            Matrix::from_slice(&values)
        })
        .unwrap_or(Matrix::IDENTITY);
    Some(Appearance {
        stream,
        rect,
        bbox,
        matrix,
    })
}

/// Split a page's annotations into widget appearances and the annotations to keep.
fn page_widgets(doc: &Document, page_id: ObjectId) -> (Vec<Appearance>, Vec<Object>, usize) {
    let annots = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Annots").ok())
        .map(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok());
    let Some(annots) = annots else {
        return (Vec::new(), Vec::new(), 0);
    };

    let mut appearances = Vec::new();
    let mut kept = Vec::new();
    let mut widgets = 0;
    for entry in annots {
        match resolve_dict(doc, entry) {
            Some(annot) if is_widget(annot) => {
                widgets += 1;
                appearances.extend(appearance_of(doc, annot));
            }
            _ => kept.push(entry.clone()),
        }
    }
    (appearances, kept, widgets)
}

fn mark_as_form(doc: &mut Document, id: ObjectId) {
    if let Ok(Object::Stream(stream)) = doc.get_object_mut(id) {
        stream.dict.set("Type", "XObject");
        stream.dict.set("Subtype", "Form");
    }
}

/// Draw every visible widget's appearance into its page and drop the form:
/// widget annotations and the catalog /AcroForm are removed. A document
/// without a form is returned unchanged.
#[instrument(skip_all, fields(bytes_len = data.len()))]
pub fn flatten(data: &[u8]) -> Result<Vec<u8>> {
    let mut handle = DocumentHandle::load(data)?;
    let has_acroform = handle.catalog_mut()?.has(b"AcroForm");

    let mut total_widgets = 0;
    let mut drawn = 0;
    for page_id in handle.page_ids() {
        let (appearances, kept, widgets) = page_widgets(handle.document(), page_id);
        if widgets == 0 {
            continue;
        }
        total_widgets += widgets;

        let mut canvas = Canvas::new();
        for appearance in &appearances {
            let Some(placement) = appearance.placement() else {
                warn!(?page_id, "Widget appearance has no area, skipped");
                continue;
            };
            mark_as_form(handle.document_mut(), appearance.stream);
            canvas.xobject(appearance.stream, &placement, 1.0);
            drawn += 1;
        }
        canvas.stamp(&mut handle, page_id)?;

        let page = handle.page_dict_mut(page_id)?;
        if kept.is_empty() {
            page.remove(b"Annots");
        } else {
            page.set("Annots", Object::Array(kept));
        }
        debug!(?page_id, widgets, "Page flattened");
    }

    if !has_acroform && total_widgets == 0 {
        warn!("Document has no form fields, nothing to flatten");
        return Ok(data.to_vec());
    }
    handle.catalog_mut()?.remove(b"AcroForm");
    info!(widgets = total_widgets, drawn, "Form flattened");
    handle.save()
}

/// Remove every page's /Annots and the catalog /AcroForm.
#[instrument(skip_all, fields(bytes_len = data.len()))]
pub fn remove_annotations(data: &[u8]) -> Result<Vec<u8>> {
    let mut handle = DocumentHandle::load(data)?;
    let mut removed = 0;
    for page_id in handle.page_ids() {
        if handle.page_dict_mut(page_id)?.remove(b"Annots").is_some() {
            removed += 1;
        }
    }
    handle.catalog_mut()?.remove(b"AcroForm");
    info!(pages_with_annotations = removed, "Annotations removed");
    handle.save()
}
