// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page copying between documents. Pages are deep-cloned together with every
// object they reference so the copy is independent of the source document.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use orbit_core::{EngineError, Rect, Result};
use tracing::{debug, warn};

use crate::pdf::handle::geometry_of;
use crate::pdf::objects::{inherited, page_content, rect_to_object};

/// Attributes a page may inherit from its ancestors in the page tree. They
/// are inlined on copy because the copied page gets a new parent.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Copies pages out of one source document.
///
/// Objects shared between copied pages (fonts, images, resource dictionaries)
/// are cloned once per copier and reused, so copying a page twice or copying
/// many pages that share a font does not duplicate the shared objects.
pub struct PageCopier<'s> {
    source: &'s Document,
    copied: HashMap<ObjectId, ObjectId>,
}

impl<'s> PageCopier<'s> {
    pub fn new(source: &'s Document) -> Self {
        Self {
            source,
            copied: HashMap::new(),
        }
    }

    /// Deep-clone the page `page_id` into `target` and return the new page
    /// object id. The page is not yet attached to the target page tree.
    pub fn copy_page(&mut self, target: &mut Document, page_id: ObjectId) -> Result<ObjectId> {
        let page = self.source.get_dictionary(page_id).map_err(|err| {
            EngineError::Load(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        let mut cloned = Dictionary::new();
        for (key, value) in page.iter() {
            if key == b"Parent" {
                continue;
            }
            cloned.set(key.clone(), self.clone_object(target, value));
        }
        for key in INHERITABLE {
            if cloned.has(key) {
                continue;
            }
            if let Some(value) = inherited(self.source, page_id, key) {
                cloned.set(key.to_vec(), self.clone_object(target, value));
            }
        }

        // Each copy of a page is a distinct page object, even when the same
        // source page is copied twice.
        let new_id = target.add_object(cloned);
        debug!(?page_id, ?new_id, "Page copied");
        Ok(new_id)
    }

    /// Clone page `page_id` into `target` as a Form XObject whose /BBox is
    /// the page's media box. Returns the form id and that box.
    pub fn copy_page_as_form(
        &mut self,
        target: &mut Document,
        page_id: ObjectId,
    ) -> Result<(ObjectId, Rect)> {
        let page = self.source.get_dictionary(page_id).map_err(|err| {
            EngineError::Load(format!("cannot read page object {:?}: {}", page_id, err))
        })?;
        let media_box = geometry_of(self.source, page_id).media_box;
        let content = page_content(self.source, page);

        let mut dict = Dictionary::new();
        dict.set("Type", "XObject");
        dict.set("Subtype", "Form");
        dict.set("BBox", rect_to_object(&media_box));
        if let Some(resources) = inherited(self.source, page_id, b"Resources") {
            let cloned = self.clone_object(target, resources);
            dict.set("Resources", cloned);
        }
        let id = target.add_object(Stream::new(dict, content));
        debug!(?page_id, form = ?id, "Page embedded as form");
        Ok((id, media_box))
    }

    /// Number of non-page objects cloned so far.
    pub fn shared_objects(&self) -> usize {
        self.copied.len()
    }

    fn clone_reference(&mut self, target: &mut Document, id: ObjectId) -> Object {
        if let Some(existing) = self.copied.get(&id) {
            return Object::Reference(*existing);
        }
        let Ok(object) = self.source.get_object(id) else {
            warn!(?id, "Cannot resolve reference, using Null");
            return Object::Null;
        };
        // Reserve the id before descending so reference cycles terminate.
        let new_id = target.new_object_id();
        self.copied.insert(id, new_id);
        let cloned = self.clone_object(target, object);
        target.objects.insert(new_id, cloned);
        Object::Reference(new_id)
    }

    fn clone_object(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Reference(id) => self.clone_reference(target, *id),
            Object::Dictionary(dict) => Object::Dictionary(self.clone_dict(target, dict)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.clone_object(target, item))
                    .collect(),
            ),
            Object::Stream(stream) => {
                let dict = self.clone_dict(target, &stream.dict);
                let mut copy = Stream::new(dict, stream.content.clone());
                copy.allows_compression = stream.allows_compression;
                Object::Stream(copy)
            }
            other => other.clone(),
        }
    }

    fn clone_dict(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut cloned = Dictionary::new();
        for (key, value) in dict.iter() {
            // /Parent links point back into the source page tree.
            if key == b"Parent" {
                continue;
            }
            cloned.set(key.clone(), self.clone_object(target, value));
        }
        cloned
    }
}
