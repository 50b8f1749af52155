// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Owned PDF object graph backed by `lopdf`: load, inspect, mutate and save.

use chrono::Utc;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use orbit_core::{EngineError, MetadataFields, PageSize, Rect, Result};
use tracing::{debug, info, instrument, warn};

use crate::pdf::objects::{
    decode_text_string, inherited, number, rect_from_object, rect_to_object, text_string,
};
use crate::protect;

/// How a document is opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions<'a> {
    /// Password for a visual-locked document.
    pub password: Option<&'a str>,
    /// Open documents carrying an /Encrypt dictionary instead of rejecting them.
    /// The dictionary is dropped; stream contents are left as parsed.
    pub ignore_encryption: bool,
}

/// Resolved geometry of a single page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub media_box: Rect,
    /// Equal to the media box when the page has none.
    pub crop_box: Rect,
    /// Normalised to `0..360`.
    pub rotation: i64,
}

impl PageGeometry {
    pub fn size(&self) -> PageSize {
        PageSize {
            width: self.media_box.width,
            height: self.media_box.height,
        }
    }
}

/// An owned, in-memory PDF document.
///
/// Every engine operation loads one of these from bytes, transforms it, and
/// saves it back; no handle outlives a call.
pub struct DocumentHandle {
    document: Document,
}

impl DocumentHandle {
    // -- Construction ---------------------------------------------------------

    /// Load a document from raw bytes with default options.
    pub fn load(data: &[u8]) -> Result<Self> {
        Self::load_with(data, LoadOptions::default())
    }

    /// Load a document from raw bytes.
    ///
    /// Fails with [`EngineError::Load`] on malformed input and
    /// [`EngineError::Encrypted`] when the document is encrypted or
    /// visual-locked and the password is missing or wrong.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn load_with(data: &[u8], options: LoadOptions<'_>) -> Result<Self> {
        let mut document = Document::load_mem(data)
            .map_err(|err| EngineError::Load(format!("failed to parse PDF: {}", err)))?;

        if document.trailer.has(b"Encrypt") {
            if !options.ignore_encryption {
                return Err(EngineError::Encrypted(
                    "document carries an /Encrypt dictionary".to_string(),
                ));
            }
            warn!("Ignoring /Encrypt dictionary");
            document.trailer.remove(b"Encrypt");
        }

        protect::check_lock(&document, options.password)?;

        if document.catalog().is_err() {
            return Err(EngineError::Load("document has no catalog".to_string()));
        }

        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    /// A new document with an empty page tree.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Page object ids in page order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.document.get_pages().into_values().collect()
    }

    /// Object id of the zero-based page `index`.
    pub fn page_id(&self, index: usize) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages
            .get(&(index as u32 + 1))
            .copied()
            .ok_or_else(|| {
                EngineError::InvalidArgument(format!(
                    "page index {} out of range (document has {} pages)",
                    index,
                    pages.len()
                ))
            })
    }

    /// Media box, crop box, and rotation of the zero-based page `index`,
    /// resolving inherited attributes.
    pub fn page_geometry(&self, index: usize) -> Result<PageGeometry> {
        let page_id = self.page_id(index)?;
        Ok(geometry_of(&self.document, page_id))
    }

    /// Id of the root /Pages node.
    pub fn pages_root(&self) -> Result<ObjectId> {
        pages_root(&self.document)
    }

    // -- Page mutation --------------------------------------------------------

    /// Rotate one page by `delta` degrees (multiple of 90), additive mod 360.
    /// Returns the new rotation.
    pub fn rotate_page(&mut self, index: usize, delta: i64) -> Result<i64> {
        if delta % 90 != 0 {
            return Err(EngineError::InvalidArgument(format!(
                "rotation must be a multiple of 90, got {}",
                delta
            )));
        }
        let page_id = self.page_id(index)?;
        let existing = geometry_of(&self.document, page_id).rotation;
        let rotation = (existing + delta).rem_euclid(360);

        let page = self.page_dict_mut(page_id)?;
        page.set("Rotate", rotation);
        debug!(index, existing, rotation, "Page rotated");
        Ok(rotation)
    }

    /// Replace the crop box of a page. Degenerate boxes are rejected.
    pub fn set_crop_box(&mut self, index: usize, crop: Rect) -> Result<()> {
        if crop.is_degenerate() {
            return Err(EngineError::InvalidArgument(format!(
                "crop box {:?} has no area",
                crop
            )));
        }
        let page_id = self.page_id(index)?;
        let page = self.page_dict_mut(page_id)?;
        page.set("CropBox", rect_to_object(&crop));
        Ok(())
    }

    /// Append a page built from raw content bytes and a resource dictionary.
    pub fn append_page(
        &mut self,
        size: PageSize,
        content: Vec<u8>,
        resources: Dictionary,
    ) -> Result<ObjectId> {
        let pages_id = self.pages_root()?;
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), content));
        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => rect_to_object(&Rect::new(0.0, 0.0, size.width, size.height)),
            "Contents" => content_id,
            "Resources" => resources,
        });
        attach_to_pages(&mut self.document, pages_id, page_id)?;
        Ok(page_id)
    }

    /// Append `content` to a page's content stream list, wrapping the
    /// existing content in `q`/`Q` so its graphics state cannot leak.
    pub fn append_content(&mut self, page_id: ObjectId, content: Vec<u8>) -> Result<()> {
        let existing = self.page_dict_mut(page_id)?.remove(b"Contents");
        let mut streams = Vec::new();
        if let Some(existing) = existing {
            let open = self.document.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            let close = self.document.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
            streams.push(Object::Reference(open));
            match existing {
                Object::Array(items) => streams.extend(items),
                other => streams.push(other),
            }
            streams.push(Object::Reference(close));
        }
        let overlay = self.document.add_object(Stream::new(Dictionary::new(), content));
        streams.push(Object::Reference(overlay));

        self.page_dict_mut(page_id)?
            .set("Contents", Object::Array(streams));
        Ok(())
    }

    pub(crate) fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        self.document.get_dictionary_mut(page_id).map_err(|err| {
            EngineError::Load(format!("page object {:?} is not a dictionary: {}", page_id, err))
        })
    }

    /// The document catalog (/Root).
    pub fn catalog_mut(&mut self) -> Result<&mut Dictionary> {
        let root = match self.document.trailer.get(b"Root") {
            Ok(Object::Reference(id)) => *id,
            _ => return Err(EngineError::Load("trailer has no /Root reference".to_string())),
        };
        self.document
            .get_dictionary_mut(root)
            .map_err(|err| EngineError::Load(format!("/Root is not a dictionary: {}", err)))
    }

    // -- Metadata -------------------------------------------------------------

    /// Read the document information fields.
    pub fn metadata(&self) -> MetadataFields {
        let info = self
            .document
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|obj| crate::pdf::objects::resolve_dict(&self.document, obj));
        let field = |key: &[u8]| -> Option<String> {
            match info?.get(key).ok()? {
                Object::String(bytes, _) => Some(decode_text_string(bytes)),
                _ => None,
            }
        };
        MetadataFields {
            title: field(b"Title"),
            author: field(b"Author"),
            subject: field(b"Subject"),
            keywords: field(b"Keywords")
                .map(|k| k.split_whitespace().map(str::to_string).collect()),
            creator: field(b"Creator"),
            producer: field(b"Producer"),
        }
    }

    /// Write each provided field into /Info and refresh /ModDate.
    #[instrument(skip_all)]
    pub fn set_metadata(&mut self, fields: &MetadataFields) -> Result<()> {
        let info = self.info_dict_mut()?;
        let mut written = 0usize;
        let mut write = |key: &str, value: Option<&str>| {
            if let Some(value) = value {
                info.set(key, text_string(value));
                written += 1;
            }
        };
        write("Title", fields.title.as_deref());
        write("Author", fields.author.as_deref());
        write("Subject", fields.subject.as_deref());
        let keywords = fields.keywords.as_ref().map(|k| k.join(" "));
        write("Keywords", keywords.as_deref());
        write("Creator", fields.creator.as_deref());
        write("Producer", fields.producer.as_deref());

        let stamp = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        info.set("ModDate", text_string(&stamp));
        info!(written, "Metadata updated");
        Ok(())
    }

    /// The /Info dictionary, created when absent.
    pub fn info_dict_mut(&mut self) -> Result<&mut Dictionary> {
        let existing = match self.document.trailer.get(b"Info") {
            Ok(Object::Reference(id)) if self.document.get_dictionary(*id).is_ok() => Some(*id),
            _ => None,
        };
        let info_id = match existing {
            Some(id) => id,
            None => {
                // Inline /Info dictionaries are moved into their own object.
                let inline = match self.document.trailer.get(b"Info") {
                    Ok(Object::Dictionary(dict)) => dict.clone(),
                    _ => Dictionary::new(),
                };
                let id = self.document.add_object(inline);
                self.document.trailer.set("Info", id);
                id
            }
        };
        self.document
            .get_dictionary_mut(info_id)
            .map_err(|err| EngineError::Load(format!("/Info is not a dictionary: {}", err)))
    }

    // -- Output ---------------------------------------------------------------

    /// Serialize with unreferenced objects pruned, ids renumbered, and
    /// streams compressed.
    pub fn save(mut self) -> Result<Vec<u8>> {
        self.to_bytes()
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.document.prune_objects();
        self.document.renumber_objects();
        self.document.compress();

        let mut output = Vec::new();
        self.document
            .save_to(&mut output)
            .map_err(|err| EngineError::Save(format!("failed to serialise PDF: {}", err)))?;
        debug!(output_bytes = output.len(), "PDF serialised");
        Ok(output)
    }
}

impl Default for DocumentHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Geometry of a page object, falling back to US Letter when no usable
/// MediaBox is found.
pub(crate) fn geometry_of(doc: &Document, page_id: ObjectId) -> PageGeometry {
    let media_box = inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| rect_from_object(doc, obj))
        .filter(|rect| !rect.is_degenerate())
        .unwrap_or(Rect::new(0.0, 0.0, PageSize::LETTER.width, PageSize::LETTER.height));
    let crop_box = inherited(doc, page_id, b"CropBox")
        .and_then(|obj| rect_from_object(doc, obj))
        .filter(|rect| !rect.is_degenerate())
        .unwrap_or(media_box);
    let rotation = inherited(doc, page_id, b"Rotate")
        .and_then(number)
        .map(|r| (r as i64).rem_euclid(360))
        .unwrap_or(0);
    PageGeometry {
        media_box,
        crop_box,
        rotation,
    }
}

pub(crate) fn pages_root(doc: &Document) -> Result<ObjectId> {
    let catalog = doc
        .catalog()
        .map_err(|err| EngineError::Load(format!("no catalog: {}", err)))?;
    match catalog.get(b"Pages") {
        Ok(Object::Reference(id)) => Ok(*id),
        Ok(_) => Err(EngineError::Load("/Pages is not a reference".to_string())),
        Err(err) => Err(EngineError::Load(format!("no /Pages: {}", err))),
    }
}

/// Append `page_id` to the /Kids of `pages_id` and bump /Count.
pub(crate) fn attach_to_pages(
    doc: &mut Document,
    pages_id: ObjectId,
    page_id: ObjectId,
) -> Result<()> {
    let pages = doc
        .get_dictionary_mut(pages_id)
        .map_err(|err| EngineError::Load(format!("/Pages is not a dictionary: {}", err)))?;
    match pages.get_mut(b"Kids") {
        Ok(Object::Array(kids)) => kids.push(Object::Reference(page_id)),
        _ => pages.set("Kids", vec![Object::Reference(page_id)]),
    }
    let count = pages.get(b"Count").ok().and_then(number).unwrap_or(0.0) as i64;
    pages.set("Count", count + 1);

    if let Ok(page) = doc.get_dictionary_mut(page_id) {
        page.set("Parent", pages_id);
    }
    Ok(())
}
