// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Small helpers over the lopdf object model: numeric coercion, reference
// resolution, inherited page attributes, and content stream access.

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use orbit_core::Rect;
use tracing::warn;

/// Maximum number of /Parent hops when resolving inherited attributes.
pub const INHERITANCE_DEPTH: usize = 32;

/// Coerce an Integer or Real object to `f32`.
pub fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}

/// Follow a reference one level; anything else is returned as-is.
pub fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

/// Resolve an object that should be a dictionary, inline or by reference.
pub fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, object) {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Parse a four-number box array into a [`Rect`].
pub fn rect_from_object(doc: &Document, object: &Object) -> Option<Rect> {
    let Object::Array(values) = resolve(doc, object) else {
        return None;
    };
    let numbers: Vec<f32> = values
        .iter()
        .filter_map(|value| number(resolve(doc, value)))
        .collect();
    match numbers.as_slice() {
        [llx, lly, urx, ury] => Some(Rect::from_corners(*llx, *lly, *urx, *ury)),
        _ => None,
    }
}

pub fn rect_to_object(rect: &Rect) -> Object {
    Object::Array(rect.corners().iter().map(|v| Object::Real(*v)).collect())
}

/// Look up `key` on a page dictionary, walking /Parent until found.
pub fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..INHERITANCE_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => *parent,
            _ => return None,
        };
    }
    warn!(?page_id, "Page tree deeper than inheritance limit");
    None
}

/// Concatenated, decompressed content of every stream in a page's /Contents.
pub fn page_content(doc: &Document, page: &Dictionary) -> Vec<u8> {
    let Ok(contents) = page.get(b"Contents") else {
        return Vec::new();
    };
    let mut content = Vec::new();
    let mut push_stream = |object: &Object| {
        if let Object::Stream(stream) = resolve(doc, object) {
            let bytes = if stream.dict.has(b"Filter") {
                match stream.decompressed_content() {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        warn!(%err, "Cannot decompress content stream, skipping");
                        return;
                    }
                }
            } else {
                stream.content.clone()
            };
            if !content.is_empty() {
                content.push(b'\n');
            }
            content.extend_from_slice(&bytes);
        }
    };
    match resolve(doc, contents) {
        Object::Array(items) => items.iter().for_each(&mut push_stream),
        other => push_stream(other),
    }
    content
}

/// Text string object. Non-Latin-1 text is written as UTF-16BE with a BOM.
pub fn text_string(value: &str) -> Object {
    if value.chars().all(|c| (c as u32) < 0x80) {
        Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in value.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, otherwise Latin-1).
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|b| *b as char).collect()
    }
}

pub fn name_of(object: &Object) -> Option<&[u8]> {
    match object {
        Object::Name(name) => Some(name.as_slice()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn inherited_walks_parent_chain() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page_id)],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 200.into(), 300.into()],
            }),
        );

        let media = inherited(&doc, page_id, b"MediaBox")
            .and_then(|obj| rect_from_object(&doc, obj))
            .expect("inherited media box");
        assert_eq!(media, Rect::new(0.0, 0.0, 200.0, 300.0));
        assert!(inherited(&doc, page_id, b"CropBox").is_none());
    }

    #[test]
    fn text_strings_round_trip() {
        let Object::String(bytes, _) = text_string("Zoë ✓") else {
            panic!("expected string object");
        };
        assert_eq!(decode_text_string(&bytes), "Zoë ✓");

        let Object::String(ascii, _) = text_string("plain") else {
            panic!("expected string object");
        };
        assert_eq!(ascii, b"plain");
    }
}
