// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image XObjects: wrap encoded JPEG frames or decoded raster images as PDF
// image objects.

use image::DynamicImage;
use lopdf::{Document, ObjectId, Stream, dictionary};
use orbit_core::{EngineError, Result};
use tracing::debug;

/// An image object added to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

/// Add an already-encoded baseline JPEG (RGB) without re-encoding.
pub fn embed_jpeg(doc: &mut Document, jpeg: Vec<u8>, width: u32, height: u32) -> EmbeddedImage {
    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    );
    stream.allows_compression = false;
    let id = doc.add_object(stream);
    EmbeddedImage { id, width, height }
}

/// Decode `bytes` (any format the `image` crate reads) and add it as an
/// RGB image with a soft mask carrying its alpha channel.
pub fn embed_decoded(doc: &mut Document, bytes: &[u8]) -> Result<EmbeddedImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|err| EngineError::Image(format!("failed to decode overlay image: {}", err)))?;
    Ok(embed_dynamic(doc, &decoded))
}

pub fn embed_dynamic(doc: &mut Document, decoded: &DynamicImage) -> EmbeddedImage {
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };
    if alpha.iter().any(|a| *a < 255) {
        let mask_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha,
        ));
        image_dict.set("SMask", mask_id);
    }
    let id = doc.add_object(Stream::new(image_dict, rgb));
    debug!(width, height, "Image embedded");
    EmbeddedImage { id, width, height }
}
