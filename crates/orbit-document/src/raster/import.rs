// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image-to-PDF: one page per image using `printpdf` 0.8.
//
// printpdf builds documents from `PdfPage` values holding `Vec<Op>` lists;
// each image is added once as an XObject and placed at 72 DPI so one pixel
// maps to one point.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use orbit_core::{EngineError, ImageKind, Result};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

/// Points per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;
/// Placement resolution at which one pixel is one point.
const POINT_DPI: f32 = 72.0;

/// Decode an input image. PNG and JPEG are taken as-is; any other format the
/// `image` crate reads is first re-encoded as JPEG at `quality` (1..=100).
fn decode_input(bytes: &[u8], quality: u8) -> std::result::Result<DynamicImage, String> {
    let decoded = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    if ImageKind::detect(bytes).is_some() {
        return Ok(decoded);
    }

    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, quality);
    decoded
        .to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|err| format!("re-encode failed: {}", err))?;
    image::load(Cursor::new(jpeg), ImageFormat::Jpeg).map_err(|err| err.to_string())
}

/// Build a document with one page per decodable image, each page the size of
/// its image. Undecodable inputs are skipped; no usable image at all is
/// `InvalidArgument`.
#[instrument(skip(images), fields(inputs = images.len()))]
pub fn images_to_pdf(images: &[&[u8]], quality: u8) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new("Orbit Images");
    let mut pages: Vec<PdfPage> = Vec::new();

    for (position, bytes) in images.iter().enumerate() {
        let decoded = match decode_input(bytes, quality.clamp(1, 100)) {
            Ok(decoded) => decoded,
            Err(reason) => {
                warn!(position, %reason, "Image skipped");
                continue;
            }
        };

        let (width, height) = (decoded.width(), decoded.height());
        let raw = RawImage {
            pixels: RawImageData::U8(decoded.to_rgb8().into_raw()),
            width: width as usize,
            height: height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = doc.add_image(&raw);

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(0.0)),
                scale_x: Some(1.0),
                scale_y: Some(1.0),
                dpi: Some(POINT_DPI),
                rotate: None,
            },
        }];
        let page_w = Mm(width as f32 / PT_PER_MM);
        let page_h = Mm(height as f32 / PT_PER_MM);
        pages.push(PdfPage::new(page_w, page_h, ops));
        debug!(position, width, height, "Image page added");
    }

    if pages.is_empty() {
        return Err(EngineError::InvalidArgument(
            "no decodable images were supplied".to_string(),
        ));
    }

    let count = pages.len();
    doc.with_pages(pages);
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
    info!(pages = count, warnings = warnings.len(), "Images converted");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::handle::DocumentHandle;
    use crate::testing::png_bytes;
    use image::{Rgb, RgbImage};

    fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 200, 90]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, ImageFormat::Bmp)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn one_page_per_image_sized_in_points() {
        let png = png_bytes(200, 100);
        let bmp = bmp_bytes(50, 80);
        let pdf = images_to_pdf(&[&png, b"not an image", &bmp], 90).unwrap();

        let handle = DocumentHandle::load(&pdf).unwrap();
        assert_eq!(handle.page_count(), 2);
        let first = handle.page_geometry(0).unwrap().size();
        assert!((first.width - 200.0).abs() < 0.5, "{first:?}");
        assert!((first.height - 100.0).abs() < 0.5, "{first:?}");
        let second = handle.page_geometry(1).unwrap().size();
        assert!((second.width - 50.0).abs() < 0.5, "{second:?}");
    }

    #[test]
    fn nothing_decodable_is_invalid() {
        assert!(matches!(
            images_to_pdf(&[b"junk".as_slice()], 90),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(images_to_pdf(&[], 90).is_err());
    }
}
