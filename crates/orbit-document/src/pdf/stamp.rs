// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page overlays: watermarks, page numbers, and signature images, plus the
// placement helpers they share.

use orbit_core::{
    EngineError, HorizontalAlign, ImageKind, PageNumberPosition, Position, Rect, Result,
    SignPlacement, VerticalAlign, WatermarkContent, WatermarkOptions,
};
use tracing::{debug, info, instrument};

use crate::pdf::canvas::{Canvas, Color, TextStyle};
use crate::pdf::fonts::{StandardFont, sanitize_text};
use crate::pdf::handle::DocumentHandle;
use crate::pdf::xobject::embed_decoded;

/// Distance kept from the page edge by positioned watermarks.
pub const WATERMARK_MARGIN: f32 = 20.0;
/// Spacing of the tiled watermark grid.
pub const TILE_GAP: f32 = 300.0;
pub const WATERMARK_FONT_SIZE: f32 = 50.0;
pub const WATERMARK_GRAY: f32 = 0.6;
pub const WATERMARK_IMAGE_SCALE: f32 = 0.5;

pub const PAGE_NUMBER_FONT_SIZE: f32 = 12.0;

pub const SIGNATURE_SCALE: f32 = 0.5;
pub const SIGNATURE_MARGIN: f32 = 50.0;

// -- Placement ----------------------------------------------------------------

/// Lower-left corner of an item of `item_w × item_h` placed at `position` on a
/// `page_w × page_h` page, keeping `margin` from the edges. `Tiled` falls
/// back to the centre; use [`tile_origins`] for the grid.
pub fn anchor(
    position: Position,
    page_w: f32,
    page_h: f32,
    item_w: f32,
    item_h: f32,
    margin: f32,
) -> (f32, f32) {
    let left = margin;
    let center_x = page_w / 2.0 - item_w / 2.0;
    let right = page_w - item_w - margin;
    let top = page_h - item_h - margin;
    let center_y = page_h / 2.0 - item_h / 2.0;
    let bottom = margin;

    match position {
        Position::TopLeft => (left, top),
        Position::TopCenter => (center_x, top),
        Position::TopRight => (right, top),
        Position::CenterLeft => (left, center_y),
        Position::Center | Position::Tiled => (center_x, center_y),
        Position::CenterRight => (right, center_y),
        Position::BottomLeft => (left, bottom),
        Position::BottomCenter => (center_x, bottom),
        Position::BottomRight => (right, bottom),
    }
}

/// Grid origins covering `[-diagonal, diagonal)²` so that rotated tiles
/// still reach every corner of the page.
pub fn tile_origins(page_w: f32, page_h: f32, gap: f32) -> Vec<(f32, f32)> {
    let diagonal = (page_w * page_w + page_h * page_h).sqrt();
    let mut steps = Vec::new();
    let mut t = -diagonal;
    while t < diagonal {
        steps.push(t);
        t += gap;
    }
    steps
        .iter()
        .flat_map(|&x| steps.iter().map(move |&y| (x, y)))
        .collect()
}

fn sign_anchor(
    placement: &SignPlacement,
    page_w: f32,
    page_h: f32,
    item_w: f32,
    item_h: f32,
) -> (f32, f32) {
    let x = match placement.horizontal {
        HorizontalAlign::Left => SIGNATURE_MARGIN,
        HorizontalAlign::Center => page_w / 2.0 - item_w / 2.0,
        HorizontalAlign::Right => page_w - item_w - SIGNATURE_MARGIN,
    };
    let y = match placement.vertical {
        VerticalAlign::Top => page_h - item_h - SIGNATURE_MARGIN,
        VerticalAlign::Center => page_h / 2.0 - item_h / 2.0,
        VerticalAlign::Bottom => SIGNATURE_MARGIN,
    };
    (x, y)
}

// -- Operations ---------------------------------------------------------------

/// Stamp a text or image watermark onto every page.
#[instrument(skip_all, fields(bytes_len = data.len(), position = ?options.position))]
pub fn watermark(
    data: &[u8],
    content: &WatermarkContent,
    options: &WatermarkOptions,
) -> Result<Vec<u8>> {
    let mut handle = DocumentHandle::load(data)?;

    let image = match content {
        WatermarkContent::Image(bytes) => {
            if ImageKind::detect(bytes).is_none() {
                return Err(EngineError::InvalidArgument(
                    "watermark image must be PNG or JPEG".to_string(),
                ));
            }
            Some(embed_decoded(handle.document_mut(), bytes)?)
        }
        WatermarkContent::Text(_) => None,
    };

    for (index, page_id) in handle.page_ids().into_iter().enumerate() {
        let media = handle.page_geometry(index)?.media_box;
        let mut canvas = Canvas::new();

        match (content, image) {
            (_, Some(image)) => {
                let w = image.width as f32 * WATERMARK_IMAGE_SCALE;
                let h = image.height as f32 * WATERMARK_IMAGE_SCALE;
                for (x, y) in origins(options.position, &media, w, h) {
                    canvas.image(image.id, x, y, w, h, options.rotation, options.opacity);
                }
            }
            (WatermarkContent::Text(text), None) => {
                let text = sanitize_text(text);
                let mut style = TextStyle::new(
                    StandardFont::HelveticaBold,
                    WATERMARK_FONT_SIZE,
                    Color::Gray(WATERMARK_GRAY),
                );
                style.opacity = options.opacity;
                style.rotation = options.rotation;
                let w = style.font.text_width(&text, style.size);
                let h = style.font.height_at(style.size);
                for (x, y) in origins(options.position, &media, w, h) {
                    canvas.text(&text, x, y, &style);
                }
            }
            (WatermarkContent::Image(_), None) => {}
        }
        canvas.stamp(&mut handle, page_id)?;
    }

    info!(pages = handle.page_count(), "Watermark applied");
    handle.save()
}

fn origins(position: Position, media: &Rect, w: f32, h: f32) -> Vec<(f32, f32)> {
    let points = match position {
        Position::Tiled => tile_origins(media.width, media.height, TILE_GAP),
        other => vec![anchor(
            other,
            media.width,
            media.height,
            w,
            h,
            WATERMARK_MARGIN,
        )],
    };
    points
        .into_iter()
        .map(|(x, y)| (media.x + x, media.y + y))
        .collect()
}

/// Render the page label for `current` of `total` from a template with
/// `{{current}}` and `{{total}}` placeholders.
pub fn format_page_label(template: &str, current: usize, total: usize) -> String {
    template
        .replacen("{{current}}", &current.to_string(), 1)
        .replacen("{{total}}", &total.to_string(), 1)
}

/// Draw a centred page label on a light pill at the top or bottom of every page.
#[instrument(skip(data), fields(bytes_len = data.len()))]
pub fn add_page_numbers(
    data: &[u8],
    position: PageNumberPosition,
    template: &str,
) -> Result<Vec<u8>> {
    let mut handle = DocumentHandle::load(data)?;
    let total = handle.page_count();
    let style = TextStyle::new(
        StandardFont::Helvetica,
        PAGE_NUMBER_FONT_SIZE,
        Color::Gray(0.2),
    );

    for (index, page_id) in handle.page_ids().into_iter().enumerate() {
        let media = handle.page_geometry(index)?.media_box;
        let label = sanitize_text(&format_page_label(template, index + 1, total));
        let text_w = style.font.text_width(&label, style.size);
        let text_h = style.size;

        let x = media.x + media.width / 2.0 - text_w / 2.0;
        let y = media.y
            + match position {
                PageNumberPosition::Top => media.height - 30.0,
                PageNumberPosition::Bottom => 20.0,
            };

        let mut canvas = Canvas::new();
        canvas.rect(
            x - 10.0,
            y - 5.0,
            text_w + 20.0,
            text_h + 10.0,
            Color::Gray(0.95),
            0.8,
        );
        canvas.text(&label, x, y, &style);
        canvas.stamp(&mut handle, page_id)?;
    }

    debug!(total, "Page numbers added");
    handle.save()
}

/// Place a PNG signature image on the selected pages.
#[instrument(skip(data, signature_png), fields(bytes_len = data.len()))]
pub fn sign(data: &[u8], signature_png: &[u8], placement: &SignPlacement) -> Result<Vec<u8>> {
    if ImageKind::detect(signature_png) != Some(ImageKind::Png) {
        return Err(EngineError::InvalidArgument(
            "signature must be a PNG image".to_string(),
        ));
    }
    let mut handle = DocumentHandle::load(data)?;
    let image = embed_decoded(handle.document_mut(), signature_png)?;
    let w = image.width as f32 * SIGNATURE_SCALE;
    let h = image.height as f32 * SIGNATURE_SCALE;

    let page_ids = handle.page_ids();
    let targets = placement.pages.indices(page_ids.len());
    for &index in &targets {
        let media = handle.page_geometry(index)?.media_box;
        let (x, y) = sign_anchor(placement, media.width, media.height, w, h);
        let mut canvas = Canvas::new();
        canvas.image(image.id, media.x + x, media.y + y, w, h, 0.0, 1.0);
        canvas.stamp(&mut handle, page_ids[index])?;
    }

    info!(pages = targets.len(), "Signature placed");
    handle.save()
}
