// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One rendered page as an RGBA pixel buffer, with the colour transforms and
// encoders the rasterize-and-rebuild pipeline applies to it.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use orbit_core::ColorMode;

/// Luma weights for the grayscale transform.
pub const LUMA_R: f32 = 0.299;
pub const LUMA_G: f32 = 0.587;
pub const LUMA_B: f32 = 0.114;

/// A page rendered at some scale. Only one is alive at a time in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFrame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl RasterFrame {
    /// Wrap an RGBA buffer. Returns `None` when the length does not match the
    /// dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        (pixels.len() == expected && expected > 0).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A frame of a single colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.pixels[offset..offset + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    // -- Colour transforms ----------------------------------------------------

    /// Apply the colour mode in place: grayscale first, then invert.
    /// Alpha is never touched.
    pub fn apply_color_mode(&mut self, mode: ColorMode) {
        if mode == ColorMode::Identity {
            return;
        }
        let grayscale = mode.grayscale();
        let invert = mode.invert();
        for px in self.pixels.chunks_exact_mut(4) {
            if grayscale {
                let luma = LUMA_R * px[0] as f32 + LUMA_G * px[1] as f32 + LUMA_B * px[2] as f32;
                let y = luma.round().clamp(0.0, 255.0) as u8;
                px[0] = y;
                px[1] = y;
                px[2] = y;
            }
            if invert {
                px[0] = 255 - px[0];
                px[1] = 255 - px[1];
                px[2] = 255 - px[2];
            }
        }
    }

    // -- Encoding -------------------------------------------------------------

    /// RGB copy with transparency composited onto white, as a page would
    /// appear on paper.
    pub fn to_rgb(&self) -> RgbImage {
        let mut rgb = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for px in self.pixels.chunks_exact(4) {
            let alpha = px[3] as u32;
            for channel in &px[..3] {
                let blended = (*channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
                rgb.push(blended as u8);
            }
        }
        // Length matches the dimensions by construction.
        RgbImage::from_raw(self.width, self.height, rgb).unwrap_or_default()
    }

    /// Baseline JPEG at `quality` (1..=100).
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, String> {
        let rgb = self.to_rgb();
        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|err| format!("JPEG encoding failed: {}", err))?;
        Ok(buf)
    }

    /// Lossless PNG, alpha preserved.
    pub fn encode_png(&self) -> Result<Vec<u8>, String> {
        let rgba = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| "frame buffer does not match its dimensions".to_string())?;
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(rgba)
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| format!("PNG encoding failed: {}", err))?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_checks_buffer_length() {
        assert!(RasterFrame::new(2, 2, vec![0; 16]).is_some());
        assert!(RasterFrame::new(2, 2, vec![0; 15]).is_none());
        assert!(RasterFrame::new(0, 0, Vec::new()).is_none());
    }

    #[test]
    fn grayscale_uses_luma_weights() {
        let mut frame = RasterFrame::filled(1, 1, [200, 100, 50, 128]);
        frame.apply_color_mode(ColorMode::Grayscale);
        // 0.299*200 + 0.587*100 + 0.114*50 = 124.2
        assert_eq!(frame.pixel(0, 0), Some([124, 124, 124, 128]));
    }

    #[test]
    fn grayscale_is_idempotent() {
        let mut frame = RasterFrame::new(
            2,
            1,
            vec![10, 200, 30, 255, 250, 5, 90, 255],
        )
        .unwrap();
        frame.apply_color_mode(ColorMode::Grayscale);
        let once = frame.clone();
        frame.apply_color_mode(ColorMode::Grayscale);
        assert_eq!(frame, once);
    }

    #[test]
    fn invert_is_self_inverse_and_keeps_alpha() {
        let original = RasterFrame::new(1, 2, vec![0, 128, 255, 7, 1, 2, 3, 255]).unwrap();
        let mut frame = original.clone();
        frame.apply_color_mode(ColorMode::Invert);
        assert_eq!(frame.pixel(0, 0), Some([255, 127, 0, 7]));
        frame.apply_color_mode(ColorMode::Invert);
        assert_eq!(frame, original);
    }

    #[test]
    fn both_is_grayscale_then_invert() {
        let mut frame = RasterFrame::filled(1, 1, [200, 100, 50, 255]);
        frame.apply_color_mode(ColorMode::Both);
        assert_eq!(frame.pixel(0, 0), Some([131, 131, 131, 255]));
    }

    #[test]
    fn transparent_pixels_composite_to_white() {
        let frame = RasterFrame::filled(1, 1, [0, 0, 0, 0]);
        assert_eq!(frame.to_rgb().get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn encoders_produce_their_formats() {
        let frame = RasterFrame::filled(8, 8, [40, 80, 120, 255]);
        let jpeg = frame.encode_jpeg(80).unwrap();
        assert_eq!(&jpeg[..3], &[0xFF, 0xD8, 0xFF]);
        let png = frame.encode_png().unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }
}
