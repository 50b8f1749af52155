// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Positioned text fragments as reported by a text layer.

use orbit_core::Rect;

use crate::geometry::Matrix;

/// One shown string with its placement in page user space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Text rendering matrix at the start of the run, font size included.
    /// `e`/`f` are the baseline origin.
    pub transform: Matrix,
    /// Advance width in user space.
    pub width: f32,
}

impl TextRun {
    pub fn new(text: impl Into<String>, transform: Matrix, width: f32) -> Self {
        Self {
            text: text.into(),
            transform,
            width,
        }
    }

    /// A run of upright text at `(x, y)` with font size `size`.
    pub fn upright(text: impl Into<String>, x: f32, y: f32, size: f32, width: f32) -> Self {
        Self::new(text, Matrix::new(size, 0.0, 0.0, size, x, y), width)
    }

    pub fn x(&self) -> f32 {
        self.transform.e
    }

    pub fn y(&self) -> f32 {
        self.transform.f
    }

    /// Font size in user space.
    pub fn font_height(&self) -> f32 {
        self.transform.vertical_extent()
    }

    /// Box over the run, dropped below the baseline by a fifth of the font
    /// height and `1.2` font heights tall so descenders and ascenders are
    /// covered.
    pub fn cover_box(&self) -> Rect {
        let h = self.font_height();
        Rect::new(self.x(), self.y() - h * 0.2, self.width, h * 1.2)
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.font_height() > 0.0
    }
}
