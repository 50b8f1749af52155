// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Drawing canvas: a content stream of operations plus the resources it
// needs, stamped onto an existing page or turned into a new one.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use orbit_core::{EngineError, PageSize, Result};

use crate::geometry::Matrix;
use crate::pdf::fonts::{StandardFont, encode_win_ansi};
use crate::pdf::handle::DocumentHandle;
use crate::pdf::objects::{inherited, resolve};

/// Fill or stroke colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Gray(f32),
    Rgb(f32, f32, f32),
}

impl Color {
    pub const BLACK: Self = Self::Gray(0.0);
    pub const RED: Self = Self::Rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::Rgb(0.0, 1.0, 0.0);

    fn fill_op(&self) -> Operation {
        match *self {
            Self::Gray(g) => Operation::new("g", vec![g.into()]),
            Self::Rgb(r, g, b) => Operation::new("rg", vec![r.into(), g.into(), b.into()]),
        }
    }

    fn stroke_op(&self) -> Operation {
        match *self {
            Self::Gray(g) => Operation::new("G", vec![g.into()]),
            Self::Rgb(r, g, b) => Operation::new("RG", vec![r.into(), g.into(), b.into()]),
        }
    }
}

/// Styling for a run of text drawn with a built-in font.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub font: StandardFont,
    pub size: f32,
    pub color: Color,
    pub opacity: f32,
    /// Counter-clockwise degrees about the text origin.
    pub rotation: f32,
}

impl TextStyle {
    pub fn new(font: StandardFont, size: f32, color: Color) -> Self {
        Self {
            font,
            size,
            color,
            opacity: 1.0,
            rotation: 0.0,
        }
    }
}

/// Accumulates drawing operations and the resources they reference.
#[derive(Default)]
pub struct Canvas {
    operations: Vec<Operation>,
    fonts: BTreeMap<String, Dictionary>,
    states: BTreeMap<String, Dictionary>,
    xobjects: BTreeMap<String, ObjectId>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    // -- Primitives -----------------------------------------------------------

    /// Filled rectangle with optional translucency.
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color, opacity: f32) {
        self.push("q", vec![]);
        self.set_opacity(opacity);
        self.operations.push(color.fill_op());
        self.push("re", vec![x.into(), y.into(), width.into(), height.into()]);
        self.push("f", vec![]);
        self.push("Q", vec![]);
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Color) {
        self.push("q", vec![]);
        self.operations.push(color.stroke_op());
        self.push("w", vec![thickness.into()]);
        self.push("m", vec![from.0.into(), from.1.into()]);
        self.push("l", vec![to.0.into(), to.1.into()]);
        self.push("S", vec![]);
        self.push("Q", vec![]);
    }

    /// Text at `(x, y)` (baseline origin). The text must be WinAnsi-safe.
    pub fn text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        let font_name = self.use_font(style.font);
        let placement = Matrix::rotate(style.rotation).then(&Matrix::translate(x, y));

        self.push("q", vec![]);
        self.set_opacity(style.opacity);
        self.operations.push(style.color.fill_op());
        self.push("BT", vec![]);
        self.push("Tf", vec![Object::Name(font_name.into_bytes()), style.size.into()]);
        self.push("Tm", matrix_operands(&placement));
        self.push("Tj", vec![win_ansi_string(text)]);
        self.push("ET", vec![]);
        self.push("Q", vec![]);
    }

    /// Text that is selectable and searchable but not painted (render mode 3).
    pub fn invisible_text(&mut self, text: &str, x: f32, y: f32, size: f32) {
        let font_name = self.use_font(StandardFont::Helvetica);
        self.push("BT", vec![]);
        self.push("Tr", vec![3.into()]);
        self.push("Tf", vec![Object::Name(font_name.into_bytes()), size.into()]);
        self.push("Tm", matrix_operands(&Matrix::translate(x, y)));
        self.push("Tj", vec![win_ansi_string(text)]);
        self.push("ET", vec![]);
    }

    /// Paint an XObject (image or form) under `placement`. For images the
    /// unit square is mapped, so `placement` carries the drawn size.
    pub fn xobject(&mut self, id: ObjectId, placement: &Matrix, opacity: f32) {
        let name = self.use_xobject(id);
        self.push("q", vec![]);
        self.set_opacity(opacity);
        self.push("cm", matrix_operands(placement));
        self.push("Do", vec![Object::Name(name.into_bytes())]);
        self.push("Q", vec![]);
    }

    /// Image XObject drawn into the rectangle `(x, y, width, height)`,
    /// rotated counter-clockwise about its lower-left corner.
    pub fn image(
        &mut self,
        id: ObjectId,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        rotation: f32,
        opacity: f32,
    ) {
        let placement = Matrix::scale(width, height)
            .then(&Matrix::rotate(rotation))
            .then(&Matrix::translate(x, y));
        self.xobject(id, &placement, opacity);
    }

    // -- Output ---------------------------------------------------------------

    /// Encoded content bytes and the resource dictionary they need.
    pub fn finish(self) -> Result<(Vec<u8>, Dictionary)> {
        let content = Content {
            operations: self.operations,
        }
        .encode()
        .map_err(|err| EngineError::Save(format!("failed to encode content stream: {}", err)))?;

        let mut resources = Dictionary::new();
        if !self.fonts.is_empty() {
            resources.set("Font", to_dict(self.fonts.into_iter().map(|(k, v)| (k, v.into()))));
        }
        if !self.states.is_empty() {
            resources.set(
                "ExtGState",
                to_dict(self.states.into_iter().map(|(k, v)| (k, v.into()))),
            );
        }
        if !self.xobjects.is_empty() {
            resources.set(
                "XObject",
                to_dict(self.xobjects.into_iter().map(|(k, v)| (k, v.into()))),
            );
        }
        Ok((content, resources))
    }

    /// Draw this canvas over an existing page.
    pub fn stamp(self, handle: &mut DocumentHandle, page_id: ObjectId) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        let (content, additions) = self.finish()?;
        let merged = merged_resources(handle.document(), page_id, additions);
        handle.page_dict_mut(page_id)?.set("Resources", merged);
        handle.append_content(page_id, content)
    }

    /// Append this canvas as a new page of `size`.
    pub fn into_page(self, handle: &mut DocumentHandle, size: PageSize) -> Result<ObjectId> {
        let (content, resources) = self.finish()?;
        handle.append_page(size, content, resources)
    }

    // -- Resources ------------------------------------------------------------

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn use_font(&mut self, font: StandardFont) -> String {
        let name = font.resource_name().to_string();
        self.fonts
            .entry(name.clone())
            .or_insert_with(|| font.dictionary());
        name
    }

    fn use_xobject(&mut self, id: ObjectId) -> String {
        let name = format!("OrbitX{}_{}", id.0, id.1);
        self.xobjects.insert(name.clone(), id);
        name
    }

    fn set_opacity(&mut self, opacity: f32) {
        if opacity >= 1.0 {
            return;
        }
        let opacity = opacity.clamp(0.0, 1.0);
        let name = format!("OrbitGS{}", (opacity * 1000.0).round() as u32);
        self.states.entry(name.clone()).or_insert_with(|| {
            let mut state = Dictionary::new();
            state.set("Type", "ExtGState");
            state.set("ca", opacity);
            state.set("CA", opacity);
            state
        });
        self.push("gs", vec![Object::Name(name.into_bytes())]);
    }
}

fn matrix_operands(m: &Matrix) -> Vec<Object> {
    vec![
        m.a.into(),
        m.b.into(),
        m.c.into(),
        m.d.into(),
        m.e.into(),
        m.f.into(),
    ]
}

fn win_ansi_string(text: &str) -> Object {
    Object::String(encode_win_ansi(text), StringFormat::Hexadecimal)
}

fn to_dict(entries: impl Iterator<Item = (String, Object)>) -> Object {
    let mut dict = Dictionary::new();
    for (key, value) in entries {
        dict.set(key, value);
    }
    Object::Dictionary(dict)
}

/// The page's effective resources (inherited and dereferenced) with the
/// canvas additions merged into each category.
fn merged_resources(doc: &Document, page_id: ObjectId, additions: Dictionary) -> Object {
    let mut resources = inherited(doc, page_id, b"Resources")
        .map(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
        .cloned()
        .unwrap_or_default();

    for (category, entries) in additions.iter() {
        let Object::Dictionary(entries) = entries else {
            continue;
        };
        let mut existing = resources
            .get(category)
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_dict().ok())
            .cloned()
            .unwrap_or_default();
        for (name, value) in entries.iter() {
            existing.set(name.clone(), value.clone());
        }
        resources.set(category.clone(), existing);
    }
    Object::Dictionary(resources)
}
