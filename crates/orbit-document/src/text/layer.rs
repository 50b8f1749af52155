// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text layer: positioned text runs per page, read by interpreting page content
// streams with `lopdf`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use orbit_core::{EngineError, Result};
use tracing::{debug, warn};

use crate::geometry::Matrix;
use crate::pdf::fonts::{StandardFont, decode_win_ansi};
use crate::pdf::handle::DocumentHandle;
use crate::pdf::objects::{inherited, number, page_content, resolve, resolve_dict};
use crate::text::cmap::ToUnicode;
use crate::text::run::TextRun;

/// Nesting limit for Form XObjects drawn from Form XObjects.
const MAX_FORM_DEPTH: usize = 8;
/// A TJ adjustment beyond this many thousandths of an em reads as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Source of positioned text runs.
pub trait TextLayer {
    fn page_count(&self) -> usize;

    /// Runs on the zero-based page `index`, in content order.
    fn page_runs(&self, index: usize) -> Result<Vec<TextRun>>;
}

/// Reads runs straight from the page content streams.
pub struct ContentTextLayer<'d> {
    document: &'d Document,
    pages: Vec<ObjectId>,
}

impl<'d> ContentTextLayer<'d> {
    pub fn new(handle: &'d DocumentHandle) -> Self {
        Self {
            document: handle.document(),
            pages: handle.page_ids(),
        }
    }
}

impl TextLayer for ContentTextLayer<'_> {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_runs(&self, index: usize) -> Result<Vec<TextRun>> {
        let page_id = *self.pages.get(index).ok_or_else(|| {
            EngineError::InvalidArgument(format!(
                "page index {} out of range (document has {} pages)",
                index,
                self.pages.len()
            ))
        })?;
        let doc = self.document;
        let page = doc
            .get_dictionary(page_id)
            .map_err(|err| EngineError::Load(format!("cannot read page {}: {}", index, err)))?;
        let resources = inherited(doc, page_id, b"Resources").and_then(|obj| resolve_dict(doc, obj));

        let mut interpreter = Interpreter::new(doc);
        interpreter
            .run(&page_content(doc, page), resources, Matrix::IDENTITY, 0)
            .map_err(|err| {
                EngineError::Load(format!("page {}: content stream cannot be decoded: {}", index, err))
            })?;
        debug!(index, runs = interpreter.runs.len(), "Text runs extracted");
        Ok(interpreter.runs)
    }
}

// -- Fonts --------------------------------------------------------------------

#[derive(Debug)]
enum Widths {
    /// /FirstChar + /Widths of a simple font.
    Simple { first: u32, widths: Vec<f32>, missing: f32 },
    /// /W + /DW of a CID font.
    Composite { widths: HashMap<u32, f32>, default: f32 },
    Standard(StandardFont),
}

#[derive(Debug)]
struct FontInfo {
    code_bytes: usize,
    widths: Widths,
    to_unicode: Option<ToUnicode>,
}

impl FontInfo {
    fn fallback() -> Self {
        Self {
            code_bytes: 1,
            widths: Widths::Standard(StandardFont::Helvetica),
            to_unicode: None,
        }
    }

    fn load(doc: &Document, font: &Dictionary) -> Self {
        let subtype = font.get(b"Subtype").ok().and_then(|o| o.as_name().ok());
        let base_font = font
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .unwrap_or(b"Helvetica".as_slice());
        let to_unicode = font
            .get(b"ToUnicode")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_stream().ok())
            .and_then(|stream| {
                let bytes = if stream.dict.has(b"Filter") {
                    stream.decompressed_content().ok()?
                } else {
                    stream.content.clone()
                };
                Some(ToUnicode::parse(&bytes))
            })
            .filter(|cmap| !cmap.is_empty());

        if subtype == Some(b"Type0".as_slice()) {
            return Self {
                code_bytes: 2,
                widths: composite_widths(doc, font),
                to_unicode,
            };
        }

        let first = font.get(b"FirstChar").ok().and_then(number);
        let widths = font
            .get(b"Widths")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok());
        let widths = match (first, widths) {
            (Some(first), Some(values)) => {
                let missing = font
                    .get(b"FontDescriptor")
                    .ok()
                    .and_then(|obj| resolve_dict(doc, obj))
                    .and_then(|desc| desc.get(b"MissingWidth").ok())
                    .and_then(number)
                    .unwrap_or(0.0);
                Widths::Simple {
                    first: first.max(0.0) as u32,
                    widths: values
                        .iter()
                        .map(|v| number(resolve(doc, v)).unwrap_or(missing))
                        .collect(),
                    missing,
                }
            }
            _ => Widths::Standard(StandardFont::from_base_font(base_font)),
        };
        Self {
            code_bytes: to_unicode
                .as_ref()
                .and_then(ToUnicode::code_bytes)
                .unwrap_or(1)
                .min(2),
            widths,
            to_unicode,
        }
    }

    /// Advance of `code` in thousandths of an em.
    fn width(&self, code: u32) -> f32 {
        match &self.widths {
            Widths::Simple {
                first,
                widths,
                missing,
            } => code
                .checked_sub(*first)
                .and_then(|i| widths.get(i as usize))
                .copied()
                .unwrap_or(*missing),
            Widths::Composite { widths, default } => {
                widths.get(&code).copied().unwrap_or(*default)
            }
            Widths::Standard(font) => u8::try_from(code)
                .map(|c| font.code_width(c) as f32)
                .unwrap_or(500.0),
        }
    }

    fn decode(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|m| m.lookup(code)) {
            return text.to_string();
        }
        match u8::try_from(code) {
            Ok(byte) if self.code_bytes == 1 => decode_win_ansi(byte).to_string(),
            _ => char::from_u32(code).map(String::from).unwrap_or_default(),
        }
    }

    fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.code_bytes == 2 {
            bytes
                .chunks(2)
                .map(|pair| ((pair[0] as u32) << 8) | pair.get(1).copied().unwrap_or(0) as u32)
                .collect()
        } else {
            bytes.iter().map(|b| *b as u32).collect()
        }
    }
}

fn composite_widths(doc: &Document, font: &Dictionary) -> Widths {
    let descendant = font
        .get(b"DescendantFonts")
        .ok()
        .map(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .and_then(|list| list.first())
        .and_then(|obj| resolve_dict(doc, obj));
    let Some(cid_font) = descendant else {
        return Widths::Composite {
            widths: HashMap::new(),
            default: 1000.0,
        };
    };
    let default = cid_font.get(b"DW").ok().and_then(number).unwrap_or(1000.0);
    let mut widths = HashMap::new();
    let entries = cid_font
        .get(b"W")
        .ok()
        .map(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok());

    if let Some(entries) = entries {
        let mut i = 0;
        while i < entries.len() {
            let Some(start) = number(resolve(doc, &entries[i])) else {
                break;
            };
            match entries.get(i + 1).map(|obj| resolve(doc, obj)) {
                Some(Object::Array(list)) => {
                    for (offset, w) in list.iter().enumerate() {
                        if let Some(w) = number(resolve(doc, w)) {
                            widths.insert(start as u32 + offset as u32, w);
                        }
                    }
                    i += 2;
                }
                Some(end) => {
                    let end = number(end).unwrap_or(start);
                    let w = entries
                        .get(i + 2)
                        .and_then(|obj| number(resolve(doc, obj)))
                        .unwrap_or(default);
                    if end >= start && end - start <= 0xFFFF as f32 {
                        for code in start as u32..=end as u32 {
                            widths.insert(code, w);
                        }
                    }
                    i += 3;
                }
                None => break,
            }
        }
    }
    Widths::Composite { widths, default }
}

// -- Interpreter --------------------------------------------------------------

#[derive(Debug, Clone)]
struct TextState {
    font: Option<Rc<FontInfo>>,
    size: f32,
    char_spacing: f32,
    word_spacing: f32,
    /// Horizontal scaling as a fraction.
    scaling: f32,
    leading: f32,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

/// One element of a shown string: glyphs, or a TJ position adjustment.
enum Piece<'a> {
    Glyphs(&'a [u8]),
    Adjust(f32),
}

struct Interpreter<'d> {
    doc: &'d Document,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    tm: Matrix,
    tlm: Matrix,
    fonts: HashMap<ObjectId, Rc<FontInfo>>,
    runs: Vec<TextRun>,
}

fn operand(op: &Operation, index: usize) -> f32 {
    op.operands.get(index).and_then(number).unwrap_or(0.0)
}

impl<'d> Interpreter<'d> {
    fn new(doc: &'d Document) -> Self {
        Self {
            doc,
            state: GraphicsState::default(),
            stack: Vec::new(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            fonts: HashMap::new(),
            runs: Vec::new(),
        }
    }

    /// Interprets one content stream. A stream that does not tokenise is an
    /// error: a page read as empty would hide its text from redaction.
    fn run(
        &mut self,
        content: &[u8],
        resources: Option<&'d Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) -> lopdf::Result<()> {
        let content = Content::decode(&strip_inline_images(content))?;
        let saved_depth = self.stack.len();
        self.state.ctm = ctm;

        for op in &content.operations {
            match op.operator.as_str() {
                "q" => self.stack.push(self.state.clone()),
                "Q" => {
                    if self.stack.len() > saved_depth
                        && let Some(state) = self.stack.pop()
                    {
                        self.state = state;
                    }
                }
                "cm" => {
                    let values: Vec<f32> = op.operands.iter().filter_map(number).collect();
                    if let Some(m) = Matrix::from_slice(&values) {
                        self.state.ctm = m.then(&self.state.ctm);
                    }
                }
                "BT" => {
                    self.tm = Matrix::IDENTITY;
                    self.tlm = Matrix::IDENTITY;
                }
                "ET" => {}
                "Tf" => {
                    let font = op
                        .operands
                        .first()
                        .and_then(|o| o.as_name().ok())
                        .map(|name| self.font(resources, name));
                    self.state.text.font = font;
                    self.state.text.size = operand(op, 1);
                }
                "Tc" => self.state.text.char_spacing = operand(op, 0),
                "Tw" => self.state.text.word_spacing = operand(op, 0),
                "Tz" => self.state.text.scaling = operand(op, 0) / 100.0,
                "TL" => self.state.text.leading = operand(op, 0),
                "Ts" => self.state.text.rise = operand(op, 0),
                "Td" => self.move_line(operand(op, 0), operand(op, 1)),
                "TD" => {
                    self.state.text.leading = -operand(op, 1);
                    self.move_line(operand(op, 0), operand(op, 1));
                }
                "Tm" => {
                    let values: Vec<f32> = op.operands.iter().filter_map(number).collect();
                    if let Some(m) = Matrix::from_slice(&values) {
                        self.tm = m;
                        self.tlm = m;
                    }
                }
                "T*" => self.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        self.show(&[Piece::Glyphs(bytes)]);
                    }
                }
                "'" => {
                    self.next_line();
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        self.show(&[Piece::Glyphs(bytes)]);
                    }
                }
                "\"" => {
                    self.state.text.word_spacing = operand(op, 0);
                    self.state.text.char_spacing = operand(op, 1);
                    self.next_line();
                    if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                        self.show(&[Piece::Glyphs(bytes)]);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        let pieces: Vec<Piece> = items
                            .iter()
                            .filter_map(|item| match item {
                                Object::String(bytes, _) => Some(Piece::Glyphs(bytes)),
                                other => number(other).map(Piece::Adjust),
                            })
                            .collect();
                        self.show(&pieces);
                    }
                }
                "Do" if depth < MAX_FORM_DEPTH => {
                    if let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) {
                        self.draw_form(resources, name, depth)?;
                    }
                }
                _ => {}
            }
        }
        self.stack.truncate(saved_depth);
        Ok(())
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translate(tx, ty).then(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.state.text.leading;
        self.move_line(0.0, -leading);
    }

    fn font(&mut self, resources: Option<&Dictionary>, name: &[u8]) -> Rc<FontInfo> {
        let entry = resources
            .and_then(|r| r.get(b"Font").ok())
            .and_then(|fonts| resolve_dict(self.doc, fonts))
            .and_then(|fonts| fonts.get(name).ok());
        let Some(entry) = entry else {
            return Rc::new(FontInfo::fallback());
        };
        if let Object::Reference(id) = entry
            && let Some(cached) = self.fonts.get(id)
        {
            return Rc::clone(cached);
        }
        let info = Rc::new(
            resolve_dict(self.doc, entry)
                .map(|dict| FontInfo::load(self.doc, dict))
                .unwrap_or_else(FontInfo::fallback),
        );
        if let Object::Reference(id) = entry {
            self.fonts.insert(*id, Rc::clone(&info));
        }
        info
    }

    fn show(&mut self, pieces: &[Piece]) {
        let text_state = self.state.text.clone();
        let font = text_state
            .font
            .clone()
            .unwrap_or_else(|| Rc::new(FontInfo::fallback()));
        let size = text_state.size;
        let scaling = text_state.scaling;

        let start = Matrix::new(size * scaling, 0.0, 0.0, size, 0.0, text_state.rise)
            .then(&self.tm)
            .then(&self.state.ctm);
        let mut text = String::new();
        let mut advance = 0.0f32;

        for piece in pieces {
            match piece {
                Piece::Glyphs(bytes) => {
                    for code in font.codes(bytes) {
                        text.push_str(&font.decode(code));
                        let mut tx = font.width(code) / 1000.0 * size + text_state.char_spacing;
                        if code == 32 && font.code_bytes == 1 {
                            tx += text_state.word_spacing;
                        }
                        advance += tx * scaling;
                    }
                }
                Piece::Adjust(amount) => {
                    if *amount < -TJ_SPACE_THRESHOLD && !text.ends_with(' ') && !text.is_empty() {
                        text.push(' ');
                    }
                    advance -= amount / 1000.0 * size * scaling;
                }
            }
        }

        let to_user = self.tm.then(&self.state.ctm);
        let (dx, dy) = to_user.apply_vector(advance, 0.0);
        let width = (dx * dx + dy * dy).sqrt();
        self.tm = Matrix::translate(advance, 0.0).then(&self.tm);

        if !text.is_empty() {
            self.runs.push(TextRun::new(text, start, width));
        }
    }

    fn draw_form(
        &mut self,
        resources: Option<&'d Dictionary>,
        name: &[u8],
        depth: usize,
    ) -> lopdf::Result<()> {
        let doc = self.doc;
        let stream = resources
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|x| resolve_dict(doc, x))
            .and_then(|x| x.get(name).ok())
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_stream().ok());
        let Some(stream) = stream else {
            return Ok(());
        };
        if stream.dict.get(b"Subtype").ok().and_then(|o| o.as_name().ok()) != Some(b"Form".as_slice()) {
            return Ok(());
        }
        let content = if stream.dict.has(b"Filter") {
            match stream.decompressed_content() {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(%err, "Cannot decompress form XObject");
                    return Ok(());
                }
            }
        } else {
            stream.content.clone()
        };
        let matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|obj| obj.as_array().ok())
            .map(|values| values.iter().filter_map(number).collect::<Vec<f32>>())
            .and_then(|values| Matrix::from_slice(&values))
            .unwrap_or(Matrix::IDENTITY);
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|obj| resolve_dict(doc, obj))
            .or(resources);

        let saved = self.state.clone();
        let (tm, tlm) = (self.tm, self.tlm);
        let ctm = matrix.then(&self.state.ctm);
        let drawn = self.run(&content, form_resources, ctm, depth + 1);
        self.state = saved;
        self.tm = tm;
        self.tlm = tlm;
        drawn
    }
}

// -- Inline images ------------------------------------------------------------

/// Content bytes with inline images (`BI ... ID ... EI`) cut out. The image
/// data after `ID` is raw binary that the content tokenizer rejects.
fn strip_inline_images(content: &[u8]) -> Cow<'_, [u8]> {
    let mut stripped: Option<Vec<u8>> = None;
    let mut copied = 0;
    let mut string_depth = 0usize;
    let mut i = 0;
    while i < content.len() {
        let byte = content[i];
        if string_depth > 0 {
            match byte {
                b'\\' => i += 1,
                b'(' => string_depth += 1,
                b')' => string_depth -= 1,
                _ => {}
            }
            i += 1;
            continue;
        }
        match byte {
            b'(' => string_depth = 1,
            b'%' => {
                while i < content.len() && !matches!(content[i], b'\r' | b'\n') {
                    i += 1;
                }
                continue;
            }
            b'B' if is_operator_at(content, i, b"BI") => {
                if let Some(end) = inline_image_end(content, i + 2) {
                    let out = stripped.get_or_insert_with(|| Vec::with_capacity(content.len()));
                    out.extend_from_slice(&content[copied..i]);
                    out.push(b' ');
                    copied = end;
                    i = end;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }
    match stripped {
        Some(mut out) => {
            out.extend_from_slice(&content[copied..]);
            debug!(removed = content.len() - out.len(), "Inline images skipped");
            Cow::Owned(out)
        }
        None => Cow::Borrowed(content),
    }
}

/// Offset just past the `EI` closing an inline image whose dictionary
/// starts at `from`.
fn inline_image_end(content: &[u8], from: usize) -> Option<usize> {
    let id = (from..content.len()).find(|&at| is_operator_at(content, at, b"ID"))?;
    // a single whitespace byte separates ID from the data
    let data = id + 3;
    (data..content.len())
        .find(|&at| is_operator_at(content, at, b"EI"))
        .map(|at| at + 2)
}

/// Whether `operator` stands alone as a token at `at`.
fn is_operator_at(content: &[u8], at: usize, operator: &[u8]) -> bool {
    content[at..].starts_with(operator)
        && (at == 0 || is_whitespace(content[at - 1]))
        && content
            .get(at + operator.len())
            .is_none_or(|&next| is_whitespace(next) || b"()<>[]{}/%".contains(&next))
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\n' | b'\r' | b'\t' | b'\x0c' | b'\0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture_pdf, pdf_with_content};

    fn runs_of(content: &str) -> Vec<TextRun> {
        let bytes = pdf_with_content(&[content]);
        let handle = DocumentHandle::load(&bytes).unwrap();
        ContentTextLayer::new(&handle).page_runs(0).unwrap()
    }

    #[test]
    fn fixture_label_is_positioned() {
        let handle = DocumentHandle::load(&fixture_pdf(&["Hello"])).unwrap();
        let runs = ContentTextLayer::new(&handle).page_runs(0).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Hello");
        assert_eq!((runs[0].x(), runs[0].y()), (72.0, 700.0));
        assert!((runs[0].font_height() - 24.0).abs() < 1e-4);
        // Helvetica H e l l o = 722 + 556 + 222 + 222 + 556
        let expected = (722 + 556 + 222 + 222 + 556) as f32 * 24.0 / 1000.0;
        assert!((runs[0].width - expected).abs() < 1e-3);
    }

    #[test]
    fn line_operators_move_the_baseline() {
        let runs = runs_of("BT /F1 10 Tf 14 TL 50 600 Td (one) Tj T* (two) Tj 0 -20 TD (three) Tj (four) ' ET");
        let positions: Vec<(&str, f32, f32)> = runs.iter().map(|r| (r.text.as_str(), r.x(), r.y())).collect();
        assert_eq!(positions[0], ("one", 50.0, 600.0));
        assert_eq!(positions[1], ("two", 50.0, 586.0));
        assert_eq!(positions[2], ("three", 50.0, 566.0));
        // TD set the leading to 20
        assert_eq!(positions[3], ("four", 50.0, 546.0));
    }

    #[test]
    fn tj_gaps_become_spaces_and_advance() {
        let runs = runs_of("BT /F1 10 Tf 100 100 Td [(Hello) -300 (World) 50 (!)] TJ (next) Tj ET");
        assert_eq!(runs[0].text, "Hello World!");
        assert_eq!(runs[1].text, "next");
        let hello_world = StandardFont::Helvetica.text_width("HelloWorld!", 10.0);
        let expected = hello_world + 3.0 - 0.5;
        assert!((runs[0].width - expected).abs() < 1e-3, "{}", runs[0].width);
        assert!((runs[1].x() - (100.0 + expected)).abs() < 1e-3);
    }

    #[test]
    fn ctm_and_text_matrix_compose() {
        let runs = runs_of("q 2 0 0 2 10 20 cm BT /F1 12 Tf 1 0 0 1 5 5 Tm (x) Tj ET Q BT /F1 12 Tf (y) Tj ET");
        assert_eq!((runs[0].x(), runs[0].y()), (20.0, 30.0));
        assert!((runs[0].font_height() - 24.0).abs() < 1e-4);
        // Q restored the identity CTM
        assert_eq!((runs[1].x(), runs[1].y()), (0.0, 0.0));
    }

    #[test]
    fn inline_images_do_not_hide_text() {
        let runs = runs_of(
            "BT /F1 24 Tf 72 700 Td (secret) Tj ET q 10 0 0 10 0 0 cm BI /W 1 /H 1 /CS /G /BPC 8 ID a EI Q BT /F1 10 Tf (after) Tj ET",
        );
        let texts: Vec<&str> = runs.iter().map(|run| run.text.as_str()).collect();
        assert_eq!(texts, vec!["secret", "after"]);
        // Q after the image restored the identity CTM
        assert_eq!((runs[1].x(), runs[1].y()), (0.0, 0.0));
    }

    #[test]
    fn inline_image_data_may_hold_operator_bytes() {
        let stripped = strip_inline_images(b"BI /W 2 /H 1 /BPC 8 ID \xff( Tj EI\n(kept) Tj");
        assert_eq!(&*stripped, b" \n(kept) Tj".as_slice());
        // BI inside a string is text, not an image
        let untouched = strip_inline_images(b"(a BI b ID c EI) Tj");
        assert!(matches!(untouched, Cow::Borrowed(_)));
    }

    #[test]
    fn undecodable_content_is_an_error() {
        // an image header with no data or EI cannot be skipped or parsed
        let bytes = pdf_with_content(&["BT /F1 24 Tf 72 700 Td (x) Tj ET BI /W 1 ID"]);
        let handle = DocumentHandle::load(&bytes).unwrap();
        let err = ContentTextLayer::new(&handle).page_runs(0).unwrap_err();
        assert!(matches!(err, EngineError::Load(ref reason) if reason.contains("page 0")), "{:?}", err);
    }

    #[test]
    fn unknown_page_index_is_rejected() {
        let handle = DocumentHandle::load(&fixture_pdf(&["a"])).unwrap();
        assert!(ContentTextLayer::new(&handle).page_runs(3).is_err());
    }
}
