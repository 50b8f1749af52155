// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Standard-14 font metrics and WinAnsi text preparation for overlays drawn
// with the built-in fonts.

use lopdf::{Dictionary, dictionary};

/// Built-in fonts the engine draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    Courier,
}

/// Advance widths (1/1000 em) for codes 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width used for codes outside the printable ASCII tables.
const FALLBACK_WIDTH: u16 = 556;

impl StandardFont {
    pub fn base_font(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::Courier => "Courier",
        }
    }

    /// Resource name used when the font is registered on a page.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "OrbitHelv",
            Self::HelveticaBold => "OrbitHelvB",
            Self::Courier => "OrbitCour",
        }
    }

    /// Match a /BaseFont name (subset prefixes and style suffixes allowed)
    /// to the closest built-in metrics.
    pub fn from_base_font(name: &[u8]) -> Self {
        let raw = String::from_utf8_lossy(name);
        let name = raw.split_once('+').map(|(_, rest)| rest).unwrap_or(raw.as_ref());
        let lower = name.to_ascii_lowercase();
        if lower.contains("courier") || lower.contains("mono") {
            Self::Courier
        } else if lower.contains("bold") {
            Self::HelveticaBold
        } else {
            Self::Helvetica
        }
    }

    /// Advance width of a single-byte code in 1/1000 em.
    pub fn code_width(&self, code: u8) -> u16 {
        let table = match self {
            Self::Helvetica => &HELVETICA_WIDTHS,
            Self::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
            Self::Courier => return 600,
        };
        match code {
            32..=126 => table[(code - 32) as usize],
            _ => FALLBACK_WIDTH,
        }
    }

    /// Width of `text` in document units at `size`. The text should already
    /// be WinAnsi-safe (see [`sanitize_text`]).
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = encode_win_ansi(text)
            .into_iter()
            .map(|code| self.code_width(code) as u32)
            .sum();
        units as f32 * size / 1000.0
    }

    /// Ascender-to-descender height at `size`.
    pub fn height_at(&self, size: f32) -> f32 {
        match self {
            Self::Helvetica | Self::HelveticaBold => size * (718.0 + 207.0) / 1000.0,
            Self::Courier => size * (629.0 + 157.0) / 1000.0,
        }
    }

    /// Type1 font dictionary with WinAnsi encoding.
    pub fn dictionary(&self) -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => self.base_font(),
            "Encoding" => "WinAnsiEncoding",
        }
    }
}

/// Replace characters the standard fonts cannot show: tabs become four
/// spaces, typographic punctuation is folded to ASCII, and anything outside
/// Latin-1 becomes `?`.
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => out.push_str("    "),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2192}' => out.push_str("->"),
            '\u{2190}' => out.push_str("<-"),
            '\u{2022}' => out.push('*'),
            c if (c as u32) <= 0xFF => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Encode Latin-1 text as single-byte codes. Characters above 0xFF map to `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(c as u32).unwrap_or(b'?'))
        .collect()
}

/// Decode a WinAnsi byte, including the 0x80..0x9F typographic block.
pub fn decode_win_ansi(code: u8) -> char {
    match code {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x99 => '\u{2122}',
        other => other as char,
    }
}
