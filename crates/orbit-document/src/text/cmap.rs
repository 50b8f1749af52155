// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ToUnicode CMap parsing (bfchar and bfrange sections).

use std::collections::HashMap;

use tracing::debug;

/// Upper bound on codes expanded from a single bfrange.
const MAX_RANGE: u32 = 0xFFFF;

/// Character code to Unicode mapping from a ToUnicode stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToUnicode {
    map: HashMap<u32, String>,
    /// Byte length of source codes seen in the mapping.
    code_bytes: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    Keyword(String),
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'>' if data.get(i + 1) == Some(&b'>') => i += 2,
            b'<' => {
                let end = data[i + 1..]
                    .iter()
                    .position(|b| *b == b'>')
                    .map(|offset| i + 1 + offset)
                    .unwrap_or(data.len());
                tokens.push(Token::Hex(parse_hex(&data[i + 1..end])));
                i = end + 1;
            }
            b'[' => {
                tokens.push(Token::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                i += 1;
            }
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b if b.is_ascii_alphanumeric() || b == b'/' => {
                let start = i;
                while i < data.len()
                    && !data[i].is_ascii_whitespace()
                    && !b"<>[]%".contains(&data[i])
                {
                    i += 1;
                }
                tokens.push(Token::Keyword(
                    String::from_utf8_lossy(&data[start..i]).into_owned(),
                ));
            }
            _ => i += 1,
        }
    }
    tokens
}

fn parse_hex(digits: &[u8]) -> Vec<u8> {
    let nibbles: Vec<u8> = digits
        .iter()
        .filter_map(|b| (*b as char).to_digit(16).map(|d| d as u8))
        .collect();
    nibbles
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

fn code_value(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32)
}

fn utf16_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Destination string for `offset` codes past the start of a bfrange: the
/// last UTF-16 unit is incremented.
fn offset_destination(base: &[u8], offset: u32) -> String {
    let mut units: Vec<u16> = base
        .chunks(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
        .collect();
    if let Some(last) = units.last_mut() {
        *last = last.wrapping_add(offset as u16);
    }
    String::from_utf16_lossy(&units)
}

impl ToUnicode {
    pub fn parse(data: &[u8]) -> Self {
        let tokens = tokenize(data);
        let mut cmap = Self::default();
        let mut i = 0;
        while i < tokens.len() {
            match &tokens[i] {
                Token::Keyword(k) if k == "beginbfchar" => {
                    i += 1;
                    while let (Some(Token::Hex(src)), Some(Token::Hex(dst))) =
                        (tokens.get(i), tokens.get(i + 1))
                    {
                        cmap.insert(src, utf16_string(dst));
                        i += 2;
                    }
                }
                Token::Keyword(k) if k == "beginbfrange" => {
                    i += 1;
                    while let (Some(Token::Hex(lo)), Some(Token::Hex(hi))) =
                        (tokens.get(i), tokens.get(i + 1))
                    {
                        i += 2;
                        let (start, end) = (code_value(lo), code_value(hi));
                        if end < start || end - start > MAX_RANGE {
                            i += 1;
                            continue;
                        }
                        match tokens.get(i) {
                            Some(Token::Hex(dst)) => {
                                for code in start..=end {
                                    cmap.insert_code(code, lo.len(), offset_destination(dst, code - start));
                                }
                                i += 1;
                            }
                            Some(Token::ArrayStart) => {
                                i += 1;
                                let mut code = start;
                                while let Some(Token::Hex(dst)) = tokens.get(i) {
                                    if code <= end {
                                        cmap.insert_code(code, lo.len(), utf16_string(dst));
                                    }
                                    code += 1;
                                    i += 1;
                                }
                                if tokens.get(i) == Some(&Token::ArrayEnd) {
                                    i += 1;
                                }
                            }
                            _ => {}
                        }
                    }
                }
                _ => i += 1,
            }
        }
        debug!(entries = cmap.map.len(), code_bytes = cmap.code_bytes, "ToUnicode parsed");
        cmap
    }

    fn insert(&mut self, src: &[u8], text: String) {
        self.insert_code(code_value(src), src.len(), text);
    }

    fn insert_code(&mut self, code: u32, len: usize, text: String) {
        self.code_bytes = self.code_bytes.max(len);
        self.map.insert(code, text);
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Byte length of the codes this map was written for, if known.
    pub fn code_bytes(&self) -> Option<usize> {
        (self.code_bytes > 0).then_some(self.code_bytes)
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }
}
