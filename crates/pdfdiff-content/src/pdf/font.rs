//! Font metrics and text decoding
//!
//! Only what span extraction needs: splitting strings into character codes,
//! glyph advances, and a best-effort mapping to Unicode.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object};

use super::objects::{get, get_dict, name, number, numbers, resolve};

/// Advance used when a font carries no width information (1/1000 em)
const FALLBACK_WIDTH: f64 = 500.0;

/// Default CID advance when `/DW` is absent
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// Widest code range a `/W` entry or `bfrange` may cover (a two-byte codespace)
const MAX_CODE_SPAN: u32 = 0xFFFF;

/// Parsed font resource
#[derive(Debug, Clone)]
pub(crate) struct FontInfo {
    /// Two-byte character codes (composite fonts)
    two_byte: bool,
    first_char: u32,
    widths: Vec<f64>,
    cid_widths: HashMap<u32, f64>,
    default_width: f64,
    to_unicode: Option<HashMap<u32, String>>,
}

impl FontInfo {
    /// Font used when text is shown before any `Tf`
    pub(crate) fn fallback() -> Self {
        Self {
            two_byte: false,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            default_width: FALLBACK_WIDTH,
            to_unicode: None,
        }
    }

    /// Load a font dictionary; missing pieces fall back to defaults
    pub(crate) fn load(doc: &Document, font: &Dictionary) -> Self {
        let subtype = get(doc, font, b"Subtype").and_then(name).unwrap_or_default();
        let mut info = if subtype == b"Type0" {
            Self::load_composite(doc, font)
        } else {
            Self::load_simple(doc, font)
        };

        info.to_unicode = match get(doc, font, b"ToUnicode") {
            Some(Object::Stream(stream)) => {
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                let map = parse_to_unicode(&data);
                if map.is_empty() {
                    tracing::debug!("ToUnicode CMap yielded no mappings");
                    None
                } else {
                    Some(map)
                }
            }
            _ => None,
        };
        info
    }

    fn load_simple(doc: &Document, font: &Dictionary) -> Self {
        let first_char = get(doc, font, b"FirstChar").and_then(number).unwrap_or(0.0);
        let widths = font
            .get(b"Widths")
            .ok()
            .and_then(|w| numbers(doc, w))
            .unwrap_or_default();
        let default_width = if widths.is_empty() { FALLBACK_WIDTH } else { 0.0 };

        Self {
            two_byte: false,
            first_char: first_char.max(0.0) as u32,
            widths,
            cid_widths: HashMap::new(),
            default_width,
            to_unicode: None,
        }
    }

    fn load_composite(doc: &Document, font: &Dictionary) -> Self {
        let descendant = match get(doc, font, b"DescendantFonts") {
            Some(Object::Array(items)) => items.first().and_then(|d| resolve(doc, d)),
            _ => None,
        };
        let descendant = match descendant {
            Some(Object::Dictionary(d)) => Some(d),
            _ => None,
        };

        let default_width = descendant
            .and_then(|d| get(doc, d, b"DW"))
            .and_then(number)
            .unwrap_or(DEFAULT_CID_WIDTH);
        let cid_widths = descendant
            .and_then(|d| get(doc, d, b"W"))
            .map(|w| parse_cid_widths(doc, w))
            .unwrap_or_default();

        Self {
            two_byte: true,
            first_char: 0,
            widths: Vec::new(),
            cid_widths,
            default_width,
            to_unicode: None,
        }
    }

    /// Split a shown string into character codes
    pub(crate) fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| pair.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }

    /// Horizontal advance of `code` in 1/1000 text space units
    pub(crate) fn width(&self, code: u32) -> f64 {
        if self.two_byte {
            return self.cid_widths.get(&code).copied().unwrap_or(self.default_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.default_width)
    }

    /// Word spacing applies to the single-byte code 32 only
    pub(crate) fn is_word_space(&self, code: u32) -> bool {
        !self.two_byte && code == 32
    }

    /// Unicode text for one code
    pub(crate) fn decode(&self, code: u32, out: &mut String) {
        if let Some(text) = self.to_unicode.as_ref().and_then(|m| m.get(&code)) {
            out.push_str(text);
            return;
        }
        out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
}

/// `/W` array: `c [w1 w2 ...]` or `c_first c_last w`
fn parse_cid_widths(doc: &Document, obj: &Object) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let items = match obj {
        Object::Array(items) => items,
        _ => return widths,
    };

    let mut i = 0;
    while i < items.len() {
        let first = match resolve(doc, &items[i]).and_then(number) {
            Some(n) => n as u32,
            None => break,
        };
        match items.get(i + 1).and_then(|o| resolve(doc, o)) {
            Some(Object::Array(run)) => {
                for (offset, w) in run.iter().filter_map(number).enumerate() {
                    let Some(code) = u32::try_from(offset).ok().and_then(|o| first.checked_add(o)) else {
                        tracing::debug!("Width run at CID {} runs past the code space", first);
                        break;
                    };
                    widths.insert(code, w);
                }
                i += 2;
            }
            Some(last) => {
                let last = number(last).unwrap_or(first as f64) as u32;
                let w = items.get(i + 2).and_then(|o| resolve(doc, o)).and_then(number);
                if last.saturating_sub(first) > MAX_CODE_SPAN {
                    tracing::debug!("Skipping width range {}..={}", first, last);
                } else if let Some(w) = w {
                    for code in first..=last {
                        widths.insert(code, w);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}

/// Parse the `bfchar`/`bfrange` sections of a ToUnicode CMap.
///
/// The CMap is tokenized with the content-stream parser: each section ends
/// with an `endbfchar`/`endbfrange` operator whose operands are the entries.
pub(crate) fn parse_to_unicode(data: &[u8]) -> HashMap<u32, String> {
    let mut map = HashMap::new();
    let content = match Content::decode(data) {
        Ok(content) => content,
        Err(err) => {
            tracing::debug!("Unreadable ToUnicode CMap: {}", err);
            return map;
        }
    };

    for op in &content.operations {
        match op.operator.as_str() {
            "endbfchar" => {
                for pair in op.operands.chunks_exact(2) {
                    if let (Some(code), Some(text)) = (code_of(&pair[0]), utf16_of(&pair[1])) {
                        map.insert(code, text);
                    }
                }
            }
            "endbfrange" => {
                for entry in op.operands.chunks_exact(3) {
                    let (Some(lo), Some(hi)) = (code_of(&entry[0]), code_of(&entry[1])) else {
                        continue;
                    };
                    if hi.saturating_sub(lo) > MAX_CODE_SPAN {
                        tracing::debug!("Skipping bfrange <{:X}> <{:X}>", lo, hi);
                        continue;
                    }
                    match &entry[2] {
                        Object::Array(targets) => {
                            for (code, target) in (lo..=hi).zip(targets) {
                                if let Some(text) = utf16_of(target) {
                                    map.insert(code, text);
                                }
                            }
                        }
                        target => {
                            let Some(units) = units_of(target) else { continue };
                            for (offset, code) in (lo..=hi).enumerate() {
                                let mut units = units.clone();
                                if let Some(last) = units.last_mut() {
                                    *last = last.wrapping_add(offset as u16);
                                }
                                map.insert(code, String::from_utf16_lossy(&units));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    map
}

fn code_of(obj: &Object) -> Option<u32> {
    match obj {
        Object::String(bytes, _) if !bytes.is_empty() && bytes.len() <= 4 => {
            Some(bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
        }
        _ => None,
    }
}

fn units_of(obj: &Object) -> Option<Vec<u16>> {
    match obj {
        Object::String(bytes, _) => Some(
            bytes
                .chunks(2)
                .map(|pair| pair.iter().fold(0u16, |acc, b| (acc << 8) | u16::from(*b)))
                .collect(),
        ),
        _ => None,
    }
}

fn utf16_of(obj: &Object) -> Option<String> {
    units_of(obj).map(|units| String::from_utf16_lossy(&units))
}
