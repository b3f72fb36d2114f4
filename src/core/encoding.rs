//! Charset and BOM detection for raw file bytes.
//!
//! Detection is an ordered rule list and is total: every byte sequence maps to
//! exactly one [`FileEncoding`].
//!
//! 1. UTF-32 BOMs (4 bytes) before UTF-16 BOMs (2 bytes); `FF FE 00 00` would
//!    otherwise be misread as UTF-16LE.
//! 2. UTF-8 BOM.
//! 3. Strict UTF-8 over the whole buffer.
//! 4. Windows-1252, unless one of its five undefined bytes is present.
//! 5. Latin-1, which accepts everything.
//!
//! A BOM whose payload does not decode strictly in the announced charset is
//! ignored and detection continues with the next rule, so decode after detect
//! never has to substitute characters.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::{UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252};
use serde::Serialize;

const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];
const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF16_BE: &[u8] = &[0xFE, 0xFF];
const BOM_UTF32_LE: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
const BOM_UTF32_BE: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

/// Bytes Windows-1252 leaves unassigned.
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// Supported character sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Charset {
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    Cp1252,
    Latin1,
}

impl Charset {
    /// Canonical label used in summaries and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Utf32Le => "UTF-32LE",
            Charset::Utf32Be => "UTF-32BE",
            Charset::Cp1252 => "windows-1252",
            Charset::Latin1 => "ISO-8859-1",
        }
    }

    /// The byte order mark written for this charset, if it has one.
    pub fn bom(self) -> &'static [u8] {
        match self {
            Charset::Utf8 => BOM_UTF8,
            Charset::Utf16Le => BOM_UTF16_LE,
            Charset::Utf16Be => BOM_UTF16_BE,
            Charset::Utf32Le => BOM_UTF32_LE,
            Charset::Utf32Be => BOM_UTF32_BE,
            Charset::Cp1252 | Charset::Latin1 => &[],
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Charset plus BOM policy; fixed for the lifetime of a line store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FileEncoding {
    pub charset: Charset,
    pub has_bom: bool,
}

impl FileEncoding {
    pub const UTF8: FileEncoding = FileEncoding {
        charset: Charset::Utf8,
        has_bom: false,
    };

    /// BOM bytes to prepend on write (empty when `has_bom` is false).
    pub fn bom_bytes(&self) -> &'static [u8] {
        if self.has_bom { self.charset.bom() } else { &[] }
    }
}

impl Default for FileEncoding {
    fn default() -> Self {
        FileEncoding::UTF8
    }
}

impl fmt::Display for FileEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_bom {
            write!(f, "{} (BOM)", self.charset)
        } else {
            write!(f, "{}", self.charset)
        }
    }
}

/// Result of [`detect`]: the encoding and where content starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub encoding: FileEncoding,
    /// Byte offset just past the BOM (0 without one).
    pub content_offset: usize,
}

/// Classify raw bytes. Never fails.
pub fn detect(bytes: &[u8]) -> Detection {
    let (encoding, _) = decode(bytes);
    Detection {
        content_offset: encoding.bom_bytes().len(),
        encoding,
    }
}

/// Detect and decode in one pass. The returned text excludes the BOM.
pub fn decode(bytes: &[u8]) -> (FileEncoding, String) {
    // Longest BOM first; UTF-32LE's BOM starts with UTF-16LE's.
    const BOMS: [(&[u8], Charset); 5] = [
        (BOM_UTF32_LE, Charset::Utf32Le),
        (BOM_UTF32_BE, Charset::Utf32Be),
        (BOM_UTF16_LE, Charset::Utf16Le),
        (BOM_UTF16_BE, Charset::Utf16Be),
        (BOM_UTF8, Charset::Utf8),
    ];

    for (bom, charset) in BOMS {
        if let Some(payload) = bytes.strip_prefix(bom) {
            if let Some(text) = decode_strict(charset, payload) {
                let encoding = FileEncoding {
                    charset,
                    has_bom: true,
                };
                return (encoding, text);
            }
        }
    }

    for charset in [Charset::Utf8, Charset::Cp1252, Charset::Latin1] {
        if let Some(text) = decode_strict(charset, bytes) {
            let encoding = FileEncoding {
                charset,
                has_bom: false,
            };
            return (encoding, text);
        }
    }

    // Latin-1 maps every byte; kept for totality.
    (
        FileEncoding {
            charset: Charset::Latin1,
            has_bom: false,
        },
        decode_latin1(bytes),
    )
}

/// Decode `payload` in `charset` without substitutions; None on malformed input.
pub fn decode_strict(charset: Charset, payload: &[u8]) -> Option<String> {
    match charset {
        Charset::Utf8 => UTF_8
            .decode_without_bom_handling_and_without_replacement(payload)
            .map(Cow::into_owned),
        Charset::Utf16Le => UTF_16LE
            .decode_without_bom_handling_and_without_replacement(payload)
            .map(Cow::into_owned),
        Charset::Utf16Be => UTF_16BE
            .decode_without_bom_handling_and_without_replacement(payload)
            .map(Cow::into_owned),
        Charset::Utf32Le => decode_utf32(payload, u32::from_le_bytes),
        Charset::Utf32Be => decode_utf32(payload, u32::from_be_bytes),
        Charset::Cp1252 => {
            if payload.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                return None;
            }
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(payload);
            Some(text.into_owned())
        }
        Charset::Latin1 => Some(decode_latin1(payload)),
    }
}

fn decode_utf32(payload: &[u8], word: fn([u8; 4]) -> u32) -> Option<String> {
    let chunks = payload.chunks_exact(4);
    if !chunks.remainder().is_empty() {
        return None;
    }
    let mut out = String::with_capacity(payload.len() / 4);
    for chunk in chunks {
        let quad = [chunk[0], chunk[1], chunk[2], chunk[3]];
        out.push(char::from_u32(word(quad))?);
    }
    Some(out)
}

fn decode_latin1(payload: &[u8]) -> String {
    payload.iter().map(|&b| char::from(b)).collect()
}

/// Encode `text` in `charset`, appending to `out`.
/// On failure returns the first character the charset cannot represent.
pub fn encode_str(charset: Charset, text: &str, out: &mut Vec<u8>) -> Result<(), char> {
    match charset {
        Charset::Utf8 => out.extend_from_slice(text.as_bytes()),
        Charset::Utf16Le => text
            .encode_utf16()
            .for_each(|u| out.extend_from_slice(&u.to_le_bytes())),
        Charset::Utf16Be => text
            .encode_utf16()
            .for_each(|u| out.extend_from_slice(&u.to_be_bytes())),
        Charset::Utf32Le => text
            .chars()
            .for_each(|c| out.extend_from_slice(&u32::from(c).to_le_bytes())),
        Charset::Utf32Be => text
            .chars()
            .for_each(|c| out.extend_from_slice(&u32::from(c).to_be_bytes())),
        Charset::Cp1252 => {
            let (bytes, _, unmappable) = WINDOWS_1252.encode(text);
            if unmappable {
                return Err(first_unmappable_cp1252(text));
            }
            out.extend_from_slice(&bytes);
        }
        Charset::Latin1 => {
            for c in text.chars() {
                let b = u8::try_from(u32::from(c)).map_err(|_| c)?;
                out.push(b);
            }
        }
    }
    Ok(())
}

fn first_unmappable_cp1252(text: &str) -> char {
    let mut buf = [0u8; 4];
    text.chars()
        .find(|c| WINDOWS_1252.encode(c.encode_utf8(&mut buf)).2)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}
