// Encoded-string decoding for ID3v2 text fields

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use serde::Serialize;

use crate::error::{Id3Error, Result};

/// Text encoding types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum TextEncoding {
    /// ISO-8859-1, single null terminator
    Latin1 = 0,
    /// UTF-16 with a byte order mark, double null terminator
    Utf16 = 1,
    /// UTF-16 big endian without a byte order mark, double null terminator
    Utf16BE = 2,
    /// UTF-8, single null terminator
    Utf8 = 3,
}

impl TextEncoding {
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(TextEncoding::Latin1),
            1 => Ok(TextEncoding::Utf16),
            2 => Ok(TextEncoding::Utf16BE),
            3 => Ok(TextEncoding::Utf8),
            other => Err(Id3Error::UnsupportedEncoding(other)),
        }
    }

    /// Width of the null terminator, which is also the alignment it is searched at
    pub fn terminator_len(self) -> usize {
        match self {
            TextEncoding::Latin1 | TextEncoding::Utf8 => 1,
            TextEncoding::Utf16 | TextEncoding::Utf16BE => 2,
        }
    }
}

/// Result of decoding a single text field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedText {
    pub text: String,
    /// Raw bytes consumed, terminator included
    pub bytes_read: usize,
}

/// Decode the first text field in `data`.
///
/// Decoding stops at the first terminator of the encoding or at the end of
/// `data`, whichever comes first. Nothing past `data` is ever looked at.
pub fn decode_text(data: &[u8], encoding: TextEncoding) -> Result<DecodedText> {
    let width = encoding.terminator_len();

    let (raw, bytes_read) = match find_terminator(data, width) {
        Some(end) => (&data[..end], end + width),
        None => (data, data.len()),
    };

    let mut text = match encoding {
        TextEncoding::Latin1 => encoding_rs::mem::decode_latin1(raw).into_owned(),
        TextEncoding::Utf8 => decode_strict(UTF_8, raw, "invalid UTF-8 sequence")?,
        TextEncoding::Utf16 => {
            let raw = even_length(raw)?;
            match raw {
                [0xFF, 0xFE, rest @ ..] => decode_strict(UTF_16LE, rest, "invalid UTF-16 sequence")?,
                [0xFE, 0xFF, rest @ ..] => decode_strict(UTF_16BE, rest, "invalid UTF-16 sequence")?,
                // No byte order mark, the format default is big endian
                _ => decode_strict(UTF_16BE, raw, "invalid UTF-16 sequence")?,
            }
        }
        TextEncoding::Utf16BE => {
            decode_strict(UTF_16BE, even_length(raw)?, "invalid UTF-16BE sequence")?
        }
    };

    if text.starts_with('\u{FEFF}') {
        text.remove(0);
    }

    Ok(DecodedText { text, bytes_read })
}

fn find_terminator(data: &[u8], width: usize) -> Option<usize> {
    if width == 1 {
        return data.iter().position(|&b| b == 0);
    }

    data.chunks_exact(width)
        .position(|unit| unit.iter().all(|&b| b == 0))
        .map(|index| index * width)
}

/// Drop a dangling zero byte left over when a 16-bit field is cut by its bound
fn even_length(raw: &[u8]) -> Result<&[u8]> {
    match raw.split_last() {
        Some((&0, rest)) if raw.len() % 2 == 1 => Ok(rest),
        Some(_) if raw.len() % 2 == 1 => Err(Id3Error::InvalidText("UTF-16 string has an odd length")),
        _ => Ok(raw),
    }
}

fn decode_strict(encoding: &'static Encoding, raw: &[u8], reason: &'static str) -> Result<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(raw)
        .map(|text| text.into_owned())
        .ok_or(Id3Error::InvalidText(reason))
}
