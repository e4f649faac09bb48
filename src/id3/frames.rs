// Comment extraction from COMM and TXXX frames

use serde::Serialize;

use crate::error::{Id3Error, Result};
use crate::id3::reader::{FrameBody, FrameHandler, Id3Reader};
use crate::id3::v2::FrameHeader;
use crate::utils::encoding::{decode_text, TextEncoding};

/// Frame identifiers with a dedicated handler
pub mod frame_ids {
    use crate::id3::v2::FrameId;

    pub const COMMENT: FrameId = FrameId::new(*b"COMM"); // Comments
    pub const USER_TEXT: FrameId = FrameId::new(*b"TXXX"); // User defined text information
}

/// `TXXX` description written by transcoders that turn a `COMM` frame into `TXXX`
pub const USER_TEXT_COMMENT: &str = "comment";

/// Which field a comment was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentSource {
    CommentShortDescription,
    CommentLongDescription,
    UserText,
}

/// The comment found in a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedComment {
    pub text: String,
    pub source: CommentSource,
    pub encoding: TextEncoding,
}

/// Tracks the comment across a tag. Later frames replace earlier ones.
pub type CommentSlot = Option<ExtractedComment>;

/// `COMM`: encoding, language, short description, long description.
///
/// Encoders disagree on which description holds the real text, so the
/// longer of the two is kept.
pub struct CommentFrameHandler;

impl FrameHandler<CommentSlot> for CommentFrameHandler {
    fn handle(&self, _header: &FrameHeader, body: &mut FrameBody<'_>, found: &mut CommentSlot) -> Result<()> {
        let data = body.read_all()?;
        let (encoding, fields) = split_encoding(&data)?;

        // The language code is not used
        let fields = fields
            .get(3..)
            .ok_or(Id3Error::MalformedFrame("COMM frame is too short for a language code"))?;

        let short = decode_text(fields, encoding)?;
        let long = decode_text(&fields[short.bytes_read..], encoding)?;

        let comment = if short.text.chars().count() > long.text.chars().count() {
            ExtractedComment {
                text: short.text,
                source: CommentSource::CommentShortDescription,
                encoding,
            }
        } else {
            ExtractedComment {
                text: long.text,
                source: CommentSource::CommentLongDescription,
                encoding,
            }
        };

        *found = Some(comment);
        Ok(())
    }
}

/// `TXXX`: encoding, description, value. Only taken when the description is `comment`.
pub struct UserTextFrameHandler;

impl FrameHandler<CommentSlot> for UserTextFrameHandler {
    fn handle(&self, _header: &FrameHeader, body: &mut FrameBody<'_>, found: &mut CommentSlot) -> Result<()> {
        let data = body.read_all()?;
        let (encoding, fields) = split_encoding(&data)?;

        let description = decode_text(fields, encoding)?;
        if description.text != USER_TEXT_COMMENT {
            log::trace!("Ignoring TXXX frame \"{}\"", description.text);
            return Ok(());
        }

        let value = decode_text(&fields[description.bytes_read..], encoding)?;
        *found = Some(ExtractedComment {
            text: value.text,
            source: CommentSource::UserText,
            encoding,
        });
        Ok(())
    }
}

fn split_encoding(data: &[u8]) -> Result<(TextEncoding, &[u8])> {
    let (&encoding, rest) = data
        .split_first()
        .ok_or(Id3Error::MalformedFrame("frame has no text encoding byte"))?;
    Ok((TextEncoding::from_byte(encoding)?, rest))
}

/// A reader that extracts the comment and skips every other frame
pub fn comment_reader() -> Id3Reader<CommentSlot> {
    Id3Reader::new()
        .with_handler(frame_ids::COMMENT, CommentFrameHandler)
        .with_handler(frame_ids::USER_TEXT, UserTextFrameHandler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id3::v2::FrameId;
    use std::io::Cursor;

    fn frame_v4(id: FrameId, body: &[u8]) -> Vec<u8> {
        let size = body.len() as u32;
        let mut out = id.as_bytes().to_vec();
        out.extend([
            ((size >> 21) & 0x7F) as u8,
            ((size >> 14) & 0x7F) as u8,
            ((size >> 7) & 0x7F) as u8,
            (size & 0x7F) as u8,
        ]);
        out.extend([0, 0]);
        out.extend(body);
        out
    }

    fn tag_v4(frames: &[u8]) -> Vec<u8> {
        let size = frames.len() as u32;
        let mut out = b"ID3\x04\x00\x00".to_vec();
        out.extend([
            ((size >> 21) & 0x7F) as u8,
            ((size >> 14) & 0x7F) as u8,
            ((size >> 7) & 0x7F) as u8,
            (size & 0x7F) as u8,
        ]);
        out.extend(frames);
        out
    }

    fn comm(encoding: u8, short: &[u8], long: &[u8]) -> Vec<u8> {
        let mut body = vec![encoding];
        body.extend(b"eng");
        body.extend(short);
        body.extend(long);
        frame_v4(frame_ids::COMMENT, &body)
    }

    fn txxx(description: &str, value: &str) -> Vec<u8> {
        let mut body = vec![3];
        body.extend(description.as_bytes());
        body.push(0);
        body.extend(value.as_bytes());
        frame_v4(frame_ids::USER_TEXT, &body)
    }

    fn read(frames: &[u8]) -> CommentSlot {
        let mut found = None;
        comment_reader()
            .read_tag(Cursor::new(tag_v4(frames)), &mut found)
            .unwrap();
        found
    }

    #[test]
    fn longer_description_wins() {
        let found = read(&comm(0, b"A\0", b"A long one")).unwrap();
        assert_eq!(found.text, "A long one");
        assert_eq!(found.source, CommentSource::CommentLongDescription);

        let found = read(&comm(0, b"Only the short one\0", b"")).unwrap();
        assert_eq!(found.text, "Only the short one");
        assert_eq!(found.source, CommentSource::CommentShortDescription);
    }

    #[test]
    fn equal_lengths_prefer_long_description() {
        let found = read(&comm(3, b"abc\0", b"xyz")).unwrap();
        assert_eq!(found.text, "xyz");
    }

    #[test]
    fn utf16_comment_with_bom_per_field() {
        let mut short = vec![0xFF, 0xFE];
        short.extend("d".encode_utf16().flat_map(u16::to_le_bytes));
        short.extend([0, 0]);
        let mut long = vec![0xFE, 0xFF];
        long.extend("Ünïcødé".encode_utf16().flat_map(u16::to_be_bytes));

        let found = read(&comm(1, &short, &long)).unwrap();
        assert_eq!(found.text, "Ünïcødé");
        assert_eq!(found.encoding, TextEncoding::Utf16);
    }

    #[test]
    fn txxx_requires_comment_description() {
        let found = read(&txxx("comment", "hello")).unwrap();
        assert_eq!(found.text, "hello");
        assert_eq!(found.source, CommentSource::UserText);

        assert_eq!(read(&txxx("artist", "hello")), None);
        assert_eq!(read(&txxx("Comment", "hello")), None);
    }

    #[test]
    fn last_qualifying_frame_wins() {
        // Stream order decides, not frame type
        let mut frames = comm(0, b"\0", b"from COMM");
        frames.extend(txxx("comment", "from TXXX"));
        assert_eq!(read(&frames).unwrap().text, "from TXXX");

        let mut frames = txxx("comment", "from TXXX");
        frames.extend(comm(0, b"\0", b"from COMM"));
        assert_eq!(read(&frames).unwrap().text, "from COMM");

        // A later non-matching TXXX leaves the comment alone
        let mut frames = comm(0, b"\0", b"kept");
        frames.extend(txxx("artist", "someone"));
        assert_eq!(read(&frames).unwrap().text, "kept");
    }

    #[test]
    fn undecodable_frame_contributes_nothing() {
        let mut frames = comm(0, b"\0", b"good one");
        frames.extend(comm(9, b"\0", b"bad encoding"));
        frames.extend(frame_v4(frame_ids::COMMENT, &[0, b'e']));
        frames.extend(frame_v4(frame_ids::USER_TEXT, &[]));
        assert_eq!(read(&frames).unwrap().text, "good one");
    }

    #[test]
    fn other_frames_are_skipped() {
        let mut frames = frame_v4(FrameId::new(*b"TIT2"), b"\x03Title");
        frames.extend(comm(3, b"\0", b"after title"));
        assert_eq!(read(&frames).unwrap().text, "after title");
    }
}
