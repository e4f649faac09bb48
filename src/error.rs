// Error types for ID3v2 parsing

use std::io;

use thiserror::Error;

use crate::id3::v2::FrameId;

/// Alias for results produced while reading a tag
pub type Result<T> = std::result::Result<T, Id3Error>;

/// Errors that can occur while reading an ID3v2 tag
#[derive(Debug, Error)]
pub enum Id3Error {
    /// The stream does not start with the `ID3` magic
    #[error("not an ID3v2 tag")]
    NotAnId3Tag,

    /// The major version is not 2, 3 or 4
    #[error("unsupported ID3v2 major version {0}")]
    UnsupportedVersion(u8),

    /// The tag header or extended header is inconsistent
    #[error("malformed tag: {0}")]
    MalformedTag(&'static str),

    /// The stream ended before a fixed-width header or frame body was read
    #[error("tag is truncated")]
    TruncatedTag,

    /// A frame claims more bytes than the tag has left
    #[error("frame {id} ends at offset {frame_end}, past the tag end at {tag_end}")]
    FrameOverrun {
        id: FrameId,
        frame_end: u64,
        tag_end: u64,
    },

    /// A text encoding byte outside of 0..=3
    #[error("unsupported text encoding {0:#04x}")]
    UnsupportedEncoding(u8),

    /// The bytes are not valid in the declared text encoding
    #[error("invalid text: {0}")]
    InvalidText(&'static str),

    /// The frame is stored in a form that cannot be read back, e.g. compressed
    #[error("unsupported frame: {0}")]
    UnsupportedFrame(&'static str),

    /// A frame body does not have the expected field layout
    #[error("malformed frame: {0}")]
    MalformedFrame(&'static str),

    /// Underlying transport failure
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl Id3Error {
    /// Whether the error only invalidates the frame being decoded.
    ///
    /// These are swallowed at the frame handler boundary, every other
    /// error aborts the whole tag.
    pub fn is_frame_scoped(&self) -> bool {
        matches!(
            self,
            Id3Error::UnsupportedEncoding(_)
                | Id3Error::InvalidText(_)
                | Id3Error::UnsupportedFrame(_)
                | Id3Error::MalformedFrame(_)
        )
    }
}

impl From<io::Error> for Id3Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Id3Error::TruncatedTag,
            _ => Id3Error::Io(e),
        }
    }
}
