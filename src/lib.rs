//! id3meta - recover comment metadata from ID3v2 tags
//!
//! The reader walks the frames of a tag one by one and hands each frame to a
//! handler registered for its id. Unregistered frames are skipped. After every
//! frame the stream is moved to the frame's declared end, so a handler that
//! reads too little can never throw off the frames that follow.
//!
//! ```no_run
//! # fn main() -> id3meta::Result<()> {
//! if let Some(comment) = id3meta::read_comment_from_path("episode.mp3")? {
//!     println!("{}", comment.text);
//! }
//! # Ok(()) }
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub mod error;
pub mod id3;
pub mod utils;

pub use error::{Id3Error, Result};
pub use id3::{
    comment_reader, CommentSlot, CommentSource, ExtractedComment, FrameBody, FrameFlags, FrameHandler, FrameHeader,
    FrameId, Id3Reader, SkipFrame, TagFlags, TagHeader,
};
pub use utils::encoding::{decode_text, DecodedText, TextEncoding};

/// Read the comment from a tag at the current position of `reader`.
///
/// A frame that overruns the tag stops the walk but keeps the comment found
/// before it. Every other error is returned as is.
pub fn read_comment<R: Read>(reader: R) -> Result<Option<ExtractedComment>> {
    let mut found = None;

    match comment_reader().read_tag(reader, &mut found) {
        Ok(_) => Ok(found),
        Err(e @ Id3Error::FrameOverrun { .. }) => {
            log::warn!("{e}, keeping the comment read so far");
            Ok(found)
        }
        Err(e) => Err(e),
    }
}

/// Read the comment from the tag at the start of a file
pub fn read_comment_from_path<P: AsRef<Path>>(path: P) -> Result<Option<ExtractedComment>> {
    let file = File::open(path.as_ref())?;
    read_comment(BufReader::new(file))
}
