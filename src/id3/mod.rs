// ID3v2 tag reading
pub mod frames;
pub mod reader;
pub mod unsync;
pub mod v2;

pub use frames::{comment_reader, CommentSlot, CommentSource, ExtractedComment};
pub use reader::{FrameBody, FrameHandler, Id3Reader, SkipFrame};
pub use v2::{FrameFlags, FrameHeader, FrameId, TagFlags, TagHeader};
