// Frame iteration and per-frame dispatch

use std::collections::HashMap;
use std::io::{self, Read, Take};

use crate::error::{Id3Error, Result};
use crate::id3::unsync::decode_unsynchronisation;
use crate::id3::v2::{FrameHeader, FrameHeaderRead, FrameId, SizeEncoding, TagHeader};
use crate::utils::io::{read_array, skip, skip_exact, CountingReader};

/// The body of a single frame.
///
/// Reads are capped at the size declared in the frame header, a handler
/// can never consume bytes belonging to the next frame.
pub struct FrameBody<'a> {
    inner: Take<&'a mut dyn Read>,
}

impl<'a> FrameBody<'a> {
    fn new(reader: &'a mut dyn Read, size: u32) -> Self {
        Self {
            inner: Read::take(reader, u64::from(size)),
        }
    }

    /// Bytes of the body not yet consumed
    pub fn remaining(&self) -> u64 {
        self.inner.limit()
    }

    /// Read the rest of the body
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let expected = self.remaining();
        let mut data = Vec::new();
        self.inner.read_to_end(&mut data)?;

        if (data.len() as u64) < expected {
            return Err(Id3Error::TruncatedTag);
        }

        Ok(data)
    }
}

impl Read for FrameBody<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Per-frame logic, selected by frame id.
///
/// `found` is the accumulator threaded through a whole tag. A handler may
/// consume any part of the body, the reader skips whatever is left.
pub trait FrameHandler<T> {
    fn handle(&self, header: &FrameHeader, body: &mut FrameBody<'_>, found: &mut T) -> Result<()>;
}

impl<T, F> FrameHandler<T> for F
where
    F: Fn(&FrameHeader, &mut FrameBody<'_>, &mut T) -> Result<()>,
{
    fn handle(&self, header: &FrameHeader, body: &mut FrameBody<'_>, found: &mut T) -> Result<()> {
        self(header, body, found)
    }
}

/// Ignores the frame, its body is skipped by the reader
pub struct SkipFrame;

impl<T> FrameHandler<T> for SkipFrame {
    fn handle(&self, header: &FrameHeader, _body: &mut FrameBody<'_>, _found: &mut T) -> Result<()> {
        log::trace!("Skipping frame {} of size {}", header.id, header.size);
        Ok(())
    }
}

/// Walks the frames of an ID3v2 tag and hands each one to its registered handler
pub struct Id3Reader<T> {
    handlers: HashMap<FrameId, Box<dyn FrameHandler<T>>>,
    fallback: Box<dyn FrameHandler<T>>,
}

impl<T> Default for Id3Reader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Id3Reader<T> {
    /// A reader that skips every frame
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: Box::new(SkipFrame),
        }
    }

    /// Handle frames with the given id, replacing any earlier handler
    pub fn register(&mut self, id: FrameId, handler: impl FrameHandler<T> + 'static) {
        self.handlers.insert(id, Box::new(handler));
    }

    pub fn with_handler(mut self, id: FrameId, handler: impl FrameHandler<T> + 'static) -> Self {
        self.register(id, handler);
        self
    }

    fn handler_for(&self, id: &FrameId) -> &dyn FrameHandler<T> {
        self.handlers.get(id).map_or(&*self.fallback, |handler| &**handler)
    }

    /// Parse the tag starting at the current stream position.
    ///
    /// Results accumulate in `found`, which keeps whatever was gathered when
    /// an error cuts the walk short. On return the stream never sits past the
    /// end of the tag.
    pub fn read_tag<R: Read>(&self, reader: R, found: &mut T) -> Result<TagHeader> {
        let mut reader = CountingReader::new(reader);

        let header = TagHeader::read(&mut reader)?;
        log::debug!(
            "Parsing ID3v{} tag, size: {}, flags: {:?}",
            header.version(),
            header.size,
            header.flags
        );

        // ID3v2.4 unsynchronises frame by frame instead
        if header.flags.unsynchronisation && header.major_version < 4 {
            self.read_unsynchronised(&mut reader, &header, found)?;
        } else {
            self.read_frames(&mut reader, &header, header.end(), found)?;
        }

        Ok(header)
    }

    /// The tag size counts the stored bytes, frame sizes count decoded ones,
    /// so the whole tag is decoded before walking it.
    fn read_unsynchronised<R: Read>(
        &self,
        reader: &mut CountingReader<R>,
        header: &TagHeader,
        found: &mut T,
    ) -> Result<()> {
        let declared = u64::from(header.size);
        let mut data = Vec::new();
        Read::take(&mut *reader, declared).read_to_end(&mut data)?;
        let missing = declared - data.len() as u64;

        decode_unsynchronisation(&mut data);
        log::trace!("Unsynchronised tag of {} bytes decodes to {}", declared, data.len());

        let decoded_end = data.len() as u64;
        match self.read_frames(&mut CountingReader::new(data.as_slice()), header, decoded_end, found) {
            Err(Id3Error::FrameOverrun { .. }) if missing > 0 => Err(Id3Error::TruncatedTag),
            Err(e) => Err(e),
            Ok(()) => {
                if missing > 0 {
                    log::warn!("Stream ended {} bytes before the end of the tag", missing);
                }
                Ok(())
            }
        }
    }

    /// Walk the frames up to `tag_end`, a position of `reader`
    fn read_frames<S: Read>(
        &self,
        reader: &mut CountingReader<S>,
        header: &TagHeader,
        tag_end: u64,
        found: &mut T,
    ) -> Result<()> {
        if header.flags.extended_header {
            skip_extended_header(reader, header.major_version, tag_end)?;
        }

        let frame_header_size = header.frame_header_size();

        // Every iteration consumes at least a frame header, so this terminates
        while reader.position() + frame_header_size <= tag_end {
            let frame = match FrameHeader::read(reader, header.major_version)? {
                FrameHeaderRead::Frame(frame) => frame,
                FrameHeaderRead::End => break,
            };

            let body_start = reader.position();
            let body_end = body_start + u64::from(frame.size);
            if body_end > tag_end {
                log::warn!(
                    "Frame {} claims {} bytes, only {} left in the tag",
                    frame.id,
                    frame.size,
                    tag_end - body_start
                );
                return Err(Id3Error::FrameOverrun {
                    id: frame.id,
                    frame_end: body_end,
                    tag_end,
                });
            }

            log::trace!("Frame {} at {}, size {}", frame.id, body_start, frame.size);
            self.dispatch(reader, header, &frame, found)?;

            // Resynchronise on the declared frame end, however much the handler read
            let consumed = reader.position();
            skip_exact(reader, body_end - consumed)?;
        }

        // Throw away the rest of the tag (padding, garbage)
        let rest = tag_end.saturating_sub(reader.position());
        let skipped = skip(reader, rest)?;
        if skipped < rest {
            log::warn!("Stream ended {} bytes before the end of the tag", rest - skipped);
        }

        Ok(())
    }

    fn dispatch<S: Read>(
        &self,
        reader: &mut CountingReader<S>,
        header: &TagHeader,
        frame: &FrameHeader,
        found: &mut T,
    ) -> Result<()> {
        match self.dispatch_frame(reader, header, frame, found) {
            Ok(()) => Ok(()),
            Err(e) if e.is_frame_scoped() => {
                log::debug!("Frame {} contributed nothing: {}", frame.id, e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Strip what the frame flags put in front of the body, then hand the
    /// body to the handler
    fn dispatch_frame<S: Read>(
        &self,
        reader: &mut CountingReader<S>,
        header: &TagHeader,
        frame: &FrameHeader,
        found: &mut T,
    ) -> Result<()> {
        let flags = frame.flags;
        if flags.compression {
            return Err(Id3Error::UnsupportedFrame("compressed frames are not supported"));
        }
        if flags.encryption {
            return Err(Id3Error::UnsupportedFrame("encrypted frames are not supported"));
        }

        let mut size = frame.size;
        if flags.grouping {
            size = size
                .checked_sub(1)
                .ok_or(Id3Error::MalformedFrame("frame is too short for a group id"))?;
            read_array::<_, 1>(reader)?;
        }
        if flags.data_length_indicator {
            size = size
                .checked_sub(4)
                .ok_or(Id3Error::MalformedFrame("frame is too short for a data length indicator"))?;
            read_array::<_, 4>(reader)?;
        }

        let handler = self.handler_for(&frame.id);

        // In ID3v2.4 the tag flag marks every frame as unsynchronised
        let unsynchronised = header.flags.unsynchronisation && header.major_version >= 4;
        if flags.unsynchronisation || unsynchronised {
            let mut data = FrameBody::new(reader, size).read_all()?;
            decode_unsynchronisation(&mut data);

            let decoded_size = data.len() as u32;
            let mut decoded = data.as_slice();
            return handler.handle(frame, &mut FrameBody::new(&mut decoded, decoded_size), found);
        }

        handler.handle(frame, &mut FrameBody::new(reader, size), found)
    }
}

fn skip_extended_header<S: Read>(reader: &mut CountingReader<S>, major_version: u8, tag_end: u64) -> Result<()> {
    if reader.position() + 4 > tag_end {
        return Err(Id3Error::MalformedTag("extended header does not fit in the tag"));
    }

    let raw: [u8; 4] = read_array(reader)?;
    let rest = match major_version {
        // ID3v2.3 excludes the size field itself
        3 => u64::from(SizeEncoding::BigEndian.decode(&raw)),
        _ => u64::from(SizeEncoding::Synchsafe.decode(&raw))
            .checked_sub(4)
            .ok_or(Id3Error::MalformedTag("extended header is smaller than its size field"))?,
    };

    if reader.position() + rest > tag_end {
        return Err(Id3Error::MalformedTag("extended header overruns the tag"));
    }

    log::trace!("Skipping extended header of {} bytes", rest);
    skip_exact(reader, rest)?;
    Ok(())
}
