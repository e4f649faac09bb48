// ID3v2 tag and frame headers

use std::fmt;
use std::io::Read;

use serde::Serialize;

use crate::error::{Id3Error, Result};
use crate::utils::io::{read_array, read_be_u16};

/// How a size field is packed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeEncoding {
    /// 7 significant bits per byte, most significant byte first
    Synchsafe,
    /// Plain big-endian integer
    BigEndian,
}

impl SizeEncoding {
    /// Frame sizes are synchsafe from ID3v2.4 onwards
    pub fn for_frames(major_version: u8) -> Self {
        if major_version >= 4 {
            SizeEncoding::Synchsafe
        } else {
            SizeEncoding::BigEndian
        }
    }

    /// Decode a size field of up to 4 bytes
    pub fn decode(self, bytes: &[u8]) -> u32 {
        debug_assert!(bytes.len() <= 4);
        match self {
            SizeEncoding::Synchsafe => bytes
                .iter()
                .fold(0u32, |acc, &b| (acc << 7) | u32::from(b & 0x7F)),
            SizeEncoding::BigEndian => bytes
                .iter()
                .fold(0u32, |acc, &b| (acc << 8) | u32::from(b)),
        }
    }
}

/// Flags from the tag header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TagFlags {
    pub unsynchronisation: bool,
    pub extended_header: bool,
    pub experimental: bool,
    pub footer: bool,
}

impl TagFlags {
    /// Interpret the flag byte, bits a version does not define are ignored
    pub fn from_byte(flags: u8, major_version: u8) -> Self {
        let mut parsed = TagFlags {
            unsynchronisation: flags & 0x80 != 0,
            ..TagFlags::default()
        };

        if major_version >= 3 {
            parsed.extended_header = flags & 0x40 != 0;
            parsed.experimental = flags & 0x20 != 0;
        }

        if major_version >= 4 {
            parsed.footer = flags & 0x10 != 0;
        }

        parsed
    }
}

/// The fixed 10-byte ID3v2 header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagHeader {
    pub major_version: u8,
    pub minor_version: u8,
    pub flags: TagFlags,
    /// Bytes following the header, footer excluded
    pub size: u32,
}

impl TagHeader {
    pub const SIZE: u64 = 10;
    const ID: [u8; 3] = *b"ID3";

    /// Read ID3v2 header from reader
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let buffer: [u8; 10] = read_array(reader)?;

        if buffer[0..3] != Self::ID {
            return Err(Id3Error::NotAnId3Tag);
        }

        let major_version = buffer[3];
        if !(2..=4).contains(&major_version) {
            return Err(Id3Error::UnsupportedVersion(major_version));
        }

        Ok(TagHeader {
            major_version,
            minor_version: buffer[4],
            flags: TagFlags::from_byte(buffer[5], major_version),
            // The tag size is synchsafe in every version
            size: SizeEncoding::Synchsafe.decode(&buffer[6..10]),
        })
    }

    /// Absolute offset of the first byte after the tag, relative to the header start
    pub fn end(&self) -> u64 {
        Self::SIZE + u64::from(self.size)
    }

    /// Size of a frame header in this version
    pub fn frame_header_size(&self) -> u64 {
        if self.major_version == 2 {
            6
        } else {
            10
        }
    }

    /// Human readable version, e.g. `2.4.0`
    pub fn version(&self) -> String {
        format!("2.{}.{}", self.major_version, self.minor_version)
    }
}

/// A four character frame identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId([u8; 4]);

impl FrameId {
    pub const fn new(id: [u8; 4]) -> Self {
        FrameId(id)
    }

    /// Map an ID3v2.2 identifier onto its four character successor
    pub fn from_v22(id: [u8; 3]) -> Self {
        let upgraded = match &id {
            b"COM" => *b"COMM",
            b"TXX" => *b"TXXX",
            b"TT2" => *b"TIT2",
            b"TP1" => *b"TPE1",
            b"TAL" => *b"TALB",
            [x, y, z] => [*x, *y, *z, b' '],
        };
        FrameId(upgraded)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// All zero bytes mark the start of padding
    pub fn is_padding(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Ids starting outside of `'0'..='z'` are garbage, not frames
    pub fn is_plausible(&self) -> bool {
        (b'0'..=b'z').contains(&self.0[0])
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameId(\"{self}\")")
    }
}

/// Format flags of a frame, the status flags play no part in reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameFlags {
    /// A group id byte precedes the body
    pub grouping: bool,
    pub compression: bool,
    pub encryption: bool,
    /// Only set by ID3v2.4, earlier versions unsynchronise the whole tag
    pub unsynchronisation: bool,
    /// A synchsafe length of the decoded body precedes the body
    pub data_length_indicator: bool,
}

impl FrameFlags {
    /// Interpret the flag bits of a frame header, ID3v2.2 frames have none
    pub fn from_bits(flags: u16, major_version: u8) -> Self {
        match major_version {
            3 => FrameFlags {
                compression: flags & 0x0080 != 0,
                encryption: flags & 0x0040 != 0,
                grouping: flags & 0x0020 != 0,
                ..FrameFlags::default()
            },
            4 => FrameFlags {
                grouping: flags & 0x0040 != 0,
                compression: flags & 0x0008 != 0,
                encryption: flags & 0x0004 != 0,
                unsynchronisation: flags & 0x0002 != 0,
                data_length_indicator: flags & 0x0001 != 0,
            },
            _ => FrameFlags::default(),
        }
    }
}

/// Header preceding every frame body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub id: FrameId,
    /// Length of the body that follows, as stored in the tag
    pub size: u32,
    pub flags: FrameFlags,
}

/// Outcome of reading a frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameHeaderRead {
    Frame(FrameHeader),
    /// Padding or garbage reached, there are no more frames
    End,
}

impl FrameHeader {
    /// Read frame header from reader
    pub fn read<R: Read>(reader: &mut R, major_version: u8) -> Result<FrameHeaderRead> {
        let (id, size, flags) = if major_version == 2 {
            let raw: [u8; 3] = read_array(reader)?;
            if raw == [0; 3] {
                return Ok(FrameHeaderRead::End);
            }
            let size: [u8; 3] = read_array(reader)?;
            (FrameId::from_v22(raw), SizeEncoding::BigEndian.decode(&size), FrameFlags::default())
        } else {
            let id = FrameId(read_array(reader)?);
            if id.is_padding() {
                return Ok(FrameHeaderRead::End);
            }
            let size: [u8; 4] = read_array(reader)?;
            let flags = FrameFlags::from_bits(read_be_u16(reader)?, major_version);
            (id, SizeEncoding::for_frames(major_version).decode(&size), flags)
        };

        if !id.is_plausible() {
            log::warn!("Stopping at invalid frame id {id}");
            return Ok(FrameHeaderRead::End);
        }

        Ok(FrameHeaderRead::Frame(FrameHeader { id, size, flags }))
    }
}
