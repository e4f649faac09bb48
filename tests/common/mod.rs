// Builders for synthetic ID3v2 tags
#![allow(dead_code)]

pub const LATIN1: u8 = 0;
pub const UTF16: u8 = 1;
pub const UTF16BE: u8 = 2;
pub const UTF8: u8 = 3;

fn synchsafe(size: u32) -> [u8; 4] {
    [
        ((size >> 21) & 0x7F) as u8,
        ((size >> 14) & 0x7F) as u8,
        ((size >> 7) & 0x7F) as u8,
        (size & 0x7F) as u8,
    ]
}

/// Encode text the way a tagger would, optionally with the terminator of the encoding
pub fn encode(text: &str, encoding: u8, terminated: bool) -> Vec<u8> {
    let mut out: Vec<u8> = match encoding {
        LATIN1 => text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).expect("not latin-1"))
            .collect(),
        UTF16 => {
            let mut out = vec![0xFF, 0xFE];
            out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
            out
        }
        UTF16BE => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        UTF8 => text.as_bytes().to_vec(),
        other => panic!("no such encoding {other}"),
    };

    if terminated {
        let width = if encoding == UTF16 || encoding == UTF16BE { 2 } else { 1 };
        out.extend(std::iter::repeat(0).take(width));
    }
    out
}

pub fn comm_body(encoding: u8, short: &str, long: &str) -> Vec<u8> {
    let mut body = vec![encoding];
    body.extend(b"eng");
    body.extend(encode(short, encoding, true));
    body.extend(encode(long, encoding, false));
    body
}

pub fn txxx_body(encoding: u8, description: &str, value: &str) -> Vec<u8> {
    let mut body = vec![encoding];
    body.extend(encode(description, encoding, true));
    body.extend(encode(value, encoding, false));
    body
}

pub fn text_body(encoding: u8, text: &str) -> Vec<u8> {
    let mut body = vec![encoding];
    body.extend(encode(text, encoding, false));
    body
}

/// Insert a zero after every 0xFF, as an unsynchronising writer does
pub fn unsynchronise(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        out.push(b);
        if b == 0xFF {
            out.push(0);
        }
    }
    out
}

/// Builds an ID3v2.3 or ID3v2.4 tag
pub struct TagBuilder {
    major: u8,
    frames: Vec<u8>,
    padding: usize,
    unsynchronised: bool,
}

impl TagBuilder {
    pub fn new(major: u8) -> Self {
        assert!(major == 3 || major == 4);
        Self {
            major,
            frames: Vec::new(),
            padding: 0,
            unsynchronised: false,
        }
    }

    pub fn frame(self, id: &[u8; 4], body: &[u8]) -> Self {
        self.flagged_frame(id, 0, body)
    }

    /// A frame with format flags, `body` must already carry whatever the flags announce
    pub fn flagged_frame(mut self, id: &[u8; 4], flags: u16, body: &[u8]) -> Self {
        let size = body.len() as u32;
        self.frames.extend(id);
        if self.major == 4 {
            self.frames.extend(synchsafe(size));
        } else {
            self.frames.extend(size.to_be_bytes());
        }
        self.frames.extend(flags.to_be_bytes());
        self.frames.extend(body);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.frames.extend(bytes);
        self
    }

    /// Set the tag unsynchronisation flag. ID3v2.3 frames are then stored
    /// unsynchronised, ID3v2.4 frames must be unsynchronised by the caller.
    pub fn unsynchronised(mut self) -> Self {
        self.unsynchronised = true;
        self
    }

    pub fn padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let frames = if self.unsynchronised && self.major == 3 {
            unsynchronise(&self.frames)
        } else {
            self.frames.clone()
        };
        let flags = if self.unsynchronised { 0x80 } else { 0 };

        let size = (frames.len() + self.padding) as u32;
        let mut out = vec![b'I', b'D', b'3', self.major, 0, flags];
        out.extend(synchsafe(size));
        out.extend(&frames);
        out.extend(std::iter::repeat(0).take(self.padding));
        out
    }
}
