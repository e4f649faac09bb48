// I/O utilities for reading tags from forward-only streams

use std::io::{self, Read};

/// A reader that tracks how many bytes have been pulled through it.
///
/// The tag reader never seeks, so the count doubles as the stream position
/// relative to where the parse started.
pub struct CountingReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Bytes consumed since construction
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

/// Read a fixed number of bytes
pub fn read_array<R: Read, const N: usize>(reader: &mut R) -> io::Result<[u8; N]> {
    let mut buffer = [0u8; N];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

/// Read big-endian 16-bit integer
pub fn read_be_u16<R: Read>(reader: &mut R) -> io::Result<u16> {
    Ok(u16::from_be_bytes(read_array(reader)?))
}

/// Discard up to `count` bytes, returning how many were actually skipped
pub fn skip<R: Read + ?Sized>(reader: &mut R, count: u64) -> io::Result<u64> {
    io::copy(&mut reader.take(count), &mut io::sink())
}

/// Discard exactly `count` bytes
pub fn skip_exact<R: Read + ?Sized>(reader: &mut R, count: u64) -> io::Result<()> {
    let skipped = skip(reader, count)?;
    if skipped != count {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected to skip {count} bytes, stream ended after {skipped}"),
        ));
    }
    Ok(())
}
