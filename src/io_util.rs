//! Native byte reading/writing utilities used across the codec.
//!
//! Ported from the upstream parser's `Cursor`/`ByteReader` pair and extended
//! with a symmetric little-endian writer; no external parser combinator
//! crate is pulled in for a format this small and fixed-shape.

use crate::error::EndOfStream;

/// Result type for cursor reads.
pub type ReadResult<T> = Result<T, EndOfStream>;

/// Trait for reading binary data from a byte slice.
pub trait ByteReader {
    /// Current byte offset into the underlying buffer.
    fn position(&self) -> usize;
    /// Read a single unsigned 8-bit integer.
    fn read_u8(&mut self) -> ReadResult<u8>;
    /// Read a single unsigned 32-bit integer in little-endian format.
    fn read_u32_le(&mut self) -> ReadResult<u32>;
    /// Read exactly `n` bytes.
    fn read_bytes(&mut self, n: usize) -> ReadResult<Vec<u8>>;
    /// Remaining unread bytes in the buffer.
    fn remaining(&self) -> usize;
}

/// A cursor for reading binary data from a byte slice.
pub struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the beginning of the data.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }
}

impl ByteReader for Cursor<'_> {
    fn position(&self) -> usize {
        self.position
    }

    fn read_u8(&mut self) -> ReadResult<u8> {
        if self.position >= self.data.len() {
            return Err(EndOfStream);
        }
        let value = self.data[self.position];
        self.position += 1;
        Ok(value)
    }

    fn read_u32_le(&mut self) -> ReadResult<u32> {
        if self.position + 4 > self.data.len() {
            return Err(EndOfStream);
        }
        let bytes = [
            self.data[self.position],
            self.data[self.position + 1],
            self.data[self.position + 2],
            self.data[self.position + 3],
        ];
        self.position += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    fn read_bytes(&mut self, n: usize) -> ReadResult<Vec<u8>> {
        if self.position + n > self.data.len() {
            return Err(EndOfStream);
        }
        let bytes = self.data[self.position..self.position + n].to_vec();
        self.position += n;
        Ok(bytes)
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

/// Helper function to read an array of `u32` values.
pub fn read_u32_array(reader: &mut impl ByteReader, count: usize) -> ReadResult<Vec<u32>> {
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(reader.read_u32_le()?);
    }
    Ok(values)
}

/// A plain `Vec<u8>`-backed little-endian writer, symmetric to [`Cursor`].
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create an empty writer with the given capacity pre-reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Current length of the written buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Write a 32-bit integer in little-endian format.
    pub fn write_u32_le(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write an array of 32-bit integers in little-endian format.
    pub fn write_u32_array(&mut self, values: &[u32]) {
        for &v in values {
            self.write_u32_le(v);
        }
    }

    /// Append raw bytes verbatim.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pad with zero bytes until the buffer reaches `len`. No-op if already
    /// at or past `len`.
    pub fn pad_to(&mut self, len: usize) {
        if self.buf.len() < len {
            self.buf.resize(len, 0);
        }
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
