//! Binary reading and writing utilities for the galaxio wire format.
//!
//! All values are little-endian.

use crate::ProtocolError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// A reader for parsing binary protocol messages.
#[derive(Debug)]
pub struct BinaryReader {
    buf: Bytes,
}

impl BinaryReader {
    /// Create a new reader from raw bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { buf: data.into() }
    }

    /// Returns remaining bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    #[inline]
    fn ensure(&self, n: usize) -> Result<(), ProtocolError> {
        if self.buf.remaining() >= n {
            Ok(())
        } else {
            Err(ProtocolError::UnexpectedEof)
        }
    }

    #[inline]
    pub fn get_u8(&mut self) -> Result<u8, ProtocolError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    #[inline]
    pub fn get_u32(&mut self) -> Result<u32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    #[inline]
    pub fn get_i32(&mut self) -> Result<i32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32_le())
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn get_string(&mut self) -> Result<String, ProtocolError> {
        let len = self.get_u32()? as usize;
        self.ensure(len)?;
        let bytes = self.buf.copy_to_bytes(len);
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// A writer for building binary protocol messages.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: BytesMut,
}

impl BinaryWriter {
    /// Create a new writer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new writer with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Returns the current length.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn put_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    #[inline]
    pub fn put_u32(&mut self, v: u32) {
        self.buf.put_u32_le(v);
    }

    #[inline]
    pub fn put_i32(&mut self, v: i32) {
        self.buf.put_i32_le(v);
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn put_string(&mut self, s: &str) {
        self.buf.put_u32_le(s.len() as u32);
        self.buf.put_slice(s.as_bytes());
    }

    /// Consume the writer and return the built buffer.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    /// Get current buffer as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_i32() {
        let mut w = BinaryWriter::new();
        w.put_i32(-1234);
        let mut r = BinaryReader::new(w.finish());
        assert_eq!(r.get_i32(), Ok(-1234));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_string() {
        let mut w = BinaryWriter::new();
        w.put_string("hello");
        let mut r = BinaryReader::new(w.finish());
        assert_eq!(r.get_string().as_deref(), Ok("hello"));
    }

    #[test]
    fn test_short_read_is_eof() {
        let mut r = BinaryReader::new(vec![1u8, 2]);
        assert_eq!(r.get_u32(), Err(ProtocolError::UnexpectedEof));
    }
}
