//! Big-endian cursors over byte buffers
//!
//! [`Reader`] and [`Writer`] carry the single piece of mutable state in a
//! traversal: the byte offset. Every recursive read or write borrows the same
//! cursor mutably, so the offset only ever moves forward.

use crate::error::{Error, Result};

/// Cursor for deserialization
///
/// Never mutates the underlying buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Create a reader positioned at the start of `buf`
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Create a reader positioned at `offset`
    ///
    /// The offset is not validated here; the first read past the end fails.
    pub fn at(buf: &'a [u8], offset: usize) -> Self {
        Self { buf, pos: offset }
    }

    /// Get current position in buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get remaining bytes
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Check if reader is at end of buffer
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    fn check(&self, width: usize) -> Result<()> {
        match self.pos.checked_add(width) {
            Some(end) if end <= self.buf.len() => Ok(()),
            _ => Err(Error::out_of_range(self.pos, width, self.buf.len())),
        }
    }

    /// Read raw bytes
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.check(len)?;
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read `width` bytes most-significant first into an unsigned accumulator
    ///
    /// `width` is at most 8.
    #[inline]
    pub fn read_uint(&mut self, width: usize) -> Result<u64> {
        debug_assert!(width <= 8);
        let bytes = self.read_bytes(width)?;
        Ok(bytes
            .iter()
            .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte)))
    }

    /// Read u8
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_uint(1)? as u8)
    }

    /// Read i8 (two's complement)
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_uint(1)? as i8)
    }

    /// Read u16 (big-endian)
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.read_uint(2)? as u16)
    }

    /// Read i16 (big-endian, two's complement)
    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_uint(2)? as i16)
    }

    /// Read u32 (big-endian)
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.read_uint(4)? as u32)
    }

    /// Read i32 (big-endian, two's complement)
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_uint(4)? as i32)
    }

    /// Read u64 (big-endian)
    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_uint(8)
    }

    /// Read i64 (big-endian, two's complement)
    #[inline]
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.read_uint(8)? as i64)
    }
}

/// Cursor for serialization into a caller-owned buffer
#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    /// Create a writer positioned at the start of `buf`
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Create a writer positioned at `offset`
    pub fn at(buf: &'a mut [u8], offset: usize) -> Self {
        Self { buf, pos: offset }
    }

    /// Get current position in buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get remaining capacity
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Get the bytes up to the current position
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.pos.min(self.buf.len())]
    }

    #[inline]
    fn check(&self, width: usize) -> Result<()> {
        match self.pos.checked_add(width) {
            Some(end) if end <= self.buf.len() => Ok(()),
            _ => Err(Error::out_of_range(self.pos, width, self.buf.len())),
        }
    }

    /// Write raw bytes
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.check(bytes.len())?;
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    /// Write the low `width` bytes of `bits`, most-significant first
    ///
    /// `width` is at most 8.
    #[inline]
    pub fn write_uint(&mut self, bits: u64, width: usize) -> Result<()> {
        debug_assert!(width <= 8);
        self.check(width)?;
        for i in 0..width {
            self.buf[self.pos + i] = (bits >> ((width - 1 - i) * 8)) as u8;
        }
        self.pos += width;
        Ok(())
    }

    /// Write u8
    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_uint(u64::from(value), 1)
    }

    /// Write i8 (two's complement)
    #[inline]
    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_u8(value as u8)
    }

    /// Write u16 (big-endian)
    #[inline]
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_uint(u64::from(value), 2)
    }

    /// Write i16 (big-endian, two's complement)
    #[inline]
    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_u16(value as u16)
    }

    /// Write u32 (big-endian)
    #[inline]
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_uint(u64::from(value), 4)
    }

    /// Write i32 (big-endian, two's complement)
    #[inline]
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_u32(value as u32)
    }

    /// Write u64 (big-endian)
    #[inline]
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write_uint(value, 8)
    }

    /// Write i64 (big-endian, two's complement)
    #[inline]
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_u64(value as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_u32_big_endian() {
        let mut buf = [0u8; 4];
        let mut writer = Writer::new(&mut buf);
        writer.write_u32(0x0102_0304).unwrap();
        assert_eq!(writer.position(), 4);
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_read_advances_offset() {
        let buf = [0x00, 0x2A, 0x05, 0xFF];
        let mut reader = Reader::new(&buf);
        assert_eq!(reader.read_u16().unwrap(), 42);
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.read_u8().unwrap(), 5);
        assert_eq!(reader.position(), 3);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_signed_two_complement() {
        let mut buf = [0u8; 6];
        let mut writer = Writer::new(&mut buf);
        writer.write_i16(-2).unwrap();
        writer.write_i32(-1).unwrap();
        assert_eq!(buf, [0xFF, 0xFE, 0xFF, 0xFF, 0xFF, 0xFF]);

        let mut reader = Reader::new(&buf);
        assert_eq!(reader.read_i16().unwrap(), -2);
        assert_eq!(reader.read_i32().unwrap(), -1);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_out_of_range() {
        let buf = [0x01, 0x02];
        let mut reader = Reader::new(&buf);
        assert_eq!(
            reader.read_u32(),
            Err(Error::out_of_range(0, 4, 2))
        );
        // failed reads do not move the cursor
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_write_out_of_range_at_offset() {
        let mut buf = [0u8; 4];
        let mut writer = Writer::at(&mut buf, 3);
        assert_eq!(writer.write_u16(7), Err(Error::out_of_range(3, 2, 4)));
        assert_eq!(buf, [0u8; 4]);
    }

    #[test]
    fn test_offset_past_end() {
        let buf = [0u8; 2];
        let mut reader = Reader::at(&buf, usize::MAX);
        assert!(matches!(reader.read_u8(), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_u64_round_trip() {
        let mut buf = [0u8; 8];
        let mut writer = Writer::new(&mut buf);
        writer.write_u64(0x0102_0304_0506_0708).unwrap();
        assert_eq!(writer.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8]);

        let mut reader = Reader::new(&buf);
        assert_eq!(reader.read_u64().unwrap(), 0x0102_0304_0506_0708);
    }
}
