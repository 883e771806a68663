//! Byte sources for the decoder.
//!
//! Two cursor variants feed the same decoding paths: [`StreamCursor`] over
//! an open `Read + Seek` source for the top-level chunk stream, and
//! [`SliceCursor`] over an already-buffered block for nested records. The
//! loader swaps the active cursor when it descends into a sub-block, so
//! one set of decoding routines serves both.

use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use glam::{Quat, Vec3};

use crate::decode::format::Tag;
use crate::util::{Error, Result};

/// A bounded sequential byte source.
///
/// Bulk [`read_bytes`](Self::read_bytes) is strict on streams and tolerant
/// on slices: reading past the end of a slice yields whatever bytes remain,
/// because the enclosing length prefix already bounds legal reads there.
/// The typed helpers require their exact width on either variant.
pub trait ByteSource {
    /// Read up to `n` bytes. A streaming source fails with
    /// [`Error::TruncatedInput`] when fewer than `n` remain.
    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>>;

    /// Step back `n` bytes. Used only for the 4-byte tag probe.
    fn rewind(&mut self, n: usize) -> Result<()>;

    /// Read exactly `n` bytes or fail with [`Error::TruncatedInput`].
    fn read_strict(&mut self, n: usize) -> Result<Vec<u8>> {
        let buf = self.read_bytes(n)?;
        if buf.len() != n {
            return Err(Error::TruncatedInput {
                expected: n,
                actual: buf.len(),
            });
        }
        Ok(buf)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_strict(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(&self.read_strict(2)?))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(&self.read_strict(4)?))
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(&self.read_strict(4)?))
    }

    fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(&self.read_strict(4)?))
    }

    fn read_vec3(&mut self) -> Result<Vec3> {
        let buf = self.read_strict(12)?;
        Ok(Vec3::new(
            LittleEndian::read_f32(&buf[0..4]),
            LittleEndian::read_f32(&buf[4..8]),
            LittleEndian::read_f32(&buf[8..12]),
        ))
    }

    fn read_quat(&mut self) -> Result<Quat> {
        let buf = self.read_strict(16)?;
        Ok(Quat::from_xyzw(
            LittleEndian::read_f32(&buf[0..4]),
            LittleEndian::read_f32(&buf[4..8]),
            LittleEndian::read_f32(&buf[8..12]),
            LittleEndian::read_f32(&buf[12..16]),
        ))
    }

    fn read_tag(&mut self) -> Result<Tag> {
        let buf = self.read_strict(4)?;
        Ok(Tag([buf[0], buf[1], buf[2], buf[3]]))
    }
}

/// Streaming cursor over an open file or reader.
pub struct StreamCursor<R> {
    inner: R,
}

impl<R: Read + Seek> StreamCursor<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read + Seek> ByteSource for StreamCursor<R> {
    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            let got = self.inner.read(&mut buf[filled..])?;
            if got == 0 {
                return Err(Error::TruncatedInput {
                    expected: n,
                    actual: filled,
                });
            }
            filled += got;
        }
        Ok(buf)
    }

    fn rewind(&mut self, n: usize) -> Result<()> {
        self.inner.seek(SeekFrom::Current(-(n as i64)))?;
        Ok(())
    }
}

/// Bounded cursor over an already-buffered block.
///
/// The block is shared via `Arc`, so nesting into a sub-range never copies
/// the parent block's bytes.
#[derive(Debug, Clone)]
pub struct SliceCursor {
    buf: Arc<[u8]>,
    pos: usize,
}

impl SliceCursor {
    pub fn new(buf: Arc<[u8]>, pos: usize) -> Self {
        Self { buf, pos }
    }

    /// Current offset into the underlying block.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Bytes left before the end of the block.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }
}

impl ByteSource for SliceCursor {
    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let start = self.pos.min(self.buf.len());
        let end = self.buf.len().min(start.saturating_add(n));
        self.pos = end;
        Ok(self.buf[start..end].to_vec())
    }

    fn rewind(&mut self, n: usize) -> Result<()> {
        self.pos = self.pos.saturating_sub(n);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn slice(bytes: &[u8]) -> SliceCursor {
        SliceCursor::new(bytes.to_vec().into(), 0)
    }

    #[test]
    fn test_slice_short_read_is_tolerant() {
        let mut cur = slice(&[1, 2, 3]);
        assert_eq!(cur.read_bytes(8).unwrap(), vec![1, 2, 3]);
        assert_eq!(cur.read_bytes(8).unwrap(), Vec::<u8>::new());
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn test_slice_typed_read_is_strict() {
        let mut cur = slice(&[1, 2]);
        let err = cur.read_i32().unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedInput { expected: 4, actual: 2 }
        ));
    }

    #[test]
    fn test_slice_rewind() {
        let mut cur = slice(&[0x2a, 0, 0, 0]);
        assert_eq!(cur.read_i32().unwrap(), 42);
        cur.rewind(4).unwrap();
        assert_eq!(cur.pos(), 0);
        assert_eq!(cur.read_i32().unwrap(), 42);
    }

    #[test]
    fn test_stream_short_read_fails() {
        let mut cur = StreamCursor::new(Cursor::new(vec![1u8, 2, 3]));
        let err = cur.read_bytes(4).unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedInput { expected: 4, actual: 3 }
        ));
    }

    #[test]
    fn test_stream_rewind() {
        let mut cur = StreamCursor::new(Cursor::new(b"VERSVERS".to_vec()));
        assert_eq!(cur.read_tag().unwrap().0, *b"VERS");
        cur.rewind(4).unwrap();
        assert_eq!(cur.read_tag().unwrap().0, *b"VERS");
    }

    #[test]
    fn test_typed_reads_little_endian() {
        let mut cur = slice(&[
            0x01, 0x00, // u16
            0xff, 0xff, 0xff, 0xff, // i32 -1
            0x00, 0x00, 0x80, 0x3f, // f32 1.0
        ]);
        assert_eq!(cur.read_u16().unwrap(), 1);
        assert_eq!(cur.read_i32().unwrap(), -1);
        assert_eq!(cur.read_f32().unwrap(), 1.0);
    }

    #[test]
    fn test_read_vec3() {
        let mut bytes = Vec::new();
        for v in [1.0f32, 2.0, 3.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let mut cur = slice(&bytes);
        assert_eq!(cur.read_vec3().unwrap(), Vec3::new(1.0, 2.0, 3.0));
    }
}
