//! Big-endian read and write primitives.
//!
//! [`Cursor`] is a forward-only reader over an in-memory byte slice.  Every
//! read is bounds-checked up front and fails with [`FormatError::Truncated`]
//! rather than returning short data, so a codec built on it can never
//! observe a partially filled field.
//!
//! [`ChunkWriter`] is the append-only mirror over any [`Write`] sink.  Its
//! only failure mode is the sink's own `io::Error`.
//!
//! Neither type has any knowledge of chunk structure.

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use std::io::{self, Write};

use crate::error::{ContractError, FormatError};
use crate::tag::Tag;

// ── Reader ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos:  usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Absolute byte offset of the next read.
    #[inline]
    pub fn position(&self) -> u64 {
        self.pos as u64
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn truncated(&self, needed: u64) -> FormatError {
        FormatError::Truncated {
            offset:    self.position(),
            needed,
            available: self.remaining() as u64,
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        if n > self.remaining() {
            return Err(self.truncated(n as u64));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Byte length of `count` elements of `width` bytes, or a truncation
    /// error if that cannot possibly fit.
    fn span(&self, count: usize, width: usize) -> Result<usize, FormatError> {
        count
            .checked_mul(width)
            .ok_or_else(|| self.truncated(u64::MAX))
    }

    // ── Tags ─────────────────────────────────────────────────────────────────

    pub fn read_tag(&mut self) -> Result<Tag, FormatError> {
        let b = self.take(4)?;
        Ok(Tag([b[0], b[1], b[2], b[3]]))
    }

    /// Read the next tag without consuming it.
    pub fn peek_tag(&self) -> Result<Tag, FormatError> {
        if self.remaining() < 4 {
            return Err(self.truncated(4));
        }
        let b = &self.data[self.pos..self.pos + 4];
        Ok(Tag([b[0], b[1], b[2], b[3]]))
    }

    pub fn expect_tag(&mut self, expected: Tag) -> Result<(), FormatError> {
        let offset = self.position();
        let found = self.read_tag()?;
        if found != expected {
            return Err(FormatError::UnexpectedTag { offset, expected, found });
        }
        Ok(())
    }

    // ── Scalars ──────────────────────────────────────────────────────────────

    pub fn read_i32(&mut self) -> Result<i32, FormatError> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, FormatError> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn read_u16(&mut self) -> Result<u16, FormatError> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_f32(&mut self) -> Result<f32, FormatError> {
        Ok(BigEndian::read_f32(self.take(4)?))
    }

    pub fn read_f32x3(&mut self) -> Result<[f32; 3], FormatError> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    /// Read an i32 element count.  Negative values are a format error.
    pub fn read_count(&mut self, what: &'static str) -> Result<usize, FormatError> {
        let offset = self.position();
        let value = self.read_i32()?;
        usize::try_from(value).map_err(|_| FormatError::InvalidCount {
            offset,
            what,
            value: value as i64,
        })
    }

    // ── Arrays ───────────────────────────────────────────────────────────────

    pub fn read_f32_vec(&mut self, count: usize) -> Result<Vec<f32>, FormatError> {
        let len = self.span(count, 4)?;
        let src = self.take(len)?;
        let mut out = vec![0f32; count];
        BigEndian::read_f32_into(src, &mut out);
        Ok(out)
    }

    pub fn read_i32_vec(&mut self, count: usize) -> Result<Vec<i32>, FormatError> {
        let len = self.span(count, 4)?;
        let src = self.take(len)?;
        let mut out = vec![0i32; count];
        BigEndian::read_i32_into(src, &mut out);
        Ok(out)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        self.take(n)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), FormatError> {
        self.take(n).map(|_| ())
    }

    /// Read a fixed-width, NUL-padded text field.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD, so such a
    /// name is written back with different bytes.
    pub fn read_fixed_str(&mut self, width: usize) -> Result<String, FormatError> {
        let raw = self.take(width)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }
}

/// Encoder precondition for a text field: `s` must fit in `width` bytes and
/// hold no NUL, or it would not read back unchanged.
pub(crate) fn check_fixed_str(
    s:     &str,
    width: usize,
    owner: impl FnOnce() -> String,
) -> Result<(), ContractError> {
    if s.len() > width {
        return Err(ContractError::NameTooLong { owner: owner(), len: s.len(), max: width });
    }
    if s.contains('\0') {
        return Err(ContractError::NameContainsNul { owner: owner() });
    }
    Ok(())
}

// ── Writer ───────────────────────────────────────────────────────────────────

pub struct ChunkWriter<W: Write> {
    inner:   W,
    written: u64,
}

impl<W: Write> ChunkWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_tag(&mut self, tag: Tag) -> io::Result<()> {
        self.write_bytes(tag.as_bytes())
    }

    pub fn write_i32(&mut self, v: i32) -> io::Result<()> {
        self.inner.write_i32::<BigEndian>(v)?;
        self.written += 4;
        Ok(())
    }

    pub fn write_u32(&mut self, v: u32) -> io::Result<()> {
        self.inner.write_u32::<BigEndian>(v)?;
        self.written += 4;
        Ok(())
    }

    pub fn write_u16(&mut self, v: u16) -> io::Result<()> {
        self.inner.write_u16::<BigEndian>(v)?;
        self.written += 2;
        Ok(())
    }

    pub fn write_u8(&mut self, v: u8) -> io::Result<()> {
        self.inner.write_u8(v)?;
        self.written += 1;
        Ok(())
    }

    pub fn write_f32(&mut self, v: f32) -> io::Result<()> {
        self.inner.write_f32::<BigEndian>(v)?;
        self.written += 4;
        Ok(())
    }

    pub fn write_f32x3(&mut self, v: [f32; 3]) -> io::Result<()> {
        v.iter().try_for_each(|&x| self.write_f32(x))
    }

    /// Write an element count as i32.  Counts beyond `i32::MAX` cannot be
    /// represented in the format.
    pub fn write_count(&mut self, count: usize) -> io::Result<()> {
        let v = i32::try_from(count).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("count {count} does not fit in a 32-bit field"),
            )
        })?;
        self.write_i32(v)
    }

    pub fn write_f32s(&mut self, values: &[f32]) -> io::Result<()> {
        let mut buf = vec![0u8; values.len() * 4];
        BigEndian::write_f32_into(values, &mut buf);
        self.write_bytes(&buf)
    }

    pub fn write_i32s(&mut self, values: &[i32]) -> io::Result<()> {
        let mut buf = vec![0u8; values.len() * 4];
        BigEndian::write_i32_into(values, &mut buf);
        self.write_bytes(&buf)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    /// Write `s` into a `width`-byte field, NUL-padded.  Text longer than the
    /// field is cut at the last char boundary that fits; the encoder rejects
    /// such names up front (see [`check_fixed_str`]).
    pub fn write_fixed_str(&mut self, s: &str, width: usize) -> io::Result<()> {
        let mut end = s.len().min(width);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        let mut field = vec![0u8; width];
        field[..end].copy_from_slice(&s.as_bytes()[..end]);
        self.write_bytes(&field)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{CONT, OBJT};

    #[test]
    fn reads_big_endian_scalars() {
        let bytes = [0x00, 0x00, 0x01, 0x02, 0x3f, 0x80, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff];
        let mut c = Cursor::new(&bytes);
        assert_eq!(c.read_i32().unwrap(), 0x0102);
        assert_eq!(c.read_f32().unwrap(), 1.0);
        assert_eq!(c.read_i32().unwrap(), -1);
        assert!(c.is_empty());
    }

    #[test]
    fn short_read_reports_offset_and_shortfall() {
        let bytes = [0u8; 6];
        let mut c = Cursor::new(&bytes);
        c.read_i32().unwrap();
        let err = c.read_i32().unwrap_err();
        assert_eq!(err, FormatError::Truncated { offset: 4, needed: 4, available: 2 });
        // A failed read does not advance.
        assert_eq!(c.position(), 4);
    }

    #[test]
    fn expect_tag_mismatch() {
        let mut c = Cursor::new(b"CONTxxxx");
        let err = c.expect_tag(OBJT).unwrap_err();
        assert_eq!(err, FormatError::UnexpectedTag { offset: 0, expected: OBJT, found: CONT });
    }

    #[test]
    fn peek_does_not_consume() {
        let mut c = Cursor::new(b"OBJT");
        assert_eq!(c.peek_tag().unwrap(), OBJT);
        assert_eq!(c.position(), 0);
        assert_eq!(c.read_tag().unwrap(), OBJT);
        assert!(c.peek_tag().is_err());
    }

    #[test]
    fn negative_count_is_rejected() {
        let bytes = (-3i32).to_be_bytes();
        let mut c = Cursor::new(&bytes);
        let err = c.read_count("point count").unwrap_err();
        assert!(matches!(err, FormatError::InvalidCount { offset: 0, value: -3, .. }));
    }

    #[test]
    fn huge_array_fails_before_allocating() {
        let bytes = [0u8; 8];
        let mut c = Cursor::new(&bytes);
        assert!(matches!(c.read_f32_vec(usize::MAX / 2), Err(FormatError::Truncated { .. })));
        assert!(matches!(c.read_i32_vec(3), Err(FormatError::Truncated { .. })));
    }

    #[test]
    fn fixed_str_stops_at_nul() {
        let mut field = [0u8; 16];
        field[..5].copy_from_slice(b"actin");
        field[7] = b'x';
        let mut c = Cursor::new(&field);
        assert_eq!(c.read_fixed_str(16).unwrap(), "actin");
        assert!(c.is_empty());
    }

    #[test]
    fn writer_mirrors_reader() {
        let mut w = ChunkWriter::new(Vec::new());
        w.write_tag(OBJT).unwrap();
        w.write_i32(-22).unwrap();
        w.write_u16(7).unwrap();
        w.write_f32s(&[1.5, -2.0]).unwrap();
        w.write_i32s(&[4, -1]).unwrap();
        w.write_fixed_str("name", 8).unwrap();
        assert_eq!(w.bytes_written(), 4 + 4 + 2 + 8 + 8 + 8);

        let bytes = w.into_inner();
        let mut c = Cursor::new(&bytes);
        c.expect_tag(OBJT).unwrap();
        assert_eq!(c.read_i32().unwrap(), -22);
        assert_eq!(c.read_u16().unwrap(), 7);
        assert_eq!(c.read_f32_vec(2).unwrap(), vec![1.5, -2.0]);
        assert_eq!(c.read_i32_vec(2).unwrap(), vec![4, -1]);
        assert_eq!(c.read_fixed_str(8).unwrap(), "name");
    }

    #[test]
    fn fixed_str_truncates_on_char_boundary() {
        let mut w = ChunkWriter::new(Vec::new());
        w.write_fixed_str("abé", 3).unwrap();
        assert_eq!(w.into_inner(), vec![b'a', b'b', 0]);
    }

    #[test]
    fn fixed_str_replaces_invalid_utf8() {
        let field = [b'a', 0xff, b'b', 0];
        let mut c = Cursor::new(&field);
        assert_eq!(c.read_fixed_str(4).unwrap(), "a\u{fffd}b");
    }

    #[test]
    fn fixed_str_precondition() {
        let owner = || "object 2".to_string();
        assert!(check_fixed_str(&"x".repeat(64), 64, owner).is_ok());
        assert_eq!(
            check_fixed_str(&"x".repeat(70), 64, owner),
            Err(ContractError::NameTooLong { owner: "object 2".into(), len: 70, max: 64 })
        );
        // 33 two-byte chars
        assert!(matches!(
            check_fixed_str(&"é".repeat(33), 64, owner),
            Err(ContractError::NameTooLong { len: 66, .. })
        ));
        assert_eq!(
            check_fixed_str("a\0b", 64, owner),
            Err(ContractError::NameContainsNul { owner: "object 2".into() })
        );
    }
}
