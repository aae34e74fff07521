//! Length-prefixed extension chunks.
//!
//! Everything after the fixed `OBJT` / `CONT` / `MESH` records is written as
//! `tag (4 B) | length (i32 BE) | payload`.  Chunks this crate does not model
//! are consumed by [`skip_chunk`] and kept as opaque [`Extension`] blobs so a
//! re-encode can emit them again; their payload is never interpreted.
//!
//! The scale/translation chunks (`MINX` at model level, `OMNX` at object
//! level) share the [`Transform`] payload.

use log::trace;
use std::io::{self, Write};

use crate::cursor::{ChunkWriter, Cursor};
use crate::error::FormatError;
use crate::tag::Tag;

/// An unmodelled chunk retained verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub tag:     Tag,
    pub payload: Vec<u8>,
}

impl Extension {
    pub fn new(tag: Tag, payload: Vec<u8>) -> Self {
        Self { tag, payload }
    }

    /// Write tag, freshly computed length, payload.
    pub fn write<W: Write>(&self, w: &mut ChunkWriter<W>) -> io::Result<()> {
        w.write_tag(self.tag)?;
        w.write_count(self.payload.len())?;
        w.write_bytes(&self.payload)
    }
}

/// Consume the length-prefixed chunk whose `tag` has already been read.
///
/// The cursor advances by exactly 4 + the declared length.  A declared length
/// larger than what remains fails without consuming the payload.
pub fn skip_chunk(cursor: &mut Cursor<'_>, tag: Tag) -> Result<Extension, FormatError> {
    let len = cursor.read_count("chunk length")?;
    let start = cursor.position();
    let payload = cursor.read_bytes(len)?.to_vec();
    trace!("skipped {tag} chunk: {len} bytes at offset {start}");
    Ok(Extension { tag, payload })
}

/// Read the length field of a chunk with a fixed-size payload.
///
/// Returns the number of trailing bytes beyond `fixed` that the caller must
/// skip after decoding its fields.  Shorter payloads are a format error.
pub(crate) fn read_fixed_length(
    cursor: &mut Cursor<'_>,
    tag:    Tag,
    fixed:  usize,
) -> Result<usize, FormatError> {
    let offset = cursor.position();
    let len = cursor.read_count("chunk length")?;
    if len < fixed {
        return Err(FormatError::CountMismatch {
            offset,
            what:     "chunk length",
            expected: fixed as u64,
            found:    len as u64,
        });
    }
    if len > fixed {
        trace!("{tag} chunk carries {} bytes beyond its {fixed}-byte payload", len - fixed);
    }
    Ok(len - fixed)
}

// ── Transform ────────────────────────────────────────────────────────────────

/// Payload size of `MINX` / `OMNX`.
pub const TRANSFORM_SIZE: usize = 72;

/// Scale, translation and rotation applied when displaying the model.
///
/// The `original_*` triple is the transform at the time the model was
/// created; the unprefixed triple is the current one and is what exporters
/// apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub original_scale:       [f32; 3],
    pub original_translation: [f32; 3],
    pub original_rotation:    [f32; 3],
    pub scale:                [f32; 3],
    pub translation:          [f32; 3],
    pub rotation:             [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            original_scale:       [1.0; 3],
            original_translation: [0.0; 3],
            original_rotation:    [0.0; 3],
            scale:                [1.0; 3],
            translation:          [0.0; 3],
            rotation:             [0.0; 3],
        }
    }
}

impl Transform {
    /// Decode the payload of a transform chunk whose tag has been consumed.
    pub fn read(cursor: &mut Cursor<'_>, tag: Tag) -> Result<Self, FormatError> {
        let tail = read_fixed_length(cursor, tag, TRANSFORM_SIZE)?;
        let t = Self {
            original_scale:       cursor.read_f32x3()?,
            original_translation: cursor.read_f32x3()?,
            original_rotation:    cursor.read_f32x3()?,
            scale:                cursor.read_f32x3()?,
            translation:          cursor.read_f32x3()?,
            rotation:             cursor.read_f32x3()?,
        };
        cursor.skip(tail)?;
        Ok(t)
    }

    pub fn write<W: Write>(&self, w: &mut ChunkWriter<W>, tag: Tag) -> io::Result<()> {
        w.write_tag(tag)?;
        w.write_count(TRANSFORM_SIZE)?;
        w.write_f32x3(self.original_scale)?;
        w.write_f32x3(self.original_translation)?;
        w.write_f32x3(self.original_rotation)?;
        w.write_f32x3(self.scale)?;
        w.write_f32x3(self.translation)?;
        w.write_f32x3(self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{MINX, OBJT};

    fn chunk(len: i32, payload: &[u8]) -> Vec<u8> {
        let mut v = len.to_be_bytes().to_vec();
        v.extend_from_slice(payload);
        v
    }

    #[test]
    fn skip_advances_exactly_declared_length() {
        let mut bytes = chunk(5, b"hello");
        bytes.extend_from_slice(b"OBJT");
        let mut c = Cursor::new(&bytes);
        let ext = skip_chunk(&mut c, Tag(*b"OLBL")).unwrap();
        assert_eq!(ext.payload, b"hello");
        assert_eq!(c.position(), 4 + 5);
        assert_eq!(c.peek_tag().unwrap(), OBJT);
    }

    #[test]
    fn skip_rejects_overlong_length() {
        let bytes = chunk(100, b"short");
        let mut c = Cursor::new(&bytes);
        let err = skip_chunk(&mut c, Tag(*b"OLBL")).unwrap_err();
        assert_eq!(err, FormatError::Truncated { offset: 4, needed: 100, available: 5 });
    }

    #[test]
    fn skip_rejects_negative_length() {
        let bytes = chunk(-8, b"");
        let mut c = Cursor::new(&bytes);
        assert!(matches!(
            skip_chunk(&mut c, Tag(*b"OLBL")),
            Err(FormatError::InvalidCount { value: -8, .. })
        ));
    }

    #[test]
    fn extension_write_recomputes_length() {
        let ext = Extension::new(Tag(*b"CLBL"), vec![1, 2, 3]);
        let mut w = ChunkWriter::new(Vec::new());
        ext.write(&mut w).unwrap();
        assert_eq!(w.into_inner(), b"CLBL\x00\x00\x00\x03\x01\x02\x03".to_vec());
    }

    #[test]
    fn transform_round_trip() {
        let t = Transform {
            scale:       [2.0, 2.0, 6.5],
            translation: [-10.0, 4.0, 0.5],
            ..Transform::default()
        };
        let mut w = ChunkWriter::new(Vec::new());
        t.write(&mut w, MINX).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes.len(), 4 + 4 + TRANSFORM_SIZE);

        let mut c = Cursor::new(&bytes);
        c.expect_tag(MINX).unwrap();
        assert_eq!(Transform::read(&mut c, MINX).unwrap(), t);
        assert!(c.is_empty());
    }

    #[test]
    fn transform_skips_longer_payload() {
        let mut payload = vec![0u8; TRANSFORM_SIZE + 8];
        payload[..4].copy_from_slice(&3.0f32.to_be_bytes());
        let bytes = chunk((TRANSFORM_SIZE + 8) as i32, &payload);
        let mut c = Cursor::new(&bytes);
        let t = Transform::read(&mut c, MINX).unwrap();
        assert_eq!(t.original_scale[0], 3.0);
        assert!(c.is_empty());
    }

    #[test]
    fn transform_rejects_short_payload() {
        let bytes = chunk(12, &[0u8; 12]);
        let mut c = Cursor::new(&bytes);
        assert!(matches!(
            Transform::read(&mut c, MINX),
            Err(FormatError::CountMismatch { expected: 72, found: 12, .. })
        ));
    }
}
