//! Four-byte chunk identifiers.
//!
//! Every chunk in an IMOD file starts with a 4-byte ASCII tag.  Tags are
//! compared as raw bytes; no case folding or trimming is ever applied.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

/// File magic.
pub const IMOD: Tag = Tag(*b"IMOD");
/// Format version written by this crate.
pub const V1_2: Tag = Tag(*b"V1.2");
pub const OBJT: Tag = Tag(*b"OBJT");
pub const CONT: Tag = Tag(*b"CONT");
pub const MESH: Tag = Tag(*b"MESH");
/// Per-point sizes for the contour immediately preceding it.
pub const SIZE: Tag = Tag(*b"SIZE");
/// Object material.
pub const IMAT: Tag = Tag(*b"IMAT");
/// Model-wide scale / translation / rotation.
pub const MINX: Tag = Tag(*b"MINX");
/// Object-level override of `MINX`.
pub const OMNX: Tag = Tag(*b"OMNX");
pub const VIEW: Tag = Tag(*b"VIEW");
pub const MOST: Tag = Tag(*b"MOST");
pub const SLAN: Tag = Tag(*b"SLAN");
/// Per-object meshing parameters, written after the object's meshes.
pub const MEPA: Tag = Tag(*b"MEPA");
/// Terminal tag.
pub const IEOF: Tag = Tag(*b"IEOF");

/// Tags that belong to the model level.  An object's chunk run ends at the
/// first one of these.
pub const MODEL_LEVEL: [Tag; 6] = [OBJT, IEOF, MINX, VIEW, MOST, SLAN];

impl Tag {
    #[inline]
    pub const fn new(bytes: [u8; 4]) -> Self {
        Tag(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub fn is_model_level(self) -> bool {
        MODEL_LEVEL.contains(&self)
    }

    fn is_printable(&self) -> bool {
        self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ')
    }
}

impl From<[u8; 4]> for Tag {
    fn from(bytes: [u8; 4]) -> Self {
        Tag(bytes)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_printable() {
            // is_printable guarantees ASCII
            f.write_str(std::str::from_utf8(&self.0).map_err(|_| fmt::Error)?)
        } else {
            write!(f, "0x{}", hex::encode(self.0))
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}
