//! `CONT` chunk: one ordered outline of 3D points.
//!
//! Wire layout (after the tag):
//!
//! | Field   | Type          |
//! |---------|---------------|
//! | psize   | i32           |
//! | flags   | u32           |
//! | time    | i32           |
//! | surf    | i32           |
//! | points  | f32 × 3·psize |
//!
//! An optional `SIZE` chunk directly after the points carries one f32 radius
//! per point: `SIZE | byte length (= 4·psize) | f32 × psize`.

use std::io::{self, Write};

use crate::cursor::{ChunkWriter, Cursor};
use crate::error::{ContractError, FormatError};
use crate::tag::{CONT, SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 3]> for Point {
    fn from(p: [f32; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    pub points:  Vec<Point>,
    pub flags:   u32,
    /// Time index; doubles as the contour's type tag.
    pub time:    i32,
    pub surface: i32,
    /// Per-point sizes; same length as `points` when present.
    pub sizes:   Option<Vec<f32>>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points, ..Self::default() }
    }

    pub fn with_sizes(mut self, sizes: Vec<f32>) -> Self {
        self.sizes = Some(sizes);
        self
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Points flattened to `x0, y0, z0, x1, ...` in order.
    pub fn coords(&self) -> Vec<f32> {
        self.points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }

    /// Decode a contour whose `CONT` tag has already been consumed, plus its
    /// `SIZE` chunk if one follows.
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self, FormatError> {
        let psize   = cursor.read_count("contour point count")?;
        let flags   = cursor.read_u32()?;
        let time    = cursor.read_i32()?;
        let surface = cursor.read_i32()?;

        let coords = cursor.read_f32_vec(psize.saturating_mul(3))?;
        let points = coords
            .chunks_exact(3)
            .map(|c| Point::new(c[0], c[1], c[2]))
            .collect();

        let sizes = if cursor.remaining() >= 4 && cursor.peek_tag()? == SIZE {
            cursor.read_tag()?;
            let offset = cursor.position();
            let len = cursor.read_count("SIZE chunk length")?;
            if len != psize.saturating_mul(4) {
                return Err(FormatError::CountMismatch {
                    offset,
                    what:     "SIZE chunk length",
                    expected: psize as u64 * 4,
                    found:    len as u64,
                });
            }
            Some(cursor.read_f32_vec(psize)?)
        } else {
            None
        };

        Ok(Self { points, flags, time, surface, sizes })
    }

    pub fn write<W: Write>(&self, w: &mut ChunkWriter<W>) -> io::Result<()> {
        w.write_tag(CONT)?;
        w.write_count(self.points.len())?;
        w.write_u32(self.flags)?;
        w.write_i32(self.time)?;
        w.write_i32(self.surface)?;
        w.write_f32s(&self.coords())?;
        if let Some(sizes) = &self.sizes {
            w.write_tag(SIZE)?;
            w.write_count(sizes.len() * 4)?;
            w.write_f32s(sizes)?;
        }
        Ok(())
    }

    /// Encoder precondition: a size array, if present, matches the points.
    pub(crate) fn check(&self, object: usize, contour: usize) -> Result<(), ContractError> {
        match &self.sizes {
            Some(sizes) if sizes.len() != self.points.len() => {
                Err(ContractError::SizeCountMismatch {
                    object,
                    contour,
                    points: self.points.len(),
                    sizes:  sizes.len(),
                })
            }
            _ => Ok(()),
        }
    }
}
