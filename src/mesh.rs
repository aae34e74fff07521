//! `MESH` chunk: a vertex/normal buffer plus an index/control stream.
//!
//! Wire layout (after the tag):
//!
//! | Field   | Type          |
//! |---------|---------------|
//! | vsize   | i32           |
//! | lsize   | i32           |
//! | flags   | u32           |
//! | time    | u16           |
//! | surf    | u16           |
//! | vert    | f32 × 3·vsize |
//! | list    | i32 × lsize   |
//!
//! `vsize` counts 3-float vectors, which alternate position / normal, so the
//! buffer is a run of 6-tuples.
//! The codec keeps `list` as raw integers.  [`MeshItem`] is the consumer-side
//! reading of it: non-negative entries index the vector array (divide by 2 for
//! the logical vertex), negative entries are structural markers.

use log::warn;
use std::io::{self, Write};

use crate::cursor::{ChunkWriter, Cursor};
use crate::error::{ContractError, FormatError};
use crate::tag::MESH;

// ── Index stream interpretation ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// -1: end of the list.
    End,
    /// -2: start of a polygon.
    BeginPolygon,
    /// -3: following entry is a normal.
    Normal,
    /// -21: start of a polygon with normals.
    BeginPolygonNormals,
    /// -22: end of a polygon.
    EndPolygon,
    /// -23: start of a polygon listing vertex/normal pairs.
    BeginPolygonNormalPairs,
    Other(i32),
}

impl MarkerKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            -1  => MarkerKind::End,
            -2  => MarkerKind::BeginPolygon,
            -3  => MarkerKind::Normal,
            -21 => MarkerKind::BeginPolygonNormals,
            -22 => MarkerKind::EndPolygon,
            -23 => MarkerKind::BeginPolygonNormalPairs,
            c   => MarkerKind::Other(c),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            MarkerKind::End                     => -1,
            MarkerKind::BeginPolygon            => -2,
            MarkerKind::Normal                  => -3,
            MarkerKind::BeginPolygonNormals     => -21,
            MarkerKind::EndPolygon              => -22,
            MarkerKind::BeginPolygonNormalPairs => -23,
            MarkerKind::Other(c)                => c,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshItem {
    /// Logical vertex (6-tuple) index: the raw entry divided by 2.
    Vertex(usize),
    Marker(MarkerKind),
}

impl MeshItem {
    pub fn from_raw(raw: i32) -> Self {
        if raw >= 0 {
            MeshItem::Vertex(raw as usize / 2)
        } else {
            MeshItem::Marker(MarkerKind::from_code(raw))
        }
    }
}

// ── Mesh ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Consecutive `(px, py, pz, nx, ny, nz)` tuples.
    pub vertices: Vec<f32>,
    /// Raw index/control stream, never reinterpreted by the codec.
    pub indices:  Vec<i32>,
    pub flags:    u32,
    pub time:     u16,
    pub surface:  u16,
}

impl Mesh {
    pub fn new(vertices: Vec<f32>, indices: Vec<i32>) -> Self {
        Self { vertices, indices, ..Self::default() }
    }

    /// Number of logical (position + normal) vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 6
    }

    /// Length of the flat vertex buffer in floats.
    #[inline]
    pub fn vertex_float_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn positions(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.vertices.chunks_exact(6).map(|v| [v[0], v[1], v[2]])
    }

    pub fn normals(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.vertices.chunks_exact(6).map(|v| [v[3], v[4], v[5]])
    }

    pub fn items(&self) -> impl Iterator<Item = MeshItem> + '_ {
        self.indices.iter().map(|&raw| MeshItem::from_raw(raw))
    }

    /// Triangles formed by consecutive triples of vertex references.
    ///
    /// Markers end a run.  A run whose length is not a multiple of three
    /// loses its incomplete tail.
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        let mut out = Vec::with_capacity(self.indices.len() / 3);
        let mut pending: Vec<usize> = Vec::with_capacity(3);
        let mut dropped = 0usize;

        for item in self.items() {
            match item {
                MeshItem::Vertex(v) => {
                    pending.push(v);
                    if pending.len() == 3 {
                        out.push([pending[0], pending[1], pending[2]]);
                        pending.clear();
                    }
                }
                MeshItem::Marker(_) => {
                    dropped += pending.len();
                    pending.clear();
                }
            }
        }
        dropped += pending.len();
        if dropped > 0 {
            warn!("mesh index stream: dropped {dropped} references outside complete triangles");
        }
        out
    }

    /// Decode a mesh whose `MESH` tag has already been consumed.
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self, FormatError> {
        let offset  = cursor.position();
        let vsize   = cursor.read_count("mesh vertex count")?;
        let lsize   = cursor.read_count("mesh index count")?;
        let flags   = cursor.read_u32()?;
        let time    = cursor.read_u16()?;
        let surface = cursor.read_u16()?;

        let floats = vsize.saturating_mul(3);
        if floats % 6 != 0 {
            return Err(FormatError::UnalignedVertices { offset, floats: floats as u64 });
        }
        let vertices = cursor.read_f32_vec(floats)?;
        let indices  = cursor.read_i32_vec(lsize)?;

        Ok(Self { vertices, indices, flags, time, surface })
    }

    pub fn write<W: Write>(&self, w: &mut ChunkWriter<W>) -> io::Result<()> {
        w.write_tag(MESH)?;
        w.write_count(self.vertices.len() / 3)?;
        w.write_count(self.indices.len())?;
        w.write_u32(self.flags)?;
        w.write_u16(self.time)?;
        w.write_u16(self.surface)?;
        w.write_f32s(&self.vertices)?;
        w.write_i32s(&self.indices)
    }

    pub(crate) fn check(&self, object: usize, mesh: usize) -> Result<(), ContractError> {
        if self.vertices.len() % 6 != 0 {
            return Err(ContractError::UnalignedVertices {
                object,
                mesh,
                floats: self.vertices.len(),
            });
        }
        Ok(())
    }
}
