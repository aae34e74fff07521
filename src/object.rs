//! `OBJT` chunk: an object header followed by its contours, meshes and
//! object-level extension chunks.
//!
//! The fixed header is 176 bytes:
//!
//! | Field                         | Type      |
//! |-------------------------------|-----------|
//! | name                          | 64 × u8   |
//! | extra                         | 16 × u32  |
//! | contsize                      | i32       |
//! | flags                         | u32       |
//! | axis                          | i32       |
//! | drawmode                      | i32       |
//! | red, green, blue              | 3 × f32   |
//! | pdrawsize                     | i32       |
//! | symbol, symsize, linewidth2,  |           |
//! | linewidth, linesty, symflags, |           |
//! | sympad, trans                 | 8 × u8    |
//! | meshsize                      | i32       |
//! | surfsize                      | i32       |
//!
//! After the header the object owns every chunk up to the next model-level
//! tag (see [`crate::tag::MODEL_LEVEL`]).  `contsize` `CONT` chunks and
//! `meshsize` `MESH` chunks must appear in that run, no more and no fewer.

use log::debug;
use std::io::{self, Write};

use crate::contour::Contour;
use crate::cursor::{check_fixed_str, ChunkWriter, Cursor};
use crate::error::{ContractError, FormatError};
use crate::extension::{read_fixed_length, skip_chunk, Extension, Transform};
use crate::mesh::Mesh;
use crate::tag::{CONT, IMAT, MESH, OBJT, OMNX, SIZE};

pub const OBJECT_HEADER_SIZE: usize = 176;
pub const OBJECT_NAME_LEN:    usize = 64;
/// Payload size of `IMAT`.
pub const MATERIAL_SIZE:      usize = 16;

#[inline]
fn unit_from_byte(b: u8) -> f32 {
    b as f32 / 255.0
}

#[inline]
fn byte_from_unit(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ── Material ─────────────────────────────────────────────────────────────────

/// Lighting properties from the `IMAT` chunk.
///
/// The four lighting channels are stored as bytes and exposed in `[0, 1]`;
/// the remaining fields are carried through untouched.  A channel that is
/// not a multiple of 1/255 is rounded to the nearest step on encode, so 0.5
/// reads back as 128/255.  [`Material::quantized`] gives the value that will
/// read back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient:     f32,
    pub diffuse:     f32,
    pub specular:    f32,
    pub shininess:   f32,
    pub fill_color:  [u8; 3],
    pub quality:     u8,
    pub mat2:        u32,
    pub black_level: u8,
    pub white_level: u8,
    pub flags2:      u8,
    pub mat3b3:      u8,
}

impl Default for Material {
    fn default() -> Self {
        Self::from_bytes(102, 255, 127, 4)
    }
}

impl Material {
    /// Build a material from stored byte channels.
    pub fn from_bytes(ambient: u8, diffuse: u8, specular: u8, shininess: u8) -> Self {
        Self {
            ambient:     unit_from_byte(ambient),
            diffuse:     unit_from_byte(diffuse),
            specular:    unit_from_byte(specular),
            shininess:   unit_from_byte(shininess),
            fill_color:  [0; 3],
            quality:     0,
            mat2:        0,
            black_level: 0,
            white_level: 255,
            flags2:      0,
            mat3b3:      0,
        }
    }

    /// Stored byte channels `[ambient, diffuse, specular, shininess]`.
    pub fn to_bytes(&self) -> [u8; 4] {
        [
            byte_from_unit(self.ambient),
            byte_from_unit(self.diffuse),
            byte_from_unit(self.specular),
            byte_from_unit(self.shininess),
        ]
    }

    /// Snap the lighting channels to the stored byte steps.
    pub fn quantized(self) -> Self {
        let [ambient, diffuse, specular, shininess] = self.to_bytes();
        Self {
            ambient:   unit_from_byte(ambient),
            diffuse:   unit_from_byte(diffuse),
            specular:  unit_from_byte(specular),
            shininess: unit_from_byte(shininess),
            ..self
        }
    }

    /// Decode an `IMAT` payload whose tag has been consumed.
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self, FormatError> {
        let tail = read_fixed_length(cursor, IMAT, MATERIAL_SIZE)?;
        let m = Self {
            ambient:     unit_from_byte(cursor.read_u8()?),
            diffuse:     unit_from_byte(cursor.read_u8()?),
            specular:    unit_from_byte(cursor.read_u8()?),
            shininess:   unit_from_byte(cursor.read_u8()?),
            fill_color:  [cursor.read_u8()?, cursor.read_u8()?, cursor.read_u8()?],
            quality:     cursor.read_u8()?,
            mat2:        cursor.read_u32()?,
            black_level: cursor.read_u8()?,
            white_level: cursor.read_u8()?,
            flags2:      cursor.read_u8()?,
            mat3b3:      cursor.read_u8()?,
        };
        cursor.skip(tail)?;
        Ok(m)
    }

    pub fn write<W: Write>(&self, w: &mut ChunkWriter<W>) -> io::Result<()> {
        w.write_tag(IMAT)?;
        w.write_count(MATERIAL_SIZE)?;
        w.write_bytes(&self.to_bytes())?;
        w.write_bytes(&self.fill_color)?;
        w.write_u8(self.quality)?;
        w.write_u32(self.mat2)?;
        w.write_bytes(&[self.black_level, self.white_level, self.flags2, self.mat3b3])
    }
}

// ── Object ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// At most 64 bytes with no NUL; names read from disk have invalid
    /// UTF-8 replaced with U+FFFD.
    pub name:          String,
    pub extra:         [u32; 16],
    pub flags:         u32,
    pub axis:          i32,
    pub draw_mode:     i32,
    pub color:         [f32; 3],
    pub point_size:    i32,
    pub symbol:        u8,
    pub symbol_size:   u8,
    pub line_width_2d: u8,
    pub line_width:    u8,
    pub line_style:    u8,
    pub symbol_flags:  u8,
    pub symbol_pad:    u8,
    /// Stored as a whole percentage byte and exposed in `[0, 1]`.  Values
    /// between percent steps are rounded on encode (0.123 reads back as
    /// 0.12).
    pub transparency:  f32,
    pub surface_count: i32,
    pub material:      Option<Material>,
    /// Overrides the model's `MINX` transform for this object.
    pub transform:     Option<Transform>,
    pub contours:      Vec<Contour>,
    pub meshes:        Vec<Mesh>,
    pub extensions:    Vec<Extension>,
}

impl Default for Object {
    fn default() -> Self {
        Self {
            name:          String::new(),
            extra:         [0; 16],
            flags:         0,
            axis:          0,
            draw_mode:     1,
            color:         [0.0, 1.0, 0.0],
            point_size:    0,
            symbol:        0,
            symbol_size:   3,
            line_width_2d: 1,
            line_width:    1,
            line_style:    0,
            symbol_flags:  0,
            symbol_pad:    0,
            transparency:  0.0,
            surface_count: 0,
            material:      None,
            transform:     None,
            contours:      Vec::new(),
            meshes:        Vec::new(),
            extensions:    Vec::new(),
        }
    }
}

impl Object {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// The object's material, or the format default when it has no `IMAT`.
    pub fn material(&self) -> Material {
        self.material.unwrap_or_default()
    }

    /// Decode an object whose `OBJT` tag has already been consumed.
    ///
    /// Returns with the cursor on the first model-level tag after the object,
    /// which is left unconsumed for the caller.
    pub fn read(cursor: &mut Cursor<'_>, index: usize) -> Result<Self, FormatError> {
        let name = cursor.read_fixed_str(OBJECT_NAME_LEN)?;
        let mut extra = [0u32; 16];
        for e in extra.iter_mut() {
            *e = cursor.read_u32()?;
        }
        let contsize   = cursor.read_count("object contour count")?;
        let flags      = cursor.read_u32()?;
        let axis       = cursor.read_i32()?;
        let draw_mode  = cursor.read_i32()?;
        let color      = cursor.read_f32x3()?;
        let point_size = cursor.read_i32()?;
        let style      = cursor.read_bytes(8)?;
        let meshsize   = cursor.read_count("object mesh count")?;
        let surface_count = cursor.read_i32()?;

        debug!("object {index} {name:?}: {contsize} contours, {meshsize} meshes");

        let mut object = Object {
            name,
            extra,
            flags,
            axis,
            draw_mode,
            color,
            point_size,
            symbol:        style[0],
            symbol_size:   style[1],
            line_width_2d: style[2],
            line_width:    style[3],
            line_style:    style[4],
            symbol_flags:  style[5],
            symbol_pad:    style[6],
            transparency:  style[7] as f32 / 100.0,
            surface_count,
            ..Object::default()
        };

        loop {
            let offset = cursor.position();
            let tag = cursor.peek_tag()?;
            if tag.is_model_level() {
                break;
            }
            cursor.read_tag()?;
            match tag {
                CONT => {
                    if object.contours.len() == contsize {
                        return Err(FormatError::CountMismatch {
                            offset,
                            what:     "object contours",
                            expected: contsize as u64,
                            found:    contsize as u64 + 1,
                        });
                    }
                    object.contours.push(Contour::read(cursor)?);
                }
                MESH => {
                    if object.meshes.len() == meshsize {
                        return Err(FormatError::CountMismatch {
                            offset,
                            what:     "object meshes",
                            expected: meshsize as u64,
                            found:    meshsize as u64 + 1,
                        });
                    }
                    object.meshes.push(Mesh::read(cursor)?);
                }
                IMAT => object.material  = Some(Material::read(cursor)?),
                OMNX => object.transform = Some(Transform::read(cursor, OMNX)?),
                SIZE => {
                    // Sizes are only valid directly after their contour.
                    return Err(FormatError::UnexpectedTag { offset, expected: CONT, found: SIZE });
                }
                _ => object.extensions.push(skip_chunk(cursor, tag)?),
            }
        }

        let offset = cursor.position();
        if object.contours.len() != contsize {
            return Err(FormatError::CountMismatch {
                offset,
                what:     "object contours",
                expected: contsize as u64,
                found:    object.contours.len() as u64,
            });
        }
        if object.meshes.len() != meshsize {
            return Err(FormatError::CountMismatch {
                offset,
                what:     "object meshes",
                expected: meshsize as u64,
                found:    object.meshes.len() as u64,
            });
        }
        Ok(object)
    }

    pub fn write<W: Write>(&self, w: &mut ChunkWriter<W>) -> io::Result<()> {
        w.write_tag(OBJT)?;
        w.write_fixed_str(&self.name, OBJECT_NAME_LEN)?;
        for &e in &self.extra {
            w.write_u32(e)?;
        }
        w.write_count(self.contours.len())?;
        w.write_u32(self.flags)?;
        w.write_i32(self.axis)?;
        w.write_i32(self.draw_mode)?;
        w.write_f32x3(self.color)?;
        w.write_i32(self.point_size)?;
        let trans = (self.transparency * 100.0).round().clamp(0.0, 255.0) as u8;
        w.write_bytes(&[
            self.symbol,
            self.symbol_size,
            self.line_width_2d,
            self.line_width,
            self.line_style,
            self.symbol_flags,
            self.symbol_pad,
            trans,
        ])?;
        w.write_count(self.meshes.len())?;
        w.write_i32(self.surface_count)?;

        for contour in &self.contours {
            contour.write(w)?;
        }
        for mesh in &self.meshes {
            mesh.write(w)?;
        }
        if let Some(material) = &self.material {
            material.write(w)?;
        }
        if let Some(transform) = &self.transform {
            transform.write(w, OMNX)?;
        }
        for ext in &self.extensions {
            ext.write(w)?;
        }
        Ok(())
    }

    pub(crate) fn check(&self, number: usize) -> Result<(), ContractError> {
        check_fixed_str(&self.name, OBJECT_NAME_LEN, || format!("object {number}"))?;
        for (i, c) in self.contours.iter().enumerate() {
            c.check(number, i + 1)?;
        }
        for (i, m) in self.meshes.iter().enumerate() {
            m.check(number, i + 1)?;
        }
        Ok(())
    }
}
