//! Model header.
//!
//! ```text
//! Offset  Size  Field
//!      0     4  magic "IMOD"
//!      4     4  version tag ("V1.2")
//!      8   128  name (NUL-padded)
//!    136    12  xmax, ymax, zmax       i32
//!    148     4  objsize                i32  object count
//!    152     4  flags                  u32
//!    156    16  drawmode, mousemode, blacklevel, whitelevel  i32
//!    172    12  xoffset, yoffset, zoffset  f32
//!    184    12  xscale, yscale, zscale     f32
//!    196    12  object, contour, point     i32  current selection
//!    208     8  res, thresh            i32
//!    216     4  pixsize                f32
//!    220     4  units                  i32
//!    224     4  csum                   i32
//!    228    12  alpha, beta, gamma     f32
//! ```
//!
//! The object count is not stored on [`ModelHeader`]; the codec writes the
//! live object list length and checks the declared count on decode.

use std::io::{self, Write};

use crate::cursor::{ChunkWriter, Cursor};
use crate::error::FormatError;

/// Bytes after the magic and version tags.
pub const HEADER_SIZE: usize = 232;
pub const MODEL_NAME_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelHeader {
    /// At most 128 bytes with no NUL; names read from disk have invalid
    /// UTF-8 replaced with U+FFFD.
    pub name:            String,
    /// Volume extents in pixels.
    pub max:             [i32; 3],
    pub flags:           u32,
    pub draw_mode:       i32,
    pub mouse_mode:      i32,
    pub black_level:     i32,
    pub white_level:     i32,
    pub offset:          [f32; 3],
    pub scale:           [f32; 3],
    pub current_object:  i32,
    pub current_contour: i32,
    pub current_point:   i32,
    pub resolution:      i32,
    pub threshold:       i32,
    pub pixel_size:      f32,
    pub units:           i32,
    pub checksum:        i32,
    /// Rotation angles (alpha, beta, gamma).
    pub rotation:        [f32; 3],
}

impl Default for ModelHeader {
    fn default() -> Self {
        Self {
            name:            String::new(),
            max:             [0; 3],
            flags:           0,
            draw_mode:       1,
            mouse_mode:      0,
            black_level:     0,
            white_level:     255,
            offset:          [0.0; 3],
            scale:           [1.0; 3],
            current_object:  0,
            current_contour: -1,
            current_point:   -1,
            resolution:      3,
            threshold:       128,
            pixel_size:      1.0,
            units:           0,
            checksum:        0,
            rotation:        [0.0; 3],
        }
    }
}

impl ModelHeader {
    /// Decode the fixed header.  Returns the header and the declared object
    /// count.
    pub fn read(cursor: &mut Cursor<'_>) -> Result<(Self, usize), FormatError> {
        let name = cursor.read_fixed_str(MODEL_NAME_LEN)?;
        let max = [cursor.read_i32()?, cursor.read_i32()?, cursor.read_i32()?];
        let objsize = cursor.read_count("model object count")?;
        let header = Self {
            name,
            max,
            flags:           cursor.read_u32()?,
            draw_mode:       cursor.read_i32()?,
            mouse_mode:      cursor.read_i32()?,
            black_level:     cursor.read_i32()?,
            white_level:     cursor.read_i32()?,
            offset:          cursor.read_f32x3()?,
            scale:           cursor.read_f32x3()?,
            current_object:  cursor.read_i32()?,
            current_contour: cursor.read_i32()?,
            current_point:   cursor.read_i32()?,
            resolution:      cursor.read_i32()?,
            threshold:       cursor.read_i32()?,
            pixel_size:      cursor.read_f32()?,
            units:           cursor.read_i32()?,
            checksum:        cursor.read_i32()?,
            rotation:        cursor.read_f32x3()?,
        };
        Ok((header, objsize))
    }

    pub fn write<W: Write>(&self, w: &mut ChunkWriter<W>, object_count: usize) -> io::Result<()> {
        w.write_fixed_str(&self.name, MODEL_NAME_LEN)?;
        for &m in &self.max {
            w.write_i32(m)?;
        }
        w.write_count(object_count)?;
        w.write_u32(self.flags)?;
        w.write_i32(self.draw_mode)?;
        w.write_i32(self.mouse_mode)?;
        w.write_i32(self.black_level)?;
        w.write_i32(self.white_level)?;
        w.write_f32x3(self.offset)?;
        w.write_f32x3(self.scale)?;
        w.write_i32(self.current_object)?;
        w.write_i32(self.current_contour)?;
        w.write_i32(self.current_point)?;
        w.write_i32(self.resolution)?;
        w.write_i32(self.threshold)?;
        w.write_f32(self.pixel_size)?;
        w.write_i32(self.units)?;
        w.write_i32(self.checksum)?;
        w.write_f32x3(self.rotation)
    }
}
