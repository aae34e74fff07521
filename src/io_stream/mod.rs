//! Model codec: reader and writer.
//!
//! # Reader
//! [`ModelReader`] makes a single forward pass over the file bytes:
//!
//! ```text
//! Start ──(IMOD, version, header)──▶ HeaderRead ──▶ ScanningChunks ──(IEOF)──▶ Done
//! ```
//!
//! While scanning, `OBJT` dispatches to [`Object::read`], `MINX` to
//! [`Transform::read`], and any other tag to [`skip_chunk`].  Object-level
//! tags (`CONT`, `MESH`, `SIZE`, `IMAT`, `OMNX`) are invalid here.  Running
//! out of bytes before `IEOF` is a truncation error, never a valid end.
//!
//! Every failure aborts the whole decode; no partially built [`Model`] is ever
//! returned.
//!
//! # Writer
//! [`ModelWriter`] checks the whole tree first, then emits magic, version,
//! header, objects, `MINX`, retained extensions and `IEOF`.  Every count and
//! length field is recomputed from the live data.  Output is not atomic; see
//! [`crate::model_file::save`] for the temp-file-and-rename path.
//!
//! # Endianness
//! All multi-byte fields are big-endian; see `cursor.rs`.

use log::{debug, warn};
use std::io::Write;

use crate::cursor::{ChunkWriter, Cursor};
use crate::error::{FormatError, ImodError};
use crate::extension::{skip_chunk, Transform};
use crate::header::ModelHeader;
use crate::model::Model;
use crate::object::Object;
use crate::tag::{CONT, IEOF, IMAT, IMOD, MESH, MINX, OBJT, OMNX, SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    Start,
    HeaderRead,
    ScanningChunks,
    Done,
}

// ── Reader ───────────────────────────────────────────────────────────────────

pub struct ModelReader<'a> {
    cursor: Cursor<'a>,
    state:  DecodeState,
}

impl<'a> ModelReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(bytes), state: DecodeState::Start }
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Byte offset of the next read.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn read_model(&mut self) -> Result<Model, FormatError> {
        let mut model = Model::default();
        let mut declared_objects = 0usize;

        loop {
            match self.state {
                DecodeState::Start => {
                    self.cursor.expect_tag(IMOD)?;
                    model.version = self.cursor.read_tag()?;
                    let (header, objsize) = ModelHeader::read(&mut self.cursor)?;
                    model.header = header;
                    declared_objects = objsize;
                    self.state = DecodeState::HeaderRead;
                }
                DecodeState::HeaderRead => {
                    debug!(
                        "model {:?} ({}): {declared_objects} objects declared",
                        model.header.name, model.version
                    );
                    self.state = DecodeState::ScanningChunks;
                }
                DecodeState::ScanningChunks => {
                    let offset = self.cursor.position();
                    let tag = self.cursor.read_tag()?;
                    match tag {
                        OBJT => {
                            let index = model.objects.len();
                            if index == declared_objects {
                                return Err(FormatError::CountMismatch {
                                    offset,
                                    what:     "model objects",
                                    expected: declared_objects as u64,
                                    found:    declared_objects as u64 + 1,
                                });
                            }
                            model.objects.push(Object::read(&mut self.cursor, index)?);
                        }
                        MINX => model.transform = Some(Transform::read(&mut self.cursor, MINX)?),
                        IEOF => {
                            if model.objects.len() != declared_objects {
                                return Err(FormatError::CountMismatch {
                                    offset,
                                    what:     "model objects",
                                    expected: declared_objects as u64,
                                    found:    model.objects.len() as u64,
                                });
                            }
                            self.state = DecodeState::Done;
                        }
                        CONT | MESH | SIZE | IMAT | OMNX => {
                            return Err(FormatError::UnexpectedTag { offset, expected: OBJT, found: tag });
                        }
                        _ => model.extensions.push(skip_chunk(&mut self.cursor, tag)?),
                    }
                }
                DecodeState::Done => break,
            }
        }

        if !self.cursor.is_empty() {
            warn!(
                "ignoring {} bytes after IEOF at offset {}",
                self.cursor.remaining(),
                self.cursor.position()
            );
        }
        Ok(model)
    }
}

/// Decode a complete model file held in memory.
pub fn decode(bytes: &[u8]) -> Result<Model, FormatError> {
    ModelReader::new(bytes).read_model()
}

// ── Writer ───────────────────────────────────────────────────────────────────

pub struct ModelWriter<W: Write> {
    writer: ChunkWriter<W>,
}

impl<W: Write> ModelWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { writer: ChunkWriter::new(inner) }
    }

    /// Encode `model`.  Returns the number of bytes written.
    pub fn write_model(&mut self, model: &Model) -> Result<u64, ImodError> {
        model.check()?;

        let start = self.writer.bytes_written();
        let w = &mut self.writer;
        w.write_tag(IMOD)?;
        w.write_tag(model.version)?;
        model.header.write(w, model.objects.len())?;
        for object in &model.objects {
            object.write(w)?;
        }
        if let Some(transform) = &model.transform {
            transform.write(w, MINX)?;
        }
        for ext in &model.extensions {
            ext.write(w)?;
        }
        w.write_tag(IEOF)?;
        w.flush()?;

        let written = w.bytes_written() - start;
        debug!("encoded {} objects in {written} bytes", model.objects.len());
        Ok(written)
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

/// Encode `model` into `writer`.  Returns the number of bytes written.
pub fn encode<W: Write>(model: &Model, writer: W) -> Result<u64, ImodError> {
    ModelWriter::new(writer).write_model(model)
}

pub fn encode_to_vec(model: &Model) -> Result<Vec<u8>, ImodError> {
    let mut writer = ModelWriter::new(Vec::new());
    writer.write_model(model)?;
    Ok(writer.into_inner())
}
