//! Error taxonomy for IMOD model files.
//!
//! - [`FormatError`]: the byte stream is not a well-formed model (bad tag,
//!   truncation, count or length mismatch).  Always fatal to the decode call;
//!   every variant carries the byte offset where the problem was detected.
//! - [`ContractError`]: the caller asked for something the model cannot
//!   provide, or handed the encoder a tree that violates an invariant.
//! - [`ImodError`]: crate-level wrapper, also carrying I/O, configuration and
//!   external-tool failures.

use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::metrics::MetricsError;
use crate::tag::Tag;

/// Result alias used by the path-level and consumer APIs.
pub type Result<T> = std::result::Result<T, ImodError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unexpected tag at offset {offset}: expected {expected}, found {found}")]
    UnexpectedTag { offset: u64, expected: Tag, found: Tag },

    #[error("Truncated stream at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated { offset: u64, needed: u64, available: u64 },

    #[error("Count mismatch at offset {offset}: {what} declared {expected}, found {found}")]
    CountMismatch { offset: u64, what: &'static str, expected: u64, found: u64 },

    #[error("Invalid {what} at offset {offset}: {value}")]
    InvalidCount { offset: u64, what: &'static str, value: i64 },

    #[error("Mesh vertex buffer at offset {offset} holds {floats} floats, not a multiple of 6")]
    UnalignedVertices { offset: u64, floats: u64 },
}

impl FormatError {
    /// Byte offset at which decoding stopped.
    pub fn offset(&self) -> u64 {
        match self {
            FormatError::UnexpectedTag { offset, .. }
            | FormatError::Truncated { offset, .. }
            | FormatError::CountMismatch { offset, .. }
            | FormatError::InvalidCount { offset, .. }
            | FormatError::UnalignedVertices { offset, .. } => *offset,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("Object {number} is out of range (model has {count} objects)")]
    ObjectOutOfRange { number: usize, count: usize },

    #[error("Object {number} contains {meshes} meshes; exactly one is required")]
    MultipleMeshes { number: usize, meshes: usize },

    #[error("Object {number} has no mesh")]
    MissingMesh { number: usize },

    #[error("Required {tag} chunk is missing")]
    MissingExtension { tag: Tag },

    #[error("Object {object}, contour {contour}: {sizes} point sizes for {points} points")]
    SizeCountMismatch { object: usize, contour: usize, points: usize, sizes: usize },

    #[error("Object {object}, mesh {mesh}: {floats} vertex floats is not a multiple of 6")]
    UnalignedVertices { object: usize, mesh: usize, floats: usize },

    #[error("{owner} name is {len} bytes; the field holds {max}")]
    NameTooLong { owner: String, len: usize, max: usize },

    #[error("{owner} name contains a NUL byte")]
    NameContainsNul { owner: String },
}

#[derive(Error, Debug)]
pub enum ImodError {
    #[error("Format error: {0}")]
    Format(#[from] FormatError),
    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
