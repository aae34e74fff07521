pub mod error;
pub mod tag;
pub mod cursor;
pub mod header;
pub mod contour;
pub mod mesh;
pub mod object;
pub mod extension;
pub mod model;
pub mod io_stream;
pub mod model_file;
pub mod config;
pub mod export;
pub mod metrics;

pub use error::{ContractError, FormatError, ImodError};
pub use tag::Tag;
pub use header::ModelHeader;
pub use contour::{Contour, Point};
pub use mesh::{MarkerKind, Mesh, MeshItem};
pub use object::{Material, Object};
pub use extension::{Extension, Transform};
pub use model::Model;
pub use io_stream::{decode, encode, encode_to_vec, ModelReader, ModelWriter};
pub use config::{ExportOptions, TransformMode};
