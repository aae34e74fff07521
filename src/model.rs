//! In-memory model tree.
//!
//! A [`Model`] exclusively owns its objects, and each [`Object`] its contours
//! and meshes.  Nothing holds a reference to its parent; the codec passes the
//! object index down explicitly where it is needed for diagnostics.
//!
//! Counts (objects per model, contours and meshes per object, points per
//! contour) are never stored: they are the lengths of the live sequences and
//! are recomputed every time the tree is encoded.

use crate::cursor::check_fixed_str;
use crate::error::{ContractError, FormatError, ImodError};
use crate::extension::{Extension, Transform};
use crate::header::{ModelHeader, MODEL_NAME_LEN};
use crate::io_stream;
use crate::object::Object;
use crate::tag::{Tag, V1_2};

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Version tag following the magic.
    pub version:    Tag,
    pub header:     ModelHeader,
    /// File order is significant and preserved.
    pub objects:    Vec<Object>,
    /// Model-wide `MINX` transform.
    pub transform:  Option<Transform>,
    /// Unmodelled model-level chunks, re-emitted before `IEOF`.
    pub extensions: Vec<Extension>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            version:    V1_2,
            header:     ModelHeader::default(),
            objects:    Vec::new(),
            transform:  None,
            extensions: Vec::new(),
        }
    }
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        let mut model = Self::default();
        model.header.name = name.into();
        model
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        io_stream::decode(bytes)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ImodError> {
        io_stream::encode_to_vec(self)
    }

    #[inline]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Look up an object by its 1-based number, as shown to users.
    pub fn object_by_number(&self, number: usize) -> Result<&Object, ContractError> {
        number
            .checked_sub(1)
            .and_then(|i| self.objects.get(i))
            .ok_or(ContractError::ObjectOutOfRange { number, count: self.objects.len() })
    }

    /// Transform in effect for the object at `index` (0-based): its own
    /// override if present, else the model's.
    pub fn effective_transform(&self, index: usize) -> Option<Transform> {
        self.objects
            .get(index)
            .and_then(|o| o.transform)
            .or(self.transform)
    }

    /// Encoder preconditions over the whole tree.  Errors carry 1-based
    /// object, contour and mesh numbers.
    pub(crate) fn check(&self) -> Result<(), ContractError> {
        check_fixed_str(&self.header.name, MODEL_NAME_LEN, || "model".to_string())?;
        self.objects
            .iter()
            .enumerate()
            .try_for_each(|(i, o)| o.check(i + 1))
    }
}
