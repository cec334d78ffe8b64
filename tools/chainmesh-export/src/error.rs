//! Error types for the conversion pipeline

use crate::mesh::Attribute;

/// Every failure aborts the whole conversion; nothing is written.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// Malformed token, wrong field arity or a zero face index
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Index out of bounds after resolving relative indices
    #[error("line {line}: {attribute} index {index} out of range ({len} available)")]
    IndexRange {
        attribute: Attribute,
        index: i64,
        len: usize,
        line: usize,
    },

    /// Mixed attribute presence, or an internal invariant that did not hold
    #[error("consistency check failed: {0}")]
    Consistency(String),

    /// A count does not fit the 16-bit face stream encoding
    #[error("model has too many {what}: {count} found (max allowed {max})")]
    Capacity {
        what: &'static str,
        count: usize,
        max: usize,
    },

    /// Edge lookup failure while chaining (degenerate or non-manifold input)
    #[error("object {object}: triangle {triangle} has no edge {edge:?}")]
    Integrity {
        object: usize,
        triangle: usize,
        edge: (u32, u32),
    },

    /// Model name unusable as a symbol prefix
    #[error("model name {0:?} is not a valid C identifier")]
    InvalidName(String),

    #[error("no faces found in the source")]
    NoFaces,

    #[error("binary output supports a single object, model has {0} (use a text format)")]
    MultipleObjects(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MeshError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type MeshResult<T> = Result<T, MeshError>;
