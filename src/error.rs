//! Fatal generation errors.
//!
//! Every variant aborts the whole run; nothing here is recovered locally.
//! Recoverable anomalies (bad identifiers, missing `items`/`returns`) never
//! become errors, they are worked around by the renderer.
use thiserror::Error;

use crate::path_id::PathId;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unsupported type at {id}: {node}")]
    Unsupported { id: PathId, node: String },

    #[error("nodoc node reached the renderer at {id}")]
    NodocReached { id: PathId },

    #[error("enum at {id} has no members")]
    EmptyEnum { id: PathId },

    #[error("enum at {id} must be of type string or integer, got {ty:?}")]
    BadEnumType { id: PathId, ty: Option<String> },

    #[error("choices at {id} has no alternatives")]
    EmptyChoices { id: PathId },

    #[error("inline function at {id} cannot declare returns_async")]
    InlineAsync { id: PathId },

    #[error("$ref template value at {id} must be an array: {value}")]
    BadTemplateValue { id: PathId, value: String },

    #[error("function at {id} has no name")]
    UnnamedFunction { id: PathId },

    #[error("array at {id} has minItems {min} > maxItems {max}")]
    ArrayBounds { id: PathId, min: u32, max: u32 },

    #[error("returns_async at {id} declares {count} result parameters, at most one is supported")]
    AsyncArity { id: PathId, count: usize },

    #[error("invalid input: {0}")]
    Input(String),
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;

impl RenderError {
    /// Build an `Unsupported` error carrying a compact JSON dump of the node.
    pub fn unsupported<T: serde::Serialize>(id: &PathId, node: &T) -> Self {
        let node = serde_json::to_string(node).unwrap_or_else(|error| format!("<unprintable: {error}>"));
        RenderError::Unsupported { id: id.clone(), node }
    }
}
