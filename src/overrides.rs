//! Collaborator seams the renderer calls out to.
//!
//! Everything here is keyed by [`PathId`]; the renderer never inspects a
//! collaborator's internals.
use crate::path_id::PathId;
use crate::schema::SchemaNode;

/// Node-level policy: visibility, replacement and type-text hooks.
pub trait RenderOverride {
    /// Consulted for every candidate entry before it is yielded by traversal.
    fn is_visible(&self, node: &SchemaNode, _id: &PathId) -> bool {
        !node.nodoc
    }

    /// Full replacement for the node at `id`, used for template-type injection.
    fn type_override(&self, _node: &SchemaNode, _id: &PathId) -> Option<SchemaNode> {
        None
    }

    /// Template-parameter text appended after an interface/class name.
    fn object_templates_for(&self, _id: &PathId) -> Option<String> {
        None
    }

    /// Narrower type text for an `any` node.
    fn replace_any_with(&self, _id: &PathId) -> Option<String> {
        None
    }
}

/// Visibility by `nodoc` only; no replacements.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl RenderOverride for NoOverrides {}

/// Resolves symbol mentions inside documentation text.
pub trait CommentRewriter {
    fn rewrite(&self, namespace: &str, text: &str) -> String;
}

/// Leaves documentation untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl CommentRewriter for Verbatim {
    fn rewrite(&self, _namespace: &str, text: &str) -> String {
        text.to_string()
    }
}
