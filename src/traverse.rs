//! Visibility-filtered, order-preserving enumeration of child entries, plus
//! overload expansion for function signatures.
//!
//! Containers are `IndexMap`s decoded with `preserve_order`, so iteration is
//! schema-declared order. A non-mapping container never gets this far: it
//! fails decoding with the JSON path of the offending value.
use indexmap::IndexMap;

use crate::error::{RenderError, Result};
use crate::path_id::PathId;
use crate::schema::SchemaNode;

/// One visible child of a container.
#[derive(Debug, Clone)]
pub struct Entry<'n> {
    pub name: &'n str,
    pub id: PathId,
    pub node: &'n SchemaNode,
}

/// One overload variant: return node (absent → void) and parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub returns: Option<SchemaNode>,
    pub parameters: Vec<SchemaNode>,
}

pub struct Traverse<'a> {
    is_visible: Box<dyn Fn(&SchemaNode, &PathId) -> bool + 'a>,
}

impl std::fmt::Debug for Traverse<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Traverse").finish_non_exhaustive()
    }
}

impl<'a> Traverse<'a> {
    pub fn new(is_visible: impl Fn(&SchemaNode, &PathId) -> bool + 'a) -> Self {
        Self { is_visible: Box::new(is_visible) }
    }

    pub fn is_visible(&self, node: &SchemaNode, id: &PathId) -> bool {
        (self.is_visible)(node, id)
    }

    /// Visible entries of `container` in declaration order.
    pub fn entries<'n>(&self, container: &'n IndexMap<String, SchemaNode>, base: &PathId) -> Vec<Entry<'n>> {
        container
            .iter()
            .map(|(name, node)| Entry { name: name.as_str(), id: base.child(name), node })
            .filter(|entry| self.is_visible(entry.node, &entry.id))
            .collect()
    }

    /// Invoke `visit` for every visible entry, stopping at the first error.
    pub fn for_each<'n, F>(&self, container: &'n IndexMap<String, SchemaNode>, base: &PathId, mut visit: F) -> Result<()>
    where
        F: FnMut(Entry<'n>) -> Result<()>,
    {
        for entry in self.entries(container, base) {
            visit(entry)?;
        }
        Ok(())
    }

    /// Visible `properties` of `node`, in declaration order.
    pub fn properties_for<'n>(&self, node: &'n SchemaNode, base: &PathId) -> Vec<Entry<'n>> {
        match &node.properties {
            Some(properties) => self.entries(properties, base),
            None => Vec::new(),
        }
    }

    /// Visible parameters with their ids. Unnamed parameters are keyed by
    /// position.
    pub fn parameters_for<'n>(&self, parameters: &'n [SchemaNode], base: &PathId) -> Vec<(PathId, &'n SchemaNode)> {
        parameters
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let id = match param.name.as_deref() {
                    Some(name) if !name.is_empty() => base.child(name),
                    _ => base.child(&index.to_string()),
                };
                (id, param)
            })
            .filter(|(id, param)| self.is_visible(param, id))
            .collect()
    }

    /// Expand a function into its calling conventions.
    ///
    /// Synchronous functions give one variant. With `returns_async` there is a
    /// callback variant (plain `returns`) and, unless promises are unsupported,
    /// a variant without the callback returning `Promise<result>`.
    pub fn expand_function_params(&self, function: &SchemaNode, id: &PathId) -> Result<Vec<Signature>> {
        let parameters = function.parameters.clone().unwrap_or_default();
        let returns = function.returns.as_deref().cloned();

        let Some(async_node) = function.returns_async.as_deref() else {
            return Ok(vec![Signature { returns, parameters }]);
        };

        let results = async_node.parameters.clone().unwrap_or_default();
        let callback = SchemaNode {
            ty: Some("function".to_string()),
            name: Some(async_node.name.clone().unwrap_or_else(|| "callback".to_string())),
            parameters: Some(results.clone()),
            optional: async_node.optional,
            description: async_node.description.clone(),
            ..SchemaNode::default()
        };

        let mut with_callback = parameters.clone();
        with_callback.push(callback);
        let mut variants = vec![Signature { returns, parameters: with_callback }];

        if async_node.supports_promises() {
            let result = match results.as_slice() {
                [] => SchemaNode::void(),
                [only] => only.clone(),
                many => return Err(RenderError::AsyncArity { id: id.clone(), count: many.len() }),
            };
            variants.push(Signature {
                returns: Some(SchemaNode::promise_of(&result)?),
                parameters,
            });
        }

        Ok(variants)
    }
}

/// Leading namespace of a path id; scopes reference resolution.
pub fn namespace_name_from_id(id: &PathId) -> &str {
    id.namespace_name()
}
