//! Recursive type renderer.
//!
//! Maps one schema node, at a given path id, to type-expression text. Rule
//! precedence lives in [`SchemaNode::shape`]; this module turns each shape
//! into text, recursing through the traversal context for children and the
//! comment renderer for per-member documentation.
use std::borrow::Cow;

use serde_json::Value;

use crate::buffer::RenderBuffer;
use crate::comment::{Comment, render_comment};
use crate::error::{RenderError, Result};
use crate::ident;
use crate::overrides::{CommentRewriter, RenderOverride};
use crate::path_id::PathId;
use crate::schema::{EnumMember, Primitive, SchemaNode, Shape};
use crate::traverse::{Entry, Traverse};

pub struct RenderContext<'a> {
    traverse: Traverse<'a>,
    overrides: &'a dyn RenderOverride,
    rewriter: &'a dyn CommentRewriter,
}

impl std::fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext").finish_non_exhaustive()
    }
}

/// Parenthesise `text` when it sits in an ambiguous position.
fn wrap(text: String, ambiguous: bool) -> String {
    if ambiguous { format!("({text})") } else { text }
}

impl<'a> RenderContext<'a> {
    pub fn new(overrides: &'a dyn RenderOverride, rewriter: &'a dyn CommentRewriter) -> Self {
        let traverse = Traverse::new(move |node, id| overrides.is_visible(node, id));
        Self { traverse, overrides, rewriter }
    }

    pub fn traverse(&self) -> &Traverse<'a> { &self.traverse }

    pub fn overrides(&self) -> &dyn RenderOverride { self.overrides }

    pub fn comment(&self, node: &SchemaNode, id: &PathId) -> Option<Comment> {
        render_comment(node, id, &self.traverse, self.rewriter)
    }

    /// Apply the override collaborator's replacement for `id`, if any.
    pub fn resolve<'n>(&self, node: &'n SchemaNode, id: &PathId) -> Cow<'n, SchemaNode> {
        match self.overrides.type_override(node, id) {
            Some(replacement) => Cow::Owned(replacement),
            None => Cow::Borrowed(node),
        }
    }

    /// Render `node` (absent → `void`) as a type expression.
    pub fn render_type(&self, node: Option<&SchemaNode>, id: &PathId, ambiguous: bool) -> Result<String> {
        let void = SchemaNode::void();
        let node = self.resolve(node.unwrap_or(&void), id);
        self.render_resolved(&node, id, ambiguous)
    }

    /// Render a node whose override has already been applied.
    pub fn render_resolved(&self, node: &SchemaNode, id: &PathId, ambiguous: bool) -> Result<String> {
        if node.nodoc {
            return Err(RenderError::NodocReached { id: id.clone() });
        }
        match node.shape(id)? {
            Shape::InstanceOf(name) => Ok(name.to_string()),
            Shape::Enum(members) => {
                let literals: Vec<String> = members.iter().map(EnumMember::literal).collect();
                Ok(wrap(literals.join(" | "), ambiguous))
            }
            Shape::Choices(choices) => {
                let alternatives = choices
                    .iter()
                    .enumerate()
                    .map(|(index, choice)| self.render_type(Some(choice), &id.choice(index), true))
                    .collect::<Result<Vec<_>>>()?;
                Ok(wrap(alternatives.join(" | "), ambiguous))
            }
            Shape::Array { items, min_items, max_items } => {
                self.render_array(items, min_items, max_items, id, ambiguous)
            }
            Shape::Object => self.render_object(node, id),
            Shape::Reference(name) => self.render_reference(node, name, id, ambiguous),
            Shape::Literal(value) => Ok(value.to_string()),
            Shape::Function => Ok(wrap(self.render_inline_function(node, id)?, ambiguous)),
            Shape::Primitive(Primitive::Any) => {
                Ok(self.overrides.replace_any_with(id).unwrap_or_else(|| "any".to_string()))
            }
            Shape::Primitive(primitive) => Ok(primitive.as_ts().to_string()),
        }
    }

    // ---- arrays ----

    fn render_array(
        &self,
        items: Option<&SchemaNode>,
        min_items: Option<u32>,
        max_items: Option<u32>,
        id: &PathId,
        ambiguous: bool,
    ) -> Result<String> {
        // some historical schemas omit `items` entirely
        let number = SchemaNode::of_type("number");
        let element = self.render_type(Some(items.unwrap_or(&number)), &id.element(), true)?;

        if let Some(max) = max_items {
            let min = min_items.unwrap_or(0);
            if min > max {
                return Err(RenderError::ArrayBounds { id: id.clone(), min, max });
            }
            let mut tuples: Vec<String> = (min..=max)
                .map(|len| format!("[{}]", vec![element.as_str(); len as usize].join(", ")))
                .collect();
            if tuples.len() == 1 {
                return Ok(tuples.remove(0));
            }
            return Ok(wrap(tuples.join(" | "), ambiguous));
        }

        if let Some(min) = min_items {
            let mut slots = vec![element.clone(); min as usize];
            slots.push(format!("...{element}[]"));
            return Ok(wrap(format!("[{}]", slots.join(", ")), ambiguous));
        }

        Ok(format!("{element}[]"))
    }

    // ---- objects ----

    /// `[name: string]: T` for dictionary-like objects.
    pub fn index_signature(&self, node: &SchemaNode, id: &PathId) -> Result<Option<String>> {
        node.additional_properties
            .as_deref()
            .map(|value| {
                let ty = self.render_type(Some(value), &id.element(), false)?;
                Ok(format!("[name: string]: {ty}"))
            })
            .transpose()
    }

    fn render_object(&self, node: &SchemaNode, id: &PathId) -> Result<String> {
        let index = self.index_signature(node, id)?;
        let properties = self.traverse.properties_for(node, id);
        if properties.is_empty() {
            return Ok(match index {
                Some(signature) => format!("{{{signature}}}"),
                None => "{}".to_string(),
            });
        }
        let mut buf = RenderBuffer::new();
        buf.start("{");
        self.render_members(index, &properties, &mut buf)?;
        buf.end("}");
        Ok(buf.into_string())
    }

    /// Object members in declaration order. Documented members are separated
    /// from their neighbours by a blank line.
    ///
    /// Function members declaring `returns_async` become one method signature
    /// per calling convention, each carrying the member's documentation.
    pub fn render_members(&self, index: Option<String>, properties: &[Entry<'_>], buf: &mut RenderBuffer) -> Result<()> {
        let mut first = true;
        let mut previous_documented = false;
        if let Some(signature) = index {
            buf.line(&format!("{signature};"));
            first = false;
        }
        for entry in properties {
            let node = self.resolve(entry.node, &entry.id);
            let comment = self.comment(&node, &entry.id);
            let documented = comment.is_some();
            let key = ident::property_key(entry.name);
            let marker = if node.optional { "?" } else { "" };

            let lines = if self.is_async_method(&node, &entry.id)? {
                self.traverse
                    .expand_function_params(&node, &entry.id)?
                    .iter()
                    .map(|signature| -> Result<String> {
                        let params = self.render_params(&signature.parameters, &entry.id, false)?;
                        let returns = self.render_type(signature.returns.as_ref(), &entry.id.returns(), false)?;
                        Ok(format!("{key}{marker}{params}: {returns};"))
                    })
                    .collect::<Result<Vec<_>>>()?
            } else {
                let ty = self.render_resolved(&node, &entry.id, false)?;
                vec![format!("{key}{marker}: {ty};")]
            };

            for line in lines {
                if !first && (documented || previous_documented) {
                    buf.blank();
                }
                if let Some(comment) = &comment {
                    buf.comment(comment);
                }
                buf.line(&line);
                first = false;
                previous_documented = documented;
            }
        }
        Ok(())
    }

    fn is_async_method(&self, node: &SchemaNode, id: &PathId) -> Result<bool> {
        Ok(node.returns_async.is_some() && !node.nodoc && matches!(node.shape(id)?, Shape::Function))
    }

    // ---- references ----

    fn render_reference(&self, node: &SchemaNode, name: &str, id: &PathId, ambiguous: bool) -> Result<String> {
        if node.properties.as_ref().is_some_and(|props| !props.is_empty()) {
            let extra = SchemaNode {
                ty: Some("object".to_string()),
                properties: node.properties.clone(),
                ..SchemaNode::default()
            };
            let object = self.render_object(&extra, id)?;
            return Ok(wrap(format!("{name} & {object}"), ambiguous));
        }
        match &node.value {
            Some(Value::Array(values)) if values.len() > 1 => {
                let args = values[1..]
                    .iter()
                    .enumerate()
                    .map(|(index, value)| {
                        let arg_id = id.template_arg(index);
                        let arg = SchemaNode::from_value(value, &arg_id)?;
                        self.render_type(Some(&arg), &arg_id, false)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{name}<{}>", args.join(", ")))
            }
            // A lone value has no known template meaning; ignored.
            Some(Value::Array(_)) | None => Ok(name.to_string()),
            Some(other) => Err(RenderError::BadTemplateValue { id: id.clone(), value: other.to_string() }),
        }
    }

    // ---- functions ----

    fn render_inline_function(&self, node: &SchemaNode, id: &PathId) -> Result<String> {
        if node.returns_async.is_some() {
            return Err(RenderError::InlineAsync { id: id.clone() });
        }
        let params = self.render_params(node.parameters.as_deref().unwrap_or_default(), id, true)?;
        let returns = self.render_type(node.returns.as_deref(), &id.returns(), false)?;
        Ok(format!("{params} => {returns}"))
    }

    /// Parenthesised parameter list.
    ///
    /// Only the trailing run of optional parameters keeps its `?`; an optional
    /// parameter followed by a required one renders as required. With
    /// `interleave_docs`, documented parameters switch the list to one
    /// parameter per line with its comment above it.
    pub fn render_params(&self, params: &[SchemaNode], id: &PathId, interleave_docs: bool) -> Result<String> {
        let visible = self.traverse.parameters_for(params, id);
        let optional_from = visible.iter().rposition(|(_, p)| !p.optional).map_or(0, |i| i + 1);

        let mut rendered: Vec<(Option<Comment>, String)> = Vec::with_capacity(visible.len());
        for (index, (param_id, param)) in visible.iter().enumerate() {
            let ty = self.render_type(Some(param), param_id, false)?;
            let marker = if param.optional && index >= optional_from { "?" } else { "" };
            let name = ident::param_name(param.name.as_deref(), index);
            let comment = if interleave_docs { self.comment(param, param_id) } else { None };
            rendered.push((comment, format!("{name}{marker}: {ty}")));
        }

        if rendered.iter().all(|(comment, _)| comment.is_none()) {
            let list: Vec<&str> = rendered.iter().map(|(_, text)| text.as_str()).collect();
            return Ok(format!("({})", list.join(", ")));
        }

        let mut buf = RenderBuffer::new();
        buf.start("(");
        let mut previous_documented = false;
        for (index, (comment, text)) in rendered.iter().enumerate() {
            if index > 0 && (comment.is_some() || previous_documented) {
                buf.blank();
            }
            if let Some(comment) = comment {
                buf.comment(comment);
            }
            buf.line(&format!("{text},"));
            previous_documented = comment.is_some();
        }
        buf.end(")");
        Ok(buf.into_string())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{NoOverrides, Verbatim};
    use serde_json::json;

    fn node(v: Value) -> SchemaNode { serde_json::from_value(v).unwrap() }

    fn id() -> PathId { PathId::namespace("test").child("T") }

    fn render(v: Value) -> String {
        render_with(&NoOverrides, v, false)
    }

    fn render_with(overrides: &dyn RenderOverride, v: Value, ambiguous: bool) -> String {
        let cx = RenderContext::new(overrides, &Verbatim);
        cx.render_type(Some(&node(v)), &id(), ambiguous).unwrap()
    }

    fn render_err(v: Value) -> RenderError {
        let cx = RenderContext::new(&NoOverrides, &Verbatim);
        cx.render_type(Some(&node(v)), &id(), false).unwrap_err()
    }

    #[test]
    fn primitives_map_independent_of_id() {
        let cases = [
            ("int64", "number"), ("integer", "number"), ("number", "number"), ("double", "number"),
            ("binary", "ArrayBuffer"), ("any", "any"), ("boolean", "boolean"), ("string", "string"),
            ("void", "void"), ("undefined", "undefined"),
        ];
        let cx = RenderContext::new(&NoOverrides, &Verbatim);
        for (ty, expected) in cases {
            for path in [id(), PathId::namespace("other").child("x").element()] {
                assert_eq!(cx.render_type(Some(&SchemaNode::of_type(ty)), &path, false).unwrap(), expected);
            }
        }
    }

    #[test]
    fn absent_node_is_void() {
        let cx = RenderContext::new(&NoOverrides, &Verbatim);
        assert_eq!(cx.render_type(None, &id(), false).unwrap(), "void");
    }

    #[test]
    fn enum_members_in_order() {
        assert_eq!(render(json!({"type": "string", "enum": ["c", "a", {"name": "b"}]})), r#""c" | "a" | "b""#);
        assert_eq!(render(json!({"type": "integer", "enum": [1, 2]})), "1 | 2");
    }

    #[test]
    fn ambiguous_context_parenthesises_unions() {
        let e = json!({"type": "string", "enum": ["a", "b"]});
        assert_eq!(render_with(&NoOverrides, e.clone(), true), r#"("a" | "b")"#);
        assert_eq!(render_with(&NoOverrides, e, false), r#""a" | "b""#);

        let c = json!({"choices": [{"type": "string"}, {"type": "integer"}]});
        assert_eq!(render_with(&NoOverrides, c.clone(), true), "(string | number)");
        assert_eq!(render_with(&NoOverrides, c, false), "string | number");
    }

    #[test]
    fn choices_branch_ids() {
        struct Narrow;
        impl RenderOverride for Narrow {
            fn replace_any_with(&self, id: &PathId) -> Option<String> {
                (id.to_string() == "test.T._1").then(|| "Window".to_string())
            }
        }
        let c = json!({"choices": [{"type": "any"}, {"type": "any"}]});
        assert_eq!(render_with(&Narrow, c, false), "any | Window");
    }

    #[test]
    fn array_cardinality() {
        assert_eq!(render(json!({"type": "array", "items": {"type": "string"}})), "string[]");
        assert_eq!(
            render(json!({"type": "array", "items": {"type": "string"}, "minItems": 1, "maxItems": 2})),
            "[string] | [string, string]"
        );
        assert_eq!(
            render(json!({"type": "array", "items": {"type": "string"}, "minItems": 2})),
            "[string, string, ...string[]]"
        );
        assert_eq!(render(json!({"type": "array", "items": {"type": "number"}, "maxItems": 0})), "[]");
        assert_eq!(
            render(json!({"type": "array", "items": {"type": "number"}, "minItems": 2, "maxItems": 2})),
            "[number, number]"
        );
    }

    #[test]
    fn array_defaults_and_element_wrapping() {
        assert_eq!(render(json!({"type": "array"})), "number[]");
        assert_eq!(
            render(json!({"type": "array", "items": {"choices": [{"type": "string"}, {"type": "boolean"}]}})),
            "(string | boolean)[]"
        );
        assert_eq!(
            render(json!({"type": "array", "items": {"type": "function", "parameters": []}})),
            "(() => void)[]"
        );
        let wrapped = render_with(
            &NoOverrides,
            json!({"type": "array", "items": {"type": "string"}, "minItems": 0, "maxItems": 1}),
            true,
        );
        assert_eq!(wrapped, "([] | [string])");
    }

    #[test]
    fn rest_tuples_and_intersections_wrap_as_elements() {
        assert_eq!(
            render(json!({"type": "array", "items": {"type": "array", "items": {"type": "string"}, "minItems": 1}})),
            "([string, ...string[]])[]"
        );
        assert_eq!(
            render(json!({"type": "array", "items": {"$ref": "Base", "properties": {"x": {"type": "string"}}}})),
            "(Base & {\n  x: string;\n})[]"
        );
        assert_eq!(
            render(json!({"type": "array", "items": {"type": "function", "parameters": [{"name": "n", "type": "integer"}]}})),
            "((n: number) => void)[]"
        );
    }

    #[test]
    fn async_function_members_expand_to_method_overloads() {
        let text = render(json!({
            "type": "object",
            "properties": {
                "get": {
                    "type": "function",
                    "description": "Gets items.",
                    "parameters": [{"name": "keys", "type": "string", "optional": true}],
                    "returns_async": {"name": "callback", "parameters": [
                        {"name": "items", "type": "object", "additionalProperties": {"type": "any"}}
                    ]}
                },
                "clear": {"type": "function", "optional": true, "parameters": [],
                    "returns_async": {"name": "callback", "parameters": []}},
                "area": {"type": "string"}
            }
        }));
        assert_eq!(
            text,
            "{\n  /**\n   * Gets items.\n   *\n   * @param keys\n   */\n  get(keys: string, callback: (items: {[name: string]: any}) => void): void;\n\n  /**\n   * Gets items.\n   *\n   * @param keys\n   */\n  get(keys?: string): Promise<{[name: string]: any}>;\n\n  clear?(callback: () => void): void;\n  clear?(): Promise<void>;\n  area: string;\n}"
        );
    }

    #[test]
    fn async_function_in_inline_position_is_still_fatal() {
        let err = render_err(json!({"type": "array", "items": {"type": "function", "parameters": [],
            "returns_async": {"name": "callback", "parameters": []}}}));
        assert!(matches!(err, RenderError::InlineAsync { .. }));
    }

    #[test]
    fn array_bounds_inverted_is_fatal() {
        let err = render_err(json!({"type": "array", "minItems": 3, "maxItems": 1}));
        assert!(matches!(err, RenderError::ArrayBounds { min: 3, max: 1, .. }));
    }

    #[test]
    fn dictionary_only_object() {
        assert_eq!(
            render(json!({"type": "object", "additionalProperties": {"type": "number"}})),
            "{[name: string]: number}"
        );
        assert_eq!(render(json!({"type": "object"})), "{}");
    }

    #[test]
    fn object_record_with_docs() {
        let text = render(json!({
            "type": "object",
            "additionalProperties": {"type": "any"},
            "properties": {
                "a": {"type": "string"},
                "b": {"type": "integer", "optional": true, "description": "The b."},
                "c": {"type": "boolean"},
                "d": {"type": "boolean"},
                "e-f": {"type": "string"},
                "hidden": {"type": "string", "nodoc": true}
            }
        }));
        assert_eq!(
            text,
            "{\n  [name: string]: any;\n  a: string;\n\n  /**\n   * The b.\n   */\n  b?: number;\n\n  c: boolean;\n  d: boolean;\n  \"e-f\": string;\n}"
        );
    }

    #[test]
    fn ref_forms() {
        assert_eq!(render(json!({"$ref": "tabs.Tab"})), "tabs.Tab");
        assert_eq!(render(json!({"$ref": "Foo", "value": ["only"]})), "Foo");
        assert_eq!(
            render(json!({"$ref": "events.Event", "value": ["ignored", {"type": "string"}, {"$ref": "Tab"}]})),
            "events.Event<string, Tab>"
        );
        assert_eq!(
            render(json!({"$ref": "Base", "properties": {"extra": {"type": "string"}}})),
            "Base & {\n  extra: string;\n}"
        );
        assert!(matches!(render_err(json!({"$ref": "Foo", "value": "nope"})), RenderError::BadTemplateValue { .. }));
    }

    #[test]
    fn template_args_use_at_ids() {
        struct AtIds;
        impl RenderOverride for AtIds {
            fn replace_any_with(&self, id: &PathId) -> Option<String> {
                Some(format!("'{id}'"))
            }
        }
        let text = render_with(&AtIds, json!({"$ref": "Map", "value": ["x", {"type": "any"}, {"type": "any"}]}), false);
        assert_eq!(text, "Map<'test.T.@0', 'test.T.@1'>");
    }

    #[test]
    fn literal_values() {
        assert_eq!(render(json!({"type": "string", "value": "abc"})), r#""abc""#);
        assert_eq!(render(json!({"type": "integer", "value": 42})), "42");
    }

    #[test]
    fn inline_function_optional_repair() {
        let text = render(json!({
            "type": "function",
            "parameters": [
                {"name": "a", "type": "string", "optional": true},
                {"name": "b", "type": "string"},
                {"name": "c", "type": "integer", "optional": true},
                {"name": "d", "type": "boolean", "optional": true},
                {"name": "e", "type": "boolean", "nodoc": true}
            ],
            "returns": {"type": "boolean"}
        }));
        assert_eq!(text, "(a: string, b: string, c?: number, d?: boolean) => boolean");
    }

    #[test]
    fn inline_function_interleaves_docs() {
        let text = render(json!({
            "parameters": [
                {"name": "tab", "$ref": "Tab", "description": "The tab."},
                {"name": "function", "type": "string"}
            ]
        }));
        assert_eq!(text, "(\n  /**\n   * The tab.\n   */\n  tab: Tab,\n\n  _function: string,\n) => void");
    }

    #[test]
    fn inline_async_is_fatal() {
        let err = render_err(json!({"type": "function", "parameters": [], "returns_async": {"name": "cb"}}));
        assert!(matches!(err, RenderError::InlineAsync { .. }));
    }

    #[test]
    fn nodoc_reaching_renderer_is_fatal() {
        assert!(matches!(render_err(json!({"type": "string", "nodoc": true})), RenderError::NodocReached { .. }));
    }

    #[test]
    fn any_narrowing_and_type_override() {
        struct Swap;
        impl RenderOverride for Swap {
            fn type_override(&self, _node: &SchemaNode, id: &PathId) -> Option<SchemaNode> {
                (id.to_string() == "test.T.x").then(|| SchemaNode::of_type("boolean"))
            }
            fn replace_any_with(&self, id: &PathId) -> Option<String> {
                (id.to_string() == "test.T.y").then(|| "unknown".to_string())
            }
        }
        let text = render_with(
            &Swap,
            json!({"type": "object", "properties": {"x": {"type": "string"}, "y": {"type": "any"}, "z": {"type": "any"}}}),
            false,
        );
        assert_eq!(text, "{\n  x: boolean;\n  y: unknown;\n  z: any;\n}");
    }

    #[test]
    fn instance_of_short_circuits() {
        assert_eq!(render(json!({"type": "object", "isInstanceOf": "Window", "properties": {}})), "Window");
    }
}
