//! Namespace and top-level declaration rendering.
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::buffer::RenderBuffer;
use crate::error::{RenderError, Result};
use crate::ident;
use crate::path_id::PathId;
use crate::render::RenderContext;
use crate::schema::{ApiDocument, Namespace};
use crate::traverse::Entry;

/// Static header prepended to every generated file.
pub const PREAMBLE: &str = include_str!("../resources/preamble.d.ts");

/// Visible-content counts for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceSummary {
    pub name: String,
    pub hidden: bool,
    pub types: usize,
    pub properties: usize,
    pub functions: usize,
}

impl NamespaceSummary {
    pub fn is_empty(&self) -> bool {
        self.types + self.properties + self.functions == 0
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TOP-LEVEL
// ————————————————————————————————————————————————————————————————————————————

/// Full output: preamble verbatim, a blank line, the timestamp comment, two
/// blank lines, then the declaration block.
pub fn generate(doc: &ApiDocument, cx: &RenderContext<'_>, preamble: &str, generated_at: DateTime<Utc>) -> Result<String> {
    let body = render_api(doc, cx)?;
    let mut out = String::with_capacity(preamble.len() + body.len() + 64);
    out.push_str(preamble);
    if !preamble.is_empty() && !preamble.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!("\n// Generated on {}\n\n\n{body}\n", generated_at.to_rfc2822()));
    Ok(out)
}

/// One `declare namespace chrome { ... }` block holding every rendered
/// namespace, sorted by name.
pub fn render_api(doc: &ApiDocument, cx: &RenderContext<'_>) -> Result<String> {
    let mut namespaces: Vec<&Namespace> = doc.api.values().collect();
    namespaces.sort_by(|a, b| a.namespace.cmp(&b.namespace));

    let mut out = RenderBuffer::new();
    out.start("declare namespace chrome {");
    let mut first = true;
    for ns in namespaces {
        let Some(block) = render_namespace(ns, cx)? else { continue };
        if !first {
            out.blank();
        }
        out.append(&block);
        first = false;
    }
    out.end("}");
    Ok(out.into_string())
}

/// Sorted per-namespace counts of what would be rendered.
pub fn summarize(doc: &ApiDocument, cx: &RenderContext<'_>) -> Vec<NamespaceSummary> {
    let traverse = cx.traverse();
    let mut out: Vec<NamespaceSummary> = doc.api.values()
        .map(|ns| {
            let id = PathId::namespace(&ns.namespace);
            NamespaceSummary {
                name: ns.namespace.clone(),
                hidden: !traverse.is_visible(&ns.node, &id),
                types: traverse.entries(&ns.types, &id).len(),
                properties: traverse.properties_for(&ns.node, &id).len(),
                functions: traverse.entries(&ns.functions, &id).len(),
            }
        })
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

// ————————————————————————————————————————————————————————————————————————————
// NAMESPACES
// ————————————————————————————————————————————————————————————————————————————

/// Render one namespace, or `None` when it is hidden or has nothing visible.
pub fn render_namespace(ns: &Namespace, cx: &RenderContext<'_>) -> Result<Option<RenderBuffer>> {
    let id = PathId::namespace(&ns.namespace);
    if !cx.traverse().is_visible(&ns.node, &id) {
        debug!(namespace = %ns.namespace, "namespace hidden");
        return Ok(None);
    }

    let mut body = RenderBuffer::new();
    cx.traverse().for_each(&ns.types, &id, |entry| render_top_type(cx, &entry, &mut body))?;
    if let Some(properties) = &ns.node.properties {
        cx.traverse().for_each(properties, &id, |entry| render_top_property(cx, &entry, &mut body))?;
    }
    cx.traverse().for_each(&ns.functions, &id, |entry| render_top_function(cx, &entry, &mut body))?;

    if body.is_empty() {
        debug!(namespace = %ns.namespace, "namespace has no visible content");
        return Ok(None);
    }
    debug!(namespace = %ns.namespace, "rendered namespace");

    let mut out = RenderBuffer::new();
    if let Some(comment) = cx.comment(&ns.node, &id) {
        out.comment(&comment);
    }
    if ident::is_valid_namespace_name(&ns.namespace) {
        out.start(&format!("export namespace {} {{", ns.namespace));
        out.append(&body);
        out.end("}");
    } else {
        let alias = ident::alias_for(&ns.namespace);
        warn!(namespace = %ns.namespace, %alias, "namespace name is not an identifier, aliasing");
        out.start(&format!("namespace {alias} {{"));
        out.append(&body);
        out.end("}");
        out.line(&format!("export {{{alias} as {}}};", ident::property_key(&ns.namespace)));
    }
    Ok(Some(out))
}

fn separate(buf: &mut RenderBuffer) {
    if !buf.is_empty() {
        buf.blank();
    }
}

/// Interfaces (or classes) for object types, type aliases for the rest.
fn render_top_type(cx: &RenderContext<'_>, entry: &Entry<'_>, buf: &mut RenderBuffer) -> Result<()> {
    if !ident::is_valid_token(entry.name) {
        warn!(id = %entry.id, "type name is not an identifier, skipping");
        return Ok(());
    }
    let node = cx.resolve(entry.node, &entry.id);

    separate(buf);
    if let Some(comment) = cx.comment(&node, &entry.id) {
        buf.comment(&comment);
    }

    if !node.is_object() || node.is_instance_of.is_some() {
        let ty = cx.render_resolved(&node, &entry.id, false)?;
        buf.line(&format!("export type {} = {ty};", entry.name));
        return Ok(());
    }
    if node.nodoc {
        return Err(RenderError::NodocReached { id: entry.id.clone() });
    }

    let templates = cx.overrides().object_templates_for(&entry.id).unwrap_or_default();
    let index = cx.index_signature(&node, &entry.id)?;
    let properties = cx.traverse().properties_for(&node, &entry.id);

    if node.has_instance_type() {
        let members: Vec<Entry<'_>> = properties.into_iter().filter(|p| p.name != "instanceType").collect();
        buf.start(&format!("export class {}{templates} {{", entry.name));
        buf.line(&format!("constructor(arg: Omit<{}, \"instanceType\">);", entry.name));
        if index.is_some() || !members.is_empty() {
            buf.blank();
        }
        cx.render_members(index, &members, buf)?;
        buf.end("}");
    } else {
        buf.start(&format!("export interface {}{templates} {{", entry.name));
        cx.render_members(index, &properties, buf)?;
        buf.end("}");
    }
    Ok(())
}

/// `const`, or `let` for optional properties.
fn render_top_property(cx: &RenderContext<'_>, entry: &Entry<'_>, buf: &mut RenderBuffer) -> Result<()> {
    separate(buf);
    if let Some(comment) = cx.comment(entry.node, &entry.id) {
        buf.comment(&comment);
    }
    let keyword = if entry.node.optional { "let" } else { "const" };
    let ty = cx.render_type(Some(entry.node), &entry.id, false)?;
    if ident::is_valid_token(entry.name) {
        buf.line(&format!("export {keyword} {}: {ty};", entry.name));
    } else {
        let alias = ident::alias_for(entry.name);
        warn!(id = %entry.id, %alias, "property name is not an identifier, aliasing");
        buf.line(&format!("{keyword} {alias}: {ty};"));
        buf.line(&format!("export {{{alias} as {}}};", ident::property_key(entry.name)));
    }
    Ok(())
}

/// One declaration per calling convention, sharing the function's comment.
fn render_top_function(cx: &RenderContext<'_>, entry: &Entry<'_>, buf: &mut RenderBuffer) -> Result<()> {
    if entry.name.is_empty() {
        return Err(RenderError::UnnamedFunction { id: entry.id.clone() });
    }
    let node = cx.resolve(entry.node, &entry.id);
    let variants = cx.traverse().expand_function_params(&node, &entry.id)?;
    debug!(id = %entry.id, variants = variants.len(), "expanded function");

    let valid = ident::is_valid_token(entry.name);
    let (export, declared) = if valid {
        ("export ", entry.name.to_string())
    } else {
        ("", ident::alias_for(entry.name))
    };
    let comment = cx.comment(&node, &entry.id);

    for signature in &variants {
        separate(buf);
        if let Some(comment) = &comment {
            buf.comment(comment);
        }
        let params = cx.render_params(&signature.parameters, &entry.id, false)?;
        let returns = cx.render_type(signature.returns.as_ref(), &entry.id.returns(), false)?;
        buf.line(&format!("{export}function {declared}{params}: {returns};"));
    }

    if !valid {
        warn!(id = %entry.id, alias = %declared, "function name is not an identifier, aliasing");
        buf.line(&format!("export {{{declared} as {}}};", ident::property_key(entry.name)));
    }
    Ok(())
}
