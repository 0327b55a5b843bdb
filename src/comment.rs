//! Documentation blocks: description plus structured tags.
use crate::ident;
use crate::overrides::CommentRewriter;
use crate::path_id::PathId;
use crate::schema::SchemaNode;
use crate::traverse::{Traverse, namespace_name_from_id};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: &'static str,
    pub value: String,
}

/// A non-empty documentation block. "No documentation" is `None`, never an
/// empty `Comment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub description: String,
    pub tags: Vec<Tag>,
}

impl Comment {
    /// Declaration-comment lines, one per description line and per tag.
    pub fn lines(&self) -> Vec<String> {
        let mut out = vec!["/**".to_string()];
        for line in self.description.lines() {
            out.push(star(line));
        }
        if !self.description.is_empty() && !self.tags.is_empty() {
            out.push(" *".to_string());
        }
        for tag in &self.tags {
            let mut lines = tag.value.lines();
            match lines.next() {
                Some(first) if !first.is_empty() => {
                    out.push(format!(" * @{} {}", tag.name, escape_close(first.trim_end())))
                }
                _ => out.push(format!(" * @{}", tag.name)),
            }
            out.extend(lines.map(star));
        }
        out.push(" */".to_string());
        out
    }
}

fn star(line: &str) -> String {
    let line = line.trim_end();
    if line.is_empty() { " *".to_string() } else { format!(" * {}", escape_close(line)) }
}

/// `*/` inside documentation text would end the block early.
fn escape_close(text: &str) -> String {
    text.replace("*/", "*\\/")
}

fn collect_tags(node: &SchemaNode, id: &PathId, traverse: &Traverse<'_>) -> Vec<Tag> {
    let mut tags = Vec::new();

    let params = node.parameters.as_deref().unwrap_or_default();
    for (index, (_, param)) in traverse.parameters_for(params, id).into_iter().enumerate() {
        let name = ident::param_name(param.name.as_deref(), index);
        let value = match param.description.as_deref().filter(|d| !d.is_empty()) {
            Some(description) => format!("{name} {description}"),
            None => name,
        };
        tags.push(Tag { name: "param", value });
    }

    if let Some(description) = node.returns.as_ref().and_then(|r| r.description.as_deref()) {
        tags.push(Tag { name: "returns", value: description.to_string() });
    }

    if let Some(reason) = &node.deprecated {
        tags.push(Tag { name: "deprecated", value: reason.clone().unwrap_or_default() });
    }

    for member in node.enum_.iter().flatten() {
        if let Some(description) = member.description() {
            tags.push(Tag {
                name: "chrome-enum",
                value: format!("{} {}", member.literal(), description),
            });
        }
    }

    tags
}

/// Build the documentation block for `node`, or `None` when there is nothing
/// to say. Only visible parameters get `@param` tags. Text is rewritten in
/// the scope of the namespace owning `id`.
pub fn render_comment(
    node: &SchemaNode,
    id: &PathId,
    traverse: &Traverse<'_>,
    rewriter: &dyn CommentRewriter,
) -> Option<Comment> {
    let tags = collect_tags(node, id, traverse);

    let description = node.description.as_deref().unwrap_or_default().trim();
    let description = if description.eq_ignore_ascii_case("none") { "" } else { description };

    if description.is_empty() && tags.is_empty() {
        return None;
    }

    let namespace = namespace_name_from_id(id);
    let description = if description.is_empty() {
        String::new()
    } else {
        rewriter.rewrite(namespace, description)
    };
    let tags = tags
        .into_iter()
        .map(|tag| {
            let value = if tag.value.is_empty() { tag.value } else { rewriter.rewrite(namespace, &tag.value) };
            Tag { name: tag.name, value }
        })
        .collect();

    Some(Comment { description, tags })
}
