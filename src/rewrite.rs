//! Default documentation rewriter: turns `$(ref:...)` mentions into
//! namespace-qualified `{@link ...}` tags.
//!
//! The symbol index is built on the first rewrite and read-only afterwards.
use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::{Captures, Regex};

use crate::overrides::CommentRewriter;
use crate::schema::ApiDocument;

static REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\(ref:([A-Za-z0-9_$.]+)\)").unwrap());
static TOPIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\(topic:[^)]*\)\[([^\]]*)\]").unwrap());
static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<code>(.*?)</code>").unwrap());

/// namespace → names of its types, properties and functions
#[derive(Debug, Default)]
struct SymbolIndex {
    namespaces: BTreeMap<String, BTreeSet<String>>,
}

impl SymbolIndex {
    fn build(doc: &ApiDocument) -> Self {
        let mut namespaces = BTreeMap::new();
        for ns in doc.api.values() {
            let mut symbols: BTreeSet<String> = BTreeSet::new();
            symbols.extend(ns.types.keys().cloned());
            symbols.extend(ns.functions.keys().cloned());
            if let Some(properties) = &ns.node.properties {
                symbols.extend(properties.keys().cloned());
            }
            namespaces.insert(ns.namespace.clone(), symbols);
        }
        Self { namespaces }
    }

    fn is_qualified(&self, target: &str) -> bool {
        self.namespaces
            .keys()
            .any(|ns| target.strip_prefix(ns.as_str()).is_some_and(|rest| rest.starts_with('.')))
    }

    fn link(&self, current: &str, target: &str) -> String {
        if self.is_qualified(target) || self.namespaces.contains_key(target) {
            return format!("{{@link {target}}}");
        }
        let head = target.split('.').next().unwrap_or(target);
        if self.namespaces.get(current).is_some_and(|symbols| symbols.contains(head)) {
            return format!("{{@link {current}.{target}}}");
        }
        format!("`{target}`")
    }
}

#[derive(Debug)]
pub struct RefRewriter<'a> {
    doc: &'a ApiDocument,
    index: OnceCell<SymbolIndex>,
}

impl<'a> RefRewriter<'a> {
    pub fn new(doc: &'a ApiDocument) -> Self {
        Self { doc, index: OnceCell::new() }
    }
}

impl CommentRewriter for RefRewriter<'_> {
    fn rewrite(&self, namespace: &str, text: &str) -> String {
        let index = self.index.get_or_init(|| SymbolIndex::build(self.doc));
        let text = TOPIC_RE.replace_all(text, "$1");
        let text = CODE_RE.replace_all(&text, "`$1`");
        REF_RE
            .replace_all(&text, |caps: &Captures<'_>| index.link(namespace, &caps[1]))
            .into_owned()
    }
}
