//! Stable identifiers for a node's structural position.
//!
//! A `PathId` is the only handle collaborators (visibility, overrides,
//! comment rewriting) get for "this particular occurrence of this node", so
//! it is built exclusively through the constructors below and rendered with
//! a single joining rule: segments separated by `.`.
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId {
    segments: Vec<String>,
}

impl PathId {
    /// Root id for a namespace. Dotted namespace names stay one segment.
    pub fn namespace(name: &str) -> Self {
        Self { segments: vec![name.to_string()] }
    }

    fn push(&self, segment: String) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Named child: type, property, function or parameter.
    pub fn child(&self, name: &str) -> Self { self.push(name.to_string()) }

    /// Array element or dictionary value.
    pub fn element(&self) -> Self { self.push("_".to_string()) }

    /// Function return value.
    pub fn returns(&self) -> Self { self.push("return".to_string()) }

    /// N-th alternative of a `choices` union.
    pub fn choice(&self, index: usize) -> Self { self.push(format!("_{index}")) }

    /// N-th explicit template argument of a `$ref`.
    pub fn template_arg(&self, index: usize) -> Self { self.push(format!("@{index}")) }

    /// Owning namespace name (the first segment).
    pub fn namespace_name(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or_default()
    }

    pub fn segments(&self) -> &[String] { &self.segments }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_suffixes() {
        let base = PathId::namespace("runtime").child("connect");
        assert_eq!(base.to_string(), "runtime.connect");
        assert_eq!(base.returns().to_string(), "runtime.connect.return");
        assert_eq!(base.element().to_string(), "runtime.connect._");
        assert_eq!(base.choice(2).to_string(), "runtime.connect._2");
        assert_eq!(base.returns().template_arg(0).to_string(), "runtime.connect.return.@0");
    }

    #[test]
    fn dotted_namespace_stays_whole() {
        let id = PathId::namespace("devtools.inspectedWindow").child("eval");
        assert_eq!(id.namespace_name(), "devtools.inspectedWindow");
        assert_eq!(id.to_string(), "devtools.inspectedWindow.eval");
        assert_eq!(id.segments().len(), 2);
    }

    #[test]
    fn construction_is_reproducible() {
        let a = PathId::namespace("tabs").child("Tab").child("id");
        let b = PathId::namespace("tabs").child("Tab").child("id");
        assert_eq!(a, b);
    }
}
