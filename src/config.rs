//! Data-driven override table.
//!
//! ```json
//! {
//!   "hidden": ["runtime.getManifest"],
//!   "types": {"storage.StorageArea.get.return": {"type": "object", "additionalProperties": {"type": "any"}}},
//!   "templates": {"events.Event": "<H extends (...args: any) => void>"},
//!   "replaceAny": {"tabs.Tab.extData": "unknown"}
//! }
//! ```
//!
//! Keys are rendered path ids.
use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::Result;
use crate::overrides::RenderOverride;
use crate::path_de;
use crate::path_id::PathId;
use crate::schema::SchemaNode;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OverrideTable {
    /// Path ids removed from output in addition to `nodoc` nodes.
    #[serde(default)]
    pub hidden: BTreeSet<String>,
    /// Full node replacements.
    #[serde(default)]
    pub types: IndexMap<String, SchemaNode>,
    /// Template-parameter text appended after interface/class names.
    #[serde(default)]
    pub templates: IndexMap<String, String>,
    /// Type text substituted for `any`.
    #[serde(default)]
    pub replace_any: IndexMap<String, String>,
}

impl OverrideTable {
    pub fn from_json(src: &str) -> Result<Self> {
        path_de::from_str_with_path(src)
    }
}

impl RenderOverride for OverrideTable {
    fn is_visible(&self, node: &SchemaNode, id: &PathId) -> bool {
        !node.nodoc && !self.hidden.contains(&id.to_string())
    }

    fn type_override(&self, _node: &SchemaNode, id: &PathId) -> Option<SchemaNode> {
        self.types.get(&id.to_string()).cloned()
    }

    fn object_templates_for(&self, id: &PathId) -> Option<String> {
        self.templates.get(&id.to_string()).cloned()
    }

    fn replace_any_with(&self, id: &PathId) -> Option<String> {
        self.replace_any.get(&id.to_string()).cloned()
    }
}
