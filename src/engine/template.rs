use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::diff::TemplateState;
use crate::engine::semver::SemVer;
use crate::types::{SchemaCode, SectionId, TemplateId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Client,
    Supplier,
}

/// A named bundle of schema and section bindings plus opaque config.
/// The bindings and config held here are the working copy; committed
/// history lives in the version ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub kind: TemplateKind,
    pub current_version: SemVer,
    pub active: bool,
    pub is_default: bool,
    pub schema_bindings: BTreeSet<SchemaCode>,
    pub section_bindings: BTreeSet<SectionId>,
    pub config: Value,
}

impl Template {
    /// The working state as it would be captured by the next commit.
    pub fn state(&self) -> TemplateState {
        TemplateState {
            schema_bindings: self.schema_bindings.clone(),
            section_bindings: self.section_bindings.clone(),
            config: self.config.clone(),
        }
    }
}

fn default_config() -> Value {
    Value::Object(serde_json::Map::new())
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub kind: TemplateKind,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub schema_bindings: BTreeSet<SchemaCode>,
    #[serde(default)]
    pub section_bindings: BTreeSet<SectionId>,
    #[serde(default = "default_config")]
    pub config: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub schema_bindings: Option<BTreeSet<SchemaCode>>,
    #[serde(default)]
    pub section_bindings: Option<BTreeSet<SectionId>>,
    #[serde(default)]
    pub config: Option<Value>,
}
