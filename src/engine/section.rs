use serde::{Deserialize, Serialize};

use crate::types::{SchemaCode, SectionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    Open,
    Restricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionScope {
    Global,
    Local,
}

/// A node in the platform's feature tree. The parent graph is a forest;
/// system nodes can be toggled but never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionNode {
    pub id: SectionId,
    pub name: String,
    pub parent_id: Option<SectionId>,
    pub bound_schema: Option<SchemaCode>,
    pub access_type: AccessType,
    pub scope: SectionScope,
    pub system: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSection {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<SectionId>,
    #[serde(default)]
    pub bound_schema: Option<SchemaCode>,
    pub access_type: AccessType,
    pub scope: SectionScope,
    #[serde(default)]
    pub system: bool,
}

/// Partial update. `parent_id`/`bound_schema` set a new value;
/// `clear_parent`/`clear_schema` detach explicitly, since an absent
/// JSON key already means "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub access_type: Option<AccessType>,
    #[serde(default)]
    pub scope: Option<SectionScope>,
    #[serde(default)]
    pub parent_id: Option<SectionId>,
    #[serde(default)]
    pub clear_parent: bool,
    #[serde(default)]
    pub bound_schema: Option<SchemaCode>,
    #[serde(default)]
    pub clear_schema: bool,
}
