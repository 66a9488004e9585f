use serde::{Deserialize, Serialize};

use crate::engine::field::FieldDescriptor;
use crate::types::SchemaCode;

/// Functional category of a table schema, mirroring the classic
/// metadata-driven ERP taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaCategory {
    Directory,
    Document,
    Register,
    Journal,
    Report,
    Procedure,
}

/// A named, typed record definition composed of field descriptors.
///
/// `code` is unique and immutable for the lifetime of the schema.
/// System schemas are deletion-proof and structure-frozen after
/// creation; their display name may still be edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub code: SchemaCode,
    pub name: String,
    pub category: SchemaCategory,
    pub system: bool,
    pub fields: Vec<FieldDescriptor>,
}

impl TableSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSchema {
    pub code: SchemaCode,
    pub name: String,
    pub category: SchemaCategory,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

/// Header-level edits. Category changes count as structural and are
/// rejected on system schemas; renames are always allowed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<SchemaCategory>,
}

/// Identity-preserving field change-set. A relabel edits the existing
/// descriptor in place rather than dropping and recreating it, so
/// reference-integrity checks against the field stay reliable while an
/// update is in flight.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FieldChange {
    Added { field: FieldDescriptor },
    Removed { name: String },
    Relabeled {
        name: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        required: Option<bool>,
        #[serde(default)]
        choices: Option<Vec<String>>,
    },
}
