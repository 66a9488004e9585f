use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::engine::error::FieldError;
use crate::types::SchemaCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
    Reference,
    Select,
}

/// Atomic typed-field definition. Fields carry no behavior of their
/// own beyond invariant validation; the registry owns their lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub system: bool,
    /// Target schema code; mandatory for `Reference` fields, forbidden otherwise.
    #[serde(default)]
    pub reference_target: Option<SchemaCode>,
    /// Value list; mandatory for `Select` fields, forbidden otherwise.
    #[serde(default)]
    pub choices: Option<Vec<String>>,
}

impl FieldDescriptor {
    /// Check the kind/reference/choices invariants against the set of
    /// schema codes known to the registry at validation time.
    pub fn validate(&self, known_schemas: &BTreeSet<SchemaCode>) -> Result<(), FieldError> {
        if !is_identifier(&self.name) {
            return Err(FieldError::InvalidName(self.name.clone()));
        }

        match self.kind {
            FieldKind::Reference => match &self.reference_target {
                Some(target) if known_schemas.contains(target) => {}
                _ => return Err(FieldError::InvalidReference(self.name.clone())),
            },
            _ if self.reference_target.is_some() => {
                return Err(FieldError::InvalidReference(self.name.clone()));
            }
            _ => {}
        }

        match self.kind {
            FieldKind::Select => match &self.choices {
                Some(choices) if !choices.is_empty() => {
                    let unique: HashSet<&str> = choices.iter().map(String::as_str).collect();
                    if unique.len() != choices.len() {
                        return Err(FieldError::InvalidChoices(self.name.clone()));
                    }
                }
                _ => return Err(FieldError::InvalidChoices(self.name.clone())),
            },
            _ if self.choices.is_some() => {
                return Err(FieldError::InvalidChoices(self.name.clone()));
            }
            _ => {}
        }

        Ok(())
    }
}

/// Identifier rule shared by schema codes and field names: ascii letter
/// first, then letters, digits and underscores.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
