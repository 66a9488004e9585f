//! Structural diffing between template states.
//!
//! `diff` and `apply_patch` are pure and deterministic: identical inputs
//! always produce the identical patch, and the round-trip law
//! `apply_patch(s1, diff(s1, s2)) == s2` holds for every pair of states.
//! The version ledger relies on both properties.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{SchemaCode, SectionId};

/// The full bindings+config state of a template at one point in time.
/// Stored verbatim as each version's snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateState {
    pub schema_bindings: BTreeSet<SchemaCode>,
    pub section_bindings: BTreeSet<SectionId>,
    pub config: Value,
}

impl Default for TemplateState {
    fn default() -> Self {
        Self {
            schema_bindings: BTreeSet::new(),
            section_bindings: BTreeSet::new(),
            config: Value::Object(Map::new()),
        }
    }
}

/// One leaf-level change in the config document. `old`/`new` of `None`
/// mean the key was absent on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigChange {
    pub old: Option<Value>,
    pub new: Option<Value>,
}

/// Structural delta between two template states. Binding lists are
/// sorted; config changes are keyed by JSON-Pointer paths.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Patch {
    pub added_schemas: Vec<SchemaCode>,
    pub removed_schemas: Vec<SchemaCode>,
    pub added_sections: Vec<SectionId>,
    pub removed_sections: Vec<SectionId>,
    pub config_delta: BTreeMap<String, ConfigChange>,
}

impl Patch {
    pub fn is_empty(&self) -> bool {
        self.added_schemas.is_empty()
            && self.removed_schemas.is_empty()
            && self.added_sections.is_empty()
            && self.removed_sections.is_empty()
            && self.config_delta.is_empty()
    }

    /// Whether the patch drops any schema or section binding. Removals
    /// are what the ledger treats as breaking (major version bump).
    pub fn has_removals(&self) -> bool {
        !self.removed_schemas.is_empty() || !self.removed_sections.is_empty()
    }
}

pub fn diff(old: &TemplateState, new: &TemplateState) -> Patch {
    let mut config_delta = BTreeMap::new();
    diff_value("", &old.config, &new.config, &mut config_delta);

    Patch {
        added_schemas: new
            .schema_bindings
            .difference(&old.schema_bindings)
            .cloned()
            .collect(),
        removed_schemas: old
            .schema_bindings
            .difference(&new.schema_bindings)
            .cloned()
            .collect(),
        added_sections: new
            .section_bindings
            .difference(&old.section_bindings)
            .cloned()
            .collect(),
        removed_sections: old
            .section_bindings
            .difference(&new.section_bindings)
            .cloned()
            .collect(),
        config_delta,
    }
}

pub fn apply_patch(state: &TemplateState, patch: &Patch) -> TemplateState {
    let mut next = state.clone();

    for code in &patch.added_schemas {
        next.schema_bindings.insert(code.clone());
    }
    for code in &patch.removed_schemas {
        next.schema_bindings.remove(code);
    }
    for id in &patch.added_sections {
        next.section_bindings.insert(*id);
    }
    for id in &patch.removed_sections {
        next.section_bindings.remove(id);
    }

    for (path, change) in &patch.config_delta {
        apply_config_change(&mut next.config, path, change);
    }

    next
}

/// Recursive deep diff. Objects are compared key by key; every other
/// value (scalars and arrays) is treated as atomic. Entries land at the
/// deepest path where the two sides diverge, so recorded subtrees never
/// overlap.
fn diff_value(path: &str, old: &Value, new: &Value, out: &mut BTreeMap<String, ConfigChange>) {
    if old == new {
        return;
    }

    match (old, new) {
        (Value::Object(a), Value::Object(b)) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                let child = format!("{}/{}", path, escape_pointer_token(key));
                match (a.get(key), b.get(key)) {
                    (Some(o), Some(n)) => diff_value(&child, o, n, out),
                    (Some(o), None) => {
                        out.insert(
                            child,
                            ConfigChange {
                                old: Some(o.clone()),
                                new: None,
                            },
                        );
                    }
                    (None, Some(n)) => {
                        out.insert(
                            child,
                            ConfigChange {
                                old: None,
                                new: Some(n.clone()),
                            },
                        );
                    }
                    (None, None) => unreachable!("key came from the union of both maps"),
                }
            }
        }
        _ => {
            out.insert(
                path.to_string(),
                ConfigChange {
                    old: Some(old.clone()),
                    new: Some(new.clone()),
                },
            );
        }
    }
}

fn apply_config_change(config: &mut Value, path: &str, change: &ConfigChange) {
    if path.is_empty() {
        // Whole-document replacement: the two sides diverged at the root.
        *config = change.new.clone().unwrap_or(Value::Null);
        return;
    }

    let segments: Vec<String> = path
        .split('/')
        .skip(1)
        .map(unescape_pointer_token)
        .collect();

    let (leaf, parents) = match segments.split_last() {
        Some(split) => split,
        None => return,
    };

    let mut current = config;
    for segment in parents {
        current = as_object_coerce(current)
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let map = as_object_coerce(current);
    match &change.new {
        Some(value) => {
            map.insert(leaf.clone(), value.clone());
        }
        None => {
            map.remove(leaf);
        }
    }
}

/// Parent containers recorded in a patch are objects on both sides by
/// construction; coercing here keeps application total even on inputs
/// the diff never produced.
fn as_object_coerce(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

// RFC 6901 token escaping: '~' -> "~0", '/' -> "~1".
fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape_pointer_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}
